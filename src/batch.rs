//! Render batch orchestration.
//!
//! A batch is the unit of coordination: all templates in it share one
//! immutable token catalog and one set of prompt answers. The batch
//! moves through `Scanning -> AwaitingAnswers -> Resolved`; the prompt
//! request is the only suspension point. Failures before `Resolved`
//! abort the whole batch (no catalog exists yet); failures while
//! rendering are collected per template and never abort siblings.

use crate::catalog::TokenCatalog;
use crate::constants::USER_TOKEN_PREFIX;
use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::flat::FlatFormatter;
use crate::prompt::{NoPromptSource, PromptCondition, PromptCoordinator, PromptSource};
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};
use crate::types::Grammar;
use indexmap::IndexMap;
use log::debug;

static NO_PROMPTS: NoPromptSource = NoPromptSource;

/// One template to render, tagged by grammar.
#[derive(Debug, Clone)]
pub struct Template {
    pub id: String,
    pub grammar: Grammar,
    pub body: String,
}

impl Template {
    pub fn flat(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self { id: id.into(), grammar: Grammar::Flat, body: body.into() }
    }

    pub fn document(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self { id: id.into(), grammar: Grammar::Document, body: body.into() }
    }
}

/// Per-template result; the template identity pins errors to their
/// source without inspecting internals.
#[derive(Debug)]
pub struct TemplateResult {
    pub id: String,
    pub rendered: Result<String>,
}

/// All per-template results, in input order (template identity, not
/// completion order).
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<TemplateResult>,
}

impl BatchOutcome {
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(|r| r.rendered.is_ok())
    }

    pub fn get(&self, id: &str) -> Option<&Result<String>> {
        self.results.iter().find(|r| r.id == id).map(|r| &r.rendered)
    }
}

/// Batch lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Scanning,
    AwaitingAnswers,
    Resolved,
}

/// Builder and runner for one render batch.
///
/// Provider mappings, constants and prompt answers merge into the
/// catalog in that precedence order; the catalog is built fresh here
/// and discarded with the batch.
pub struct RenderBatch<'a> {
    templates: Vec<Template>,
    providers: Vec<IndexMap<String, String>>,
    constants: IndexMap<String, String>,
    conditions: Vec<PromptCondition>,
    source: &'a dyn PromptSource,
    render_context: RenderContext,
    formatter: FlatFormatter,
    renderer: MiniJinjaRenderer,
    state: BatchState,
}

impl<'a> RenderBatch<'a> {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            providers: Vec::new(),
            constants: IndexMap::new(),
            conditions: Vec::new(),
            source: &NO_PROMPTS,
            render_context: RenderContext::new(),
            formatter: FlatFormatter::new(),
            renderer: MiniJinjaRenderer::new(),
            state: BatchState::Scanning,
        }
    }

    pub fn template(mut self, template: Template) -> Self {
        self.templates.push(template);
        self
    }

    /// Adds a provider mapping; later providers shadow earlier ones.
    pub fn provider(mut self, mapping: IndexMap<String, String>) -> Self {
        self.providers.push(mapping);
        self
    }

    /// Adds a user-defined constant token; the name must carry the
    /// `usr_` prefix (checked when the batch runs).
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    /// Gates a prompt behind a controlling token.
    pub fn condition(
        mut self,
        prompt: impl Into<String>,
        requires: impl Into<String>,
    ) -> Self {
        self.conditions
            .push(PromptCondition { prompt: prompt.into(), requires: requires.into() });
        self
    }

    pub fn prompt_source(mut self, source: &'a dyn PromptSource) -> Self {
        self.source = source;
        self
    }

    pub fn render_context(mut self, context: RenderContext) -> Self {
        self.render_context = context;
        self
    }

    pub fn flat_formatter(mut self, formatter: FlatFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Access to the flat filter registry for caller-supplied filters.
    pub fn formatter_mut(&mut self) -> &mut FlatFormatter {
        &mut self.formatter
    }

    /// Access to the multi-line renderer (custom minijinja filters and
    /// functions register through its environment).
    pub fn renderer_mut(&mut self) -> &mut MiniJinjaRenderer {
        &mut self.renderer
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    fn transition(&mut self, next: BatchState) {
        debug!("batch state: {:?} -> {next:?}", self.state);
        self.state = next;
    }

    /// Runs the batch to completion.
    ///
    /// Scanning or prompt failures abort the whole run; render failures
    /// come back inside [`BatchOutcome`] per template.
    pub fn run(mut self) -> Result<BatchOutcome> {
        for name in self.constants.keys() {
            if !name.starts_with(USER_TOKEN_PREFIX) {
                return Err(Error::InvalidUserTokenName {
                    token: name.clone(),
                    prefix: USER_TOKEN_PREFIX.to_string(),
                });
            }
        }

        // Scanning: prompt names are collected against the pre-prompt
        // catalog so conditions can be evaluated.
        let base_catalog = TokenCatalog::from_sources(
            self.providers.iter().cloned().chain([self.constants.clone()]),
        );
        let conditions = std::mem::take(&mut self.conditions);
        let coordinator = PromptCoordinator::new(self.source, &conditions);
        let scan = {
            let templates: Vec<(Grammar, &str)> =
                self.templates.iter().map(|t| (t.grammar, t.body.as_str())).collect();
            coordinator.scan(templates, &base_catalog)?
        };

        self.transition(BatchState::AwaitingAnswers);
        let answers = coordinator.collect(&scan).map_err(|e| match e {
            Error::PromptRequestFailed(_) => e,
            other => Error::PromptRequestFailed(other.to_string()),
        })?;

        self.transition(BatchState::Resolved);
        let catalog = TokenCatalog::from_sources(
            self.providers
                .iter()
                .cloned()
                .chain([self.constants.clone(), answers]),
        );
        debug!("catalog resolved with {} token(s)", catalog.len());

        self.renderer.install_globals(&self.render_context);
        let document_context = self.render_context.to_value(&catalog);

        let mut outcome = BatchOutcome::default();
        for template in &self.templates {
            let rendered = match template.grammar {
                Grammar::Flat => self.formatter.render(&template.body, &catalog),
                Grammar::Document => {
                    self.renderer.render(&template.body, &document_context)
                }
            };
            if let Err(err) = &rendered {
                debug!("template '{}' failed: {err}", template.id);
            }
            outcome.results.push(TemplateResult { id: template.id.clone(), rendered });
        }
        Ok(outcome)
    }
}

impl Default for RenderBatch<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn constants_must_carry_the_user_prefix() {
        let err = RenderBatch::new().constant("group", "GRP").run().unwrap_err();
        assert!(matches!(err, Error::InvalidUserTokenName { .. }));
    }

    #[test]
    fn prompt_answers_take_highest_precedence() {
        struct Fixed;
        impl PromptSource for Fixed {
            fn request(&self, names: &[String]) -> Result<IndexMap<String, String>> {
                Ok(names.iter().map(|n| (n.clone(), "from-prompt".to_string())).collect())
            }
        }
        let outcome = RenderBatch::new()
            .provider(mapping(&[("prompt_x", "from-provider")]))
            .template(Template::flat("t", "{prompt_x}"))
            .prompt_source(&Fixed)
            .run()
            .unwrap();
        assert_eq!(outcome.get("t").unwrap().as_ref().unwrap(), "from-prompt");
    }

    #[test]
    fn sibling_templates_survive_one_failure() {
        let outcome = RenderBatch::new()
            .provider(mapping(&[("title", "Coherence")]))
            .template(Template::flat("good", "{title}"))
            .template(Template::flat("bad", "{bad_token}"))
            .template(Template::flat("also_good", "{title}!"))
            .run()
            .unwrap();
        assert!(outcome.get("good").unwrap().is_ok());
        assert!(matches!(
            outcome.get("bad").unwrap(),
            Err(Error::UnknownToken { token }) if token == "bad_token"
        ));
        assert_eq!(outcome.get("also_good").unwrap().as_ref().unwrap(), "Coherence!");
        assert!(!outcome.all_ok());
    }

    #[test]
    fn cancelled_prompt_aborts_the_whole_batch() {
        struct Cancelled;
        impl PromptSource for Cancelled {
            fn request(&self, _names: &[String]) -> Result<IndexMap<String, String>> {
                Err(Error::PromptRequestFailed("cancelled by user".to_string()))
            }
        }
        let err = RenderBatch::new()
            .template(Template::flat("t", "{prompt_x}"))
            .prompt_source(&Cancelled)
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::PromptRequestFailed(_)));
    }

    #[test]
    fn cancellation_message_is_not_rewrapped() {
        struct Cancelled;
        impl PromptSource for Cancelled {
            fn request(&self, _names: &[String]) -> Result<IndexMap<String, String>> {
                Err(Error::PromptRequestFailed("cancelled by user".to_string()))
            }
        }
        let err = RenderBatch::new()
            .template(Template::flat("t", "{prompt_x}"))
            .prompt_source(&Cancelled)
            .run()
            .unwrap_err();
        assert_eq!(err.to_string(), "Prompt request failed: cancelled by user.");
    }

    #[test]
    fn malformed_template_aborts_during_scanning() {
        let err = RenderBatch::new()
            .template(Template::flat("broken", "{unterminated"))
            .run()
            .unwrap_err();
        assert!(matches!(err, Error::MalformedTokenSyntax { .. }));
    }

    #[test]
    fn answers_do_not_leak_into_the_next_batch() {
        struct Once;
        impl PromptSource for Once {
            fn request(&self, names: &[String]) -> Result<IndexMap<String, String>> {
                Ok(names.iter().map(|n| (n.clone(), "answer".to_string())).collect())
            }
        }
        let first = RenderBatch::new()
            .template(Template::flat("t", "{prompt_x}"))
            .prompt_source(&Once)
            .run()
            .unwrap();
        assert_eq!(first.get("t").unwrap().as_ref().unwrap(), "answer");

        // a fresh batch with no prompt source starts from nothing
        let second = RenderBatch::new()
            .template(Template::flat("t", "{prompt_x}"))
            .run()
            .unwrap();
        assert_eq!(second.get("t").unwrap().as_ref().unwrap(), "");
    }

    #[test]
    fn results_follow_input_order() {
        let outcome = RenderBatch::new()
            .provider(mapping(&[("a", "1"), ("b", "2")]))
            .template(Template::flat("second", "{b}"))
            .template(Template::flat("first", "{a}"))
            .run()
            .unwrap();
        assert_eq!(outcome.results[0].id, "second");
        assert_eq!(outcome.results[1].id, "first");
    }
}
