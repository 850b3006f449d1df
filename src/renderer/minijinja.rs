use crate::context::{program_info, RenderContext};
use crate::error::{Error, Result};
use crate::renderer::interface::TemplateRenderer;
use cruet::{
    case::{
        camel::to_camel_case, kebab::to_kebab_case, pascal::to_pascal_case,
        screaming_snake::to_screaming_snake_case, snake::to_snake_case,
        title::to_title_case, train::to_train_case,
    },
    string::{pluralize::to_plural, singularize::to_singular},
};
use minijinja::Environment;
use regex::Regex;

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
    /// Collapse runs of blank lines left by false conditional blocks
    collapse_blank_lines: bool,
    blank_run: Regex,
}

impl MiniJinjaRenderer {
    /// Creates a new MiniJinjaRenderer instance with default environment.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_filter("camel_case", to_camel_case);
        env.add_filter("kebab_case", to_kebab_case);
        env.add_filter("pascal_case", to_pascal_case);
        env.add_filter("screaming_snake_case", to_screaming_snake_case);
        env.add_filter("snake_case", to_snake_case);
        env.add_filter("title_case", to_title_case);
        env.add_filter("train_case", to_train_case);
        env.add_filter("plural", to_plural);
        env.add_filter("singular", to_singular);

        Self { env, collapse_blank_lines: false, blank_run: Regex::new(r"\n{3,}").unwrap() }
    }

    /// Enables or disables blank-line collapsing of rendered output.
    pub fn set_collapse_blank_lines(&mut self, on: bool) {
        self.collapse_blank_lines = on;
    }

    /// Registers the lazily computed engine globals for one batch:
    /// `nf_program_info()` and `nf_screen_shots()` run only when a
    /// template actually calls them.
    pub fn install_globals(&mut self, context: &RenderContext) {
        self.env.add_function("nf_program_info", program_info);
        let shots = context.clone();
        self.env
            .add_function("nf_screen_shots", move || shots.screen_shot_block());
    }

    /// Pass-through access to minijinja's own extension points so
    /// callers can register custom filters and functions.
    pub fn env_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    fn post_process(&self, rendered: String) -> String {
        if self.collapse_blank_lines {
            self.blank_run.replace_all(&rendered, "\n\n").into_owned()
        } else {
            rendered
        }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        let mut env = self.env.clone();
        env.add_template_owned("inline".to_string(), template.to_string())
            .map_err(wrap_syntax_error)?;
        let tmpl = env.get_template("inline").map_err(wrap_syntax_error)?;
        let rendered = tmpl.render(context).map_err(wrap_syntax_error)?;
        Ok(self.post_process(rendered))
    }
}

/// User-authored template mistakes surface with the offending line
/// number instead of a raw minijinja error.
fn wrap_syntax_error(err: minijinja::Error) -> Error {
    Error::TemplateSyntax { line: err.line().unwrap_or(0), detail: err.to_string() }
}
