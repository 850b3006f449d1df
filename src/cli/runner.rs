use crate::{
    batch::{RenderBatch, Template},
    cli::args::{Args, ColonArg, GrammarArg},
    constants::STDIN_INDICATOR,
    error::{Error, Result},
    flat::FlatFormatter,
    prompt::{dialoguer::DialoguerPromptSource, NoPromptSource, PromptSource},
    types::{ColonReplace, Grammar, OutputMode},
};
use indexmap::IndexMap;
use log::{debug, info};
use std::io::Read;
use std::path::Path;

/// Main CLI runner: loads templates and value files, runs one render
/// batch, prints the per-template results.
pub struct Runner {
    args: Args,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    pub fn run(self) -> Result<()> {
        let providers = self
            .args
            .values
            .iter()
            .map(|path| load_values_file(path))
            .collect::<Result<Vec<_>>>()?;

        let mut batch = RenderBatch::new();
        for mapping in providers {
            batch = batch.provider(mapping);
        }
        for pair in &self.args.constants {
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                Error::Other(anyhow::anyhow!(
                    "constant '{pair}' must be in NAME=VALUE form"
                ))
            })?;
            batch = batch.constant(name, value);
        }

        let formatter = FlatFormatter::new()
            .with_output_mode(if self.args.filename {
                OutputMode::FileName
            } else {
                OutputMode::Title
            })
            .with_colon_replace(colon_policy(self.args.colons));
        batch = batch.flat_formatter(formatter);
        batch.renderer_mut().set_collapse_blank_lines(self.args.collapse_blank_lines);

        for source in &self.args.templates {
            let (id, body) = read_template(source)?;
            let grammar = match self.args.grammar {
                GrammarArg::Flat => Grammar::Flat,
                GrammarArg::Document => Grammar::Document,
                GrammarArg::Auto => detect_grammar(&body),
            };
            debug!("template '{id}' tagged as {grammar}");
            batch = batch.template(Template { id, grammar, body });
        }

        let interactive = DialoguerPromptSource::new();
        let silent = NoPromptSource;
        let source: &dyn PromptSource =
            if self.args.non_interactive { &silent } else { &interactive };
        let outcome = batch.prompt_source(source).run()?;

        let mut failures = 0;
        for result in &outcome.results {
            match &result.rendered {
                Ok(text) => {
                    info!("rendered '{}'", result.id);
                    println!("{text}");
                }
                Err(err) => {
                    failures += 1;
                    eprintln!("{}: {err}", result.id);
                }
            }
        }
        if failures > 0 {
            return Err(Error::Other(anyhow::anyhow!(
                "{failures} of {} template(s) failed",
                outcome.results.len()
            )));
        }
        Ok(())
    }
}

/// Runs the CLI workflow with the given arguments.
pub fn run(args: Args) -> Result<()> {
    Runner::new(args).run()
}

fn colon_policy(arg: ColonArg) -> ColonReplace {
    match arg {
        ColonArg::Keep => ColonReplace::Keep,
        ColonArg::Delete => ColonReplace::Delete,
        ColonArg::Dash => ColonReplace::Dash,
        ColonArg::SpaceDash => ColonReplace::SpaceDash,
        ColonArg::SpaceDashSpace => ColonReplace::SpaceDashSpace,
    }
}

/// Documents use double-brace expressions or block tags; everything
/// else is treated as the flat grammar.
pub fn detect_grammar(body: &str) -> Grammar {
    if body.contains("{{") || body.contains("{%") {
        Grammar::Document
    } else {
        Grammar::Flat
    }
}

fn read_template(source: &str) -> Result<(String, String)> {
    if source == STDIN_INDICATOR {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        return Ok(("<stdin>".to_string(), body));
    }
    let body = std::fs::read_to_string(source)?;
    Ok((source.to_string(), body))
}

/// Loads a JSON object file into an ordered name -> value mapping.
/// Non-string scalars are coerced to their display form.
fn load_values_file(path: &Path) -> Result<IndexMap<String, String>> {
    let raw = std::fs::read_to_string(path)?;
    let parsed: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| Error::ValuesParseError {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
    let object = parsed.as_object().ok_or_else(|| Error::ValuesParseError {
        path: path.display().to_string(),
        detail: "expected a top-level JSON object".to_string(),
    })?;
    let mut mapping = IndexMap::new();
    for (key, value) in object {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        mapping.insert(key.clone(), value);
    }
    Ok(mapping)
}
