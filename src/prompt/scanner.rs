//! Prompt-token extraction from both grammars.

use crate::constants::PROMPT_TOKEN_PREFIX;
use crate::error::Result;
use crate::flat::parser::{self, Segment};
use crate::types::Grammar;
use indexmap::IndexSet;
use regex::Regex;
use std::sync::OnceLock;

fn document_prompt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*(prompt_[^}\s|]+)").unwrap())
}

/// Collects `prompt_*` names from one template body into `found`,
/// preserving first-seen order across the whole batch.
pub fn scan_template(
    body: &str,
    grammar: Grammar,
    found: &mut IndexSet<String>,
) -> Result<()> {
    match grammar {
        Grammar::Flat => {
            for segment in parser::parse(body)? {
                let token = match segment {
                    Segment::Token(t) => t,
                    Segment::Optional { token, .. } => token,
                    Segment::Literal(_) => continue,
                };
                if token.name.starts_with(PROMPT_TOKEN_PREFIX) {
                    found.insert(token.name);
                }
            }
        }
        Grammar::Document => {
            for capture in document_prompt_re().captures_iter(body) {
                found.insert(capture[1].to_string());
            }
        }
    }
    Ok(())
}
