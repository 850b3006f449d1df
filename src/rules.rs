//! Post-render replacement rule tables.
//!
//! A rule list is an ordered table of (pattern, replacement) pairs run
//! over rendered output. Rules are data, not code: the replacement may
//! use the markers `[remove]` (delete), `[space]` (single space) and
//! `[unidecode]` (fold to ASCII by dropping non-ASCII characters).

use crate::error::{Error, Result};
use regex::Regex;

/// Marker replacing the match with nothing.
pub const REMOVE_MARKER: &str = "[remove]";
/// Marker replacing the match with a single space.
pub const SPACE_MARKER: &str = "[space]";
/// Marker folding the whole string to ASCII instead of substituting.
pub const ASCII_FOLD_MARKER: &str = "[unidecode]";

/// One compiled (pattern, replacement) rule.
#[derive(Debug, Clone)]
pub struct ReplacementRule {
    pattern: Regex,
    replacement: String,
}

impl ReplacementRule {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidRulePattern {
            pattern: pattern.to_string(),
            detail: e.to_string(),
        })?;
        Ok(Self { pattern, replacement: replacement.to_string() })
    }

    /// Applies this rule to the input.
    pub fn apply(&self, input: &str) -> String {
        if self.replacement == ASCII_FOLD_MARKER {
            return input.chars().filter(char::is_ascii).collect();
        }
        let replacement =
            self.replacement.replace(REMOVE_MARKER, "").replace(SPACE_MARKER, " ");
        self.pattern.replace_all(input, replacement.as_str()).into_owned()
    }
}

/// Builds a rule list from a (pattern, replacement) table, preserving
/// order. The whole table is rejected on the first invalid pattern.
pub fn compile_rules(table: &[(&str, &str)]) -> Result<Vec<ReplacementRule>> {
    table.iter().map(|(p, r)| ReplacementRule::new(p, r)).collect()
}

/// The default title-clean table: ASCII fold, "&" to "and", drop
/// apostrophes, non-alphanumerics to spaces, collapse space runs.
pub fn title_clean_rules() -> Vec<ReplacementRule> {
    compile_rules(&[
        ("", ASCII_FOLD_MARKER),
        ("&", "and"),
        ("'", REMOVE_MARKER),
        ("[^a-zA-Z0-9]", SPACE_MARKER),
        (r"\s{2,}", SPACE_MARKER),
    ])
    .expect("default rule table is valid")
}
