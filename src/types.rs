//! Common types used across the tokensmith crate.

use std::fmt::Display;

/// Which grammar a template body is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// Single-line, single-brace token strings (filenames and titles).
    Flat,
    /// Multi-line, double-brace documents rendered through minijinja.
    Document,
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grammar::Flat => "flat",
            Grammar::Document => "document",
        };
        write!(f, "{s}")
    }
}

/// Final shaping applied to flat-grammar output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Whitespace runs collapse to single spaces.
    #[default]
    Title,
    /// Output in `x.x` form: whitespace becomes dots, dot runs collapse.
    FileName,
}

/// What to do with colons inside substituted values (title output only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColonReplace {
    #[default]
    Keep,
    Delete,
    Dash,
    SpaceDash,
    SpaceDashSpace,
}

impl ColonReplace {
    /// Applies the policy to a substituted value.
    pub fn apply(&self, value: &str) -> String {
        match self {
            ColonReplace::Keep => value.to_string(),
            ColonReplace::Delete => value.replace(':', ""),
            ColonReplace::Dash => value.replace(':', "-"),
            ColonReplace::SpaceDash => value.replace(':', " -"),
            ColonReplace::SpaceDashSpace => value.replace(':', " - "),
        }
    }
}

impl Display for ColonReplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColonReplace::Keep => "keep",
            ColonReplace::Delete => "delete",
            ColonReplace::Dash => "dash",
            ColonReplace::SpaceDash => "space-dash",
            ColonReplace::SpaceDashSpace => "space-dash-space",
        };
        write!(f, "{s}")
    }
}
