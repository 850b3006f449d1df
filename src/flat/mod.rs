//! Flat-string formatter: renders single-line token strings (filenames
//! and titles) against a token catalog.

pub mod filters;
pub mod parser;

pub use filters::{FilterInvocation, FilterRegistry};
pub use parser::{parse, Segment, TokenRef};

use crate::catalog::{Resolution, TokenCatalog};
use crate::error::{Error, Result};
use crate::flat::filters::FilterError;
use crate::rules::ReplacementRule;
use crate::types::{ColonReplace, OutputMode};
use regex::Regex;

/// Renders flat-grammar templates.
///
/// Rendering is a pure function of the template and the catalog: the
/// same inputs always produce byte-identical output.
pub struct FlatFormatter {
    filters: FilterRegistry,
    output_mode: OutputMode,
    colon_replace: ColonReplace,
    rules: Vec<ReplacementRule>,
    whitespace_run: Regex,
    dot_run: Regex,
    colon_dot: Regex,
    dash_join: Regex,
}

impl FlatFormatter {
    pub fn new() -> Self {
        Self {
            filters: FilterRegistry::new(),
            output_mode: OutputMode::Title,
            colon_replace: ColonReplace::Keep,
            rules: Vec::new(),
            whitespace_run: Regex::new(r"\s+").unwrap(),
            dot_run: Regex::new(r"\.{2,}").unwrap(),
            colon_dot: Regex::new(r":\.").unwrap(),
            dash_join: Regex::new(r"\.-\.|\.-|-\.").unwrap(),
        }
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn with_colon_replace(mut self, policy: ColonReplace) -> Self {
        self.colon_replace = policy;
        self
    }

    /// Replacement rules applied as a final pass over rendered output.
    pub fn with_rules(mut self, rules: Vec<ReplacementRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Access to the filter registry for caller-supplied filters.
    pub fn filters_mut(&mut self) -> &mut FilterRegistry {
        &mut self.filters
    }

    /// Renders a flat template against the catalog.
    ///
    /// A bare `{name}` unknown to the catalog is an error; a known but
    /// empty token substitutes the empty string. Optional segments
    /// vanish entirely when their token is empty or unknown.
    pub fn render(&self, template: &str, catalog: &TokenCatalog) -> Result<String> {
        let segments = parser::parse(template)?;
        let mut output = String::with_capacity(template.len());

        for segment in &segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Token(token) => {
                    match catalog.resolve(&token.name) {
                        Resolution::Known(value) => {
                            output.push_str(&self.shape_value(token, value)?);
                        }
                        Resolution::Empty => {}
                        Resolution::Unknown => {
                            return Err(Error::UnknownToken { token: token.name.clone() });
                        }
                    }
                }
                Segment::Optional { prefix, token, suffix } => {
                    // suppression is decided on the pre-filter resolution
                    if let Resolution::Known(value) = catalog.resolve(&token.name) {
                        output.push_str(prefix);
                        output.push_str(&self.shape_value(token, value)?);
                        output.push_str(suffix);
                    }
                }
            }
        }

        Ok(self.finalize(&output))
    }

    /// Applies the filter chain, then the colon policy, to one value.
    fn shape_value(&self, token: &TokenRef, value: &str) -> Result<String> {
        let filtered = self
            .filters
            .apply(&token.filters, value)
            .map_err(|e| convert_filter_error(e, &token.name))?;
        if self.output_mode == OutputMode::Title {
            Ok(self.colon_replace.apply(&filtered))
        } else {
            Ok(filtered)
        }
    }

    /// Final whitespace shaping plus the replacement rule pass.
    fn finalize(&self, rendered: &str) -> String {
        let mut out = match self.output_mode {
            OutputMode::Title => {
                self.whitespace_run.replace_all(rendered, " ").into_owned()
            }
            OutputMode::FileName => {
                let dotted = self.whitespace_run.replace_all(rendered, ".");
                let collapsed = self.dot_run.replace_all(&dotted, ".");
                let no_colon_dot = self.colon_dot.replace_all(&collapsed, ".");
                self.dash_join.replace_all(&no_colon_dot, "-").into_owned()
            }
        };
        for rule in &self.rules {
            out = rule.apply(&out);
        }
        out
    }
}

impl Default for FlatFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_filter_error(err: FilterError, token: &str) -> Error {
    match err {
        FilterError::Unknown { filter } => {
            Error::UnknownFilter { filter, token: token.to_string() }
        }
        FilterError::Arity { filter, expected, got } => {
            Error::FilterArity { filter, token: token.to_string(), expected, got }
        }
        FilterError::InvalidArgument { filter, value } => {
            Error::FilterArgument { filter, token: token.to_string(), value }
        }
    }
}
