//! Filter pipeline for the flat grammar.
//!
//! Filters are pure string transformations applied left to right after a
//! token resolves. Built-ins cover the casing and padding filters the
//! flat grammar guarantees; callers can register their own on top.

use cruet::case::title::to_title_case;
use indexmap::IndexMap;

/// One parsed `name(args)` step of a filter chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterInvocation {
    pub name: String,
    pub args: Vec<String>,
}

/// Internal filter failure; the formatter attaches the token name and
/// converts it into a crate [`Error`](crate::error::Error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    Unknown { filter: String },
    Arity { filter: String, expected: String, got: usize },
    InvalidArgument { filter: String, value: String },
}

type FilterFn = Box<dyn Fn(&str, &[String]) -> Result<String, FilterError> + Send + Sync>;

struct RegisteredFilter {
    /// Human-readable arity description used in error messages.
    expected_args: &'static str,
    arity: usize,
    func: FilterFn,
}

/// Registry mapping filter name -> transformation.
pub struct FilterRegistry {
    filters: IndexMap<String, RegisteredFilter>,
}

impl FilterRegistry {
    /// Creates a registry with the built-in filter set.
    pub fn new() -> Self {
        let mut registry = Self { filters: IndexMap::new() };
        registry.register_builtin("upper", 0, "no arguments", |v, _| Ok(v.to_uppercase()));
        registry.register_builtin("lower", 0, "no arguments", |v, _| Ok(v.to_lowercase()));
        registry.register_builtin("title", 0, "no arguments", |v, _| Ok(to_title_case(v)));
        registry.register_builtin("swapcase", 0, "no arguments", |v, _| Ok(swap_case(v)));
        registry.register_builtin("capitalize", 0, "no arguments", |v, _| Ok(capitalize(v)));
        registry.register_builtin("zfill", 1, "1 numeric argument", |v, args| {
            let width = args[0].parse::<usize>().map_err(|_| {
                FilterError::InvalidArgument {
                    filter: "zfill".into(),
                    value: args[0].clone(),
                }
            })?;
            Ok(zero_fill(v, width))
        });
        registry.register_builtin("replace", 2, "2 arguments", |v, args| {
            Ok(v.replace(&args[0], &args[1]))
        });
        registry
    }

    fn register_builtin(
        &mut self,
        name: &str,
        arity: usize,
        expected_args: &'static str,
        func: impl Fn(&str, &[String]) -> Result<String, FilterError> + Send + Sync + 'static,
    ) {
        self.filters.insert(
            name.to_string(),
            RegisteredFilter { expected_args, arity, func: Box::new(func) },
        );
    }

    /// Registers a caller-supplied filter taking exactly `arity` arguments.
    pub fn register(
        &mut self,
        name: &str,
        arity: usize,
        func: impl Fn(&str, &[String]) -> String + Send + Sync + 'static,
    ) {
        self.filters.insert(
            name.to_string(),
            RegisteredFilter {
                expected_args: "registered arity",
                arity,
                func: Box::new(move |v, args| Ok(func(v, args))),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Applies a filter chain left to right; each step consumes the
    /// previous step's output.
    pub fn apply(
        &self,
        chain: &[FilterInvocation],
        value: &str,
    ) -> Result<String, FilterError> {
        let mut current = value.to_string();
        for invocation in chain {
            let filter = self
                .filters
                .get(&invocation.name)
                .ok_or_else(|| FilterError::Unknown { filter: invocation.name.clone() })?;
            if invocation.args.len() != filter.arity {
                return Err(FilterError::Arity {
                    filter: invocation.name.clone(),
                    expected: filter.expected_args.to_string(),
                    got: invocation.args.len(),
                });
            }
            current = (filter.func)(&current, &invocation.args)?;
        }
        Ok(current)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn swap_case(value: &str) -> String {
    value
        .chars()
        .flat_map(|c| {
            if c.is_uppercase() {
                c.to_lowercase().collect::<Vec<_>>()
            } else if c.is_lowercase() {
                c.to_uppercase().collect::<Vec<_>>()
            } else {
                vec![c]
            }
        })
        .collect()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
        }
        None => String::new(),
    }
}

/// Left-pads with zeros to `width`, keeping a leading sign in front of
/// the padding ("-42" -> "-0042").
fn zero_fill(value: &str, width: usize) -> String {
    let char_count = value.chars().count();
    if char_count >= width {
        return value.to_string();
    }
    let pad = "0".repeat(width - char_count);
    match value.strip_prefix('-').or_else(|| value.strip_prefix('+')) {
        Some(rest) => format!("{}{}{}", &value[..1], pad, rest),
        None => format!("{pad}{value}"),
    }
}
