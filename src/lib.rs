/// Handles argument parsing.
pub mod cli;

/// Defines custom error types.
pub mod error;

/// Constants shared across the crate (reserved prefixes, exit codes).
pub mod constants;

/// Common types used across the crate.
pub mod types;

/// The precedence-merged token catalog.
pub mod catalog;

/// Flat single-brace grammar: parsing, filters and rendering.
pub mod flat;

/// Multi-line template rendering over minijinja.
pub mod renderer;

/// Structured render context for the multi-line grammar.
pub mod context;

/// Runtime prompt token coordination.
pub mod prompt;

/// Render batch orchestration.
pub mod batch;

/// Post-render replacement rule tables.
pub mod rules;
