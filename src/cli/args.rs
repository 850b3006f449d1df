use crate::constants::verbosity;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::fmt::Display;
use std::path::PathBuf;

/// Grammar selection for the templates on the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
#[value(rename_all = "lowercase")]
pub enum GrammarArg {
    /// Pick by content: double-brace expressions mean a document.
    Auto,
    Flat,
    Document,
}

impl Display for GrammarArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GrammarArg::Auto => "auto",
            GrammarArg::Flat => "flat",
            GrammarArg::Document => "document",
        };
        write!(f, "{s}")
    }
}

/// Colon handling for title output.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
#[value(rename_all = "kebab-case")]
pub enum ColonArg {
    Keep,
    Delete,
    Dash,
    SpaceDash,
    SpaceDashSpace,
}

/// CLI arguments for tokensmith.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Template files to render, or `-` to read one template from stdin.
    #[arg(value_name = "TEMPLATE", required = true)]
    pub templates: Vec<String>,

    /// JSON files of token name -> value mappings, in precedence order.
    #[arg(short = 'm', long = "values", value_name = "FILE")]
    pub values: Vec<PathBuf>,

    /// User constant tokens as `usr_name=value` pairs.
    #[arg(short, long = "constant", value_name = "NAME=VALUE")]
    pub constants: Vec<String>,

    /// Grammar of the templates.
    #[arg(long, value_enum, default_value_t = GrammarArg::Auto)]
    pub grammar: GrammarArg,

    /// Produce filename-shaped output (`x.x` form) for flat templates.
    #[arg(long)]
    pub filename: bool,

    /// Colon handling in flat title output.
    #[arg(long = "colons", value_enum, default_value_t = ColonArg::Keep)]
    pub colons: ColonArg,

    /// Collapse runs of blank lines in document output.
    #[arg(long = "collapse-blank-lines")]
    pub collapse_blank_lines: bool,

    /// Disable interactive prompting; prompt tokens resolve empty.
    #[arg(long = "non-interactive")]
    pub non_interactive: bool,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parses CLI arguments.
pub fn parse_cli() -> Args {
    Args::parse()
}

pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}
