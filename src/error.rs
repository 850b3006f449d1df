use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Unknown token '{token}'.")]
    UnknownToken { token: String },

    #[error("Malformed token syntax at offset {offset}: '{snippet}'.")]
    MalformedTokenSyntax { snippet: String, offset: usize },

    #[error("Unknown filter '{filter}' applied to token '{token}'.")]
    UnknownFilter { filter: String, token: String },

    #[error("Filter '{filter}' on token '{token}' expects {expected}, got {got} argument(s).")]
    FilterArity { filter: String, token: String, expected: String, got: usize },

    #[error("Filter '{filter}' on token '{token}' cannot use argument '{value}'.")]
    FilterArgument { filter: String, token: String, value: String },

    #[error("Prompt request failed: {0}.")]
    PromptRequestFailed(String),

    #[error("Template syntax error on line {line}: {detail}")]
    TemplateSyntax { line: usize, detail: String },

    #[error("Invalid replacement rule pattern '{pattern}'. Original error: {detail}")]
    InvalidRulePattern { pattern: String, detail: String },

    #[error("User token '{token}' must start with '{prefix}'.")]
    InvalidUserTokenName { token: String, prefix: String },

    #[error("Failed to parse values file '{path}': {detail}")]
    ValuesParseError { path: String, detail: String },

    #[error("Prompt input error: {0}.")]
    DialoguerError(#[from] dialoguer::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias for Results with tokensmith's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(crate::constants::exit_codes::FAILURE);
}
