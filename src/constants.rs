//! Constants used throughout the tokensmith crate

/// Prefix reserved for user-defined constant tokens
pub const USER_TOKEN_PREFIX: &str = "usr_";

/// Prefix reserved for runtime prompt tokens
pub const PROMPT_TOKEN_PREFIX: &str = "prompt_";

/// Prefix reserved for engine-provided globals (multi-line grammar only)
pub const GLOBAL_PREFIX: &str = "nf_";

/// Program identity exposed through the `nf_program_info()` template function
pub const PROGRAM_NAME: &str = "tokensmith";
pub const PROGRAM_URL: &str = "https://github.com/tokensmith/tokensmith";

/// STDIN indicator for CLI arguments
pub const STDIN_INDICATOR: &str = "-";

/// Exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
