//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: engine error (unknown engine, bad dimensions, bad frame time)
//! - 11: I/O error (PNG write)
//! - 12: input error (bad theme, bad JSON params)
//! - 13: serialization error

use cosmos_core::EngineError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
#[derive(Debug)]
pub enum CliError {
    Engine(EngineError),
    /// Snapshot or other file output failed.
    Io(String),
    /// A flag value the engine would otherwise silently replace with a default.
    Input(String),
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            EngineError::UnknownTheme(_)
            | EngineError::ParamNotFound(_)
            | EngineError::ParamTypeMismatch { .. } => CliError::Input(e.to_string()),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            CliError::Engine(EngineError::UnknownEngine("foo".into())).exit_code(),
            CliError::Io("write failed".into()).exit_code(),
            CliError::Input("bad theme".into()).exit_code(),
            CliError::Serialization("json fail".into()).exit_code(),
        ];
        assert_eq!(codes, [10, 11, 12, 13]);
    }

    #[test]
    fn from_engine_error_io_routes_to_cli_io() {
        let cli_err = CliError::from(EngineError::Io("disk full".into()));
        assert_eq!(cli_err.exit_code(), 11);
        assert!(cli_err.to_string().contains("disk full"));
    }

    #[test]
    fn unknown_theme_is_an_input_error() {
        let cli_err = CliError::from(EngineError::UnknownTheme("sepia".into()));
        assert_eq!(cli_err.exit_code(), 12);
        assert!(cli_err.to_string().contains("sepia"));
    }

    #[test]
    fn bad_params_are_input_errors() {
        let not_found = CliError::from(EngineError::ParamNotFound("sped".into()));
        assert_eq!(not_found.exit_code(), 12);
        let mismatch = CliError::from(EngineError::ParamTypeMismatch {
            name: "speed".into(),
            expected: "positive number".into(),
            got: "\"fast\"".into(),
        });
        assert_eq!(mismatch.exit_code(), 12);
        assert!(mismatch.to_string().contains("speed"));
    }

    #[test]
    fn from_engine_error_non_io_routes_to_cli_engine() {
        let cli_err = CliError::from(EngineError::UnknownEngine("xyz".into()));
        assert_eq!(cli_err.exit_code(), 10);
        assert!(cli_err.to_string().contains("xyz"));
    }

    #[test]
    fn from_serde_json_error_routes_to_serialization() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{invalid");
        let cli_err = CliError::from(bad_json.unwrap_err());
        assert_eq!(cli_err.exit_code(), 13);
    }
}
