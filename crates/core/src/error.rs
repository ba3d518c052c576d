//! Error types for the cosmos core.

use thiserror::Error;

/// Errors produced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero, negative, or not finite where a real surface is required.
    #[error("invalid dimensions: width and height must be positive and finite")]
    InvalidDimensions,

    /// A frame timestamp or delta was NaN or infinite.
    #[error("invalid frame time: {0}")]
    InvalidFrameTime(f64),

    /// A strict params object carried a key no config field recognizes.
    #[error("unknown parameter: {0}")]
    ParamNotFound(String),

    /// A parameter had the wrong JSON type or an out-of-range value.
    #[error("parameter type mismatch for '{name}': expected {expected}, got {got}")]
    ParamTypeMismatch {
        name: String,
        expected: String,
        got: String,
    },

    /// A theme name was not one of the known themes.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// An engine name was not found in the registry.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// Writing a snapshot failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let err = EngineError::InvalidDimensions;
        let msg = format!("{err}");
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_frame_time_includes_value() {
        let msg = EngineError::InvalidFrameTime(f64::INFINITY).to_string();
        assert!(msg.contains("inf"), "missing value in: {msg}");
    }

    #[test]
    fn param_type_mismatch_includes_all_fields() {
        let err = EngineError::ParamTypeMismatch {
            name: "density".into(),
            expected: "f64".into(),
            got: "string".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("density"), "missing param name in: {msg}");
        assert!(msg.contains("f64"), "missing expected type in: {msg}");
        assert!(msg.contains("string"), "missing got type in: {msg}");
    }

    #[test]
    fn unknown_theme_and_engine_include_name() {
        assert!(EngineError::UnknownTheme("sepia".into())
            .to_string()
            .contains("sepia"));
        assert!(EngineError::UnknownEngine("plasma".into())
            .to_string()
            .contains("plasma"));
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
