//! Unified error types for the stackport workspace.
//!
//! The public core entry points never surface these for malformed application
//! data; they degrade instead. The errors exist for internal propagation and
//! for configuration parsing.

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StackportError {
    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A document parsed but does not have the expected shape.
    #[error("invalid document: {message}")]
    InvalidDocument {
        /// Description of what is missing or malformed.
        message: String,
    },

    /// YAML (de)serialization failed.
    #[error("yaml error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StackportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_document_display_includes_message() {
        let err = StackportError::InvalidDocument {
            message: "no services section found".into(),
        };
        assert_eq!(err.to_string(), "invalid document: no services section found");
    }

    #[test]
    fn yaml_error_converts_with_question_mark() {
        fn parse(input: &str) -> Result<serde_yaml::Value> {
            Ok(serde_yaml::from_str(input)?)
        }
        let err = parse("key: [unclosed").unwrap_err();
        assert!(matches!(err, StackportError::Yaml { .. }));
    }
}
