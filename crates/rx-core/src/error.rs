//! Error types for rx-export

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rx-export
#[derive(Debug, Error)]
pub enum RxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Operational modules reference an entity that does not exist
    #[error("Unknown {kind} '{id}' referenced by form mapping {mapping}")]
    UnknownReference {
        kind: &'static str,
        id: String,
        mapping: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<RxError>,
    },
}

impl RxError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        RxError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<toml::de::Error> for RxError {
    fn from(err: toml::de::Error) -> Self {
        RxError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for RxError {
    fn from(err: toml::ser::Error) -> Self {
        RxError::Toml(err.to_string())
    }
}

/// Result type alias for rx-export
pub type Result<T> = std::result::Result<T, RxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RxError::UnknownReference {
            kind: "program",
            id: "p-1".to_string(),
            mapping: "fm-9".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown program 'p-1' referenced by form mapping fm-9"
        );
    }

    #[test]
    fn test_error_with_context() {
        let err = RxError::Validation("bad modules".to_string());
        let err = err.with_context("Failed to load operational modules");
        assert!(err.to_string().contains("Failed to load operational modules"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RxError = io_err.into();
        assert!(matches!(err, RxError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("[server").unwrap_err();
        let err: RxError = toml_err.into();
        assert!(matches!(err, RxError::Toml(_)));
    }
}
