//! Error types for ytsift

use crate::core::resolve::ResolveError;
use thiserror::Error;

/// Main error type for ytsift operations
#[derive(Debug, Error)]
pub enum SiftError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Extraction output carries no video metadata")]
    MissingMetadata,

    #[error("Unknown fields in {context}: {}", .fields.join(", "))]
    UnknownFields {
        context: String,
        fields: Vec<String>,
    },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Extraction engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    #[error("Extraction engine timed out after {0:?}")]
    EngineTimeout(std::time::Duration),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Filter {filter} needs a {stream} input")]
    FilterMismatch {
        filter: String,
        stream: &'static str,
    },

    #[error("Nothing selected for muxing")]
    EmptyMuxPlan,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl SiftError {
    /// Check if error came from format resolution
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, SiftError::Resolve(_))
    }

    /// Check if error came from the external extraction engine
    pub fn is_engine_error(&self) -> bool {
        matches!(
            self,
            SiftError::EngineFailed { .. } | SiftError::EngineTimeout(_) | SiftError::MissingMetadata
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = SiftError::from(ResolveError::EmptyCategory {
            category: "AudioOnly.Standard".to_string(),
        });
        assert!(err.is_resolution_error());
        assert!(!err.is_engine_error());

        let err = SiftError::EngineTimeout(std::time::Duration::from_secs(5));
        assert!(err.is_engine_error());
        assert!(!err.is_resolution_error());
    }

    #[test]
    fn test_unknown_fields_message() {
        let err = SiftError::UnknownFields {
            context: "format 140".to_string(),
            fields: vec!["foo".to_string(), "bar".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown fields in format 140: foo, bar");
    }
}
