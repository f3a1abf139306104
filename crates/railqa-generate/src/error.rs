//! Error types for diagram export actions.

use railqa_core::error::RailqaError;

/// Errors from copy, download and viewer actions.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// There is no successfully generated script to export.
    #[error("no generated script to export")]
    NoScript,
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("platform error: {0}")]
    Platform(String),
}

impl From<RailqaError> for ExportError {
    fn from(err: RailqaError) -> Self {
        ExportError::Platform(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Encoding(err.to_string())
    }
}
