//! Error types for the conversational interface.

use railqa_core::error::RailqaError;

/// Errors from transcript actions.
///
/// Gateway failures are not here: they are folded into the transcript as
/// error messages and never surface as `Err`.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("no message at index {0}")]
    NoSuchMessage(usize),
    #[error("platform error: {0}")]
    Platform(String),
}

impl From<RailqaError> for ChatError {
    fn from(err: RailqaError) -> Self {
        ChatError::Platform(err.to_string())
    }
}
