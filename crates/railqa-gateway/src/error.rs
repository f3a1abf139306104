//! Error types for gateway calls.

use std::time::Duration;

/// Why a gateway call did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Coarse failure taxonomy.
///
/// `Transport` means the gateway could not be reached at all; `Backend`
/// means it was reached (or hung) and did not answer successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Backend,
}

impl GatewayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Transport(_) => FailureKind::Transport,
            GatewayError::Status(_) | GatewayError::Malformed(_) | GatewayError::Timeout(_) => {
                FailureKind::Backend
            }
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            GatewayError::Status(status.as_u16())
        } else if err.is_decode() {
            GatewayError::Malformed(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}
