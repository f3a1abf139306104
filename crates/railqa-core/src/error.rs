use thiserror::Error;

/// Top-level error type for the railqa client.
///
/// Subsystem crates define their own error types and implement
/// `From<RailqaError>` where they wrap a platform or configuration failure,
/// so the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RailqaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Platform error: {0}")]
    Platform(String),
}

impl From<toml::de::Error> for RailqaError {
    fn from(err: toml::de::Error) -> Self {
        RailqaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RailqaError {
    fn from(err: toml::ser::Error) -> Self {
        RailqaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RailqaError {
    fn from(err: serde_json::Error) -> Self {
        RailqaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for railqa operations.
pub type Result<T> = std::result::Result<T, RailqaError>;
