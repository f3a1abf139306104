use serde::Serialize;

/// Shown when the generation call fails.
pub const FAILURE_TEXT: &str =
    "Could not generate BPMN diagram. Please make sure the backend is running.";

/// Result of the last generation request.
///
/// Failure text lives in its own variant so it can never be mistaken for,
/// or exported as, a diagram script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutput {
    Success { script: String },
    Failure { reason: String },
}

impl GenerationOutput {
    pub fn success(script: impl Into<String>) -> Self {
        GenerationOutput::Success {
            script: script.into(),
        }
    }

    pub fn failure() -> Self {
        GenerationOutput::Failure {
            reason: FAILURE_TEXT.to_string(),
        }
    }

    pub fn script(&self) -> Option<&str> {
        match self {
            GenerationOutput::Success { script } => Some(script),
            GenerationOutput::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutput::Success { .. })
    }
}
