//! Wire types for the backend routes.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const QA_ROUTE: &str = "/api/qa";
pub const GENERATION_ROUTE: &str = "/api/bpmn";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionRequest {
    pub question: String,
}

/// Successful response of the question-answer route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Number of retrieved passages the answer was grounded on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationRequest {
    pub description: String,
}

/// Successful response of the diagram-generation route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationResponse {
    pub mermaid_script: String,
}

/// A backend-side dependency with its own liveness route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Backend,
    InferenceRuntime,
    VectorStore,
}

impl Probe {
    pub const ALL: [Probe; 3] = [Probe::Backend, Probe::InferenceRuntime, Probe::VectorStore];

    pub fn route(&self) -> &'static str {
        match self {
            Probe::Backend => "/api/health",
            Probe::InferenceRuntime => "/api/health/ollama",
            Probe::VectorStore => "/api/health/vectordb",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Probe::Backend => "API Server",
            Probe::InferenceRuntime => "Ollama LLM",
            Probe::VectorStore => "Vector DB",
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
