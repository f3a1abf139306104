//! One-shot diagram generation for railqa.
//!
//! Turns a natural-language process description into a Mermaid script via
//! the backend's generation route, and exports the script by copy,
//! markdown download, or an external editor link.

pub mod error;
pub mod examples;
pub mod export;
pub mod output;
pub mod workflow;

pub use error::ExportError;
pub use examples::EXAMPLE_DESCRIPTIONS;
pub use export::{download_document, viewer_url, DOWNLOAD_FILE_NAME};
pub use output::GenerationOutput;
pub use workflow::{GenerateOutcome, GenerationSnapshot, GenerationWorkflow};
