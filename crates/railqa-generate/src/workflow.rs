//! Generation workflow: one description in, one script (or failure) out.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

use railqa_core::config::ViewerConfig;
use railqa_core::platform::{Clipboard, FileSaver, UrlOpener};
use railqa_core::CopyAck;
use railqa_gateway::{call_with_timeout, Gateway, GatewayError};

use crate::error::ExportError;
use crate::examples::EXAMPLE_DESCRIPTIONS;
use crate::export::{download_document, viewer_url, DOWNLOAD_FILE_NAME};
use crate::output::GenerationOutput;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// What happened to a `submit_description` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Blank input, or a generation was already running. Nothing changed.
    Ignored,
    Generated,
    Failed(GatewayError),
}

/// Point-in-time copy of the workflow for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSnapshot {
    pub draft: String,
    pub output: Option<GenerationOutput>,
    pub pending: bool,
    pub copied: bool,
}

#[derive(Debug, Default)]
struct WorkflowState {
    draft: String,
    output: Option<GenerationOutput>,
    pending: bool,
    /// Bumped by `clear`, so a result for a cleared request is dropped.
    epoch: u64,
    copied: CopyAck<()>,
}

/// Single-shot diagram generation with copy/download/viewer exports.
pub struct GenerationWorkflow {
    gateway: Arc<dyn Gateway>,
    request_timeout: Duration,
    viewer: ViewerConfig,
    state: Mutex<WorkflowState>,
}

impl GenerationWorkflow {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            viewer: ViewerConfig::default(),
            state: Mutex::new(WorkflowState::default()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_viewer(mut self, viewer: ViewerConfig) -> Self {
        self.viewer = viewer;
        self
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().expect("workflow mutex poisoned")
    }

    pub fn set_draft(&self, text: &str) {
        self.lock().draft = text.to_string();
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn output(&self) -> Option<GenerationOutput> {
        self.lock().output.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// Whether the script was copied within the last two seconds.
    pub fn is_copied(&self) -> bool {
        self.lock().copied.current().is_some()
    }

    pub fn snapshot(&self) -> GenerationSnapshot {
        let state = self.lock();
        GenerationSnapshot {
            draft: state.draft.clone(),
            output: state.output.clone(),
            pending: state.pending,
            copied: state.copied.current().is_some(),
        }
    }

    /// Load preset `index` into the draft, returning its title.
    pub fn use_example(&self, index: usize) -> Option<&'static str> {
        let (title, description) = EXAMPLE_DESCRIPTIONS.get(index)?;
        self.set_draft(description);
        Some(title)
    }

    pub async fn submit_draft(&self) -> GenerateOutcome {
        let draft = self.draft();
        self.submit_description(&draft).await
    }

    /// Generate a diagram for `text` and store the outcome as the output.
    pub async fn submit_description(&self, text: &str) -> GenerateOutcome {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank description");
            return GenerateOutcome::Ignored;
        }

        let epoch = {
            let mut state = self.lock();
            if state.pending {
                tracing::debug!("Ignoring description while generation is running");
                return GenerateOutcome::Ignored;
            }
            state.pending = true;
            state.epoch
        };

        let mut in_flight = InFlight {
            workflow: self,
            epoch,
            settled: false,
        };
        tracing::info!(description_len = text.len(), "Generation dispatched");
        let result = call_with_timeout(self.request_timeout, self.gateway.generate(text)).await;
        in_flight.settled = true;

        let mut state = self.lock();
        let (output, outcome) = match result {
            Ok(response) => {
                tracing::info!(script_len = response.mermaid_script.len(), "Diagram generated");
                (
                    GenerationOutput::success(response.mermaid_script),
                    GenerateOutcome::Generated,
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Generation failed");
                (GenerationOutput::failure(), GenerateOutcome::Failed(e))
            }
        };
        if state.epoch == epoch {
            state.output = Some(output);
            state.copied.clear();
        }
        state.pending = false;
        outcome
    }

    /// Reset the draft and output.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.draft.clear();
        state.output = None;
        state.epoch += 1;
        state.copied.clear();
    }

    fn current_script(&self) -> Result<String, ExportError> {
        self.lock()
            .output
            .as_ref()
            .and_then(|o| o.script())
            .map(str::to_string)
            .ok_or(ExportError::NoScript)
    }

    /// Write the script verbatim to the clipboard.
    pub fn copy_output(&self, clipboard: &dyn Clipboard) -> Result<(), ExportError> {
        let script = self.current_script()?;
        clipboard.write_text(&script)?;
        self.lock().copied.mark(());
        tracing::debug!(script_len = script.len(), "Script copied");
        Ok(())
    }

    /// The markdown document a download would contain.
    pub fn download_document(&self) -> Result<String, ExportError> {
        Ok(download_document(&self.current_script()?))
    }

    /// Save the markdown document as `process.md`.
    pub fn download_output(&self, saver: &dyn FileSaver) -> Result<PathBuf, ExportError> {
        let document = self.download_document()?;
        Ok(saver.save(DOWNLOAD_FILE_NAME, &document)?)
    }

    pub fn viewer_url(&self) -> Result<String, ExportError> {
        viewer_url(&self.current_script()?, &self.viewer)
    }

    /// Open the script in the external editor and return the link used.
    pub fn open_in_external_viewer(&self, opener: &dyn UrlOpener) -> Result<String, ExportError> {
        let url = self.viewer_url()?;
        opener.open(&url)?;
        tracing::info!(url_len = url.len(), "Opened external viewer");
        Ok(url)
    }
}

/// Clears `pending` and records a failure when a submit future is dropped
/// before the generation call completes.
struct InFlight<'a> {
    workflow: &'a GenerationWorkflow,
    epoch: u64,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let Ok(mut state) = self.workflow.state.lock() else {
            return;
        };
        tracing::warn!("Generation abandoned before it completed");
        if state.epoch == self.epoch {
            state.output = Some(GenerationOutput::failure());
            state.copied.clear();
        }
        state.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::FAILURE_TEXT;
    use railqa_core::platform::{DirectorySaver, MemoryClipboard, RecordingOpener};
    use railqa_gateway::mock::GatewayCall;
    use railqa_gateway::ScriptedGateway;

    const SCRIPT: &str = "graph TD\n  A[Receive request] --> B{Conflicts?}\n  B -->|No| C[Allocate path]";

    fn workflow_with(gateway: &Arc<ScriptedGateway>) -> Arc<GenerationWorkflow> {
        let gateway: Arc<dyn Gateway> = Arc::clone(gateway) as Arc<dyn Gateway>;
        Arc::new(GenerationWorkflow::new(gateway))
    }

    async fn generated() -> (Arc<ScriptedGateway>, Arc<GenerationWorkflow>) {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.generate_with(SCRIPT);
        let workflow = workflow_with(&gateway);
        assert_eq!(
            workflow.submit_description("Receive a path request").await,
            GenerateOutcome::Generated
        );
        (gateway, workflow)
    }

    #[tokio::test]
    async fn test_success_stores_script_verbatim() {
        let (gateway, workflow) = generated().await;
        assert_eq!(workflow.output(), Some(GenerationOutput::success(SCRIPT)));
        assert!(!workflow.is_pending());
        assert_eq!(
            gateway.calls(),
            vec![GatewayCall::Generate("Receive a path request".to_string())]
        );
    }

    #[tokio::test]
    async fn test_network_failure_sets_failure_output() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.set_generation(Err(GatewayError::Transport("connection refused".to_string())));
        let workflow = workflow_with(&gateway);
        workflow.set_draft("Validate the certificate");

        let outcome = workflow.submit_draft().await;
        assert!(matches!(outcome, GenerateOutcome::Failed(GatewayError::Transport(_))));
        assert_eq!(
            workflow.output(),
            Some(GenerationOutput::Failure {
                reason: FAILURE_TEXT.to_string()
            })
        );
        assert!(!workflow.is_pending());
        // The description stays in the input box.
        assert_eq!(workflow.draft(), "Validate the certificate");
    }

    #[tokio::test]
    async fn test_blank_description_is_ignored() {
        let gateway = Arc::new(ScriptedGateway::new());
        let workflow = workflow_with(&gateway);

        assert_eq!(workflow.submit_description("").await, GenerateOutcome::Ignored);
        assert_eq!(workflow.submit_description(" \n ").await, GenerateOutcome::Ignored);
        assert_eq!(workflow.output(), None);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submission_while_pending_is_ignored() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.generate_with(SCRIPT);
        gateway.hold();
        let workflow = workflow_with(&gateway);

        let first = {
            let workflow = Arc::clone(&workflow);
            tokio::spawn(async move { workflow.submit_description("first").await })
        };
        while !workflow.is_pending() {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            workflow.submit_description("second").await,
            GenerateOutcome::Ignored
        );
        gateway.release(1);
        assert_eq!(first.await.unwrap(), GenerateOutcome::Generated);
        assert_eq!(gateway.calls(), vec![GatewayCall::Generate("first".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submit_clears_pending() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.generate_with(SCRIPT);
        gateway.hold();
        let workflow = workflow_with(&gateway);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            workflow.submit_description("first"),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(!workflow.is_pending());
        assert_eq!(workflow.output(), Some(GenerationOutput::failure()));

        gateway.release(1);
        assert_eq!(
            workflow.submit_description("second").await,
            GenerateOutcome::Generated
        );
        assert_eq!(workflow.output(), Some(GenerationOutput::success(SCRIPT)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_generation_times_out() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.hang();
        let gateway_dyn: Arc<dyn Gateway> = Arc::clone(&gateway) as Arc<dyn Gateway>;
        let workflow = GenerationWorkflow::new(gateway_dyn).with_timeout(Duration::from_secs(60));

        let outcome = workflow.submit_description("anything").await;
        assert_eq!(
            outcome,
            GenerateOutcome::Failed(GatewayError::Timeout(Duration::from_secs(60)))
        );
        assert!(!workflow.is_pending());
        assert_eq!(workflow.output(), Some(GenerationOutput::failure()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_output_round_trip_and_ack() {
        let (_gateway, workflow) = generated().await;
        let clipboard = MemoryClipboard::new();

        workflow.copy_output(&clipboard).unwrap();
        assert_eq!(clipboard.read_text().as_deref(), Some(SCRIPT));
        assert!(workflow.is_copied());
        assert!(workflow.snapshot().copied);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!workflow.is_copied());
    }

    #[tokio::test]
    async fn test_download_output_writes_fenced_document() {
        let (_gateway, workflow) = generated().await;
        let dir = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(dir.path());

        let path = workflow.download_output(&saver).unwrap();
        assert_eq!(path, dir.path().join("process.md"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, format!("```mermaid\n{SCRIPT}\n```"));
        assert_eq!(written, workflow.download_document().unwrap());
    }

    #[tokio::test]
    async fn test_open_in_external_viewer() {
        let (_gateway, workflow) = generated().await;
        let opener = RecordingOpener::new();

        let url = workflow.open_in_external_viewer(&opener).unwrap();
        assert!(url.starts_with("https://mermaid.live/edit#base64:"));
        assert_eq!(opener.opened(), vec![url.clone()]);
        assert_eq!(workflow.viewer_url().unwrap(), url);
    }

    #[tokio::test]
    async fn test_exports_refuse_failure_output() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.set_generation(Err(GatewayError::Status(500)));
        let workflow = workflow_with(&gateway);
        workflow.submit_description("anything").await;

        let clipboard = MemoryClipboard::new();
        let opener = RecordingOpener::new();
        let dir = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(dir.path());

        assert!(matches!(workflow.copy_output(&clipboard), Err(ExportError::NoScript)));
        assert!(matches!(workflow.download_output(&saver), Err(ExportError::NoScript)));
        assert!(matches!(
            workflow.open_in_external_viewer(&opener),
            Err(ExportError::NoScript)
        ));
        assert_eq!(clipboard.read_text(), None);
        assert!(opener.opened().is_empty());
        assert!(!dir.path().join("process.md").exists());
    }

    #[tokio::test]
    async fn test_exports_refuse_empty_workflow() {
        let gateway = Arc::new(ScriptedGateway::new());
        let workflow = workflow_with(&gateway);
        assert!(matches!(workflow.download_document(), Err(ExportError::NoScript)));
        assert!(matches!(workflow.viewer_url(), Err(ExportError::NoScript)));
    }

    #[tokio::test]
    async fn test_clear_resets_draft_and_output() {
        let (_gateway, workflow) = generated().await;
        workflow.set_draft("something");
        workflow.clear();
        assert_eq!(workflow.draft(), "");
        assert_eq!(workflow.output(), None);
    }

    #[tokio::test]
    async fn test_clear_while_pending_drops_result() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.generate_with(SCRIPT);
        gateway.hold();
        let workflow = workflow_with(&gateway);

        let task = {
            let workflow = Arc::clone(&workflow);
            tokio::spawn(async move { workflow.submit_description("steps").await })
        };
        while !workflow.is_pending() {
            tokio::task::yield_now().await;
        }
        workflow.clear();
        gateway.release(1);

        assert_eq!(task.await.unwrap(), GenerateOutcome::Generated);
        assert_eq!(workflow.output(), None);
        assert!(!workflow.is_pending());
    }

    #[tokio::test]
    async fn test_use_example() {
        let gateway = Arc::new(ScriptedGateway::new());
        let workflow = workflow_with(&gateway);

        assert_eq!(workflow.use_example(0), Some("Train Path Allocation"));
        assert!(workflow.draft().starts_with("First, the system receives a request"));
        assert_eq!(workflow.use_example(1), Some("Safety Certificate Verification"));
        assert!(workflow.draft().contains("safety certificate application"));
        assert_eq!(workflow.use_example(2), None);
        assert!(workflow.draft().contains("safety certificate application"));
    }
}
