//! Conversation session: transcript plus a single in-flight guard.
//!
//! Lifecycle of a submission:
//! - the question is echoed into the transcript and `pending` is set
//! - the gateway call runs with no lock held
//! - the answer (or a fixed error entry) is appended, `pending` and the
//!   draft are cleared
//!
//! A submission while `pending` is set is ignored, which keeps transcript
//! entries in submission order.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

use railqa_core::platform::Clipboard;
use railqa_core::CopyAck;
use railqa_gateway::{call_with_timeout, Gateway, GatewayError};

use crate::error::ChatError;
use crate::message::Message;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// What happened to a `submit_question` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, or another question was still in flight. Nothing changed.
    Ignored,
    /// An answer was appended.
    Answered,
    /// An error entry was appended.
    Failed(GatewayError),
}

/// Point-in-time copy of the session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub transcript: Vec<Message>,
    pub pending: bool,
    pub draft: String,
}

#[derive(Debug, Default)]
struct SessionState {
    transcript: Vec<Message>,
    pending: bool,
    draft: String,
    /// Bumped by `clear_all`, so a reply to a cleared question is dropped.
    epoch: u64,
    copied: CopyAck<usize>,
}

/// Multi-turn question/answer session against the question-answer route.
pub struct ConversationSession {
    gateway: Arc<dyn Gateway>,
    request_timeout: Duration,
    state: Mutex<SessionState>,
}

impl ConversationSession {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Bound each question call; a call still running at `timeout` fails.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session mutex poisoned")
    }

    pub fn set_draft(&self, text: &str) {
        self.lock().draft = text.to_string();
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.lock().transcript.clone()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        let state = self.lock();
        ConversationSnapshot {
            transcript: state.transcript.clone(),
            pending: state.pending,
            draft: state.draft.clone(),
        }
    }

    /// Submit whatever is currently in the draft.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let draft = self.draft();
        self.submit_question(&draft).await
    }

    /// Ask a question and fold the outcome into the transcript.
    pub async fn submit_question(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank question");
            return SubmitOutcome::Ignored;
        }

        let epoch = {
            let mut state = self.lock();
            if state.pending {
                tracing::debug!("Ignoring question while another is in flight");
                return SubmitOutcome::Ignored;
            }
            state.transcript.push(Message::question(text));
            state.pending = true;
            state.epoch
        };

        let mut in_flight = InFlight {
            session: self,
            epoch,
            settled: false,
        };
        tracing::info!(question_len = text.len(), "Question dispatched");
        let result = call_with_timeout(self.request_timeout, self.gateway.ask(text)).await;
        in_flight.settled = true;

        let mut state = self.lock();
        let outcome = match result {
            Ok(response) => {
                tracing::info!(
                    answer_len = response.answer.len(),
                    has_context = response.context.is_some(),
                    "Answer received"
                );
                if state.epoch == epoch {
                    state.transcript.push(Message::answer(response));
                }
                SubmitOutcome::Answered
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Question failed");
                if state.epoch == epoch {
                    state.transcript.push(Message::error());
                }
                SubmitOutcome::Failed(e)
            }
        };
        state.pending = false;
        state.draft.clear();
        outcome
    }

    /// Empty the transcript. An in-flight question keeps `pending` set, but
    /// its reply will not be appended.
    pub fn clear_all(&self) {
        let mut state = self.lock();
        state.transcript.clear();
        state.epoch += 1;
        state.copied.clear();
        tracing::debug!("Transcript cleared");
    }

    /// Copy one transcript entry's content verbatim.
    pub fn copy_message(&self, index: usize, clipboard: &dyn Clipboard) -> Result<(), ChatError> {
        let content = self
            .lock()
            .transcript
            .get(index)
            .map(|m| m.content.clone())
            .ok_or(ChatError::NoSuchMessage(index))?;

        clipboard.write_text(&content)?;
        self.lock().copied.mark(index);
        tracing::debug!(index, "Message copied");
        Ok(())
    }

    /// Index of the message copied within the last two seconds.
    pub fn copied_index(&self) -> Option<usize> {
        self.lock().copied.current()
    }
}

/// Settles a question whose submit future is dropped before the reply
/// arrives: the question gets its error entry and `pending` clears.
struct InFlight<'a> {
    session: &'a ConversationSession,
    epoch: u64,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let Ok(mut state) = self.session.state.lock() else {
            return;
        };
        tracing::warn!("Question abandoned before a reply arrived");
        if state.epoch == self.epoch {
            state.transcript.push(Message::error());
        }
        state.pending = false;
        state.draft.clear();
    }
}
