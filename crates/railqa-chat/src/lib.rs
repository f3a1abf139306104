//! Conversational question answering for railqa.
//!
//! Keeps an ordered transcript of question/answer/error turns against the
//! backend's question-answer route, one request in flight at a time.

pub mod error;
pub mod message;
pub mod render;
pub mod session;

pub use error::ChatError;
pub use message::{Message, MessageKind};
pub use render::{render_answer, AnswerLine};
pub use session::{ConversationSession, ConversationSnapshot, SubmitOutcome};
