use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use railqa_gateway::AnswerResponse;

use crate::render::{render_answer, AnswerLine};

/// Shown in place of an answer when the question-answer call fails.
pub const ERROR_TEXT: &str =
    "Sorry, there was an error processing your question. Please make sure the backend is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Question,
    Answer,
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Question => write!(f, "Your Question"),
            MessageKind::Answer => write!(f, "AI Answer"),
            MessageKind::Error => write!(f, "Error"),
        }
    }
}

/// One transcript entry. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub kind: MessageKind,
    pub content: String,
    /// Retrieved source passages; only set on answers.
    pub context: Option<String>,
    /// How many passages the backend retrieved; only set on answers.
    pub sources: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(kind: MessageKind, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content,
            context: None,
            sources: None,
            created_at: Utc::now(),
        }
    }

    pub fn question(text: &str) -> Self {
        Self::new(MessageKind::Question, text.to_string())
    }

    pub fn answer(response: AnswerResponse) -> Self {
        Self {
            context: response.context,
            sources: response.sources,
            ..Self::new(MessageKind::Answer, response.answer)
        }
    }

    pub fn error() -> Self {
        Self::new(MessageKind::Error, ERROR_TEXT.to_string())
    }

    /// Rendered rows for the view layer.
    ///
    /// Answers go through `render_answer`; questions and errors are shown
    /// as a single verbatim body row.
    pub fn rendered(&self) -> Vec<AnswerLine> {
        match self.kind {
            MessageKind::Answer => render_answer(&self.content),
            MessageKind::Question | MessageKind::Error => {
                vec![AnswerLine::Body(self.content.clone())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_takes_fields_verbatim() {
        let msg = Message::answer(AnswerResponse {
            answer: "  Contact x@y.com\n".to_string(),
            context: Some("Section 4.2".to_string()),
            sources: Some(2),
        });
        assert_eq!(msg.kind, MessageKind::Answer);
        assert_eq!(msg.content, "  Contact x@y.com\n");
        assert_eq!(msg.context.as_deref(), Some("Section 4.2"));
        assert_eq!(msg.sources, Some(2));
    }

    #[test]
    fn test_question_and_error_have_no_context() {
        let q = Message::question("Is a permit needed?");
        assert_eq!(q.kind, MessageKind::Question);
        assert_eq!(q.context, None);

        let e = Message::error();
        assert_eq!(e.kind, MessageKind::Error);
        assert_eq!(e.content, ERROR_TEXT);
        assert_eq!(e.context, None);
    }

    #[test]
    fn test_rendered_only_parses_answers() {
        let q = Message::question("*not a heading");
        assert_eq!(q.rendered(), vec![AnswerLine::Body("*not a heading".to_string())]);

        let a = Message::answer(AnswerResponse {
            answer: "*Heading\nbody".to_string(),
            context: None,
            sources: None,
        });
        assert_eq!(
            a.rendered(),
            vec![
                AnswerLine::Heading("Heading".to_string()),
                AnswerLine::Body("body".to_string()),
            ]
        );
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(MessageKind::Question.to_string(), "Your Question");
        assert_eq!(MessageKind::Answer.to_string(), "AI Answer");
        assert_eq!(MessageKind::Error.to_string(), "Error");
    }

    #[test]
    fn test_message_ids_are_unique() {
        assert_ne!(Message::question("a").id, Message::question("a").id);
    }
}
