//! Line-oriented rendering of answer text.
//!
//! The backend marks section breaks (for example "Additional Context") by
//! starting a line with `*`. There is no richer format, so the view layer
//! relies on this exact split.

use serde::Serialize;

/// Glyph that turns a line into a section heading.
pub const HEADING_MARKER: char = '*';

/// One rendered row of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum AnswerLine {
    Heading(String),
    Body(String),
}

/// Split answer content into heading and body rows.
///
/// A line whose first non-whitespace character is the marker becomes a
/// heading with every leading marker and the whitespace after them removed.
/// Any other line, including a blank one, is kept as a body row unchanged.
pub fn render_answer(content: &str) -> Vec<AnswerLine> {
    content.split('\n').map(render_line).collect()
}

fn render_line(line: &str) -> AnswerLine {
    let trimmed = line.trim();
    if trimmed.starts_with(HEADING_MARKER) {
        let title = trimmed.trim_start_matches(HEADING_MARKER).trim_start();
        AnswerLine::Heading(title.to_string())
    } else {
        AnswerLine::Body(line.to_string())
    }
}
