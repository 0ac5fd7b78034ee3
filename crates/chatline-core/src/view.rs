//! UI-agnostic conversation state
//!
//! These types are shared by every surface (terminal, in-memory) and don't
//! depend on any specific UI framework.

use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Bot => "bot",
        }
    }
}

/// A chat message as it exists before it is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: Option<String>,
}

/// Handle to a rendered row, used to rewrite its bubble later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u64);

/// Content of a message bubble
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bubble {
    /// Animated three-dot "bot is typing" placeholder
    Typing,
    /// Sanitized text, optional timestamp suffix, optional trailing reveal cursor
    Text {
        text: String,
        timestamp: Option<String>,
        cursor: bool,
    },
}

impl Bubble {
    pub fn text(text: impl Into<String>, timestamp: Option<String>) -> Self {
        Bubble::Text {
            text: text.into(),
            timestamp,
            cursor: false,
        }
    }

    /// Message text without timestamp or cursor; `None` for the placeholder.
    pub fn message_text(&self) -> Option<&str> {
        match self {
            Bubble::Typing => None,
            Bubble::Text { text, .. } => Some(text),
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        match self {
            Bubble::Typing => None,
            Bubble::Text { timestamp, .. } => timestamp.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: RowId,
    pub speaker: Speaker,
    pub avatar: String,
    pub bubble: Bubble,
    pub typing_placeholder: bool,
}

impl Row {
    /// Rebuild the message this row displays. `None` for the typing placeholder.
    pub fn message(&self) -> Option<Message> {
        if self.typing_placeholder {
            return None;
        }
        self.bubble.message_text().map(|text| Message {
            speaker: self.speaker,
            text: text.to_string(),
            timestamp: self.bubble.timestamp().map(str::to_string),
        })
    }
}

/// Ordered rows, newest last
#[derive(Debug, Clone, Default)]
pub struct ConversationView {
    rows: Vec<Row>,
}

impl ConversationView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. A second typing placeholder replaces the first so the
    /// view never holds more than one.
    pub fn push(&mut self, row: Row) {
        if row.typing_placeholder {
            self.rows.retain(|r| !r.typing_placeholder);
        }
        self.rows.push(row);
    }

    pub fn remove(&mut self, id: RowId) -> Option<Row> {
        let idx = self.rows.iter().position(|r| r.id == id)?;
        Some(self.rows.remove(idx))
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Replace a row's bubble. Returns false if the row is gone.
    pub fn set_bubble(&mut self, id: RowId, bubble: Bubble) -> bool {
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.bubble = bubble;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn typing_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.typing_placeholder).count()
    }

    /// Messages in display order, placeholder excluded.
    pub fn messages(&self) -> Vec<Message> {
        self.rows.iter().filter_map(Row::message).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, speaker: Speaker, text: &str) -> Row {
        Row {
            id: RowId(id),
            speaker,
            avatar: String::new(),
            bubble: Bubble::text(text, Some("10:00".to_string())),
            typing_placeholder: false,
        }
    }

    fn typing(id: u64) -> Row {
        Row {
            id: RowId(id),
            speaker: Speaker::Bot,
            avatar: String::new(),
            bubble: Bubble::Typing,
            typing_placeholder: true,
        }
    }

    #[test]
    fn test_speaker_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Speaker::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::from_str::<Speaker>("\"bot\"").unwrap(), Speaker::Bot);
    }

    #[test]
    fn test_single_typing_placeholder() {
        let mut view = ConversationView::new();
        view.push(row(1, Speaker::User, "hi"));
        view.push(typing(2));
        view.push(typing(3));
        assert_eq!(view.typing_rows(), 1);
        assert_eq!(view.len(), 2);
        assert!(view.get(RowId(3)).is_some());
    }

    #[test]
    fn test_messages_skip_placeholder() {
        let mut view = ConversationView::new();
        view.push(row(1, Speaker::User, "Hello"));
        view.push(typing(2));
        let messages = view.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Hello");
        assert_eq!(messages[0].timestamp.as_deref(), Some("10:00"));
    }

    #[test]
    fn test_set_bubble_on_missing_row() {
        let mut view = ConversationView::new();
        assert!(!view.set_bubble(RowId(9), Bubble::Typing));
        view.push(row(1, Speaker::Bot, ""));
        assert!(view.set_bubble(RowId(1), Bubble::text("done", None)));
        assert_eq!(view.get(RowId(1)).unwrap().bubble.message_text(), Some("done"));
    }
}
