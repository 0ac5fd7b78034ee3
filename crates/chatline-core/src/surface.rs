//! The seam between conversation logic and whatever draws it.
//!
//! The controller, reveal effect and history store only talk to these two
//! traits. The terminal front end implements them over a ratatui view;
//! [`MemorySurface`] implements them over plain data.

use crate::view::{Bubble, ConversationView, Row, RowId};

/// The scrolling list of message rows
pub trait ConversationSurface {
    /// Append a row at the end and fade it in
    fn append_row(&mut self, row: Row);

    /// Remove a row. Returns false if it was already gone.
    fn remove_row(&mut self, id: RowId) -> bool;

    /// Rewrite the bubble of an existing row. Returns false if the row is gone.
    fn set_bubble(&mut self, id: RowId, bubble: Bubble) -> bool;

    fn clear_rows(&mut self);

    /// Snapshot of the current rows in display order
    fn rows(&self) -> Vec<Row>;

    fn scroll_to_end(&mut self);
}

/// The text input together with its send control
pub trait InputControls {
    fn input_value(&self) -> String;

    fn clear_input(&mut self);

    /// Enables or disables both the input and the send control
    fn set_input_enabled(&mut self, enabled: bool);

    fn focus_input(&mut self);
}

/// Headless surface backed by a [`ConversationView`]
#[derive(Debug, Clone)]
pub struct MemorySurface {
    pub view: ConversationView,
    pub input: String,
    pub input_enabled: bool,
    pub input_focused: bool,
    pub scrolls: usize,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self {
            view: ConversationView::new(),
            input: String::new(),
            input_enabled: true,
            input_focused: true,
            scrolls: 0,
        }
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationSurface for MemorySurface {
    fn append_row(&mut self, row: Row) {
        self.view.push(row);
    }

    fn remove_row(&mut self, id: RowId) -> bool {
        self.view.remove(id).is_some()
    }

    fn set_bubble(&mut self, id: RowId, bubble: Bubble) -> bool {
        self.view.set_bubble(id, bubble)
    }

    fn clear_rows(&mut self) {
        self.view.clear();
    }

    fn rows(&self) -> Vec<Row> {
        self.view.rows().to_vec()
    }

    fn scroll_to_end(&mut self) {
        self.scrolls += 1;
    }
}

impl InputControls for MemorySurface {
    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        if !enabled {
            self.input_focused = false;
        }
    }

    fn focus_input(&mut self) {
        self.input_focused = true;
    }
}
