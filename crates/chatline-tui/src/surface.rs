//! Terminal implementation of the conversation surface.
//!
//! The controller and the event loop both hold a [`TuiSurface`]; clones share
//! one [`ChatState`]. Borrows never outlive a single call, so the two sides
//! can interleave at await points without conflict. Every mutation wakes the
//! event loop to redraw.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::rc::Rc;

use chatline_core::{Bubble, ConversationSurface, ConversationView, InputControls, Row, RowId};
use ratatui::layout::Rect;
use tokio::sync::Notify;

pub struct ChatState {
    pub view: ConversationView,

    // Input line
    pub input: String,
    pub cursor: usize, // cursor position in chars
    pub input_enabled: bool,
    pub input_focused: bool,

    // Chat pane scrolling
    pub scroll: u16,
    pub follow: bool, // keep the newest row in view
    pub chat_height: u16,
    pub total_lines: u16,

    // Rows drawn dimmed until the next animation tick
    pub fading: HashSet<RowId>,
    // 0-2 for the typing dots
    pub animation_frame: u8,

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_area: Option<Rect>,
    pub clear_area: Option<Rect>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            view: ConversationView::new(),
            input: String::new(),
            cursor: 0,
            input_enabled: true,
            input_focused: true,
            scroll: 0,
            follow: true,
            chat_height: 0,
            total_lines: 0,
            fading: HashSet::new(),
            animation_frame: 0,
            chat_area: None,
            send_area: None,
            clear_area: None,
        }
    }
}

impl ChatState {
    pub fn max_scroll(&self) -> u16 {
        self.total_lines.saturating_sub(self.chat_height)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.min(self.max_scroll()).saturating_sub(lines);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = (self.scroll + lines).min(self.max_scroll());
        if self.scroll >= self.max_scroll() {
            self.follow = true;
        }
    }

    /// Advance the typing dots and finish any pending fade-ins
    pub fn tick_animation(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
        self.fading.clear();
    }
}

#[derive(Clone, Default)]
pub struct TuiSurface {
    state: Rc<RefCell<ChatState>>,
    changed: Rc<Notify>,
}

impl TuiSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, ChatState> {
        self.state.borrow()
    }

    /// Mutable access for the event loop, which redraws on its own
    pub fn state_mut(&self) -> RefMut<'_, ChatState> {
        self.state.borrow_mut()
    }

    /// Mutable access for the conversation; wakes the event loop to redraw
    fn touch(&self) -> RefMut<'_, ChatState> {
        self.changed.notify_one();
        self.state.borrow_mut()
    }

    /// Resolves after the next mutation
    pub async fn changed(&self) {
        self.changed.notified().await
    }
}

impl ConversationSurface for TuiSurface {
    fn append_row(&mut self, row: Row) {
        let mut state = self.touch();
        state.fading.insert(row.id);
        state.view.push(row);
    }

    fn remove_row(&mut self, id: RowId) -> bool {
        let mut state = self.touch();
        state.fading.remove(&id);
        state.view.remove(id).is_some()
    }

    fn set_bubble(&mut self, id: RowId, bubble: Bubble) -> bool {
        self.touch().view.set_bubble(id, bubble)
    }

    fn clear_rows(&mut self) {
        let mut state = self.touch();
        state.view.clear();
        state.fading.clear();
        state.scroll = 0;
        state.follow = true;
    }

    fn rows(&self) -> Vec<Row> {
        self.state().view.rows().to_vec()
    }

    fn scroll_to_end(&mut self) {
        self.touch().follow = true;
    }
}

impl InputControls for TuiSurface {
    fn input_value(&self) -> String {
        self.state().input.clone()
    }

    fn clear_input(&mut self) {
        let mut state = self.touch();
        state.input.clear();
        state.cursor = 0;
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        let mut state = self.touch();
        state.input_enabled = enabled;
        if !enabled {
            state.input_focused = false;
        }
    }

    fn focus_input(&mut self) {
        self.touch().input_focused = true;
    }
}
