use tracing::trace;

use crate::render::Renderer;
use crate::surface::ConversationSurface;
use crate::view::{RowId, Speaker};

/// Owns the single "bot is typing" row
#[derive(Debug, Default)]
pub struct TypingIndicator {
    row: Option<RowId>,
}

impl TypingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing indicator with a fresh one at the bottom.
    pub fn show<S: ConversationSurface + ?Sized>(&mut self, surface: &mut S, renderer: &mut Renderer) {
        self.hide(surface);
        let id = renderer.append_message(surface, Speaker::Bot, "", None, true);
        trace!(row = id.0, "typing indicator shown");
        self.row = Some(id);
    }

    pub fn hide<S: ConversationSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(id) = self.row.take() {
            surface.remove_row(id);
            trace!(row = id.0, "typing indicator hidden");
        }
    }

    pub fn is_visible(&self) -> bool {
        self.row.is_some()
    }

    /// Drop the reference without touching the surface, for when the surface
    /// was cleared underneath us.
    pub fn forget(&mut self) {
        self.row = None;
    }
}
