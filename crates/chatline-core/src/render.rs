//! Builds message rows and appends them to a surface.

use tracing::trace;

use crate::sanitize::sanitize;
use crate::surface::ConversationSurface;
use crate::view::{Bubble, Row, RowId, Speaker};

/// The fixed avatar reference for each speaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatars {
    pub user: String,
    pub bot: String,
}

impl Default for Avatars {
    fn default() -> Self {
        Self {
            user: "🧑".to_string(),
            bot: "🤖".to_string(),
        }
    }
}

impl Avatars {
    pub fn for_speaker(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::User => &self.user,
            Speaker::Bot => &self.bot,
        }
    }
}

/// Creates rows and hands out their handles
#[derive(Debug)]
pub struct Renderer {
    avatars: Avatars,
    next_id: u64,
}

impl Renderer {
    pub fn new(avatars: Avatars) -> Self {
        Self { avatars, next_id: 0 }
    }

    /// Append a message row and scroll to it.
    ///
    /// A typing placeholder always belongs to the bot and shows the animated
    /// dots instead of `text`.
    pub fn append_message<S: ConversationSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        speaker: Speaker,
        text: &str,
        timestamp: Option<String>,
        typing_placeholder: bool,
    ) -> RowId {
        self.next_id += 1;
        let id = RowId(self.next_id);

        let speaker = if typing_placeholder { Speaker::Bot } else { speaker };
        let bubble = if typing_placeholder {
            Bubble::Typing
        } else {
            Bubble::text(sanitize(text), timestamp)
        };

        trace!(row = id.0, speaker = speaker.as_str(), typing_placeholder, "append row");

        surface.append_row(Row {
            id,
            speaker,
            avatar: self.avatars.for_speaker(speaker).to_string(),
            bubble,
            typing_placeholder,
        });
        surface.scroll_to_end();

        id
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Avatars::default())
    }
}
