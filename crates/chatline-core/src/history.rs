//! Persists the visible conversation and restores it on startup.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::StorageError;
use crate::render::Renderer;
use crate::storage::KeyValueStore;
use crate::surface::ConversationSurface;
use crate::view::{Row, Speaker};

pub const HISTORY_KEY: &str = "chatHistory";

/// One persisted message. Timestamps are not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub who: Speaker,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct HistoryStore<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> HistoryStore<K> {
    pub fn new(store: K) -> Self {
        Self {
            store,
            key: HISTORY_KEY.to_string(),
        }
    }

    /// Message rows in order, typing placeholder excluded
    pub fn extract(rows: &[Row]) -> Vec<HistoryEntry> {
        rows.iter()
            .filter_map(Row::message)
            .map(|message| HistoryEntry {
                who: message.speaker,
                text: message.text.trim().to_string(),
            })
            .collect()
    }

    /// Replace the stored history with what the surface currently shows.
    pub fn save<S: ConversationSurface + ?Sized>(&self, surface: &S) -> Result<usize, StorageError> {
        let entries = Self::extract(&surface.rows());
        let json = serde_json::to_string(&entries)?;
        self.store.set(&self.key, &json)?;
        debug!(entries = entries.len(), "history saved");
        Ok(entries.len())
    }

    /// Stored entries; an absent key reads as empty.
    pub fn read(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        match self.store.get(&self.key)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Render the stored history with fresh timestamps. Unreadable history
    /// is logged and treated as empty.
    pub fn load<S: ConversationSurface + ?Sized>(
        &self,
        surface: &mut S,
        renderer: &mut Renderer,
        clock: &dyn Clock,
    ) -> usize {
        let entries = match self.read() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable chat history");
                return 0;
            }
        };

        for entry in &entries {
            renderer.append_message(surface, entry.who, &entry.text, Some(clock.now_label()), false);
        }
        surface.scroll_to_end();

        debug!(entries = entries.len(), "history restored");
        entries.len()
    }

    /// Empty the surface and delete the stored key.
    pub fn clear<S: ConversationSurface + ?Sized>(&self, surface: &mut S) -> Result<(), StorageError> {
        surface.clear_rows();
        self.store.remove(&self.key)?;
        debug!("history cleared");
        Ok(())
    }
}
