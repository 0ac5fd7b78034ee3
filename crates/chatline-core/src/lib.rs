pub mod backend;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod render;
pub mod reveal;
pub mod sanitize;
pub mod storage;
pub mod surface;
pub mod typing;
pub mod view;

// Re-export main types for convenience
pub use backend::{ChatBackend, HttpBackend};
pub use clock::{Clock, LocalClock};
pub use config::Config;
pub use controller::{Conversation, Outcome, Phase, TurnHandle};
pub use error::{BackendError, ConfigError, StorageError};
pub use history::{HistoryEntry, HistoryStore};
pub use render::{Avatars, Renderer};
pub use reveal::{Reveal, RevealOutcome};
pub use sanitize::sanitize;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use surface::{ConversationSurface, InputControls, MemorySurface};
pub use typing::TypingIndicator;
pub use view::{Bubble, ConversationView, Message, Row, RowId, Speaker};
