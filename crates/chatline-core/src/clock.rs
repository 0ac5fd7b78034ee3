use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use tracing::warn;

pub const DEFAULT_FORMAT: &str = "%H:%M";

/// True when chrono understands every specifier in `format`.
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Produces the display timestamp attached to a bubble.
pub trait Clock {
    fn now_label(&self) -> String;
}

/// Wall clock in the local timezone, formatted with a chrono format string
#[derive(Debug, Clone)]
pub struct LocalClock {
    format: String,
}

impl LocalClock {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
        }
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT)
    }
}

impl Clock for LocalClock {
    fn now_label(&self) -> String {
        let now = Local::now();
        let mut label = String::new();
        if write!(label, "{}", now.format(&self.format)).is_err() {
            warn!(format = %self.format, "invalid timestamp format, using {}", DEFAULT_FORMAT);
            return now.format(DEFAULT_FORMAT).to_string();
        }
        label
    }
}

/// Always reports the same label
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now_label(&self) -> String {
        self.0.clone()
    }
}
