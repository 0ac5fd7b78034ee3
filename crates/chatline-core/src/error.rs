use thiserror::Error;

/// Failure talking to the chat backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport failure: connection refused, timeout, broken body
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("backend responded with status {0}")]
    Status(reqwest::StatusCode),

    /// Body was not a JSON document of the expected shape
    #[error("failed to decode reply: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid timestamp_format {0:?}")]
    TimestampFormat(String),
}
