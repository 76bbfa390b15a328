//! Error types for the device registry service

/// Errors that can occur in the device registry service
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Sync error: {0}")]
    Sync(String),
}

/// Result type alias for device registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
