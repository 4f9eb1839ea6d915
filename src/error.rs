//! Error types for the epic bridge.

use thiserror::Error;

/// Main error type for bridge operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BridgeError {
    #[error(
        "Providing a root epic as plugin configuration is not supported; \
         register it with EpicPlugin::run instead"
    )]
    RootEpicAsConfig,

    #[error("Epic \"{epic}\" does not return a stream. Double check the epic returns Some(stream)")]
    MissingOutput { epic: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::Serialization(e.to_string())
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
