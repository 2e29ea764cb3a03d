use thiserror::Error;

use linkhub_types::TypeError;

/// Errors that can occur while talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused the write (security rules, read-only mode).
    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    /// The store could not be reached or is in a broken state.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The patch was malformed (overlapping paths, invalid segments).
    #[error("invalid patch: {0}")]
    InvalidPatch(#[from] TypeError),

    /// The subscription's notification channel was closed by the store.
    #[error("subscription closed: {path}")]
    SubscriptionClosed { path: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error during persistence.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
