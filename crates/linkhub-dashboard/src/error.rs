use thiserror::Error;

use linkhub_links::LinkError;
use linkhub_store::StoreError;
use linkhub_theme::ThemeError;
use linkhub_types::{ProfileId, TypeError, ValidationError};

/// Errors from dashboard commands and sessions.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Input rejected before anything was sent to the store.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("link error: {0}")]
    Link(#[from] LinkError),

    #[error("theme error: {0}")]
    Theme(#[from] ThemeError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// The store rejected or failed a write. Nothing was applied.
    #[error("remote write failed: {0}")]
    RemoteWrite(#[source] StoreError),

    #[error("remote read failed: {0}")]
    RemoteRead(#[source] StoreError),

    /// Stored data could not be decoded into the profile model.
    #[error("malformed document at {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("profile already exists: {0}")]
    ProfileExists(ProfileId),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for DashboardError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;
