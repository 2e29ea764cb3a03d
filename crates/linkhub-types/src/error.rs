use thiserror::Error;

/// Errors produced by type construction and path/patch handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid identifier {value:?}: {reason}")]
    InvalidId { value: String, reason: String },

    #[error("patch paths overlap: {ancestor} is an ancestor of {descendant}")]
    OverlappingPaths { ancestor: String, descendant: String },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Client-side validation failures. These are raised before anything is
/// submitted to the document store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must be between {min} and {max} characters (got {actual})")]
    TitleLength { min: usize, max: usize, actual: usize },

    #[error("url must be between {min} and {max} characters (got {actual})")]
    UrlLength { min: usize, max: usize, actual: usize },

    #[error("bio must be at most {max} characters (got {actual})")]
    BioTooLong { max: usize, actual: usize },

    #[error("display name must be between {min} and {max} characters (got {actual})")]
    DisplayNameLength { min: usize, max: usize, actual: usize },

    #[error("username must be between {min} and {max} characters (got {actual})")]
    UsernameLength { min: usize, max: usize, actual: usize },

    #[error("username contains invalid character {0:?}")]
    UsernameCharacter(char),

    #[error("unknown social provider: {0}")]
    UnknownSocialProvider(String),

    #[error("social handle must be at most {max} characters (got {actual})")]
    SocialHandleTooLong { max: usize, actual: usize },

    #[error("color value must be at most {max} characters (got {actual})")]
    ColorTooLong { max: usize, actual: usize },

    #[error("position update must name at least one link")]
    EmptyPositionUpdate,
}

/// Convenience alias used throughout the types crate.
pub type Result<T> = std::result::Result<T, TypeError>;

impl From<serde_json::Error> for TypeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
