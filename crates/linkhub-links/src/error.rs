use thiserror::Error;

use linkhub_types::LinkId;

/// Errors from link ordering operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The link is not part of the collection.
    #[error("unknown link: {0}")]
    UnknownLink(LinkId),

    /// Applying a position plan would give two links the same position.
    #[error("position {position} would be shared by {first} and {second}")]
    DuplicatePosition {
        position: u32,
        first: LinkId,
        second: LinkId,
    },
}

pub type Result<T> = std::result::Result<T, LinkError>;
