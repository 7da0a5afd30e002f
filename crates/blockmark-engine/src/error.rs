use thiserror::Error;

use crate::document::Path;

/// Failure of a document command or query.
///
/// Commands validate their input before touching the tree, so an error
/// always leaves the document unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("No node at path {0:?}")]
    InvalidPath(Path),

    #[error("Block at {0:?} does not hold text")]
    NotATextBlock(Path),

    #[error("Block at {0:?} does not hold other blocks")]
    NotAContainer(Path),

    #[error("Offset {offset} is out of bounds or not a char boundary at {path:?}")]
    InvalidOffset { path: Path, offset: usize },

    #[error("Block at {0:?} has no parent block to lift out of")]
    NotNested(Path),

    #[error("Document has no selection")]
    NoSelection,

    #[error("Invalid document JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Json(err.to_string())
    }
}
