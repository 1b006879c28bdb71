//! Engine errors.
//!
//! Almost everything in this crate degrades silently; only a document
//! that cannot be read at all surfaces as an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The document is not parseable JSON.
    #[error("malformed document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    /// The change document carries no recognizable change list.
    #[error("change document has no change list ({0})")]
    MissingChangeList(&'static str),
}
