//! Error types for index operations.

use hads_storage::StorageError;

/// Error returned by [`Indexer`](crate::Indexer) operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Reading a document or enumerating the root failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The search engine failed to write or query the index.
    #[error("Search index error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
}

impl IndexError {
    /// Whether the error is a missing file or root directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_not_found())
    }
}
