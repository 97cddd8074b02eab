//! Full-text index of the markdown documents under a documentation root.
//!
//! The [`Indexer`] keeps two views of the corpus:
//!
//! - a tantivy index over file names and contents, used for ranked search
//! - the raw content of every indexed document, keyed by its path relative
//!   to the root, used for search excerpts and the navigation tree
//!
//! Entries are never removed: a document deleted from disk stays searchable
//! until the process restarts.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hads_index::Indexer;
//! use hads_storage::FsStorage;
//!
//! let indexer = Indexer::new(Arc::new(FsStorage::new("docs".into())))?;
//! indexer.index_all()?;
//! for hit in indexer.search("install")? {
//!     println!("{} ({})", hit.reference, hit.score);
//! }
//! ```

mod error;
mod indexer;
mod schema;

pub use error::IndexError;
pub use indexer::{IndexEntry, Indexer, SearchHit};
