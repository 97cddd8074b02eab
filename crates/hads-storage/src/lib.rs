//! Document root access for hads.
//!
//! This crate provides:
//! - [`matcher`]: classification of paths into markdown, image and code files
//! - [`Storage`] trait with `stat()`, `read()`, `write()`, `mtime()` and `scan()`
//! - [`FsStorage`] implementation bound to a root directory
//! - [`path`] helpers for normalizing and sanitizing request paths
//!
//! All path parameters are relative to the storage root and use `/` as the
//! separator. A leading `/` is accepted and ignored.
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use hads_storage::{FsStorage, Storage, matcher};
//!
//! let storage = FsStorage::new(PathBuf::from("docs"));
//! for file in storage.scan()?.iter().filter(|f| matcher::is_markdown(f)) {
//!     println!("{file}");
//! }
//! ```

mod fs;
pub mod matcher;
pub mod path;
mod storage;

pub use fs::FsStorage;
pub use matcher::FileKind;
pub use storage::{EntryKind, Storage, StorageError, StorageErrorKind};
