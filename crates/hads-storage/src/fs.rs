//! Filesystem storage implementation.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use crate::storage::{EntryKind, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Directory names never descended into while scanning.
const EXCLUDED_DIRS: [&str; 1] = ["node_modules"];

/// Filesystem storage rooted at a documentation directory.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use hads_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("docs"));
/// let content = storage.read("/guide.md")?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Root directory for document storage.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Validate that a path doesn't escape the root directory.
    ///
    /// Rejects paths containing parent directory components (`..`) to prevent
    /// path traversal attacks (e.g., `../../../etc/passwd`).
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let has_parent_dir = path
            .components()
            .any(|c| matches!(c, Component::ParentDir));

        if has_parent_dir {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    /// Map a document path to its location on disk.
    fn full_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));
        Self::validate_path(relative)?;
        Ok(self.root.join(relative))
    }

    fn io_error(err: std::io::Error, path: &Path) -> StorageError {
        StorageError::io(err, Some(path.to_path_buf())).with_backend(BACKEND)
    }

    /// Scan directory recursively and collect file paths.
    fn scan_directory(dir_path: &Path, prefix: &str, files: &mut Vec<String>) {
        let entries = match fs::read_dir(dir_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir_path.display(), error = %e, "Skipping unreadable directory");
                return;
            }
        };

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            if is_dir && EXCLUDED_DIRS.contains(&name.as_str()) {
                continue;
            }

            let rel_path = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };

            if is_dir {
                Self::scan_directory(&entry.path(), &rel_path, files);
            } else {
                files.push(rel_path);
            }
        }
    }
}

impl Storage for FsStorage {
    fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        self.full_path(path)
    }

    fn stat(&self, path: &str) -> Result<EntryKind, StorageError> {
        let full_path = self.full_path(path)?;
        let metadata = fs::metadata(&full_path).map_err(|e| Self::io_error(e, &full_path))?;
        if metadata.is_dir() {
            Ok(EntryKind::Directory)
        } else {
            Ok(EntryKind::File)
        }
    }

    fn read(&self, path: &str) -> Result<String, StorageError> {
        let full_path = self.full_path(path)?;
        fs::read_to_string(&full_path).map_err(|e| Self::io_error(e, &full_path))
    }

    fn write(&self, path: &str, content: &str) -> Result<(), StorageError> {
        let full_path = self.full_path(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_error(e, parent))?;
        }
        fs::write(&full_path, content).map_err(|e| Self::io_error(e, &full_path))
    }

    fn mtime(&self, path: &str) -> Result<SystemTime, StorageError> {
        let full_path = self.full_path(path)?;
        fs::metadata(&full_path)
            .and_then(|m| m.modified())
            .map_err(|e| Self::io_error(e, &full_path))
    }

    fn scan(&self) -> Result<Vec<String>, StorageError> {
        // The root itself must be readable; nested failures only skip a subtree.
        fs::read_dir(&self.root).map_err(|e| Self::io_error(e, &self.root))?;

        let mut files = Vec::new();
        Self::scan_directory(&self.root, "", &mut files);
        files.sort();
        Ok(files)
    }
}
