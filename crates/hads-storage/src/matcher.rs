//! File classification by extension.
//!
//! Extensions are compared exactly as stored, without the leading dot and
//! without case folding: `README.MD` is not a markdown file.

use std::path::Path;

/// Canonical directory index files, in the order they are tried.
pub const ROOT_FILES: [&str; 3] = ["index.md", "README.md", "readme.md"];

/// Markdown extensions, in the order extensionless links are resolved.
pub const MARKDOWN_EXTENSIONS: [&str; 4] = ["md", "mkdn", "mdown", "markdown"];

/// Image extensions served as raw files.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// Text and source extensions rendered as highlighted code.
pub const CODE_EXTENSIONS: [&str; 14] = [
    "js", "json", "ts", "coffee", "css", "scss", "sass", "less", "stylus", "html", "jade", "pug",
    "sh", "txt",
];

/// Kind of document a path refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Markdown,
    Image,
    Code,
    Other,
}

impl FileKind {
    /// Classify a path by its extension.
    #[must_use]
    pub fn of(path: &str) -> Self {
        if is_markdown(path) {
            Self::Markdown
        } else if is_image(path) {
            Self::Image
        } else if is_code(path) {
            Self::Code
        } else {
            Self::Other
        }
    }
}

/// Extension of the last path segment, without the dot.
///
/// Dotfiles such as `.md` have no extension.
#[must_use]
pub fn extension(path: &str) -> Option<&str> {
    Path::new(path).extension().and_then(|ext| ext.to_str())
}

#[must_use]
pub fn is_markdown(path: &str) -> bool {
    has_extension(path, &MARKDOWN_EXTENSIONS)
}

#[must_use]
pub fn is_image(path: &str) -> bool {
    has_extension(path, &IMAGE_EXTENSIONS)
}

#[must_use]
pub fn is_code(path: &str) -> bool {
    has_extension(path, &CODE_EXTENSIONS)
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    extension(path).is_some_and(|ext| extensions.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_extensions() {
        assert!(is_markdown("guide.md"));
        assert!(is_markdown("docs/guide.mkdn"));
        assert!(is_markdown("/docs/guide.mdown"));
        assert!(is_markdown("notes.markdown"));
        assert!(!is_markdown("guide.txt"));
        assert!(!is_markdown("guide"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(!is_markdown("README.MD"));
        assert!(!is_image("photo.PNG"));
        assert!(!is_code("script.JS"));
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        assert_eq!(extension(".md"), None);
        assert!(!is_markdown(".md"));
        assert_eq!(extension("dir/.hidden.md"), Some("md"));
    }

    #[test]
    fn test_extension_of_last_segment_only() {
        assert_eq!(extension("v1.2/readme"), None);
        assert_eq!(extension("v1.2/readme.md"), Some("md"));
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::of("index.md"), FileKind::Markdown);
        assert_eq!(FileKind::of("images/logo.svg"), FileKind::Image);
        assert_eq!(FileKind::of("images/photo.webp"), FileKind::Image);
        assert_eq!(FileKind::of("src/app.ts"), FileKind::Code);
        assert_eq!(FileKind::of("notes.txt"), FileKind::Code);
        assert_eq!(FileKind::of("archive.zip"), FileKind::Other);
        assert_eq!(FileKind::of("Makefile"), FileKind::Other);
    }

    #[test]
    fn test_sets_are_disjoint() {
        for ext in MARKDOWN_EXTENSIONS {
            assert!(!IMAGE_EXTENSIONS.contains(&ext));
            assert!(!CODE_EXTENSIONS.contains(&ext));
        }
        for ext in IMAGE_EXTENSIONS {
            assert!(!CODE_EXTENSIONS.contains(&ext));
        }
    }
}
