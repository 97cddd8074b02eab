//! Helpers for `/`-separated document paths.
//!
//! Routes are handled as strings rather than [`std::path::Path`] so that the
//! same rules apply on every platform and match the URLs they came from.

use std::sync::LazyLock;

use regex::Regex;

static LEADING_PARENT_DIRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\.\.[/\\])+").unwrap());

/// Strip leading `../` (or `..\`) sequences so a path cannot climb above
/// the directory it is joined to.
#[must_use]
pub fn sanitize_path(path: &str) -> String {
    LEADING_PARENT_DIRS.replace(path, "").into_owned()
}

/// Normalize a path: fold `.` and `..` segments and collapse repeated
/// separators.
///
/// `..` never climbs above the root of an absolute path; relative paths keep
/// unresolvable leading `..` segments. A trailing separator is preserved.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_owned();
    }

    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }

    let mut normalized = segments.join("/");
    if absolute {
        normalized.insert(0, '/');
    }
    if trailing && !segments.is_empty() {
        normalized.push('/');
    }
    if normalized.is_empty() {
        normalized.push('.');
    }
    normalized
}

/// Join two paths and normalize the result.
#[must_use]
pub fn join(base: &str, name: &str) -> String {
    normalize_path(&format!("{base}/{name}"))
}

/// Directory part of a path, ignoring a trailing separator.
///
/// `dirname("/docs/guide.md")` is `/docs`, `dirname("/guide.md")` is `/`.
#[must_use]
pub fn dirname(path: &str) -> &str {
    let trimmed = trim_trailing_separator(path);
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(pos) => &trimmed[..pos],
        None => ".",
    }
}

/// Last segment of a path, ignoring a trailing separator.
#[must_use]
pub fn basename(path: &str) -> &str {
    let trimmed = trim_trailing_separator(path);
    trimmed.rfind('/').map_or(trimmed, |pos| &trimmed[pos + 1..])
}

/// Last segment of a path with its extension removed.
#[must_use]
pub fn file_stem(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

fn trim_trailing_separator(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}
