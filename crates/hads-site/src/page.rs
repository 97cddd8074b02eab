//! Rendered page and its display metadata.

use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Display format of the last modification time.
const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%d %-H:%M:%S";

/// Icon shown next to the page title.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Icon {
    #[serde(rename = "octicon-file")]
    File,
    #[serde(rename = "octicon-file-code")]
    FileCode,
    #[serde(rename = "octicon-search")]
    Search,
    #[serde(rename = "octicon-alert")]
    Alert,
}

impl Icon {
    /// CSS class of the icon.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "octicon-file",
            Self::FileCode => "octicon-file-code",
            Self::Search => "octicon-search",
            Self::Alert => "octicon-alert",
        }
    }
}

/// A resolved page, ready to be laid out or serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub title: String,
    pub icon: Icon,
    /// Route shown to the reader; `/` for error pages.
    pub route: String,
    pub last_modified: Option<String>,
    /// Rendered HTML, or the raw markdown when `edit` is set.
    pub content: String,
    /// The page is opened in the editor.
    pub edit: bool,
    /// Search query the page answers.
    pub search: Option<String>,
    /// HTTP status code.
    pub status: u16,
}

impl Page {
    /// A rendered page with status 200.
    pub fn new(title: impl Into<String>, icon: Icon, route: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon,
            route: route.into(),
            last_modified: None,
            content: String::new(),
            edit: false,
            search: None,
            status: 200,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }

    #[must_use]
    pub fn with_last_modified(mut self, mtime: Option<SystemTime>) -> Self {
        self.last_modified = mtime.map(format_last_modified);
        self
    }

    #[must_use]
    pub fn with_edit(mut self, edit: bool) -> Self {
        self.edit = edit;
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Whether the page reports an error.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Format a modification time in local time, e.g. `2024-03-05 9:07:02`.
#[must_use]
pub fn format_last_modified(mtime: SystemTime) -> String {
    DateTime::<Local>::from(mtime)
        .format(LAST_MODIFIED_FORMAT)
        .to_string()
}
