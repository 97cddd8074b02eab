//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;

use hads_site::{Layout, Resolver};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Route resolver over the indexed documentation root.
    pub(crate) resolver: Resolver,
    /// Layout wrapping pages for HTML responses.
    pub(crate) layout: Layout,
    /// Images directory, relative to the root.
    pub(crate) images_dir: String,
    /// Custom stylesheet, when one exists.
    pub(crate) custom_css: Option<PathBuf>,
}
