//! Route resolution and page rendering for hads.
//!
//! This crate turns request routes into pages:
//! - [`Resolver`]: maps a route and its query intents to a [`Resolution`]
//! - [`DocRenderer`]: renders documents, code, search results and the index
//! - [`Layout`]: wraps a [`Page`] in a complete HTML document
//! - [`export`]: writes every document of the root as a static HTML file
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use hads_index::Indexer;
//! use hads_site::{Layout, QueryOptions, Resolution, Resolver, extract_route};
//! use hads_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("docs")));
//! let indexer = Arc::new(Indexer::new(storage)?);
//! indexer.index_all()?;
//!
//! let resolver = Resolver::new(indexer);
//! let route = extract_route("/guide");
//! if let Resolution::Page(page) = resolver.resolve(&route, &QueryOptions::default()) {
//!     let html = Layout::new().render(&page);
//! #   let _ = html;
//! }
//! # Ok(())
//! # }
//! ```

mod export;
mod layout;
mod page;
mod renderer;
mod resolver;
mod route;

pub use export::{ExportError, ExportOptions, ExportSummary, export};
pub use layout::{CUSTOM_CSS_ROUTE, Layout};
pub use page::{Icon, Page, format_last_modified};
pub use renderer::{DocRenderer, SearchPage};
pub use resolver::{Resolution, Resolver};
pub use route::{QueryOptions, encode_route, ensure_markdown_extension, extract_route};
