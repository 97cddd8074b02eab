//! Markdown renderer for hads.
//!
//! This crate provides a generic [`MarkdownRenderer`] that produces HTML
//! through the [`RenderBackend`] trait, plus the pieces that turn a plain
//! markdown page into a documentation page:
//!
//! - [`DirectiveProcessor`]: expands `[[toc]]` and `[[index]]` lines before parsing
//! - [`MermaidProcessor`] and [`HighlightProcessor`]: code block processors
//! - [`NavTree`]: navigation tree built from the indexed file list
//! - [`plain_text`]: markdown to plain text, used for search excerpts
//!
//! # Example
//!
//! ```
//! use hads_renderer::{HtmlBackend, MarkdownRenderer, MermaidProcessor};
//!
//! let result = MarkdownRenderer::<HtmlBackend>::new()
//!     .with_processor(MermaidProcessor)
//!     .render_markdown("# Hello\n\n```mermaid\ngraph TD; A-->B;\n```");
//! assert!(result.html.contains(r#"<div class="mermaid">"#));
//! ```

mod backend;
mod code_block;
mod directive;
mod fence;
mod highlight;
mod html;
mod mermaid;
mod nav;
mod renderer;
mod state;
mod text;
mod util;

pub use backend::RenderBackend;
pub use code_block::{CodeBlockProcessor, ProcessResult};
pub use directive::DirectiveProcessor;
pub use highlight::HighlightProcessor;
pub use html::HtmlBackend;
pub use mermaid::MermaidProcessor;
pub use nav::{NavTree, NodeKind};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
pub use text::plain_text;
