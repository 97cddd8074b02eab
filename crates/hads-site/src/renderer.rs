//! Rendering of documents, search results and the navigation index.

use std::fmt::Write;
use std::sync::Arc;

use hads_index::{IndexError, Indexer};
use hads_renderer::{
    DirectiveProcessor, HighlightProcessor, HtmlBackend, MarkdownRenderer, MermaidProcessor,
    NavTree, plain_text,
};
use hads_storage::StorageError;

use crate::route::encode_route;

/// Maximum number of search results listed.
const SEARCH_RESULTS_MAX: usize = 10;

/// Maximum excerpt length, in characters.
const SEARCH_EXTRACT_LENGTH: usize = 400;

/// Marker appended to truncated excerpts.
const TRUNCATION_MARKER: &str = " [...]";

/// Rendered search results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchPage {
    /// Summary such as `Search results (first 10 of 37)`.
    pub title: String,
    pub html: String,
    /// Number of matches before truncation.
    pub total: usize,
}

/// Renders documents of an indexed root to HTML.
///
/// Every render expands `[[toc]]` and `[[index]]` directives, turns `mermaid`
/// blocks into diagram containers and highlights other fenced code.
#[derive(Clone, Debug)]
pub struct DocRenderer {
    indexer: Arc<Indexer>,
    static_export: bool,
    image_prefix: String,
}

impl DocRenderer {
    #[must_use]
    pub fn new(indexer: Arc<Indexer>) -> Self {
        Self {
            indexer,
            static_export: false,
            image_prefix: String::new(),
        }
    }

    /// Rewrite relative markdown links to the `.html` files of a static export.
    #[must_use]
    pub fn with_static_export(mut self, enabled: bool) -> Self {
        self.static_export = enabled;
        self
    }

    /// Prefix prepended to relative image sources.
    #[must_use]
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_prefix = prefix.into();
        self
    }

    pub fn indexer(&self) -> &Arc<Indexer> {
        &self.indexer
    }

    /// Render markdown text.
    pub fn render_markdown(&self, content: &str) -> String {
        let mut renderer = MarkdownRenderer::<HtmlBackend>::new()
            .with_static_export(self.static_export)
            .with_image_prefix(self.image_prefix.as_str())
            .with_processor(MermaidProcessor)
            .with_processor(HighlightProcessor::new());

        let expanded = DirectiveProcessor::new(renderer.parser_options())
            .with_index(|| self.index_markdown())
            .process(content);

        let result = renderer.render_markdown(&expanded);
        for warning in &result.warnings {
            tracing::debug!(warning = %warning, "Markdown rendered with warning");
        }
        result.html
    }

    /// Raw content of a document.
    pub fn render_raw(&self, route: &str) -> Result<String, StorageError> {
        self.indexer.storage().read(route)
    }

    /// Render a markdown document.
    pub fn render_file(&self, route: &str) -> Result<String, StorageError> {
        Ok(self.render_markdown(&self.render_raw(route)?))
    }

    /// Render a source file as a fenced code block of `language`.
    pub fn render_code(&self, route: &str, language: &str) -> Result<String, StorageError> {
        let content = self.render_raw(route)?;
        Ok(self.render_markdown(&code_fence(&content, language)))
    }

    /// Search the index and render the best matches with their excerpts.
    pub fn render_search(&self, query: &str) -> Result<SearchPage, IndexError> {
        let hits = self.indexer.search(query)?;
        let total = hits.len();

        let title = if total > SEARCH_RESULTS_MAX {
            format!("Search results (first {SEARCH_RESULTS_MAX} of {total})")
        } else {
            format!("Search results ({total})")
        };

        let mut content = String::new();
        if total == 0 {
            content.push_str("No results.");
        }
        for hit in hits.iter().take(SEARCH_RESULTS_MAX) {
            // Entries can outlive their files; skip anything without content.
            let Some(text) = self.indexer.get_content(&hit.reference) else {
                continue;
            };
            write!(
                content,
                "[{}](/{})\n> {}\n\n",
                hit.reference,
                encode_route(&hit.reference),
                excerpt(&text)
            )
            .unwrap();
        }

        Ok(SearchPage {
            title,
            html: self.render_markdown(&content),
            total,
        })
    }

    /// Render the navigation tree of every indexed document.
    pub fn render_index(&self) -> String {
        self.render_markdown(&self.index_markdown())
    }

    fn index_markdown(&self) -> String {
        NavTree::from_paths(self.indexer.get_files()).to_markdown(self.static_export)
    }
}

/// Plain-text excerpt of a document for search results, escaped so it
/// renders as literal text when placed back into markdown.
pub(crate) fn excerpt(markdown: &str) -> String {
    let text = plain_text(markdown).replace('`', "");

    if text.chars().count() > SEARCH_EXTRACT_LENGTH {
        let truncated: String = text.chars().take(SEARCH_EXTRACT_LENGTH).collect();
        let mut escaped = escape_markdown(&truncated);
        escaped.push_str(TRUNCATION_MARKER);
        escaped
    } else {
        escape_markdown(&text)
    }
}

/// Backslash-escape every ASCII punctuation character.
///
/// Tags, entities, emphasis, links, directives and block markers all come
/// out as plain text.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_punctuation() {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wrap `content` in a fence longer than any backtick run it contains.
fn code_fence(content: &str, language: &str) -> String {
    let longest_run = content
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or_default();
    let fence = "`".repeat(longest_run.max(2) + 1);
    format!("{fence}{language}\n{content}\n{fence}")
}
