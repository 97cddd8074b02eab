//! Line directives expanded before markdown parsing.
//!
//! Two directives are recognized at the start of a line (after at most three
//! spaces of indentation), case-insensitively:
//!
//! - `[[toc]]`: nested list of links to every heading of the document
//! - `[[index]]`: navigation tree of the whole documentation root
//!
//! Directives are expanded into markdown, so the result goes through the
//! regular renderer. Lines inside fenced code blocks are left untouched.

use std::fmt::Write;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::fence::{FenceTracker, strip_indent};
use crate::state::{HeadingState, TocEntry};
use crate::util::{escape_link_text, heading_level_to_num};

const TOC_DIRECTIVE: &str = "[[toc]]";
const INDEX_DIRECTIVE: &str = "[[index]]";

/// Provider for the `[[index]]` expansion.
type IndexFn<'a> = dyn Fn() -> String + 'a;

/// Expands `[[toc]]` and `[[index]]` lines into markdown.
///
/// # Example
///
/// ```
/// use hads_renderer::DirectiveProcessor;
/// use pulldown_cmark::Options;
///
/// let mut processor = DirectiveProcessor::new(Options::empty());
/// let output = processor.process("[[toc]]\n# Intro\n## Setup\n");
/// assert!(output.contains("- [Intro](#intro)"));
/// assert!(output.contains("  - [Setup](#setup)"));
/// ```
pub struct DirectiveProcessor<'a> {
    options: Options,
    index: Option<Box<IndexFn<'a>>>,
    fence: FenceTracker,
}

impl<'a> DirectiveProcessor<'a> {
    /// Create a processor that collects headings with the given parser options.
    ///
    /// Use the same options as the renderer so that generated anchors match
    /// the heading IDs of the rendered page.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            options,
            index: None,
            fence: FenceTracker::default(),
        }
    }

    /// Set the provider for `[[index]]` expansion.
    ///
    /// Without a provider, `[[index]]` lines are left as they are.
    #[must_use]
    pub fn with_index(mut self, index: impl Fn() -> String + 'a) -> Self {
        self.index = Some(Box::new(index));
        self
    }

    /// Expand directives in `input`.
    ///
    /// The table of contents and the index are generated at most once per
    /// call, on the first line that needs them.
    pub fn process(&mut self, input: &str) -> String {
        self.fence = FenceTracker::default();

        let mut toc: Option<String> = None;
        let mut index: Option<String> = None;
        let mut output = String::with_capacity(input.len());
        let lines: Vec<&str> = input.lines().collect();
        let line_count = lines.len();

        for (idx, line) in lines.iter().enumerate() {
            self.fence.update(line);

            match self.match_directive(line) {
                Some((Directive::Toc, rest)) => {
                    let toc = toc.get_or_insert_with(|| toc_markdown(&self.collect_toc(input)));
                    push_expansion(&mut output, toc, rest);
                }
                Some((Directive::Index, rest)) if self.index.is_some() => {
                    if index.is_none() {
                        index = self.index.as_ref().map(|provider| provider());
                    }
                    push_expansion(&mut output, index.as_deref().unwrap_or_default(), rest);
                }
                Some((Directive::Index, _)) | None => output.push_str(line),
            }

            push_line_end(&mut output, idx, line_count, input);
        }

        output
    }

    fn match_directive<'l>(&self, line: &'l str) -> Option<(Directive, &'l str)> {
        if self.fence.in_fence() {
            return None;
        }

        let trimmed = strip_indent(line)?;
        [
            (Directive::Toc, TOC_DIRECTIVE),
            (Directive::Index, INDEX_DIRECTIVE),
        ]
        .into_iter()
        .find_map(|(directive, token)| {
            let head = trimmed.get(..token.len())?;
            head.eq_ignore_ascii_case(token)
                .then(|| (directive, &trimmed[token.len()..]))
        })
    }

    /// Collect headings of the document with the same IDs the renderer assigns.
    fn collect_toc(&self, input: &str) -> Vec<TocEntry> {
        let mut headings = HeadingState::default();
        let mut image_depth = 0usize;

        for event in Parser::new_ext(input, self.options) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    headings.start_heading(heading_level_to_num(level));
                }
                Event::End(TagEnd::Heading(_)) => {
                    headings.complete_heading();
                }
                Event::Start(Tag::Image { .. }) => image_depth += 1,
                Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
                Event::Text(text) | Event::Code(text)
                    if headings.is_active() && image_depth == 0 =>
                {
                    headings.push_text(&text);
                }
                _ => {}
            }
        }

        headings.take_toc()
    }
}

#[derive(Clone, Copy)]
enum Directive {
    Toc,
    Index,
}

/// Replace a directive with its expansion, separated from surrounding
/// paragraphs by blank lines.
fn push_expansion(output: &mut String, expansion: &str, rest: &str) {
    output.push('\n');
    output.push_str(expansion);
    output.push('\n');
    output.push_str(rest);
}

fn push_line_end(output: &mut String, idx: usize, line_count: usize, input: &str) {
    if idx + 1 < line_count || input.ends_with('\n') {
        output.push('\n');
    }
}

/// Render table of contents entries as a nested markdown list.
///
/// Nesting is relative to the shallowest heading and never skips a level,
/// so `#` followed by `###` yields a single level of indentation.
pub(crate) fn toc_markdown(entries: &[TocEntry]) -> String {
    let Some(min_level) = entries.iter().map(|e| e.level).min() else {
        return String::new();
    };

    let mut markdown = String::new();
    let mut previous: Option<usize> = None;
    for entry in entries {
        let relative = usize::from(entry.level - min_level);
        let depth = previous.map_or(0, |p| relative.min(p + 1));
        previous = Some(depth);

        writeln!(
            markdown,
            "{}- [{}](#{})",
            "  ".repeat(depth),
            escape_link_text(&entry.title),
            entry.id
        )
        .unwrap();
    }
    markdown
}
