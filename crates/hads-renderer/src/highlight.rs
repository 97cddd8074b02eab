//! Syntax highlighting code block processor.
//!
//! Highlighting produces class-based `<span>` markup so the page stylesheet
//! decides on colors. Unknown languages fall back to plain code blocks.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::code_block::{CodeBlockProcessor, ProcessResult};
use crate::state::escape_html;

/// Bundled syntax definitions, loaded on first use.
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Language tag that explicitly disables highlighting.
const NO_HIGHLIGHT: &str = "no-highlight";

/// Highlights fenced code blocks by language tag.
///
/// Register it after processors that claim specific languages (such as
/// [`MermaidProcessor`](crate::MermaidProcessor)) so those see the block first.
#[derive(Debug, Default)]
pub struct HighlightProcessor {
    warnings: Vec<String>,
}

impl HighlightProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn highlight(language: &str, source: &str) -> Result<Option<String>, syntect::Error> {
        let Some(syntax) = SYNTAX_SET.find_syntax_by_token(language) else {
            return Ok(None);
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
        for line in LinesWithEndings::from(source) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(Some(generator.finalize()))
    }

    fn unsupported(&mut self, language: &str, reason: &str) -> ProcessResult {
        tracing::warn!(language, reason, "Code block rendered without highlighting");
        self.warnings
            .push(format!("cannot highlight `{language}`: {reason}"));
        ProcessResult::PassThrough
    }
}

impl CodeBlockProcessor for HighlightProcessor {
    fn process(
        &mut self,
        language: &str,
        _attrs: &HashMap<String, String>,
        source: &str,
    ) -> ProcessResult {
        if language.is_empty() || language == NO_HIGHLIGHT {
            return ProcessResult::PassThrough;
        }

        match Self::highlight(language, source) {
            Ok(Some(highlighted)) => {
                let mut html = String::with_capacity(highlighted.len() + 48);
                write!(
                    html,
                    r#"<pre><code class="language-{}">{highlighted}</code></pre>"#,
                    escape_html(language)
                )
                .unwrap();
                ProcessResult::Inline(html)
            }
            Ok(None) => self.unsupported(language, "unknown language"),
            Err(e) => self.unsupported(language, &e.to_string()),
        }
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
