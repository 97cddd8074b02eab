//! Plain text extraction from markdown.

use pulldown_cmark::{Event, Options, Parser, TagEnd};

use crate::util::collapse_whitespace;

/// Strip markdown syntax and return the readable text.
///
/// Text of every block is kept (including code and image alt text), raw
/// HTML is dropped, and whitespace is collapsed to single spaces.
///
/// ```
/// use hads_renderer::plain_text;
///
/// assert_eq!(
///     plain_text("# Title\n\nSome **bold** and `code`.\n\n- one\n- two"),
///     "Title Some bold and code. one two"
/// );
/// ```
#[must_use]
pub fn plain_text(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut text = String::with_capacity(markdown.len());

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak | Event::Rule => text.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::CodeBlock
                | TagEnd::Item
                | TagEnd::TableCell
                | TagEnd::BlockQuote(_),
            ) => text.push(' '),
            _ => {}
        }
    }

    collapse_whitespace(&text)
}
