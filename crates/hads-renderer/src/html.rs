//! HTML backend for markdown rendering.
//!
//! Produces semantic HTML5 output suitable for web display.

use std::borrow::Cow;
use std::fmt::Write;

use hads_storage::matcher::{extension, is_markdown};

use crate::backend::RenderBackend;
use crate::state::escape_html;

/// HTML render backend.
///
/// Produces semantic HTML5 with:
/// - `<pre><code>` for code blocks
/// - `<blockquote>` for blockquotes
/// - `<img>` wrapped in a link opening the full image in a new tab
/// - Relative markdown links rewritten to `.html` siblings in static export
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        match lang {
            Some(lang) if lang != "no-highlight" => {
                write!(
                    out,
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    escape_html(lang),
                    escape_html(content)
                )
                .unwrap();
            }
            _ => write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap(),
        }
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let src = escape_html(src);
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<a href="{src}" target="_blank"><img src="{src}"{title_attr} alt="{}"></a>"#,
            escape_html(alt)
        )
        .unwrap();
    }

    fn transform_link(url: &str, static_export: bool) -> Cow<'_, str> {
        if static_export {
            export_link(url)
        } else {
            Cow::Borrowed(url)
        }
    }
}

/// Whether a URL points outside the documentation root or at the current page.
pub(crate) fn is_external_or_absolute(url: &str) -> bool {
    url.starts_with('/')
        || url.starts_with('#')
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
        || url.contains("://")
}

/// Rewrite a relative markdown link to the `.html` file produced by export.
///
/// - `guide.md` → `guide.html`
/// - `../api/intro.mdown#setup` → `../api/intro.html#setup`
///
/// External, absolute, fragment-only and non-markdown links are returned
/// unchanged.
fn export_link(url: &str) -> Cow<'_, str> {
    if is_external_or_absolute(url) {
        return Cow::Borrowed(url);
    }

    let (path_part, fragment) = match url.find('#') {
        Some(pos) => (&url[..pos], &url[pos..]),
        None => (url, ""),
    };

    if !is_markdown(path_part) {
        return Cow::Borrowed(url);
    }

    let Some(ext) = extension(path_part) else {
        return Cow::Borrowed(url);
    };
    let stem = &path_part[..path_part.len() - ext.len()];
    Cow::Owned(format!("{stem}html{fragment}"))
}
