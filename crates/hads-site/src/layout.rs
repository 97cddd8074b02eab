//! HTML page layout.

use std::fmt::Write;

use hads_renderer::escape_html;

use crate::page::{Icon, Page};
use crate::route::encode_route;

/// Location the custom stylesheet is served at.
pub const CUSTOM_CSS_ROUTE: &str = "/_hads/custom.css";

/// Mermaid runtime, which renders every `.mermaid` element on load.
const MERMAID_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";

/// Wraps rendered pages in a complete HTML document.
#[derive(Clone, Copy, Debug, Default)]
pub struct Layout {
    custom_css: bool,
    read_only: bool,
    static_export: bool,
}

impl Layout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Link the stylesheet served at [`CUSTOM_CSS_ROUTE`].
    #[must_use]
    pub fn with_custom_css(mut self, enabled: bool) -> Self {
        self.custom_css = enabled;
        self
    }

    /// Hide edit links.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Render standalone files: no search box, no edit links.
    #[must_use]
    pub fn with_static_export(mut self, enabled: bool) -> Self {
        self.static_export = enabled;
        self
    }

    /// Render a complete HTML document for `page`.
    pub fn render(&self, page: &Page) -> String {
        let mut html = String::with_capacity(page.content.len() + 2048);
        let title = escape_html(&page.title);

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        let _ = writeln!(html, "<title>{title}</title>");
        if self.custom_css && !self.static_export {
            let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{CUSTOM_CSS_ROUTE}\">");
        }
        let _ = writeln!(html, "<script src=\"{MERMAID_SCRIPT}\"></script>");
        html.push_str("</head>\n<body>\n");

        if !self.static_export {
            self.render_header(&mut html, page);
        }

        html.push_str("<main>\n");
        let _ = writeln!(
            html,
            "<h1 class=\"page-title\"><span class=\"octicon {}\"></span> {title}</h1>",
            page.icon.as_str()
        );
        if let Some(last_modified) = &page.last_modified {
            let _ = writeln!(
                html,
                "<p class=\"last-modified\">Last modified {}</p>",
                escape_html(last_modified)
            );
        }

        if page.edit {
            Self::render_editor(&mut html, page);
        } else {
            html.push_str("<article class=\"markdown-body\">\n");
            html.push_str(&page.content);
            html.push_str("\n</article>\n");
        }

        html.push_str("</main>\n</body>\n</html>");
        html
    }

    fn render_header(&self, html: &mut String, page: &Page) {
        html.push_str("<header>\n<a class=\"home\" href=\"/\">Home</a>\n");
        html.push_str("<form class=\"search\" action=\"/\" method=\"get\">");
        let _ = write!(
            html,
            "<input type=\"search\" name=\"search\" placeholder=\"Search\" value=\"{}\">",
            escape_html(page.search.as_deref().unwrap_or_default())
        );
        html.push_str("</form>\n");

        let editable = !self.read_only && !page.edit && !page.is_error() && page.icon == Icon::File;
        if editable {
            let _ = writeln!(
                html,
                "<a class=\"edit\" href=\"{}?edit=1\">Edit</a>",
                escape_html(&encode_route(&page.route))
            );
        }
        html.push_str("</header>\n");
    }

    fn render_editor(html: &mut String, page: &Page) {
        let _ = writeln!(
            html,
            "<form class=\"editor\" method=\"post\" action=\"{}\">",
            escape_html(&encode_route(&page.route))
        );
        let _ = writeln!(
            html,
            "<textarea name=\"content\">{}</textarea>",
            escape_html(&page.content)
        );
        html.push_str("<button type=\"submit\">Save</button>\n</form>\n");
    }
}
