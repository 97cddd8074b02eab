//! Request path and query string handling.

use std::collections::HashMap;

use hads_storage::matcher::is_markdown;
use hads_storage::path::{normalize_path, sanitize_path};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Characters escaped when a route is turned back into a URL path.
const ROUTE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Turn a request path into a route relative to the documentation root.
///
/// The path is percent-decoded, normalized and stripped of leading `../`
/// sequences. The result always starts with `/`.
///
/// ```
/// use hads_site::extract_route;
///
/// assert_eq!(extract_route("/guide/../my%20page.md"), "/my page.md");
/// assert_eq!(extract_route("/docs//api/"), "/docs/api/");
/// ```
#[must_use]
pub fn extract_route(request_path: &str) -> String {
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();
    let route = sanitize_path(&normalize_path(&decoded));
    if route.starts_with('/') {
        route
    } else if route == "." {
        "/".to_owned()
    } else {
        format!("/{route}")
    }
}

/// Percent-encode a route for use in a URL.
#[must_use]
pub fn encode_route(route: &str) -> String {
    utf8_percent_encode(route, ROUTE).to_string()
}

/// Route of the markdown file to create for `route`.
///
/// A trailing separator is dropped and `.md` appended unless the route
/// already has a markdown extension.
#[must_use]
pub fn ensure_markdown_extension(route: &str) -> String {
    let file = route.strip_suffix('/').unwrap_or(route);
    if is_markdown(file) {
        file.to_owned()
    } else {
        format!("{file}.md")
    }
}

/// Intent flags recognized in the query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Create the requested markdown file if it doesn't exist.
    pub create: bool,
    /// Return the raw markdown for editing. Implied by `create`.
    pub edit: bool,
    /// Stream the file as is.
    pub raw: bool,
    /// Trimmed, non-empty search query.
    pub search: Option<String>,
}

impl QueryOptions {
    /// Parse query parameters.
    ///
    /// `create`, `edit` and `raw` are JSON values (`1`, `true`, `"yes"`);
    /// anything that doesn't parse or is falsy leaves the flag off.
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use hads_site::QueryOptions;
    ///
    /// let query = HashMap::from([
    ///     ("create".to_owned(), "1".to_owned()),
    ///     ("search".to_owned(), "  ".to_owned()),
    /// ]);
    /// let options = QueryOptions::from_query(&query);
    /// assert!(options.create && options.edit);
    /// assert_eq!(options.search, None);
    /// ```
    #[must_use]
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let flag = |name: &str| query.get(name).is_some_and(|value| is_truthy(value));
        let create = flag("create");

        Self {
            create,
            edit: flag("edit") || create,
            raw: flag("raw"),
            search: query
                .get("search")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        }
    }
}

/// Whether a query value parses as a truthy JSON value.
fn is_truthy(value: &str) -> bool {
    match serde_json::from_str::<serde_json::Value>(value) {
        Ok(serde_json::Value::Bool(b)) => b,
        Ok(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Ok(serde_json::Value::String(s)) => !s.is_empty(),
        Ok(serde_json::Value::Array(_) | serde_json::Value::Object(_)) => true,
        Ok(serde_json::Value::Null) | Err(_) => false,
    }
}
