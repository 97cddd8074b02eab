//! Resolution of request routes to documents.
//!
//! A route is resolved by a bounded retry loop. Each attempt stats the
//! current candidate and either settles on an outcome or moves to the next
//! candidate:
//!
//! 1. A directory gets the next canonical root file appended
//!    (`index.md`, `README.md`, `readme.md`).
//! 2. A missing root file is replaced by the next root file of the same
//!    directory.
//! 3. A missing extensionless route gets the next markdown extension
//!    (`md`, `mkdn`, `mdown`, `markdown`).
//!
//! Both cursors only move forward, so a request stats at most a handful of
//! paths before it ends on a page, a redirect or a 404.

use std::path::PathBuf;
use std::sync::Arc;

use hads_index::Indexer;
use hads_storage::matcher::{MARKDOWN_EXTENSIONS, ROOT_FILES, extension};
use hads_storage::path::{basename, dirname, file_stem, join};
use hads_storage::{EntryKind, FileKind, Storage, StorageError};

use crate::page::{Icon, Page};
use crate::renderer::DocRenderer;
use crate::route::{QueryOptions, encode_route, ensure_markdown_extension};

const NO_HOME_PAGE: &str = "## No home page (╥﹏╥)\nDo you want to create an \
    [index.md](/index.md?create=1) or [readme.md](/readme.md?create=1) file perhaps?";

const NOT_FOUND: &str =
    "## File not found ¯\\\\\\_(◕\\_\\_◕)_/¯\n> *There's a glitch in the matrix...*";

/// Outcome of resolving a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A rendered page, possibly an error page with a 4xx status.
    Page(Page),
    /// A file to stream as is.
    RawFile {
        route: String,
        path: PathBuf,
    },
    /// The client should request this location instead.
    Redirect(String),
    /// The route exists but is not a document this server renders.
    NotHandled,
    /// A mutating request was made against a read-only root.
    ReadOnly,
}

/// Terminal error states of a resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Failure {
    NotFound,
    NoHomePage,
    /// 400 with the given markdown message.
    BadRequest(String),
}

/// Candidate route and the fallbacks already tried for it.
#[derive(Debug)]
struct Cursor {
    route: String,
    /// Position in [`ROOT_FILES`] of the root file appended last.
    root_index: Option<usize>,
    /// Position in [`MARKDOWN_EXTENSIONS`] of the extension appended last.
    md_index: Option<usize>,
    created: bool,
}

impl Cursor {
    fn new(route: &str) -> Self {
        Self {
            route: route.to_owned(),
            root_index: None,
            md_index: None,
            created: false,
        }
    }

    /// Append the next root file to a directory route.
    fn enter_directory(&mut self) -> bool {
        let next = self.root_index.map_or(0, |i| i + 1);
        let Some(name) = ROOT_FILES.get(next) else {
            return false;
        };
        self.route = join(&self.route, name);
        self.root_index = Some(next);
        true
    }

    /// Move to the next candidate after a missing route.
    fn advance(&mut self) -> bool {
        if let Some(index) = self.root_index {
            let Some(name) = ROOT_FILES.get(index + 1) else {
                return false;
            };
            self.route = join(dirname(&self.route), name);
            self.root_index = Some(index + 1);
            return true;
        }

        let guessing = extension(&self.route).is_none() || self.md_index.is_some();
        if basename(&self.route).is_empty() || !guessing {
            return false;
        }
        let next = self.md_index.map_or(0, |i| i + 1);
        let Some(ext) = MARKDOWN_EXTENSIONS.get(next) else {
            return false;
        };
        let candidate = format!("{}.{ext}", file_stem(&self.route));
        self.route = join(dirname(&self.route), &candidate);
        self.md_index = Some(next);
        true
    }

    /// Error reported once every candidate is exhausted.
    fn failure(&self) -> Failure {
        if dirname(&self.route) == "/" && self.root_index == Some(ROOT_FILES.len() - 1) {
            Failure::NoHomePage
        } else {
            Failure::NotFound
        }
    }
}

/// Resolves request routes against an indexed documentation root.
///
/// # Example
///
/// ```ignore
/// use hads_site::{QueryOptions, Resolution, Resolver};
///
/// let resolver = Resolver::new(indexer);
/// match resolver.resolve("/guide", &QueryOptions::default()) {
///     Resolution::Page(page) => println!("{}: {}", page.status, page.title),
///     other => println!("{other:?}"),
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Resolver {
    renderer: DocRenderer,
    read_only: bool,
}

impl Resolver {
    #[must_use]
    pub fn new(indexer: Arc<Indexer>) -> Self {
        Self {
            renderer: DocRenderer::new(indexer),
            read_only: false,
        }
    }

    /// Disable creating and editing documents.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn renderer(&self) -> &DocRenderer {
        &self.renderer
    }

    fn storage(&self) -> &Arc<dyn Storage> {
        self.renderer.indexer().storage()
    }

    /// Resolve `route` for the intents in `query`.
    ///
    /// Never fails: every error ends as an error page.
    pub fn resolve(&self, route: &str, query: &QueryOptions) -> Resolution {
        let create = query.create && !self.read_only;
        let edit = query.edit && !self.read_only;
        let mut cursor = Cursor::new(route);

        loop {
            tracing::debug!(route = %cursor.route, "Resolving route");

            match self.storage().stat(&cursor.route) {
                Ok(EntryKind::Directory) if query.search.is_none() => {
                    if create {
                        return self.cannot_create(&cursor.route);
                    }
                    if !cursor.enter_directory() {
                        return self.error_page(cursor.failure());
                    }
                }
                Ok(_) => return self.found(&cursor.route, query, edit),
                Err(_) if create => {
                    if let Some(resolution) = self.create(&mut cursor) {
                        return resolution;
                    }
                }
                Err(_) => {
                    if !cursor.advance() {
                        return self.error_page(cursor.failure());
                    }
                }
            }
        }
    }

    /// Create an empty markdown file for the cursor's route.
    ///
    /// Returns `None` once the file exists and resolution should retry.
    fn create(&self, cursor: &mut Cursor) -> Option<Resolution> {
        if cursor.created {
            return Some(self.cannot_create(&cursor.route));
        }

        let fixed = ensure_markdown_extension(&cursor.route);
        if fixed != cursor.route {
            return Some(Resolution::Redirect(format!(
                "{}?create=1",
                encode_route(&fixed)
            )));
        }

        if let Err(e) = self.storage().write(&cursor.route, "") {
            tracing::error!(route = %cursor.route, error = %e, "Failed to create file");
            return Some(self.cannot_create(&cursor.route));
        }
        if let Err(e) = self.renderer.indexer().update_index_for_file(&cursor.route) {
            tracing::warn!(route = %cursor.route, error = %e, "Failed to index created file");
        }

        tracing::info!(route = %cursor.route, "Created file");
        cursor.created = true;
        None
    }

    /// Build the outcome for an existing route.
    fn found(&self, route: &str, query: &QueryOptions, edit: bool) -> Resolution {
        if let Some(search) = &query.search {
            return self.search_page(route, search);
        }

        let kind = FileKind::of(route);
        if query.raw || kind == FileKind::Image {
            return match self.storage().resolve(route) {
                Ok(path) => Resolution::RawFile {
                    route: route.to_owned(),
                    path,
                },
                Err(_) => Resolution::NotHandled,
            };
        }

        match kind {
            FileKind::Markdown if edit => self.file_page(route, Icon::File, true, |r| {
                self.renderer.render_raw(r)
            }),
            FileKind::Markdown => {
                self.file_page(route, Icon::File, false, |r| self.renderer.render_file(r))
            }
            FileKind::Code => {
                let language = extension(route).unwrap_or_default();
                self.file_page(route, Icon::FileCode, false, |r| {
                    self.renderer.render_code(r, language)
                })
            }
            FileKind::Image | FileKind::Other => Resolution::NotHandled,
        }
    }

    fn file_page<F>(&self, route: &str, icon: Icon, edit: bool, render: F) -> Resolution
    where
        F: FnOnce(&str) -> Result<String, StorageError>,
    {
        match render(route) {
            Ok(content) => Resolution::Page(
                Page::new(basename(route), icon, route)
                    .with_content(content)
                    .with_edit(edit)
                    .with_last_modified(self.storage().mtime(route).ok()),
            ),
            Err(e) => {
                tracing::warn!(route = %route, error = %e, "Failed to read file");
                self.error_page(Failure::NotFound)
            }
        }
    }

    fn search_page(&self, route: &str, search: &str) -> Resolution {
        match self.renderer.render_search(search) {
            Ok(results) => Resolution::Page(
                Page::new(results.title, Icon::Search, route)
                    .with_content(results.html)
                    .with_search(search),
            ),
            Err(e) => {
                tracing::error!(query = %search, error = %e, "Search failed");
                self.error_page(Failure::BadRequest(format!("Cannot search for `{search}`")))
            }
        }
    }

    fn cannot_create(&self, route: &str) -> Resolution {
        self.error_page(Failure::BadRequest(format!("Cannot create file `{route}`")))
    }

    fn error_page(&self, failure: Failure) -> Resolution {
        let (title, status, message) = match &failure {
            Failure::NotFound => ("404 Error", 404, NOT_FOUND),
            Failure::NoHomePage => ("404 Error", 404, NO_HOME_PAGE),
            Failure::BadRequest(message) => ("Error", 400, message.as_str()),
        };
        Resolution::Page(
            Page::new(title, Icon::Alert, "/")
                .with_content(self.renderer.render_markdown(message))
                .with_status(status),
        )
    }

    /// Save edited content to an existing document and render it.
    ///
    /// CRLF line endings from form submissions are normalized to LF on
    /// non-Windows hosts. Empty content leaves the file untouched.
    pub fn save(&self, route: &str, content: Option<&str>) -> Resolution {
        if self.read_only {
            return Resolution::ReadOnly;
        }

        match self.storage().stat(route) {
            Ok(EntryKind::File) => {}
            Ok(EntryKind::Directory) | Err(_) => return Resolution::NotHandled,
        }

        if let Some(content) = content.filter(|c| !c.is_empty()) {
            let content = if cfg!(windows) {
                content.to_owned()
            } else {
                content.replace("\r\n", "\n")
            };
            if let Err(e) = self.storage().write(route, &content) {
                tracing::error!(route = %route, error = %e, "Failed to save file");
                return self.error_page(Failure::BadRequest(format!("Cannot save file `{route}`")));
            }
            tracing::info!(route = %route, "Saved file");
        }

        if FileKind::of(route) == FileKind::Markdown
            && let Err(e) = self.renderer.indexer().update_index_for_file(route)
        {
            tracing::warn!(route = %route, error = %e, "Failed to index saved file");
        }

        self.found(route, &QueryOptions::default(), false)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use hads_storage::FsStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    fn create_resolver(files: &[(&str, &str)]) -> (tempfile::TempDir, Resolver) {
        let temp_dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = temp_dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let storage = Arc::new(FsStorage::new(temp_dir.path().to_path_buf()));
        let indexer = Arc::new(Indexer::new(storage).unwrap());
        indexer.index_all().unwrap();
        (temp_dir, Resolver::new(indexer))
    }

    fn query(create: bool, edit: bool) -> QueryOptions {
        QueryOptions {
            create,
            edit: edit || create,
            ..QueryOptions::default()
        }
    }

    fn page(resolution: Resolution) -> Page {
        match resolution {
            Resolution::Page(page) => page,
            other => panic!("expected a page, got {other:?}"),
        }
    }

    #[test]
    fn test_cursor_tries_root_files_in_order() {
        let mut cursor = Cursor::new("/guide");
        assert!(cursor.enter_directory());
        assert_eq!(cursor.route, "/guide/index.md");
        assert!(cursor.advance());
        assert_eq!(cursor.route, "/guide/README.md");
        assert!(cursor.advance());
        assert_eq!(cursor.route, "/guide/readme.md");
        assert!(!cursor.advance());
        assert_eq!(cursor.failure(), Failure::NotFound);
    }

    #[test]
    fn test_cursor_tries_extensions_in_order() {
        let mut cursor = Cursor::new("/notes");
        let mut tried = Vec::new();
        while cursor.advance() {
            tried.push(cursor.route.clone());
        }
        assert_eq!(
            tried,
            vec!["/notes.md", "/notes.mkdn", "/notes.mdown", "/notes.markdown"]
        );
    }

    #[test]
    fn test_cursor_keeps_explicit_extension() {
        let mut cursor = Cursor::new("/app.js");
        assert!(!cursor.advance());
        assert_eq!(cursor.route, "/app.js");
    }

    #[test]
    fn test_cursor_home_page_failure() {
        let mut cursor = Cursor::new("/");
        assert!(cursor.enter_directory());
        while cursor.advance() {}
        assert_eq!(cursor.route, "/readme.md");
        assert_eq!(cursor.failure(), Failure::NoHomePage);
    }

    #[test]
    fn test_root_serves_index() {
        let (_dir, resolver) = create_resolver(&[("index.md", "# Home")]);

        let page = page(resolver.resolve("/", &QueryOptions::default()));
        assert_eq!(page.status, 200);
        assert_eq!(page.title, "index.md");
        assert_eq!(page.route, "/index.md");
        assert_eq!(page.icon, Icon::File);
        assert_eq!(page.content, r#"<h1 id="home">Home</h1>"#);
        assert!(page.last_modified.is_some());
        assert!(!page.edit);
    }

    #[test]
    fn test_root_without_home_page() {
        let (_dir, resolver) = create_resolver(&[("guide.md", "")]);

        let page = page(resolver.resolve("/", &QueryOptions::default()));
        assert_eq!(page.status, 404);
        assert_eq!(page.title, "404 Error");
        assert_eq!(page.route, "/");
        assert_eq!(page.icon, Icon::Alert);
        assert!(page.content.contains("No home page"));
        assert!(page.content.contains(r#"href="/index.md?create=1""#));
    }

    #[test]
    fn test_directory_falls_back_to_lowercase_readme() {
        let (_dir, resolver) = create_resolver(&[("guide/readme.md", "lower")]);

        let page = page(resolver.resolve("/guide", &QueryOptions::default()));
        assert_eq!(page.status, 200);
        assert_eq!(page.route, "/guide/readme.md");
        assert_eq!(page.content, "<p>lower</p>");
    }

    #[test]
    fn test_directory_without_root_file() {
        let (_dir, resolver) = create_resolver(&[("guide/setup.md", "")]);

        let page = page(resolver.resolve("/guide/", &QueryOptions::default()));
        assert_eq!(page.status, 404);
        assert!(page.content.contains("File not found"));
    }

    #[test]
    fn test_extensionless_route_matches_direct_request() {
        let (_dir, resolver) = create_resolver(&[("foo.md", "# Foo")]);

        let guessed = resolver.resolve("/foo", &QueryOptions::default());
        let direct = resolver.resolve("/foo.md", &QueryOptions::default());
        assert_eq!(guessed, direct);
        assert_eq!(page(guessed).route, "/foo.md");
    }

    #[test]
    fn test_extension_guess_reaches_markdown() {
        let (_dir, resolver) = create_resolver(&[("notes.markdown", "text")]);

        let page = page(resolver.resolve("/notes", &QueryOptions::default()));
        assert_eq!(page.route, "/notes.markdown");
    }

    #[test]
    fn test_missing_file() {
        let (_dir, resolver) = create_resolver(&[("index.md", "")]);

        let page = page(resolver.resolve("/missing.md", &QueryOptions::default()));
        assert_eq!(page.status, 404);
        assert_eq!(page.title, "404 Error");
        assert_eq!(page.route, "/");
        assert!(page.content.contains("File not found"));
        assert!(page.content.contains("glitch in the matrix"));
    }

    #[test]
    fn test_edit_returns_raw_markdown() {
        let (_dir, resolver) = create_resolver(&[("page.md", "# Raw")]);

        let page = page(resolver.resolve("/page.md", &query(false, true)));
        assert!(page.edit);
        assert_eq!(page.content, "# Raw");
    }

    #[test]
    fn test_code_file_is_highlighted() {
        let (_dir, resolver) = create_resolver(&[("app.js", "let x = 1;")]);

        let page = page(resolver.resolve("/app.js", &QueryOptions::default()));
        assert_eq!(page.icon, Icon::FileCode);
        assert_eq!(page.title, "app.js");
        assert!(page.content.starts_with(r#"<pre><code class="language-js">"#));
    }

    #[test]
    fn test_image_is_raw() {
        let (dir, resolver) = create_resolver(&[("logo.png", "png")]);

        assert_eq!(
            resolver.resolve("/logo.png", &QueryOptions::default()),
            Resolution::RawFile {
                route: "/logo.png".to_owned(),
                path: dir.path().join("logo.png"),
            }
        );
    }

    #[test]
    fn test_raw_flag_streams_markdown() {
        let (_dir, resolver) = create_resolver(&[("page.md", "# Raw")]);
        let options = QueryOptions {
            raw: true,
            ..QueryOptions::default()
        };

        assert!(matches!(
            resolver.resolve("/page.md", &options),
            Resolution::RawFile { .. }
        ));
    }

    #[test]
    fn test_unknown_kind_not_handled() {
        let (_dir, resolver) = create_resolver(&[("archive.zip", "zip")]);

        assert_eq!(
            resolver.resolve("/archive.zip", &QueryOptions::default()),
            Resolution::NotHandled
        );
    }

    #[test]
    fn test_search_on_existing_route() {
        let (_dir, resolver) = create_resolver(&[("index.md", "needle")]);
        let options = QueryOptions {
            search: Some("needle".to_owned()),
            ..QueryOptions::default()
        };

        let page = page(resolver.resolve("/", &options));
        assert_eq!(page.title, "Search results (1)");
        assert_eq!(page.icon, Icon::Search);
        assert_eq!(page.route, "/");
        assert_eq!(page.search.as_deref(), Some("needle"));
        assert!(page.content.contains(r#"href="/index.md""#));
    }

    #[test]
    fn test_create_redirects_to_markdown_route() {
        let (dir, resolver) = create_resolver(&[("index.md", "")]);

        assert_eq!(
            resolver.resolve("/new-page", &query(true, false)),
            Resolution::Redirect("/new-page.md?create=1".to_owned())
        );
        assert!(!dir.path().join("new-page.md").exists());
    }

    #[test]
    fn test_create_writes_empty_editable_page() {
        let (dir, resolver) = create_resolver(&[("index.md", "")]);

        let page = page(resolver.resolve("/docs/new-page.md", &query(true, false)));
        assert_eq!(page.status, 200);
        assert!(page.edit);
        assert_eq!(page.content, "");
        assert_eq!(page.route, "/docs/new-page.md");
        assert_eq!(fs::read_to_string(dir.path().join("docs/new-page.md")).unwrap(), "");
        assert!(resolver.renderer().indexer().get_files().contains(&"docs/new-page.md".to_owned()));
    }

    #[test]
    fn test_create_existing_file_opens_editor() {
        let (_dir, resolver) = create_resolver(&[("page.md", "keep")]);

        let page = page(resolver.resolve("/page.md", &query(true, false)));
        assert!(page.edit);
        assert_eq!(page.content, "keep");
    }

    #[test]
    fn test_create_on_directory_is_bad_request() {
        let (_dir, resolver) = create_resolver(&[("guide/index.md", "")]);

        let page = page(resolver.resolve("/guide", &query(true, false)));
        assert_eq!(page.status, 400);
        assert_eq!(page.title, "Error");
        assert_eq!(page.route, "/");
        assert!(page.content.contains("Cannot create file <code>/guide</code>"));
    }

    #[test]
    fn test_read_only_disables_create_and_edit() {
        let (dir, resolver) = create_resolver(&[("page.md", "# Page")]);
        let resolver = resolver.with_read_only(true);

        let missing = page(resolver.resolve("/new.md", &query(true, false)));
        assert_eq!(missing.status, 404);
        assert!(!dir.path().join("new.md").exists());

        let existing = page(resolver.resolve("/page.md", &query(false, true)));
        assert!(!existing.edit);
        assert_eq!(existing.content, r#"<h1 id="page">Page</h1>"#);
    }

    #[test]
    fn test_save_writes_and_reindexes() {
        let (dir, resolver) = create_resolver(&[("page.md", "old")]);

        let page = page(resolver.save("/page.md", Some("# New\r\n\r\nneedle\r\n")));
        assert_eq!(page.content, r#"<h1 id="new">New</h1><p>needle</p>"#);
        assert_eq!(page.title, "page.md");
        if !cfg!(windows) {
            assert_eq!(
                fs::read_to_string(dir.path().join("page.md")).unwrap(),
                "# New\n\nneedle\n"
            );
        }
        assert_eq!(resolver.renderer().indexer().search("needle").unwrap().len(), 1);
    }

    #[test]
    fn test_save_empty_content_keeps_file() {
        let (dir, resolver) = create_resolver(&[("page.md", "old")]);

        let page = page(resolver.save("/page.md", Some("")));
        assert_eq!(page.content, "<p>old</p>");
        assert_eq!(fs::read_to_string(dir.path().join("page.md")).unwrap(), "old");
    }

    #[test]
    fn test_save_missing_file_not_handled() {
        let (dir, resolver) = create_resolver(&[]);

        assert_eq!(resolver.save("/page.md", Some("x")), Resolution::NotHandled);
        assert!(!dir.path().join("page.md").exists());
    }

    #[test]
    fn test_save_read_only() {
        let (_dir, resolver) = create_resolver(&[("page.md", "old")]);
        let resolver = resolver.with_read_only(true);

        assert_eq!(resolver.save("/page.md", Some("new")), Resolution::ReadOnly);
    }
}
