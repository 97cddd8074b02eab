//! Static export of a documentation root to HTML files.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hads_index::{IndexError, Indexer};
use hads_storage::matcher::{ROOT_FILES, extension};
use hads_storage::path::basename;
use hads_storage::{FileKind, StorageError};

use crate::layout::Layout;
use crate::page::{Icon, Page};
use crate::renderer::DocRenderer;

/// Error returned by [`export`].
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration of a static export.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Directory the HTML files are written to, mirroring the source tree.
    pub output_dir: PathBuf,
    /// Prefix prepended to relative image sources.
    pub image_prefix: String,
}

/// Files written by an export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Pages rendered from markdown and code files.
    pub pages: usize,
    /// Root files copied to their folder's `index.html`.
    pub folder_indexes: usize,
}

/// One page to render.
struct ExportPage<'a> {
    route: &'a str,
    target: String,
    /// `index.html` of the folder this page is the root file of.
    folder_index: Option<String>,
}

/// Render every markdown and code file of the indexer's root to HTML.
///
/// `page.md` is written as `page.html` and `app.js` as `app.js.html`. The
/// first canonical root file of each folder is also written as the folder's
/// `index.html`. Relative links to markdown files point at their exported
/// pages.
pub fn export(indexer: &Arc<Indexer>, options: &ExportOptions) -> Result<ExportSummary, ExportError> {
    indexer.index_all()?;
    let storage = indexer.storage();
    let files = storage.scan()?;

    let output_prefix = options
        .output_dir
        .strip_prefix(storage.root())
        .ok()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| format!("{}/", p.to_string_lossy().replace('\\', "/")));
    let sources: Vec<&str> = files
        .iter()
        .map(String::as_str)
        .filter(|f| !output_prefix.as_ref().is_some_and(|prefix| f.starts_with(prefix)))
        .collect();

    let pages = plan(&sources);
    let renderer = DocRenderer::new(Arc::clone(indexer))
        .with_static_export(true)
        .with_image_prefix(options.image_prefix.as_str());
    let layout = Layout::new().with_static_export(true);

    let mut summary = ExportSummary::default();
    for page in &pages {
        let html = layout.render(&render_page(&renderer, page.route)?);

        write_file(&options.output_dir.join(&page.target), &html)?;
        summary.pages += 1;
        if let Some(index) = &page.folder_index {
            write_file(&options.output_dir.join(index), &html)?;
            summary.folder_indexes += 1;
        }
    }

    tracing::info!(
        pages = summary.pages,
        folder_indexes = summary.folder_indexes,
        output = %options.output_dir.display(),
        "Exported documentation"
    );
    Ok(summary)
}

/// Decide which files to export and where.
///
/// Files that are themselves the output of another source (a previous export
/// into the source tree) are skipped.
fn plan<'a>(sources: &[&'a str]) -> Vec<ExportPage<'a>> {
    let available: HashSet<&str> = sources.iter().copied().collect();
    let folders: BTreeSet<&str> = sources.iter().map(|f| folder_of(f)).collect();

    let mut folder_roots: HashSet<String> = HashSet::new();
    for folder in folders {
        let root = ROOT_FILES
            .iter()
            .map(|name| join_relative(folder, name))
            .find(|candidate| available.contains(candidate.as_str()));
        if let Some(root) = root {
            folder_roots.insert(root);
        }
    }

    let mut pages: Vec<ExportPage<'a>> = sources
        .iter()
        .filter_map(|&route| {
            let target = export_target(route)?;
            let folder_index = folder_roots
                .contains(route)
                .then(|| join_relative(folder_of(route), "index.html"))
                .filter(|index| *index != target);
            Some(ExportPage {
                route,
                target,
                folder_index,
            })
        })
        .collect();

    let outputs: HashSet<String> = pages
        .iter()
        .flat_map(|p| std::iter::once(p.target.clone()).chain(p.folder_index.clone()))
        .collect();
    pages.retain(|page| !outputs.contains(page.route));
    pages
}

fn render_page(renderer: &DocRenderer, route: &str) -> Result<Page, StorageError> {
    let name = basename(route);
    let (icon, content) = if FileKind::of(route) == FileKind::Markdown {
        (Icon::File, renderer.render_file(route)?)
    } else {
        let language = extension(route).unwrap_or_default();
        (Icon::FileCode, renderer.render_code(route, language)?)
    };
    let mtime = renderer.indexer().storage().mtime(route).ok();

    Ok(Page::new(name, icon, format!("/{route}"))
        .with_content(content)
        .with_last_modified(mtime))
}

/// Output path of a source file, relative to the output directory.
fn export_target(route: &str) -> Option<String> {
    match FileKind::of(route) {
        FileKind::Markdown => {
            let ext = extension(route)?;
            let stem = &route[..route.len() - ext.len() - 1];
            Some(format!("{stem}.html"))
        }
        FileKind::Code => Some(format!("{route}.html")),
        FileKind::Image | FileKind::Other => None,
    }
}

fn folder_of(route: &str) -> &str {
    route.rsplit_once('/').map_or("", |(folder, _)| folder)
}

fn join_relative(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_owned()
    } else {
        format!("{folder}/{name}")
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    let to_error = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, content).map_err(to_error)
}

#[cfg(test)]
mod tests {
    use hads_storage::FsStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    fn create_indexer(files: &[(&str, &str)]) -> (tempfile::TempDir, Arc<Indexer>) {
        let temp_dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = temp_dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let storage = Arc::new(FsStorage::new(temp_dir.path().to_path_buf()));
        (temp_dir, Arc::new(Indexer::new(storage).unwrap()))
    }

    fn targets(sources: &[&str]) -> Vec<(String, Option<String>)> {
        plan(sources)
            .into_iter()
            .map(|p| (p.target, p.folder_index))
            .collect()
    }

    #[test]
    fn test_export_target() {
        assert_eq!(export_target("guide/setup.md").as_deref(), Some("guide/setup.html"));
        assert_eq!(export_target("notes.markdown").as_deref(), Some("notes.html"));
        assert_eq!(export_target("app.js").as_deref(), Some("app.js.html"));
        assert_eq!(export_target("logo.png"), None);
        assert_eq!(export_target("archive.zip"), None);
    }

    #[test]
    fn test_plan_folder_indexes() {
        assert_eq!(
            targets(&["README.md", "guide/readme.md", "guide/setup.md", "api/index.md"]),
            vec![
                ("README.html".to_owned(), Some("index.html".to_owned())),
                ("guide/readme.html".to_owned(), Some("guide/index.html".to_owned())),
                ("guide/setup.html".to_owned(), None),
                ("api/index.html".to_owned(), None),
            ]
        );
    }

    #[test]
    fn test_plan_prefers_first_root_file() {
        assert_eq!(
            targets(&["README.md", "index.md"]),
            vec![
                ("README.html".to_owned(), None),
                ("index.html".to_owned(), None),
            ]
        );
    }

    #[test]
    fn test_plan_skips_previous_output() {
        assert_eq!(
            targets(&["app.js", "app.js.html", "page.html", "page.md"]),
            vec![
                ("app.js.html".to_owned(), None),
                ("page.html".to_owned(), None),
            ]
        );
    }

    #[test]
    fn test_export_writes_pages() {
        let (dir, indexer) = create_indexer(&[
            ("README.md", "# Home\n\nSee [setup](guide/setup.md#install)."),
            ("guide/setup.md", "# Setup\n\n![diagram](img/flow.png)"),
            ("app.js", "let x = 1;"),
            ("logo.png", "png"),
        ]);
        let output = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            output_dir: output.path().to_path_buf(),
            image_prefix: "/static/".to_owned(),
        };

        let summary = export(&indexer, &options).unwrap();
        assert_eq!(
            summary,
            ExportSummary {
                pages: 3,
                folder_indexes: 1,
            }
        );

        let home = fs::read_to_string(output.path().join("README.html")).unwrap();
        assert!(home.contains(r##"<a href="guide/setup.html#install">setup</a>"##));
        assert!(!home.contains("<header>"));
        assert_eq!(
            fs::read_to_string(output.path().join("index.html")).unwrap(),
            home
        );

        let setup = fs::read_to_string(output.path().join("guide/setup.html")).unwrap();
        assert!(setup.contains(r#"src="/static/img/flow.png""#));

        let code = fs::read_to_string(output.path().join("app.js.html")).unwrap();
        assert!(code.contains("octicon-file-code"));
        assert!(!output.path().join("logo.png.html").exists());
        drop(dir);
    }

    #[test]
    fn test_export_index_links_to_pages() {
        let (dir, indexer) = create_indexer(&[
            ("README.md", "[[index]]"),
            ("guide/setup.md", "# Setup"),
        ]);
        let output = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            output_dir: output.path().to_path_buf(),
            image_prefix: String::new(),
        };

        export(&indexer, &options).unwrap();

        let home = fs::read_to_string(output.path().join("README.html")).unwrap();
        assert!(home.contains(r#"<a href="/guide/setup.html">Setup</a>"#), "{home}");
        assert!(!home.contains("/guide/setup.md"));
        drop(dir);
    }

    #[test]
    fn test_export_into_source_tree_is_repeatable() {
        let (dir, indexer) = create_indexer(&[("page.md", "text"), ("app.js", "x")]);
        let options = ExportOptions {
            output_dir: dir.path().to_path_buf(),
            image_prefix: String::new(),
        };

        export(&indexer, &options).unwrap();
        let summary = export(&indexer, &options).unwrap();

        assert_eq!(summary.pages, 2);
        assert!(dir.path().join("page.html").exists());
        assert!(!dir.path().join("page.html.html").exists());
        assert!(!dir.path().join("app.js.html.html").exists());
    }

    #[test]
    fn test_export_skips_nested_output_dir() {
        let (dir, indexer) = create_indexer(&[("page.md", "text")]);
        let options = ExportOptions {
            output_dir: dir.path().join("_site"),
            image_prefix: String::new(),
        };

        export(&indexer, &options).unwrap();
        fs::write(dir.path().join("_site/extra.js"), "x").unwrap();
        let summary = export(&indexer, &options).unwrap();

        assert_eq!(summary.pages, 1);
        assert!(!dir.path().join("_site/_site").exists());
    }

    #[test]
    fn test_export_missing_root_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FsStorage::new(temp_dir.path().join("missing")));
        let indexer = Arc::new(Indexer::new(storage).unwrap());
        let options = ExportOptions {
            output_dir: temp_dir.path().join("out"),
            image_prefix: String::new(),
        };

        assert!(matches!(
            export(&indexer, &options),
            Err(ExportError::Index(_))
        ));
    }
}
