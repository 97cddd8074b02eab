//! Indexer over the markdown documents of a storage root.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use hads_storage::matcher::is_markdown;
use hads_storage::path::file_stem;
use hads_storage::Storage;
use rayon::prelude::*;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, QueryParser};
use tantivy::schema::Value;
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc};

use crate::error::IndexError;
use crate::schema::{SchemaFields, build_schema, register_tokenizers};

/// Weight of file name matches relative to content matches.
const FILENAME_BOOST: f32 = 2.0;

/// Memory budget of the index writer, in bytes.
const WRITER_MEMORY_BUDGET: usize = 15_000_000;

/// Raw content of one indexed document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Path relative to the documentation root.
    pub reference: String,
    /// File name without extension.
    pub name: String,
    pub content: String,
}

/// A search match.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    /// Path relative to the documentation root.
    pub reference: String,
    pub score: f32,
}

#[derive(Default)]
struct Documents {
    entries: HashMap<String, IndexEntry>,
    /// Indexed paths in the order they were first indexed.
    files: Vec<String>,
}

/// Full-text index of the markdown files of a [`Storage`].
///
/// Documents are keyed by their path relative to the root. Updating a
/// document that is already indexed replaces it; the ordered file list never
/// contains the same path twice.
pub struct Indexer {
    storage: Arc<dyn Storage>,
    index: Index,
    reader: IndexReader,
    /// Serializes index updates, which also keeps concurrent updates of the
    /// same document last-writer-wins.
    writer: Mutex<IndexWriter>,
    fields: SchemaFields,
    documents: RwLock<Documents>,
}

impl Indexer {
    /// Create an empty in-memory index over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Result<Self, IndexError> {
        let (schema, fields) = build_schema();
        let index = Index::create_in_ram(schema);
        register_tokenizers(&index);

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let writer = index.writer_with_num_threads(1, WRITER_MEMORY_BUDGET)?;

        Ok(Self {
            storage,
            index,
            reader,
            writer: Mutex::new(writer),
            fields,
            documents: RwLock::new(Documents::default()),
        })
    }

    /// The storage this index reads documents from.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Index every markdown file under the root.
    ///
    /// Files are read in parallel. A file that cannot be read is logged and
    /// skipped; only a failure to enumerate the root is returned as an error.
    /// Returns the number of indexed files.
    pub fn index_all(&self) -> Result<usize, IndexError> {
        let paths: Vec<String> = self
            .storage
            .scan()?
            .into_iter()
            .filter(|path| is_markdown(path))
            .collect();

        let loaded: Vec<(String, String)> = paths
            .into_par_iter()
            .filter_map(|path| match self.storage.read(&path) {
                Ok(content) => Some((path, content)),
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Skipping unreadable file");
                    None
                }
            })
            .collect();

        let count = loaded.len();
        let mut writer = self.writer.lock().unwrap();
        for (reference, content) in loaded {
            self.upsert(&mut writer, reference, content)?;
        }
        writer.commit()?;
        drop(writer);
        self.reader.reload()?;

        tracing::info!(files = count, "Indexed documentation");
        Ok(count)
    }

    /// Read one file and insert or replace its index entry.
    ///
    /// `path` may be given with or without a leading `/`. Updates are
    /// serialized on the index writer; the file is read under the same lock,
    /// so the last update to commit holds the newest content.
    pub fn update_index_for_file(&self, path: &str) -> Result<(), IndexError> {
        let reference = reference_for(path);

        let mut writer = self.writer.lock().unwrap();
        let content = self.storage.read(&reference)?;
        self.upsert(&mut writer, reference.clone(), content)?;
        writer.commit()?;
        drop(writer);
        self.reader.reload()?;

        tracing::debug!(path = %reference, "Updated index entry");
        Ok(())
    }

    fn upsert(
        &self,
        writer: &mut IndexWriter,
        reference: String,
        content: String,
    ) -> Result<(), IndexError> {
        let name = file_stem(&reference).to_owned();

        writer.delete_term(Term::from_field_text(self.fields.reference, &reference));
        writer.add_document(doc!(
            self.fields.reference => reference.as_str(),
            self.fields.filename => name.as_str(),
            self.fields.content => content.as_str(),
        ))?;

        let mut documents = self.documents.write().unwrap();
        if !documents.entries.contains_key(&reference) {
            documents.files.push(reference.clone());
        }
        documents.entries.insert(
            reference.clone(),
            IndexEntry {
                reference,
                name,
                content,
            },
        );
        Ok(())
    }

    /// Raw content indexed for `reference`, if it was ever indexed.
    pub fn get_content(&self, reference: &str) -> Option<String> {
        self.documents
            .read()
            .unwrap()
            .entries
            .get(reference_for(reference).as_str())
            .map(|entry| entry.content.clone())
    }

    /// Indexed entry for `reference`, if it was ever indexed.
    pub fn get_entry(&self, reference: &str) -> Option<IndexEntry> {
        self.documents
            .read()
            .unwrap()
            .entries
            .get(reference_for(reference).as_str())
            .cloned()
    }

    /// All indexed paths, in the order they were first indexed.
    pub fn get_files(&self) -> Vec<String> {
        self.documents.read().unwrap().files.clone()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Search file names and contents.
    ///
    /// Every query token also matches as a prefix (`conf` finds
    /// `configuration`). File name matches weigh twice as much as content
    /// matches. Hits are ordered by descending score, then by reference.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, IndexError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        if num_docs == 0 {
            return Ok(Vec::new());
        }

        let query = self.build_query(query)?;
        let top_docs = searcher.search(&query, &TopDocs::with_limit(num_docs))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            if let Some(reference) = doc
                .get_first(self.fields.reference)
                .and_then(|value| value.as_str())
            {
                hits.push(SearchHit {
                    reference: reference.to_owned(),
                    score,
                });
            }
        }

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.reference.cmp(&b.reference))
        });
        Ok(hits)
    }

    /// Parsed query OR'ed with a prefix query per analyzed token and field.
    fn build_query(&self, query: &str) -> Result<BooleanQuery, IndexError> {
        let fields = [
            (self.fields.filename, FILENAME_BOOST),
            (self.fields.content, 1.0),
        ];

        let mut parser =
            QueryParser::for_index(&self.index, fields.iter().map(|(field, _)| *field).collect());
        parser.set_field_boost(self.fields.filename, FILENAME_BOOST);
        let (parsed, errors) = parser.parse_query_lenient(query);
        if !errors.is_empty() {
            tracing::debug!(query, errors = errors.len(), "Search query parsed leniently");
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Should, parsed)];
        for (field, boost) in fields {
            let mut analyzer = self.index.tokenizer_for_field(field)?;
            let mut stream = analyzer.token_stream(query);
            while stream.advance() {
                let term = Term::from_field_text(field, &stream.token().text);
                let prefix = FuzzyTermQuery::new_prefix(term, 0, true);
                clauses.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(Box::new(prefix), boost)),
                ));
            }
        }

        Ok(BooleanQuery::new(clauses))
    }
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("root", &self.storage.root())
            .field("documents", &self.len())
            .finish_non_exhaustive()
    }
}

/// Index key for a path: relative to the root, without a leading `/`.
fn reference_for(path: &str) -> String {
    path.trim_start_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use hads_storage::FsStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    fn create_indexer(files: &[(&str, &str)]) -> (tempfile::TempDir, Indexer) {
        let temp_dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = temp_dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let storage = Arc::new(FsStorage::new(temp_dir.path().to_path_buf()));
        let indexer = Indexer::new(storage).unwrap();
        (temp_dir, indexer)
    }

    fn references(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.reference.as_str()).collect()
    }

    #[test]
    fn test_index_all_only_markdown() {
        let (_dir, indexer) = create_indexer(&[
            ("index.md", "# Home"),
            ("guide/setup.mkdn", "Setup"),
            ("app.js", "let needle;"),
            ("logo.png", "png"),
            (".hidden/secret.md", "secret"),
            ("node_modules/pkg/readme.md", "dependency"),
        ]);

        assert_eq!(indexer.index_all().unwrap(), 2);

        let mut files = indexer.get_files();
        files.sort();
        assert_eq!(files, vec!["guide/setup.mkdn", "index.md"]);
    }

    #[test]
    fn test_index_all_missing_root_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FsStorage::new(temp_dir.path().join("missing")));
        let indexer = Indexer::new(storage).unwrap();

        let err = indexer.index_all().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_search_content() {
        let (_dir, indexer) = create_indexer(&[
            ("a.md", "There is a needle in this haystack."),
            ("b.md", "Only hay here."),
        ]);
        indexer.index_all().unwrap();

        let hits = indexer.search("needle").unwrap();
        assert_eq!(references(&hits), vec!["a.md"]);
        assert!(hits[0].score > 0.0);
    }

    #[test]
    fn test_search_filename() {
        let (_dir, indexer) = create_indexer(&[
            ("deployment.md", "How we ship."),
            ("other.md", "Unrelated."),
        ]);
        indexer.index_all().unwrap();

        assert_eq!(references(&indexer.search("deployment").unwrap()), vec!["deployment.md"]);
    }

    #[test]
    fn test_search_prefix_and_stemming() {
        let (_dir, indexer) = create_indexer(&[
            ("a.md", "Configuration reference"),
            ("b.md", "Running the server"),
        ]);
        indexer.index_all().unwrap();

        assert_eq!(references(&indexer.search("conf").unwrap()), vec!["a.md"]);
        assert_eq!(references(&indexer.search("runs").unwrap()), vec!["b.md"]);
        assert_eq!(references(&indexer.search("CONFIGURATION").unwrap()), vec!["a.md"]);
    }

    #[test]
    fn test_search_filename_outranks_content() {
        let (_dir, indexer) = create_indexer(&[
            ("notes.md", "release checklist"),
            ("release.md", "notes"),
        ]);
        indexer.index_all().unwrap();

        let hits = indexer.search("release").unwrap();
        assert_eq!(references(&hits), vec!["release.md", "notes.md"]);
    }

    #[test]
    fn test_search_ties_ordered_by_reference() {
        let (_dir, indexer) = create_indexer(&[
            ("c.md", "same words"),
            ("a.md", "same words"),
            ("b.md", "same words"),
        ]);
        indexer.index_all().unwrap();

        let hits = indexer.search("words").unwrap();
        assert_eq!(references(&hits), vec!["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn test_search_empty_query_or_index() {
        let (_dir, indexer) = create_indexer(&[("a.md", "text")]);
        assert!(indexer.search("text").unwrap().is_empty());

        indexer.index_all().unwrap();
        assert!(indexer.search("   ").unwrap().is_empty());
        assert!(indexer.search("absent").unwrap().is_empty());
    }

    #[test]
    fn test_search_tolerates_query_syntax() {
        let (_dir, indexer) = create_indexer(&[("a.md", "needle")]);
        indexer.index_all().unwrap();

        assert_eq!(references(&indexer.search("needle AND (").unwrap()), vec!["a.md"]);
    }

    #[test]
    fn test_update_replaces_entry() {
        let (dir, indexer) = create_indexer(&[("page.md", "old needle")]);
        indexer.index_all().unwrap();

        fs::write(dir.path().join("page.md"), "fresh thread").unwrap();
        indexer.update_index_for_file("/page.md").unwrap();

        assert_eq!(indexer.get_files(), vec!["page.md"]);
        assert_eq!(indexer.len(), 1);
        assert_eq!(indexer.get_content("page.md").as_deref(), Some("fresh thread"));
        assert!(indexer.search("needle").unwrap().is_empty());
        assert_eq!(references(&indexer.search("thread").unwrap()), vec!["page.md"]);
    }

    #[test]
    fn test_update_new_file_appends() {
        let (dir, indexer) = create_indexer(&[("a.md", "a")]);
        indexer.index_all().unwrap();

        fs::write(dir.path().join("new.md"), "").unwrap();
        indexer.update_index_for_file("/new.md").unwrap();
        indexer.update_index_for_file("new.md").unwrap();

        assert_eq!(indexer.get_files(), vec!["a.md", "new.md"]);
        assert_eq!(
            indexer.get_entry("/new.md"),
            Some(IndexEntry {
                reference: "new.md".to_owned(),
                name: "new".to_owned(),
                content: String::new(),
            })
        );
    }

    #[test]
    fn test_update_missing_file_fails() {
        let (_dir, indexer) = create_indexer(&[]);

        let err = indexer.update_index_for_file("/missing.md").unwrap_err();
        assert!(err.is_not_found());
        assert!(indexer.is_empty());
    }

    #[test]
    fn test_stale_entries_are_kept() {
        let (dir, indexer) = create_indexer(&[("gone.md", "needle")]);
        indexer.index_all().unwrap();

        fs::remove_file(dir.path().join("gone.md")).unwrap();

        assert_eq!(indexer.get_content("gone.md").as_deref(), Some("needle"));
        assert_eq!(references(&indexer.search("needle").unwrap()), vec!["gone.md"]);
    }

    #[test]
    fn test_concurrent_updates_of_one_file() {
        let (dir, indexer) = create_indexer(&[("page.md", "needle version 0")]);
        indexer.index_all().unwrap();
        let versions: Vec<String> = (0..8).map(|i| format!("needle version {i}")).collect();

        std::thread::scope(|scope| {
            for (i, version) in versions.iter().enumerate() {
                let indexer = &indexer;
                let root = dir.path();
                scope.spawn(move || {
                    let staged = root.join(format!(".staged-{i}"));
                    fs::write(&staged, version).unwrap();
                    fs::rename(&staged, root.join("page.md")).unwrap();
                    indexer.update_index_for_file("/page.md").unwrap();
                });
                scope.spawn(move || {
                    let hits = indexer.search("needle").unwrap();
                    assert_eq!(references(&hits), vec!["page.md"]);
                    let content = indexer.get_content("page.md").unwrap();
                    assert!(content.starts_with("needle version "), "{content}");
                });
            }
        });

        assert_eq!(indexer.get_files(), vec!["page.md"]);
        let content = indexer.get_content("page.md").unwrap();
        assert!(versions.contains(&content), "{content}");
        assert_eq!(references(&indexer.search("needle").unwrap()), vec!["page.md"]);
    }

    #[test]
    fn test_get_content_unknown() {
        let (_dir, indexer) = create_indexer(&[]);
        assert_eq!(indexer.get_content("nope.md"), None);
    }
}
