//! Tantivy schema and analyzer for documentation files.

use tantivy::Index;
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer,
};

/// Name of the analyzer registered for full-text fields.
const ANALYZER: &str = "en_stem";

/// Field handles of the document schema.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SchemaFields {
    /// Path relative to the root, the unique key of a document.
    pub(crate) reference: Field,
    /// File name without extension.
    pub(crate) filename: Field,
    pub(crate) content: Field,
}

pub(crate) fn build_schema() -> (Schema, SchemaFields) {
    let mut builder = Schema::builder();

    let reference = builder.add_text_field("ref", STRING | STORED);

    let text_options = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(ANALYZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );
    let filename = builder.add_text_field("filename", text_options.clone());
    let content = builder.add_text_field("content", text_options);

    let fields = SchemaFields {
        reference,
        filename,
        content,
    };
    (builder.build(), fields)
}

/// Register the analyzer used by the full-text fields.
///
/// Tokens are split on non-alphanumeric characters, lower-cased and stemmed,
/// so `Configuring` matches `configure`.
pub(crate) fn register_tokenizers(index: &Index) {
    let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(40))
        .filter(LowerCaser)
        .filter(Stemmer::new(Language::English))
        .build();
    index.tokenizers().register(ANALYZER, analyzer);
}
