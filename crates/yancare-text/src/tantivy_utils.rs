use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, StopWordFilter, TextAnalyzer, WhitespaceTokenizer};
use tantivy::Index;

/// Analyzer for the `text` field. Documents arrive pre-tokenized by the
/// shared [`yancare_core::tokenize::Tokenizer`] and joined with spaces, so
/// tantivy only splits on whitespace and drops stop words.
pub const PRETOKENIZED: &str = "pretokenized_with_stopwords";

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _id_field = schema_builder.add_text_field("id", STRING | STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(PRETOKENIZED).set_index_option(IndexRecordOption::WithFreqs);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	let _text_field = schema_builder.add_text_field("text", text_options);
	let _category_field = schema_builder.add_text_field("category", STRING);
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
		"的","了","吗","呢","吧","啊",
	];
	let tokenizer = TextAnalyzer::builder(WhitespaceTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(PRETOKENIZED, tokenizer);
}
