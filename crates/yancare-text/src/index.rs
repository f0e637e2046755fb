use std::sync::Arc;

use anyhow::{bail, Result};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, ConstScoreQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use yancare_core::tokenize::Tokenizer;
use yancare_core::types::{SourceHit, SourceKind};
use yancare_core::Corpus;

use crate::tantivy_utils::{build_schema, register_tokenizer};

/// Writer heap for the one-shot in-RAM build.
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Immutable BM25 index over one corpus snapshot, held in RAM.
pub struct Bm25Index {
	corpus: Arc<Corpus>,
	tokenizer: Arc<dyn Tokenizer>,
	reader: IndexReader,
	id_field: Field,
	text_field: Field,
	category_field: Field,
}

impl Bm25Index {
	/// Tokenize every document once and commit them in a single segment.
	pub fn build(corpus: Arc<Corpus>, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
		if corpus.is_empty() { bail!("corpus is empty"); }
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let id_field = schema.get_field("id")?;
		let text_field = schema.get_field("text")?;
		let category_field = schema.get_field("category")?;

		let mut index_writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
		for d in corpus.documents() {
			let tokens = tokenizer.tokenize(&d.content);
			index_writer.add_document(doc!(
				id_field => d.id.clone(),
				text_field => tokens.join(" "),
				category_field => d.metadata.category.clone(),
			))?;
		}
		index_writer.commit()?;
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		Ok(Self { corpus, tokenizer, reader, id_field, text_field, category_field })
	}

	pub fn len(&self) -> usize { self.corpus.len() }

	pub fn is_empty(&self) -> bool { self.corpus.is_empty() }

	pub fn corpus(&self) -> &Arc<Corpus> { &self.corpus }

	/// Top-`k` documents by BM25. Documents that share no token with the
	/// query are not returned. The category filter is a zero-score clause, so
	/// ranking among matching documents is the same as unfiltered BM25.
	pub fn search(&self, query: &str, k: usize, category: Option<&str>) -> Result<Vec<SourceHit>> {
		if k == 0 { return Ok(Vec::new()); }
		let tokens = self.tokenizer.tokenize(query);
		if tokens.is_empty() { return Ok(Vec::new()); }

		let terms: Vec<Term> = tokens.iter().map(|t| Term::from_field_text(self.text_field, t)).collect();
		let text_query = BooleanQuery::new_multiterms_query(terms);
		let query: Box<dyn Query> = match category {
			Some(cat) => {
				let filter = TermQuery::new(Term::from_field_text(self.category_field, cat), IndexRecordOption::Basic);
				Box::new(BooleanQuery::new(vec![
					(Occur::Must, Box::new(text_query) as Box<dyn Query>),
					(Occur::Must, Box::new(ConstScoreQuery::new(Box::new(filter), 0.0))),
				]))
			}
			None => Box::new(text_query),
		};

		let searcher = self.reader.searcher();
		let top_docs = searcher.search(&*query, &TopDocs::with_limit(k))?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			if score <= 0.0 { continue; }
			let stored: TantivyDocument = searcher.doc(addr)?;
			let id = stored.get_first(self.id_field).and_then(|v| v.as_str()).unwrap_or("");
			if let Some(document) = self.corpus.get(id) {
				hits.push(SourceHit { document: document.clone(), score, source: SourceKind::Lexical });
			}
		}
		Ok(hits)
	}
}
