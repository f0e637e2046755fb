//! Offline writer that embeds a corpus snapshot into a LanceDB table.
use anyhow::{bail, Result};
use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::{connect, Connection};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use yancare_core::traits::Embedder;
use yancare_core::{Corpus, KnowledgeDocument};

use crate::schema::build_arrow_schema;

const BATCH_SIZE: usize = 256;

pub struct LanceVectorWriter { db: Connection, table_name: String }

impl LanceVectorWriter {
	pub async fn new(db_path: &Path, table_name: &str) -> Result<Self> {
		let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
		Ok(Self { db, table_name: table_name.to_string() })
	}

	/// Replace the table contents with `corpus`. Returns the number of rows written.
	pub async fn write(&self, corpus: &Corpus, embedder: &dyn Embedder) -> Result<usize> {
		if corpus.is_empty() { info!(table = %self.table_name, "no documents to index"); return Ok(0); }
		let dim = embedder.dim();
		let pb = ProgressBar::new(corpus.len() as u64);
		if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} docs ({percent}%) {msg}") {
			pb.set_style(style.progress_chars("#>-"));
		}
		self.clear().await?;
		let mut written = 0usize;
		for docs in corpus.documents().chunks(BATCH_SIZE) {
			let texts: Vec<String> = docs.iter().map(|d| d.content.clone()).collect();
			let vectors = embedder.embed_batch(&texts).await?;
			if vectors.len() != docs.len() { bail!("embedder returned {} vectors for {} documents", vectors.len(), docs.len()); }
			let batch = docs_to_record_batch(docs, vectors, dim)?;
			self.insert_batch(batch).await?;
			written += docs.len();
			pb.set_position(written as u64);
			pb.set_message(format!("batch of {}", docs.len()));
		}
		pb.finish_with_message("done");
		info!(table = %self.table_name, rows = written, embedder = embedder.embedder_id(), "lancedb table written");
		Ok(written)
	}

	async fn clear(&self) -> Result<()> {
		if self.db.table_names().execute().await?.contains(&self.table_name) {
			let _ = self.db.open_table(&self.table_name).execute().await?.delete("true").await?;
		}
		Ok(())
	}

	async fn insert_batch(&self, record_batch: RecordBatch) -> Result<()> {
		let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		if self.db.table_names().execute().await?.contains(&self.table_name) {
			self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
		} else {
			self.db.create_table(&self.table_name, reader).execute().await?;
		}
		Ok(())
	}
}

fn docs_to_record_batch(docs: &[KnowledgeDocument], vectors: Vec<Vec<f32>>, dim: usize) -> Result<RecordBatch> {
	let mut ids = Vec::new(); let mut contents = Vec::new(); let mut categories = Vec::new(); let mut doc_types = Vec::new(); let mut metadata = Vec::new();
	for d in docs { ids.push(d.id.clone()); contents.push(d.content.clone()); categories.push(d.metadata.category.clone()); doc_types.push(d.metadata.doc_type.clone()); metadata.push(serde_json::to_string(&d.metadata)?); }
	for v in &vectors { if v.len() != dim { bail!("vector dimension {} does not match embedder dimension {}", v.len(), dim); } }
	let vectors: Vec<Option<Vec<Option<f32>>>> = vectors.into_iter().map(|v| Some(v.into_iter().map(Some).collect())).collect();
	let record_batch = RecordBatch::try_new(build_arrow_schema(dim as i32), vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(StringArray::from(contents)),
		Arc::new(StringArray::from(categories)),
		Arc::new(StringArray::from(doc_types)),
		Arc::new(StringArray::from(metadata)),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim as i32)),
	])?;
	Ok(record_batch)
}
