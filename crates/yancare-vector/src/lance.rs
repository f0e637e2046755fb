use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use futures::future::BoxFuture;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use tracing::debug;

use yancare_core::traits::{Embedder, SemanticBackend};
use yancare_core::{KnowledgeDocument, KnowledgeMetadata, SemanticMatch};

/// Semantic backend over a LanceDB table written by [`crate::LanceVectorWriter`].
pub struct LanceVectorStore { db: Connection, table_name: String, embedder: Arc<dyn Embedder> }

impl LanceVectorStore {
	/// Connects and checks that the table exists.
	pub async fn open(db_path: &Path, table_name: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
		let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
		if !db.table_names().execute().await?.contains(&table_name.to_string()) {
			return Err(anyhow!("lancedb table '{}' not found under {}", table_name, db_path.display()));
		}
		Ok(Self { db, table_name: table_name.to_string(), embedder })
	}

	async fn search_vec(&self, query: Vec<f32>, k: usize, category: Option<&str>) -> Result<Vec<SemanticMatch>> {
		let table = self.db.open_table(&self.table_name).execute().await?;
		let mut q = table.vector_search(query)?.limit(k);
		if let Some(c) = category { q = q.only_if(format!("category = '{}'", c.replace('\'', "''"))); }
		let mut stream = q.execute().await?;
		let mut out = Vec::new();
		while let Some(batch) = TryStreamExt::try_next(&mut stream).await? { out.extend(batch_to_matches(&batch)?); }
		out.sort_by(|a, b| a.distance.total_cmp(&b.distance));
		debug!(table = %self.table_name, hits = out.len(), "lancedb vector search");
		Ok(out)
	}
}

impl SemanticBackend for LanceVectorStore {
	fn name(&self) -> &str { "lancedb" }

	fn search<'a>(&'a self, query: &'a str, k: usize, category: Option<&'a str>) -> BoxFuture<'a, Result<Vec<SemanticMatch>>> {
		Box::pin(async move {
			if k == 0 { return Ok(Vec::new()); }
			let texts = vec![query.to_string()];
			let q = self.embedder.embed_batch(&texts).await?.into_iter().next().ok_or_else(|| anyhow!("embedder returned no vector"))?;
			self.search_vec(q, k, category).await
		})
	}
}

fn string_col<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b StringArray> {
	batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| anyhow!("{} column missing", name))
}

fn batch_to_matches(batch: &RecordBatch) -> Result<Vec<SemanticMatch>> {
	let ids = string_col(batch, "id")?;
	let contents = string_col(batch, "content")?;
	let metadata = string_col(batch, "metadata")?;
	let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>()).ok_or_else(|| anyhow!("_distance column missing"))?;
	let mut out = Vec::with_capacity(batch.num_rows());
	for i in 0..batch.num_rows() {
		let meta: KnowledgeMetadata = if metadata.is_null(i) { KnowledgeMetadata::default() } else { serde_json::from_str(metadata.value(i))? };
		let document = KnowledgeDocument::new(ids.value(i), contents.value(i), meta);
		out.push(SemanticMatch { document, distance: distances.value(i).max(0.0) });
	}
	Ok(out)
}
