use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use futures::future::BoxFuture;
use tracing::info;

use yancare_core::traits::{Embedder, SemanticBackend};
use yancare_core::{Corpus, KnowledgeDocument, SemanticMatch};

/// Brute-force squared-L2 search over embeddings held in memory. Meant for
/// small corpora and tests; the store is rebuilt on corpus reload.
pub struct MemoryVectorStore {
	embedder: Arc<dyn Embedder>,
	entries: Vec<(KnowledgeDocument, Vec<f32>)>,
}

impl MemoryVectorStore {
	pub async fn build(corpus: &Corpus, embedder: Arc<dyn Embedder>) -> Result<Self> {
		let texts: Vec<String> = corpus.documents().iter().map(|d| d.content.clone()).collect();
		let vectors = if texts.is_empty() { Vec::new() } else { embedder.embed_batch(&texts).await? };
		if vectors.len() != texts.len() { bail!("embedder returned {} vectors for {} documents", vectors.len(), texts.len()); }
		let entries: Vec<_> = corpus.documents().iter().cloned().zip(vectors).collect();
		info!(documents = entries.len(), embedder = embedder.embedder_id(), "memory vector store built");
		Ok(Self { embedder, entries })
	}

	pub fn len(&self) -> usize { self.entries.len() }

	pub fn is_empty(&self) -> bool { self.entries.is_empty() }

	fn nearest(&self, query: &[f32], k: usize, category: Option<&str>) -> Vec<SemanticMatch> {
		let mut scored: Vec<(usize, f32)> = self
			.entries
			.iter()
			.enumerate()
			.filter(|(_, (d, _))| category.map_or(true, |c| d.category() == c))
			.map(|(i, (_, v))| (i, squared_l2(query, v)))
			.collect();
		scored.sort_by(|a, b| a.1.total_cmp(&b.1));
		scored
			.into_iter()
			.take(k)
			.map(|(i, distance)| SemanticMatch { document: self.entries[i].0.clone(), distance })
			.collect()
	}
}

impl SemanticBackend for MemoryVectorStore {
	fn name(&self) -> &str { "memory" }

	fn search<'a>(&'a self, query: &'a str, k: usize, category: Option<&'a str>) -> BoxFuture<'a, Result<Vec<SemanticMatch>>> {
		Box::pin(async move {
			if k == 0 || self.entries.is_empty() { return Ok(Vec::new()); }
			let texts = vec![query.to_string()];
			let q = self.embedder.embed_batch(&texts).await?.into_iter().next().ok_or_else(|| anyhow!("embedder returned no vector"))?;
			Ok(self.nearest(&q, k, category))
		})
	}
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
	let common: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
	// unequal lengths count missing components as zero
	let tail: f32 = if a.len() > b.len() { a[b.len()..].iter().map(|x| x * x).sum() } else { b[a.len()..].iter().map(|x| x * x).sum() };
	common + tail
}
