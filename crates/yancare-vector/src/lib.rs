//! Semantic retrieval: vector backends plus the adapter the orchestrator
//! talks to.
//!
//! - `memory`: brute-force store built from the in-memory corpus
//! - `lance`: LanceDB table produced offline by `writer`
//! - `adapter`: timeout, similarity conversion and graceful degradation
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use yancare_core::config::{expand_path, AssistantConfig, SemanticBackendKind};
use yancare_core::traits::{Embedder, SemanticBackend};
use yancare_core::Corpus;

pub mod adapter;
pub mod lance;
pub mod memory;
pub mod schema;
pub mod writer;

pub use adapter::{distance_to_similarity, SemanticAdapter};
pub use lance::LanceVectorStore;
pub use memory::MemoryVectorStore;
pub use writer::LanceVectorWriter;

/// Open the configured backend. `Ok(None)` means semantic search is disabled.
pub async fn open_backend(cfg: &AssistantConfig, corpus: &Corpus, embedder: Arc<dyn Embedder>) -> Result<Option<Arc<dyn SemanticBackend>>> {
	let backend: Arc<dyn SemanticBackend> = match cfg.semantic.backend {
		SemanticBackendKind::Disabled => return Ok(None),
		SemanticBackendKind::Memory => Arc::new(MemoryVectorStore::build(corpus, embedder).await?),
		SemanticBackendKind::Lancedb => {
			let dir = expand_path(&cfg.data.lancedb_dir);
			Arc::new(LanceVectorStore::open(Path::new(&dir), &cfg.data.lancedb_table, embedder).await?)
		}
	};
	info!(backend = backend.name(), "semantic backend opened");
	Ok(Some(backend))
}

pub fn adapter_for(backend: Option<Arc<dyn SemanticBackend>>, timeout_ms: u64) -> SemanticAdapter {
	match backend {
		Some(b) => SemanticAdapter::new(b, Duration::from_millis(timeout_ms)),
		None => SemanticAdapter::disabled(),
	}
}
