use futures::future::BoxFuture;

use crate::types::SemanticMatch;

/// Turns raw text into lexical tokens. The same implementation must be used
/// for indexing, querying and reranking.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `hashing:d384`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    /// Vectors come back in input order, one per text.
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, anyhow::Result<Vec<Vec<f32>>>>;
}

/// Vector-similarity backend behind the semantic adapter.
///
/// Distances are non-negative, lower is better. Implementations should honor
/// `category` but the orchestrator re-checks it.
pub trait SemanticBackend: Send + Sync {
    fn name(&self) -> &str;
    fn search<'a>(
        &'a self,
        query: &'a str,
        k: usize,
        category: Option<&'a str>,
    ) -> BoxFuture<'a, anyhow::Result<Vec<SemanticMatch>>>;
}
