//! Hybrid retrieval: rank fusion, reranking, query expansion and the
//! orchestrator tying the intent classifier to both retrieval sources.
pub mod expansion;
pub mod fusion;
pub mod pipeline;
pub mod rerank;

pub use expansion::QueryExpander;
pub use fusion::{reciprocal_rank_fusion, DEFAULT_RRF_K};
pub use pipeline::{PipelineOptions, RetrievalOutcome, RetrievalPipeline};
pub use rerank::{jaccard, Reranker};
