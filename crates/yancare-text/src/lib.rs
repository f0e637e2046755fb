//! yancare-text
//!
//! Tantivy-backed BM25 lexical retrieval over the in-memory knowledge corpus.
//! See `index` for the immutable snapshot and `lexical` for the lazily built,
//! reloadable handle the orchestrator shares across requests.
pub mod tantivy_utils;
pub mod index;
pub mod lexical;

pub use index::Bm25Index;
pub use lexical::{IndexState, LexicalIndex, StagedGeneration};
