//! Text embedders used by the semantic source and the indexer.
//!
//! `build_embedder` picks the provider from [`EmbeddingConfig`]. Setting
//! `APP_USE_FAKE_EMBEDDINGS=1` forces the deterministic [`HashingEmbedder`]
//! regardless of config, for fast tests and development.
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use yancare_core::config::{EmbeddingConfig, EmbeddingProvider};
use yancare_core::traits::Embedder;

pub mod hashing;
pub mod http;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;

pub fn build_embedder(cfg: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false);
    let provider = if use_fake { EmbeddingProvider::Hashing } else { cfg.provider };
    let embedder: Arc<dyn Embedder> = match provider {
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(cfg.dimension)),
        EmbeddingProvider::Http => Arc::new(HttpEmbedder::from_config(cfg)?),
    };
    info!(embedder = embedder.embedder_id(), dim = embedder.dim(), "embedder ready");
    Ok(embedder)
}

/// Scale `v` to unit length in place; the zero vector stays zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-6 { for x in v.iter_mut() { *x /= norm; } }
}
