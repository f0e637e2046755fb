use std::hash::{Hash, Hasher};

use futures::future::BoxFuture;
use twox_hash::XxHash64;

use yancare_core::tokenize::{CjkBigramTokenizer, Tokenizer};
use yancare_core::traits::Embedder;

use crate::l2_normalize;

/// Feature-hashing embedder: every token lands in one of `dim` buckets.
/// Texts sharing tokens get similar vectors, which is enough to exercise the
/// semantic path without a model.
#[derive(Debug, Clone)]
pub struct HashingEmbedder { dim: usize, id: String }

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, id: format!("hashing:d{dim}") } }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        if self.dim == 0 { return v; }
        for token in CjkBigramTokenizer.tokenize(text) {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32) * 0.5;
        }
        l2_normalize(&mut v);
        v
    }
}

impl Embedder for HashingEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, anyhow::Result<Vec<Vec<f32>>>> {
        Box::pin(async move { Ok(texts.iter().map(|t| self.embed_text(t)).collect()) })
    }
}
