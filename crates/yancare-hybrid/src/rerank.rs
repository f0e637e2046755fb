use std::collections::HashSet;
use std::sync::Arc;

use yancare_core::config::RerankConfig;
use yancare_core::tokenize::Tokenizer;
use yancare_core::{KnowledgeMetadata, RetrievalCandidate};

/// Training-free second pass over fused candidates:
/// `final = fused_weight * fused + overlap_weight * jaccard(query, doc) + faq_boost * is_faq`.
pub struct Reranker {
    tokenizer: Arc<dyn Tokenizer>,
    weights: RerankConfig,
}

impl Reranker {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, weights: RerankConfig) -> Self { Self { tokenizer, weights } }

    /// Rescore and stably sort; the output is a permutation of the input.
    pub fn rerank(&self, mut candidates: Vec<RetrievalCandidate>, query: &str) -> Vec<RetrievalCandidate> {
        let query_tokens: HashSet<String> = self.tokenizer.tokenize(query).into_iter().collect();
        for c in &mut candidates {
            let doc_tokens: HashSet<String> = self.tokenizer.tokenize(&c.content).into_iter().collect();
            let boost = if is_faq(&c.metadata) { self.weights.faq_boost } else { 0.0 };
            c.final_score = self.weights.fused_weight * c.fused_score + self.weights.overlap_weight * jaccard(&query_tokens, &doc_tokens) + boost;
        }
        candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        candidates
    }
}

/// `|a ∩ b| / |a ∪ b|`, 0 when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 { return 0.0; }
    a.intersection(b).count() as f64 / union as f64
}

fn is_faq(metadata: &KnowledgeMetadata) -> bool {
    metadata.doc_type.eq_ignore_ascii_case("faq") || metadata.category == "FAQ" || metadata.category == "常见问题"
}
