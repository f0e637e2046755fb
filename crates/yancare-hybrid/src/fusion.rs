//! Reciprocal Rank Fusion: score = Σ 1/(k + rank_i)
//!
//! Combines ranked lists from different sources without normalizing their
//! native score scales. Ranks are 1-based.

use std::collections::HashMap;

use yancare_core::{RetrievalCandidate, SourceHit};

pub const DEFAULT_RRF_K: u32 = 60;

/// Fuse `rankings` into one list ordered by descending fused score. Ties keep
/// the order in which documents were first seen across the input lists.
/// `final_score` starts equal to `fused_score`.
pub fn reciprocal_rank_fusion(rankings: &[Vec<SourceHit>], k: u32) -> Vec<RetrievalCandidate> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut fused: Vec<RetrievalCandidate> = Vec::new();

    for ranking in rankings {
        for (i, hit) in ranking.iter().enumerate() {
            let contribution = 1.0 / (k as f64 + (i + 1) as f64);
            let slot = *slots.entry(hit.document.id.clone()).or_insert_with(|| {
                fused.push(RetrievalCandidate::from_document(hit.document.clone()));
                fused.len() - 1
            });
            let candidate = &mut fused[slot];
            candidate.fused_score += contribution;
            candidate.source_scores.record(hit.source, hit.score);
        }
    }

    for c in &mut fused { c.final_score = c.fused_score; }
    fused.sort_by(|a, b| b.fused_score.total_cmp(&a.fused_score));
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use yancare_core::{KnowledgeDocument, KnowledgeMetadata, SourceKind};

    fn hit(id: &str, source: SourceKind) -> SourceHit {
        SourceHit { document: KnowledgeDocument::new(id, id, KnowledgeMetadata::default()), score: 1.0, source }
    }

    fn list(ids: &[&str], source: SourceKind) -> Vec<SourceHit> { ids.iter().map(|id| hit(id, source)).collect() }

    #[test]
    fn agreement_sums_contributions() {
        let a = list(&["x", "y"], SourceKind::Semantic);
        let b = list(&["z", "x"], SourceKind::Lexical);
        let fused = reciprocal_rank_fusion(&[a, b], 60);
        assert_eq!(fused[0].document_id, "x");
        assert!((fused[0].fused_score - (1.0 / 61.0 + 1.0 / 62.0)).abs() < 1e-12);
        assert_eq!(fused[0].source_scores.lexical, Some(1.0));
        assert_eq!(fused[0].source_scores.semantic, Some(1.0));
        let y = fused.iter().find(|c| c.document_id == "y").unwrap();
        assert!((y.fused_score - 1.0 / 62.0).abs() < 1e-12);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let a = list(&["p"], SourceKind::Semantic);
        let b = list(&["q"], SourceKind::Lexical);
        let ids: Vec<String> = reciprocal_rank_fusion(&[a, b], 60).into_iter().map(|c| c.document_id).collect();
        assert_eq!(ids, vec!["p", "q"]);
    }

    #[test]
    fn empty_inputs_fuse_to_nothing() {
        assert!(reciprocal_rank_fusion(&[], 60).is_empty());
        assert!(reciprocal_rank_fusion(&[vec![], vec![]], 60).is_empty());
    }

    proptest! {
        #[test]
        fn fused_scores_match_formula(a in proptest::sample::subsequence(vec!["d0","d1","d2","d3","d4","d5"], 0..6),
                                      b in proptest::sample::subsequence(vec!["d0","d1","d2","d3","d4","d5"], 0..6),
                                      k in 1u32..100) {
            let fused = reciprocal_rank_fusion(&[list(&a, SourceKind::Semantic), list(&b, SourceKind::Lexical)], k);
            for c in &fused {
                let mut expected = 0.0;
                if let Some(r) = a.iter().position(|id| *id == c.document_id) { expected += 1.0 / (k as f64 + r as f64 + 1.0); }
                if let Some(r) = b.iter().position(|id| *id == c.document_id) { expected += 1.0 / (k as f64 + r as f64 + 1.0); }
                prop_assert!((c.fused_score - expected).abs() < 1e-12);
            }
            let mut ids: Vec<&str> = a.iter().chain(b.iter()).copied().collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(fused.len(), ids.len());
            for w in fused.windows(2) { prop_assert!(w[0].fused_score >= w[1].fused_score); }
        }
    }
}
