use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use yancare_core::tokenize::{CjkBigramTokenizer, Tokenizer};
use yancare_core::{Corpus, KnowledgeDocument, KnowledgeMetadata, SourceOutcome};
use yancare_text::{IndexState, LexicalIndex};

fn fixture(name: &str) -> Corpus {
    // crates/yancare-text -> crates -> repo root
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().to_path_buf();
    Corpus::from_path(&root.join("test_data").join(name)).expect("fixture")
}

fn bigrams() -> Arc<dyn Tokenizer> { Arc::new(CjkBigramTokenizer) }

fn ids(outcome: &SourceOutcome) -> Vec<String> { outcome.hits().iter().map(|h| h.document.id.clone()).collect() }

struct CountingTokenizer { calls: AtomicUsize }

impl Tokenizer for CountingTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CjkBigramTokenizer.tokenize(text)
    }
}

#[test]
fn bm25_ranks_matching_documents() {
    let index = LexicalIndex::new(fixture("knowledge_en.jsonl"), bigrams());
    assert_eq!(index.state(), IndexState::Uninitialized);

    let outcome = index.search("monthly card price", 5, None);
    assert_eq!(index.state(), IndexState::Ready);
    let hits = outcome.hits();
    assert!(!hits.is_empty());
    assert!(["card_overview", "faq_card_price"].contains(&hits[0].document.id.as_str()), "top hit {}", hits[0].document.id);
    for w in hits.windows(2) { assert!(w[0].score >= w[1].score); }
    for h in hits {
        let content = h.document.content.to_lowercase();
        assert!(["monthly", "card", "price"].iter().any(|t| content.contains(t)), "{} shares no token", h.document.id);
    }
}

#[test]
fn chinese_bigrams_find_the_price_faq() {
    let index = LexicalIndex::new(fixture("knowledge_zh.jsonl"), bigrams());
    let hits = index.search("月卡多少钱", 3, None).into_hits();
    assert_eq!(hits.first().map(|h| h.document.id.as_str()), Some("faq_price"));
}

#[test]
fn category_filter_keeps_unfiltered_order() {
    let index = LexicalIndex::new(fixture("knowledge_en.jsonl"), bigrams());
    let n = index.corpus_size();
    let unfiltered: Vec<String> = index
        .search("scalp care hair", n, None)
        .hits()
        .iter()
        .filter(|h| h.document.category() == "knowledge")
        .map(|h| h.document.id.clone())
        .collect();
    let filtered = index.search("scalp care hair", n, Some("knowledge"));
    assert!(!unfiltered.is_empty());
    assert_eq!(ids(&filtered), unfiltered);
}

#[test]
fn no_overlap_and_zero_k_return_nothing() {
    let index = LexicalIndex::new(fixture("knowledge_en.jsonl"), bigrams());
    assert_eq!(index.search("zebra", 5, None), SourceOutcome::Hits(vec![]));
    assert_eq!(index.search("monthly card", 0, None), SourceOutcome::Hits(vec![]));
    assert_eq!(index.search("  ?! ", 5, None), SourceOutcome::Hits(vec![]));
    assert_eq!(index.search("the", 5, None), SourceOutcome::Hits(vec![]), "stop words never match");
}

#[test]
fn empty_corpus_is_unavailable() {
    let index = LexicalIndex::new(Corpus::empty(), bigrams());
    assert!(!index.search("card", 5, None).is_available());
    assert_eq!(index.state(), IndexState::Unavailable);
}

#[test]
fn concurrent_first_searches_share_one_build() {
    let corpus = fixture("knowledge_en.jsonl");
    let docs = corpus.len();
    let tokenizer = Arc::new(CountingTokenizer { calls: AtomicUsize::new(0) });
    let index = Arc::new(LexicalIndex::new(corpus, tokenizer.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let index = Arc::clone(&index);
            std::thread::spawn(move || ids(&index.search("book appointment slot", 3, None)))
        })
        .collect();
    let results: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(results[0].first().map(String::as_str), Some("booking_rules"));
    assert_eq!(tokenizer.calls.load(Ordering::SeqCst), docs + 8, "one build plus one tokenize per query");
}

#[test]
fn reload_swaps_generation() {
    let index = LexicalIndex::new(fixture("knowledge_en.jsonl"), bigrams());
    let before = index.generation();
    assert!(index.search("zebra", 5, None).hits().is_empty());

    let next = Corpus::new(vec![KnowledgeDocument::new(
        "zebra",
        "Zebra stripes pattern",
        KnowledgeMetadata::new("service", "section", "test"),
    )])
    .unwrap();
    assert_eq!(index.reload(next), IndexState::Ready);
    assert_ne!(index.generation(), before);
    assert_eq!(index.corpus_size(), 1);
    assert_eq!(ids(&index.search("zebra", 5, None)), vec!["zebra".to_string()]);
}

#[test]
fn staged_generation_stays_invisible_until_installed() {
    let index = LexicalIndex::new(fixture("knowledge_en.jsonl"), bigrams());
    let before = index.generation();
    let next = Corpus::new(vec![KnowledgeDocument::new(
        "zebra",
        "Zebra stripes pattern",
        KnowledgeMetadata::new("service", "section", "test"),
    )])
    .unwrap();

    let staged = index.stage(next);
    assert_eq!(staged.state(), IndexState::Ready);
    assert_ne!(staged.generation(), before);
    assert_eq!(index.generation(), before);
    assert_eq!(index.corpus_size(), 10);
    assert!(index.search("zebra", 5, None).hits().is_empty());

    assert_eq!(index.install(staged), IndexState::Ready);
    assert_eq!(index.corpus_size(), 1);
    assert_eq!(ids(&index.search("zebra", 5, None)), vec!["zebra".to_string()]);
}
