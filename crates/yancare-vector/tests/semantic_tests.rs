use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use yancare_core::traits::{Embedder, SemanticBackend};
use yancare_core::{Corpus, KnowledgeDocument, KnowledgeMetadata, SemanticMatch, SourceOutcome};
use yancare_embed::HashingEmbedder;
use yancare_vector::{LanceVectorStore, LanceVectorWriter, MemoryVectorStore, SemanticAdapter};

fn fixture() -> Corpus {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().to_path_buf();
    Corpus::from_path(&root.join("test_data/knowledge_en.jsonl")).expect("fixture")
}

fn embedder() -> Arc<dyn Embedder> { Arc::new(HashingEmbedder::new(128)) }

enum Stub { Slow, Broken, Fixed(Vec<(&'static str, f32)>) }

impl SemanticBackend for Stub {
    fn name(&self) -> &str { "stub" }
    fn search<'a>(&'a self, _query: &'a str, _k: usize, _category: Option<&'a str>) -> BoxFuture<'a, anyhow::Result<Vec<SemanticMatch>>> {
        Box::pin(async move {
            match self {
                Stub::Slow => { tokio::time::sleep(Duration::from_millis(500)).await; Ok(Vec::new()) }
                Stub::Broken => Err(anyhow::anyhow!("connection refused")),
                Stub::Fixed(rows) => Ok(rows
                    .iter()
                    .map(|(id, distance)| SemanticMatch {
                        document: KnowledgeDocument::new(*id, "x", KnowledgeMetadata::new(if id.starts_with('s') { "store" } else { "card" }, "section", "t")),
                        distance: *distance,
                    })
                    .collect()),
            }
        })
    }
}

#[tokio::test]
async fn memory_store_ranks_by_distance() -> anyhow::Result<()> {
    let corpus = fixture();
    let target = corpus.get("store_downtown").unwrap().content.clone();
    let store = MemoryVectorStore::build(&corpus, embedder()).await?;
    assert_eq!(store.len(), corpus.len());

    let matches = store.search(&target, 4, None).await?;
    assert_eq!(matches.len(), 4);
    assert_eq!(matches[0].document.id, "store_downtown");
    assert!(matches[0].distance.abs() < 1e-5);
    for w in matches.windows(2) { assert!(w[0].distance <= w[1].distance); }

    let cards = store.search(&target, 10, Some("card")).await?;
    assert!(!cards.is_empty());
    assert!(cards.iter().all(|m| m.document.category() == "card"));
    assert!(store.search(&target, 0, None).await?.is_empty());
    Ok(())
}

/// Embeds documents but comes back empty-handed for single-text batches,
/// i.e. for every query.
struct QueryBlindEmbedder;

impl Embedder for QueryBlindEmbedder {
    fn embedder_id(&self) -> &str { "query-blind" }
    fn dim(&self) -> usize { 4 }
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, anyhow::Result<Vec<Vec<f32>>>> {
        Box::pin(async move {
            if texts.len() == 1 { return Ok(Vec::new()); }
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0, 0.0]).collect())
        })
    }
}

#[tokio::test]
async fn missing_query_vector_makes_memory_source_unavailable() -> anyhow::Result<()> {
    let corpus = fixture();
    let store = MemoryVectorStore::build(&corpus, Arc::new(QueryBlindEmbedder)).await?;
    assert_eq!(store.len(), corpus.len());
    assert!(store.search("monthly card", 5, None).await.is_err());

    let adapter = SemanticAdapter::new(Arc::new(store), Duration::from_secs(1));
    let outcome = adapter.search("monthly card", 5, None).await;
    assert!(matches!(outcome, SourceOutcome::Unavailable(m) if m.contains("no vector")));
    Ok(())
}

#[tokio::test]
async fn adapter_converts_distance_and_rechecks_category() {
    let stub = Stub::Fixed(vec![("card_b", 1.0), ("store_a", 0.0), ("card_a", 0.0)]);
    let adapter = SemanticAdapter::new(Arc::new(stub), Duration::from_secs(1));
    let hits = adapter.search("q", 5, Some("card")).await.into_hits();
    let ids: Vec<&str> = hits.iter().map(|h| h.document.id.as_str()).collect();
    assert_eq!(ids, vec!["card_a", "card_b"]);
    assert_eq!(hits[0].score, 1.0);
    assert_eq!(hits[1].score, 0.5);
}

#[tokio::test]
async fn adapter_degrades_on_timeout_error_and_missing_backend() {
    let slow = SemanticAdapter::new(Arc::new(Stub::Slow), Duration::from_millis(20));
    assert!(matches!(slow.search("q", 5, None).await, SourceOutcome::Unavailable(_)));

    let broken = SemanticAdapter::new(Arc::new(Stub::Broken), Duration::from_secs(1));
    assert!(matches!(broken.search("q", 5, None).await, SourceOutcome::Unavailable(m) if m.contains("refused")));

    let disabled = SemanticAdapter::disabled();
    assert!(!disabled.is_enabled());
    assert!(!disabled.search("q", 5, None).await.is_available());

    disabled.replace_backend(Some(Arc::new(Stub::Fixed(vec![("card_a", 0.0)]))));
    assert_eq!(disabled.backend_name().as_deref(), Some("stub"));
    assert_eq!(disabled.search("q", 5, None).await.hits().len(), 1);
}

#[tokio::test]
async fn lancedb_write_then_search() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let corpus = fixture();
    let embedder = embedder();

    let writer = LanceVectorWriter::new(tmp.path(), "knowledge").await?;
    assert_eq!(writer.write(&corpus, embedder.as_ref()).await?, corpus.len());
    // rewriting replaces rows instead of appending
    assert_eq!(writer.write(&corpus, embedder.as_ref()).await?, corpus.len());

    let store = LanceVectorStore::open(tmp.path(), "knowledge", embedder.clone()).await?;
    let target = corpus.get("faq_same_day").unwrap();
    let matches = store.search(&target.content, corpus.len() * 2, None).await?;
    assert_eq!(matches.len(), corpus.len());
    assert_eq!(matches[0].document.id, "faq_same_day");
    assert_eq!(matches[0].document.metadata, target.metadata);

    let filtered = store.search(&target.content, 5, Some("FAQ")).await?;
    assert!(!filtered.is_empty());
    assert!(filtered.iter().all(|m| m.document.category() == "FAQ"));

    assert!(LanceVectorStore::open(tmp.path(), "missing", embedder).await.is_err());
    Ok(())
}
