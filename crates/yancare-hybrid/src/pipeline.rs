//! Retrieval pipeline orchestrator.
//!
//! One pass per request: classify → gate → pick category → query both
//! sources concurrently → fuse → rerank → filter, dedup, truncate. Source
//! failures are absorbed as empty lists, so retrieval itself never fails.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use yancare_core::config::{AssistantConfig, RerankConfig, RetrievalConfig, SemanticBackendKind};
use yancare_core::tokenize::build_tokenizer;
use yancare_core::traits::Embedder;
use yancare_core::{Corpus, Intent, IntentResult, RetrievalCandidate, SourceHit, SourceOutcome};
use yancare_embed::build_embedder;
use yancare_intent::{recommended_results, IntentClassifier};
use yancare_text::{IndexState, LexicalIndex};
use yancare_vector::{adapter_for, open_backend, MemoryVectorStore, SemanticAdapter};

use crate::expansion::QueryExpander;
use crate::fusion::reciprocal_rank_fusion;
use crate::rerank::Reranker;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    pub retrieval: RetrievalConfig,
    pub rerank: RerankConfig,
}

impl From<&AssistantConfig> for PipelineOptions {
    fn from(cfg: &AssistantConfig) -> Self { Self { retrieval: cfg.retrieval.clone(), rerank: cfg.rerank } }
}

/// What `answer` hands to the response generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalOutcome {
    pub intent: IntentResult,
    pub category: Option<String>,
    pub candidates: Vec<RetrievalCandidate>,
}

#[derive(Debug, Default, Clone, Copy)]
struct SourceCounts { lexical: usize, semantic: usize }

pub struct RetrievalPipeline {
    classifier: IntentClassifier,
    lexical: Arc<LexicalIndex>,
    semantic: SemanticAdapter,
    reranker: Reranker,
    expander: QueryExpander,
    options: PipelineOptions,
    /// Set when the semantic backend is the in-memory store, which has to be
    /// rebuilt on corpus reload.
    memory_embedder: Option<Arc<dyn Embedder>>,
}

impl RetrievalPipeline {
    pub fn new(classifier: IntentClassifier, lexical: Arc<LexicalIndex>, semantic: SemanticAdapter, options: PipelineOptions) -> Self {
        let reranker = Reranker::new(Arc::clone(lexical.tokenizer()), options.rerank);
        let expander = QueryExpander::new(&options.retrieval.synonyms, options.retrieval.max_expansions);
        Self { classifier, lexical, semantic, reranker, expander, options, memory_embedder: None }
    }

    /// Wire every component from config. A semantic backend that fails to
    /// open is logged and left disabled.
    pub async fn from_config(cfg: &AssistantConfig, corpus: Corpus) -> anyhow::Result<Self> {
        cfg.validate()?;
        let tokenizer = build_tokenizer(cfg.retrieval.tokenizer);
        let classifier = IntentClassifier::from_config(&cfg.intent);
        let embedder = match cfg.semantic.backend {
            SemanticBackendKind::Disabled => None,
            _ => Some(build_embedder(&cfg.embedding)?),
        };
        let backend = match &embedder {
            Some(e) => open_backend(cfg, &corpus, Arc::clone(e)).await.unwrap_or_else(|err| {
                warn!(error = %err, "semantic backend unavailable; serving lexical-only");
                None
            }),
            None => None,
        };
        let semantic = adapter_for(backend, cfg.semantic.timeout_ms);
        let lexical = Arc::new(LexicalIndex::new(corpus, tokenizer));
        let mut pipeline = Self::new(classifier, lexical, semantic, PipelineOptions::from(cfg));
        if cfg.semantic.backend == SemanticBackendKind::Memory && pipeline.semantic.is_enabled() {
            pipeline.memory_embedder = embedder;
        }
        Ok(pipeline)
    }

    pub fn options(&self) -> &PipelineOptions { &self.options }

    pub fn lexical(&self) -> &Arc<LexicalIndex> { &self.lexical }

    pub fn semantic(&self) -> &SemanticAdapter { &self.semantic }

    pub fn classify_intent(&self, text: &str) -> IntentResult { self.classifier.classify(text) }

    pub fn needs_retrieval(&self, intent: Intent) -> bool { self.classifier.needs_retrieval(intent) }

    pub fn corpus_size(&self) -> usize { self.lexical.corpus_size() }

    /// Full per-request flow with the category filter taken from the intent.
    pub async fn retrieve(&self, query: &str, n_results: usize, use_reranking: bool) -> Vec<RetrievalCandidate> {
        let intent = self.classify_intent(query);
        let category = self.category(intent.intent);
        info!(intent = %intent.intent, confidence = intent.confidence, category = ?category, "intent decided");
        if !self.needs_retrieval(intent.intent) {
            debug!(intent = %intent.intent, "retrieval gated off");
            return Vec::new();
        }
        self.search(query, n_results, category, use_reranking).await
    }

    /// Like [`retrieve`](Self::retrieve) but sized by the intent and
    /// returning the classification alongside the candidates.
    pub async fn answer(&self, query: &str) -> RetrievalOutcome {
        let intent = self.classify_intent(query);
        let category = self.category(intent.intent).map(str::to_string);
        info!(intent = %intent.intent, confidence = intent.confidence, category = ?category, "intent decided");
        let candidates = if self.needs_retrieval(intent.intent) {
            let n = recommended_results(intent.intent, &self.options.retrieval).min(self.options.retrieval.max_results);
            self.search(query, n, category.as_deref(), self.options.retrieval.use_reranking).await
        } else {
            Vec::new()
        };
        RetrievalOutcome { intent, category, candidates }
    }

    /// Retrieval steps 4–7 with an explicit category, skipping classification.
    /// Asking for more than the corpus holds simply yields fewer candidates.
    pub async fn search(&self, query: &str, n_results: usize, category: Option<&str>, use_reranking: bool) -> Vec<RetrievalCandidate> {
        if n_results == 0 { return Vec::new(); }
        let k = n_results.saturating_mul(self.options.retrieval.candidate_multiplier).min(self.corpus_size());
        let variants = if self.options.retrieval.query_expansion { self.expander.expand(query) } else { vec![query.to_string()] };

        let outcomes = join_all(variants.iter().map(|v| self.query_sources(v, k, category))).await;
        let mut counts = SourceCounts::default();
        let mut rankings: Vec<Vec<SourceHit>> = Vec::new();
        for (semantic, lexical) in outcomes {
            let (semantic, lexical) = (semantic.into_hits(), lexical.into_hits());
            counts.semantic += semantic.len();
            counts.lexical += lexical.len();
            if !semantic.is_empty() { rankings.push(semantic); }
            if !lexical.is_empty() { rankings.push(lexical); }
        }
        info!(lexical = counts.lexical, semantic = counts.semantic, variants = variants.len(), k, "sources queried");
        if rankings.is_empty() {
            info!("no candidates from any source");
            return Vec::new();
        }

        let fused = reciprocal_rank_fusion(&rankings, self.options.retrieval.rrf_k);
        let fused_count = fused.len();
        let ranked = if use_reranking { self.reranker.rerank(fused, query) } else { fused };

        let mut seen = HashSet::new();
        let out: Vec<RetrievalCandidate> = ranked
            .into_iter()
            .filter(|c| category.map_or(true, |cat| c.metadata.category == cat))
            .filter(|c| seen.insert(c.document_id.clone()))
            .take(n_results)
            .collect();
        info!(fused = fused_count, final_count = out.len(), reranked = use_reranking, "retrieval finished");
        out
    }

    /// Swap in a new corpus: a fresh lexical generation and, for the
    /// in-memory semantic store, a rebuilt vector store. Both are built
    /// before either is installed.
    pub async fn reload_corpus(&self, corpus: Corpus) -> anyhow::Result<IndexState> {
        let store = match &self.memory_embedder {
            Some(embedder) => Some(MemoryVectorStore::build(&corpus, Arc::clone(embedder)).await?),
            None => None,
        };
        let lexical = Arc::clone(&self.lexical);
        let staged = tokio::task::spawn_blocking(move || lexical.stage(corpus)).await?;
        if let Some(store) = store { self.semantic.replace_backend(Some(Arc::new(store))); }
        let state = self.lexical.install(staged);
        info!(?state, documents = self.corpus_size(), "corpus reloaded");
        Ok(state)
    }

    fn category(&self, intent: Intent) -> Option<&str> {
        if self.options.retrieval.category_filter { self.classifier.category_for(intent) } else { None }
    }

    /// Lexical search runs on the blocking pool while the semantic call is
    /// awaited, so latency is bounded by the slower of the two.
    async fn query_sources(&self, query: &str, k: usize, category: Option<&str>) -> (SourceOutcome, SourceOutcome) {
        let lexical = Arc::clone(&self.lexical);
        let (q, cat) = (query.to_string(), category.map(str::to_string));
        let lexical_task = tokio::task::spawn_blocking(move || lexical.search(&q, k, cat.as_deref()));
        let (semantic, lexical) = tokio::join!(self.semantic.search(query, k, category), lexical_task);
        let lexical = lexical.unwrap_or_else(|e| {
            warn!(error = %e, "lexical search task failed");
            SourceOutcome::Unavailable(e.to_string())
        });
        if let SourceOutcome::Unavailable(reason) = &semantic { debug!(%reason, "semantic source unavailable"); }
        if let SourceOutcome::Unavailable(reason) = &lexical { debug!(%reason, "lexical source unavailable"); }
        (semantic, lexical)
    }
}
