//! Domain types shared by the classifier, the retrieval sources and the
//! orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type DocumentId = String;

/// Recognized metadata keys plus an open map for whatever else the
/// ingestion tool attached (title, question, chunk_index, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeMetadata {
    #[serde(default)]
    pub category: String,
    #[serde(default, rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub source: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl KnowledgeMetadata {
    pub fn new(category: impl Into<String>, doc_type: impl Into<String>, source: impl Into<String>) -> Self {
        Self { category: category.into(), doc_type: doc_type.into(), source: source.into(), extra: BTreeMap::new() }
    }
}

/// Immutable unit of retrievable content.
///
/// - `id`: unique within a corpus
/// - `content`: the text body that is tokenized and embedded
/// - `metadata`: category/type/source plus free-form extras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: DocumentId,
    pub content: String,
    #[serde(default)]
    pub metadata: KnowledgeMetadata,
}

impl KnowledgeDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>, metadata: KnowledgeMetadata) -> Self {
        Self { id: id.into(), content: content.into(), metadata }
    }

    pub fn category(&self) -> &str { &self.metadata.category }
}

/// Indicates which retrieval source produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Lexical,
    Semantic,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Lexical => f.write_str("lexical"),
            SourceKind::Semantic => f.write_str("semantic"),
        }
    }
}

/// One entry of a single source's ranking.
///
/// `score` is source-specific but higher is always better: raw BM25 for the
/// lexical index, `1 / (1 + distance)` for the semantic adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceHit {
    pub document: KnowledgeDocument,
    pub score: f32,
    pub source: SourceKind,
}

/// Raw match from a vector backend before distance is turned into a score.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticMatch {
    pub document: KnowledgeDocument,
    pub distance: f32,
}

/// Result of asking one retrieval source for candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Hits(Vec<SourceHit>),
    Unavailable(String),
}

impl SourceOutcome {
    pub fn hits(&self) -> &[SourceHit] {
        match self {
            SourceOutcome::Hits(h) => h,
            SourceOutcome::Unavailable(_) => &[],
        }
    }

    pub fn into_hits(self) -> Vec<SourceHit> {
        match self {
            SourceOutcome::Hits(h) => h,
            SourceOutcome::Unavailable(_) => Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool { matches!(self, SourceOutcome::Hits(_)) }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic: Option<f32>,
}

impl SourceScores {
    /// Record a source score, keeping the best one when a document shows up
    /// more than once for the same source (query expansion).
    pub fn record(&mut self, source: SourceKind, score: f32) {
        let slot = match source {
            SourceKind::Lexical => &mut self.lexical,
            SourceKind::Semantic => &mut self.semantic,
        };
        *slot = Some(slot.map_or(score, |prev| prev.max(score)));
    }
}

/// A fused and (optionally) reranked candidate handed to the response
/// generator. Only the ordering by `final_score` is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalCandidate {
    pub document_id: DocumentId,
    pub content: String,
    pub metadata: KnowledgeMetadata,
    pub source_scores: SourceScores,
    pub fused_score: f64,
    pub final_score: f64,
}

impl RetrievalCandidate {
    pub fn from_document(document: KnowledgeDocument) -> Self {
        Self {
            document_id: document.id,
            content: document.content,
            metadata: document.metadata,
            source_scores: SourceScores::default(),
            fused_score: 0.0,
            final_score: 0.0,
        }
    }
}

/// Communicative purpose of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Thanks,
    Goodbye,
    Complaint,
    ConsultCard,
    ConsultService,
    ConsultBooking,
    ConsultStore,
    ConsultKnowledge,
    Other,
}

impl Intent {
    /// Consult intents in tie-break order.
    pub const CONSULT: [Intent; 5] = [
        Intent::ConsultCard,
        Intent::ConsultService,
        Intent::ConsultBooking,
        Intent::ConsultStore,
        Intent::ConsultKnowledge,
    ];

    pub fn is_consult(self) -> bool { Self::CONSULT.contains(&self) }

    /// Only consult intents need the knowledge base; the rest are answered
    /// with canned behavior by the caller.
    pub fn needs_retrieval(self) -> bool { self.is_consult() }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Thanks => "thanks",
            Intent::Goodbye => "goodbye",
            Intent::Complaint => "complaint",
            Intent::ConsultCard => "consult_card",
            Intent::ConsultService => "consult_service",
            Intent::ConsultBooking => "consult_booking",
            Intent::ConsultStore => "consult_store",
            Intent::ConsultKnowledge => "consult_knowledge",
            Intent::Other => "other",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Classifier output; `confidence` is always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub confidence: f32,
}

impl IntentResult {
    pub fn new(intent: Intent, confidence: f32) -> Self { Self { intent, confidence: confidence.clamp(0.0, 1.0) } }
}
