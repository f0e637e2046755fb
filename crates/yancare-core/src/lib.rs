#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod tokenize;
pub mod traits;
pub mod types;

pub use corpus::Corpus;
pub use error::{Error, Result};
pub use types::{
    Intent, IntentResult, KnowledgeDocument, KnowledgeMetadata, RetrievalCandidate, SemanticMatch, SourceHit,
    SourceKind, SourceOutcome, SourceScores,
};
