//! Keyword-rule intent classifier.
//!
//! Social intents (greeting, thanks, goodbye, complaint) are checked first in
//! that order and short-circuit on any keyword hit. Otherwise each consult
//! intent is scored by the share of its keywords present in the text.
pub mod classifier;
pub mod lexicon;

pub use classifier::{recommended_results, IntentClassifier};
pub use lexicon::{ConsultRule, IntentLexicon, MatchMode};
