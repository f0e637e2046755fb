use tracing::{debug, warn};

use yancare_core::config::{IntentConfig, RetrievalConfig};
use yancare_core::tokenize::{CjkBigramTokenizer, Tokenizer};
use yancare_core::{Intent, IntentResult};

use crate::lexicon::{IntentLexicon, MatchMode};

const SOCIAL_CONFIDENCE: f32 = 0.95;
const COMPLAINT_CONFIDENCE: f32 = 0.9;
const CONSULT_THRESHOLD: f32 = 0.3;
const CONSULT_CAP: f32 = 0.9;
const FALLBACK_CONFIDENCE: f32 = 0.5;

/// Pure function of the text and the lexicon; safe to share across threads.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
	lexicon: IntentLexicon,
}

/// Lowercased message in both shapes the matchers need.
struct Message {
	text: String,
	words: Vec<String>,
}

impl IntentClassifier {
	pub fn new(lexicon: IntentLexicon) -> Self { Self { lexicon } }

	/// Lexicon for the configured language, with category overrides applied.
	pub fn from_config(cfg: &IntentConfig) -> Self {
		let mut lexicon = IntentLexicon::for_language(cfg.language);
		for (name, category) in &cfg.categories {
			match Intent::CONSULT.into_iter().find(|i| i.as_str() == name.as_str()) {
				Some(intent) => { lexicon.set_category(intent, category.clone()); }
				None => warn!(intent = %name, "ignoring category override for non-consult intent"),
			}
		}
		Self { lexicon }
	}

	pub fn lexicon(&self) -> &IntentLexicon { &self.lexicon }

	pub fn classify(&self, text: &str) -> IntentResult {
		let text = text.trim().to_lowercase();
		if text.is_empty() { return IntentResult::new(Intent::Other, 0.0); }
		let words = match self.lexicon.mode {
			MatchMode::Token => CjkBigramTokenizer.tokenize(&text),
			MatchMode::Substring => Vec::new(),
		};
		let msg = Message { text, words };

		let social = [
			(Intent::Greeting, &self.lexicon.greeting, SOCIAL_CONFIDENCE),
			(Intent::Thanks, &self.lexicon.thanks, SOCIAL_CONFIDENCE),
			(Intent::Goodbye, &self.lexicon.goodbye, SOCIAL_CONFIDENCE),
			(Intent::Complaint, &self.lexicon.complaint, COMPLAINT_CONFIDENCE),
		];
		for (intent, keywords, confidence) in social {
			if keywords.iter().any(|k| self.matches(&msg, k)) {
				debug!(%intent, confidence, "social intent matched");
				return IntentResult::new(intent, confidence);
			}
		}

		let mut best: Option<(Intent, f32)> = None;
		for rule in &self.lexicon.consult {
			let score = self.score(&msg, &rule.keywords);
			// strict `>` keeps the earliest rule on ties
			if best.map_or(true, |(_, s)| score > s) { best = Some((rule.intent, score)); }
		}
		match best {
			Some((intent, score)) if score > CONSULT_THRESHOLD => IntentResult::new(intent, score.min(CONSULT_CAP)),
			_ => IntentResult::new(Intent::Other, FALLBACK_CONFIDENCE),
		}
	}

	pub fn needs_retrieval(&self, intent: Intent) -> bool { intent.needs_retrieval() }

	/// Knowledge category to filter retrieval by; `None` for non-consult intents.
	pub fn category_for(&self, intent: Intent) -> Option<&str> { self.lexicon.category_for(intent) }

	/// `min(matched / total * 5, 0.9)`, or 0 when nothing matches.
	fn score(&self, msg: &Message, keywords: &[String]) -> f32 {
		if keywords.is_empty() { return 0.0; }
		let matched = keywords.iter().filter(|k| self.matches(msg, k)).count();
		if matched == 0 { return 0.0; }
		(matched as f32 / keywords.len() as f32 * 5.0).min(CONSULT_CAP)
	}

	fn matches(&self, msg: &Message, keyword: &str) -> bool {
		match self.lexicon.mode {
			MatchMode::Substring => msg.text.contains(keyword),
			MatchMode::Token => {
				let phrase = CjkBigramTokenizer.tokenize(keyword);
				!phrase.is_empty() && msg.words.windows(phrase.len()).any(|w| w == phrase.as_slice())
			}
		}
	}
}

/// Candidate count for a consult intent: knowledge questions get the larger
/// `knowledge_results`, everything else `default_results`.
pub fn recommended_results(intent: Intent, cfg: &RetrievalConfig) -> usize {
	if intent == Intent::ConsultKnowledge { cfg.knowledge_results } else { cfg.default_results }
}
