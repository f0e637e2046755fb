//! Lazily built, atomically swappable lexical index.
//!
//! A generation pairs one corpus snapshot with at most one [`Bm25Index`].
//! The first search builds it under a `OnceLock`, so concurrent first callers
//! wait for the single build and all observe its result. `reload` builds the
//! next generation off to the side (`stage`) and swaps the `Arc` under a
//! short write lock (`install`); in-flight searches keep the generation they
//! started with.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{debug, info, warn};

use yancare_core::tokenize::Tokenizer;
use yancare_core::types::SourceOutcome;
use yancare_core::Corpus;

use crate::index::Bm25Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
	Uninitialized,
	Ready,
	/// Build failed or the corpus was empty; searches yield no candidates.
	Unavailable,
}

struct Generation {
	corpus: Arc<Corpus>,
	fingerprint: String,
	built: OnceLock<Option<Arc<Bm25Index>>>,
}

impl Generation {
	fn new(corpus: Corpus) -> Self {
		let fingerprint = corpus.fingerprint();
		Self { corpus: Arc::new(corpus), fingerprint, built: OnceLock::new() }
	}

	fn index(&self, tokenizer: &Arc<dyn Tokenizer>) -> Option<Arc<Bm25Index>> {
		self.built
			.get_or_init(|| match Bm25Index::build(Arc::clone(&self.corpus), Arc::clone(tokenizer)) {
				Ok(index) => {
					info!(documents = index.len(), generation = %self.fingerprint, "lexical index built");
					Some(Arc::new(index))
				}
				Err(e) => {
					warn!(error = %e, generation = %self.fingerprint, "lexical index unavailable");
					None
				}
			})
			.clone()
	}

	fn state(&self) -> IndexState {
		match self.built.get() {
			None => IndexState::Uninitialized,
			Some(Some(_)) => IndexState::Ready,
			Some(None) => IndexState::Unavailable,
		}
	}
}

/// A fully built generation waiting for [`LexicalIndex::install`].
pub struct StagedGeneration(Arc<Generation>);

impl StagedGeneration {
	pub fn state(&self) -> IndexState { self.0.state() }

	pub fn generation(&self) -> &str { &self.0.fingerprint }
}

pub struct LexicalIndex {
	tokenizer: Arc<dyn Tokenizer>,
	current: RwLock<Arc<Generation>>,
}

impl LexicalIndex {
	/// Wrap a corpus without building anything yet.
	pub fn new(corpus: Corpus, tokenizer: Arc<dyn Tokenizer>) -> Self {
		Self { tokenizer, current: RwLock::new(Arc::new(Generation::new(corpus))) }
	}

	pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> { &self.tokenizer }

	/// Build the current generation now instead of on first search.
	pub fn warm_up(&self) -> IndexState {
		let generation = self.current();
		let _ = generation.index(&self.tokenizer);
		generation.state()
	}

	pub fn state(&self) -> IndexState { self.current().state() }

	pub fn corpus_size(&self) -> usize { self.current().corpus.len() }

	pub fn corpus(&self) -> Arc<Corpus> { Arc::clone(&self.current().corpus) }

	pub fn generation(&self) -> String { self.current().fingerprint.clone() }

	pub fn search(&self, query: &str, k: usize, category: Option<&str>) -> SourceOutcome {
		let generation = self.current();
		let Some(index) = generation.index(&self.tokenizer) else {
			return SourceOutcome::Unavailable("lexical index not built".to_string());
		};
		match index.search(query, k, category) {
			Ok(hits) => {
				debug!(hits = hits.len(), k, ?category, "lexical search");
				SourceOutcome::Hits(hits)
			}
			Err(e) => {
				warn!(error = %e, "lexical search failed");
				SourceOutcome::Unavailable(e.to_string())
			}
		}
	}

	/// Build a new generation from `corpus` and swap it in.
	pub fn reload(&self, corpus: Corpus) -> IndexState { self.install(self.stage(corpus)) }

	/// Build a generation without making it visible to searches.
	pub fn stage(&self, corpus: Corpus) -> StagedGeneration {
		let next = Arc::new(Generation::new(corpus));
		let _ = next.index(&self.tokenizer);
		StagedGeneration(next)
	}

	/// Make a staged generation current.
	pub fn install(&self, staged: StagedGeneration) -> IndexState {
		let next = staged.0;
		let state = next.state();
		let fingerprint = next.fingerprint.clone();
		*self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
		info!(generation = %fingerprint, ?state, "lexical index generation swapped");
		state
	}

	fn current(&self) -> Arc<Generation> {
		Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
	}
}
