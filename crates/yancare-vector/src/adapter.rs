//! Uniform face of the semantic source: bounded latency, distances turned
//! into similarities, and every failure reported as "unavailable" so the
//! orchestrator can fall back to lexical-only results.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, warn};

use yancare_core::traits::SemanticBackend;
use yancare_core::{SourceHit, SourceKind, SourceOutcome};

pub struct SemanticAdapter {
	backend: RwLock<Option<Arc<dyn SemanticBackend>>>,
	timeout: Duration,
}

impl SemanticAdapter {
	pub fn new(backend: Arc<dyn SemanticBackend>, timeout: Duration) -> Self {
		Self { backend: RwLock::new(Some(backend)), timeout }
	}

	pub fn disabled() -> Self { Self { backend: RwLock::new(None), timeout: Duration::ZERO } }

	pub fn is_enabled(&self) -> bool { self.backend().is_some() }

	pub fn backend_name(&self) -> Option<String> { self.backend().map(|b| b.name().to_string()) }

	/// Swap the backend; in-flight searches finish on the old one.
	pub fn replace_backend(&self, backend: Option<Arc<dyn SemanticBackend>>) {
		*self.backend.write().unwrap_or_else(PoisonError::into_inner) = backend;
	}

	pub async fn search(&self, query: &str, k: usize, category: Option<&str>) -> SourceOutcome {
		let Some(backend) = self.backend() else {
			return SourceOutcome::Unavailable("semantic backend not configured".to_string());
		};
		if k == 0 { return SourceOutcome::Hits(Vec::new()); }
		let mut matches = match tokio::time::timeout(self.timeout, backend.search(query, k, category)).await {
			Err(_) => {
				warn!(backend = backend.name(), timeout_ms = self.timeout.as_millis() as u64, "semantic search timed out");
				return SourceOutcome::Unavailable("semantic search timed out".to_string());
			}
			Ok(Err(e)) => {
				warn!(backend = backend.name(), error = %e, "semantic search failed");
				return SourceOutcome::Unavailable(e.to_string());
			}
			Ok(Ok(matches)) => matches,
		};
		if let Some(c) = category { matches.retain(|m| m.document.category() == c); }
		matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
		matches.truncate(k);
		let hits: Vec<SourceHit> = matches
			.into_iter()
			.map(|m| SourceHit { score: distance_to_similarity(m.distance), document: m.document, source: SourceKind::Semantic })
			.collect();
		debug!(backend = backend.name(), hits = hits.len(), k, ?category, "semantic search");
		SourceOutcome::Hits(hits)
	}

	fn backend(&self) -> Option<Arc<dyn SemanticBackend>> {
		self.backend.read().unwrap_or_else(PoisonError::into_inner).clone()
	}
}

/// Monotonically decreasing map from a non-negative distance to `(0, 1]`.
pub fn distance_to_similarity(distance: f32) -> f32 { 1.0 / (1.0 + distance.max(0.0)) }

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn similarity_is_monotone() {
		assert_eq!(distance_to_similarity(0.0), 1.0);
		assert_eq!(distance_to_similarity(1.0), 0.5);
		assert!(distance_to_similarity(0.2) > distance_to_similarity(0.3));
		assert_eq!(distance_to_similarity(-1.0), 1.0);
	}
}
