//! Shared setup for the operator binaries.
use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use yancare_core::config::{expand_path, AssistantConfig, Config};
use yancare_core::Corpus;

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

pub fn load_config() -> anyhow::Result<AssistantConfig> {
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    config.assistant()
}

/// Load the corpus from `path`, or from `data.corpus_path` when absent.
pub fn load_corpus(cfg: &AssistantConfig, path: Option<&str>) -> anyhow::Result<Corpus> {
    let path: PathBuf = expand_path(path.unwrap_or(cfg.data.corpus_path.as_str()));
    Corpus::load(&path).with_context(|| format!("loading corpus from {}", path.display()))
}
