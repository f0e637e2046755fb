//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_RETRIEVAL__RRF_K=30`). Every section
//! of [`AssistantConfig`] has defaults, so an empty figment is a valid config.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::tokenize::TokenizerKind;

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Load `config.toml` and the env-specific overlay from `dir`.
    pub fn load_from(dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AssistantConfig::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: dir.to_path_buf() };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    /// Directory relative data paths are resolved against.
    pub fn base_dir(&self) -> &Path { &self.base_dir }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed config with `data` paths resolved against [`Self::base_dir`].
    pub fn assistant(&self) -> anyhow::Result<AssistantConfig> {
        let mut cfg: AssistantConfig = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract assistant config: {}", e))?;
        cfg.validate()?;
        cfg.data.resolve_paths(&self.base_dir);
        Ok(cfg)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        match env {
            "prod" | "production" => {
                // the hashing embedder is for development only
                let provider: EmbeddingProvider = self.get("embedding.provider").unwrap_or_default();
                let backend: SemanticBackendKind = self.get("semantic.backend").unwrap_or_default();
                if backend != SemanticBackendKind::Disabled && provider == EmbeddingProvider::Hashing {
                    return Err(Error::InvalidConfig("production requires embedding.provider = \"http\"".into()).into());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub data: DataConfig,
    pub intent: IntentConfig,
    pub retrieval: RetrievalConfig,
    pub rerank: RerankConfig,
    pub semantic: SemanticConfig,
    pub embedding: EmbeddingConfig,
}

impl AssistantConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let r = &self.retrieval;
        if r.candidate_multiplier == 0 {
            return Err(Error::InvalidConfig("retrieval.candidate_multiplier must be >= 1".into()));
        }
        if r.default_results > r.max_results || r.knowledge_results > r.max_results {
            return Err(Error::InvalidConfig("retrieval result defaults exceed retrieval.max_results".into()));
        }
        if r.max_expansions == 0 {
            return Err(Error::InvalidConfig("retrieval.max_expansions must be >= 1".into()));
        }
        if self.rerank.fused_weight < 0.0 || self.rerank.overlap_weight < 0.0 {
            return Err(Error::InvalidConfig("rerank weights must be non-negative".into()));
        }
        if self.embedding.dimension == 0 {
            return Err(Error::InvalidConfig("embedding.dimension must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub corpus_path: String,
    pub lancedb_dir: String,
    pub lancedb_table: String,
}

impl DataConfig {
    /// Expand `~`/`$VAR` and anchor relative paths at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        self.corpus_path = resolve_with_base(base, &self.corpus_path).to_string_lossy().into_owned();
        self.lancedb_dir = resolve_with_base(base, &self.lancedb_dir).to_string_lossy().into_owned();
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            corpus_path: "data/knowledge".to_string(),
            lancedb_dir: "data/indexes/lancedb".to_string(),
            lancedb_table: "knowledge".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Zh,
    En,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    pub language: Language,
    /// Optional override of the consult-intent → category label mapping,
    /// keyed by intent name (e.g. `consult_card = "cards"`).
    pub categories: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub tokenizer: TokenizerKind,
    pub default_results: usize,
    pub knowledge_results: usize,
    pub max_results: usize,
    pub rrf_k: u32,
    pub candidate_multiplier: usize,
    pub use_reranking: bool,
    pub category_filter: bool,
    pub query_expansion: bool,
    pub max_expansions: usize,
    /// Synonym table for query expansion; empty means the built-in table.
    pub synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerKind::Bigram,
            default_results: 5,
            knowledge_results: 8,
            max_results: 50,
            rrf_k: 60,
            candidate_multiplier: 2,
            use_reranking: true,
            category_filter: true,
            query_expansion: false,
            max_expansions: 3,
            synonyms: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    pub fused_weight: f64,
    pub overlap_weight: f64,
    pub faq_boost: f64,
}

impl Default for RerankConfig {
    fn default() -> Self { Self { fused_weight: 0.7, overlap_weight: 0.3, faq_boost: 0.0 } }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticBackendKind {
    #[default]
    Memory,
    Lancedb,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub backend: SemanticBackendKind,
    pub timeout_ms: u64,
}

impl Default for SemanticConfig {
    fn default() -> Self { Self { backend: SemanticBackendKind::Memory, timeout_ms: 2000 } }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    #[default]
    Hashing,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub dimension: usize,
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hashing,
            dimension: 384,
            endpoint: "http://127.0.0.1:8080/v1".to_string(),
            model: "text2vec-base-chinese".to_string(),
            api_key_env: "EMBEDDING_API_KEY".to_string(),
            timeout_ms: 1500,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
