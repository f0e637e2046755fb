//! Client for an OpenAI-compatible `/embeddings` endpoint (text2vec, bge and
//! friends behind a local inference server or a hosted API).

use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use yancare_core::config::EmbeddingConfig;
use yancare_core::traits::Embedder;

const BATCH_SIZE: usize = 64;

pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
    id: String,
}

impl std::fmt::Debug for HttpEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbedder")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("dim", &self.dim)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedDataItem>,
}

#[derive(Deserialize)]
struct EmbedDataItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl HttpEmbedder {
    /// The API key is read from the environment variable named by
    /// `api_key_env`; a missing key means unauthenticated requests.
    pub fn from_config(cfg: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).ok().filter(|k| !k.is_empty());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("building embedding http client")?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
            dim: cfg.dimension,
            id: format!("http:{}:d{}", cfg.model, cfg.dimension),
        })
    }

    pub fn has_api_key(&self) -> bool { self.api_key.is_some() }

    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.endpoint);
        let mut request = self.client.post(&url).json(&EmbedRequest { model: &self.model, input: texts });
        if let Some(key) = &self.api_key { request = request.bearer_auth(key); }
        let response = request.send().await.with_context(|| format!("POST {url}"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("embedding request failed ({status}): {body}");
        }
        let mut parsed: EmbedResponse = response.json().await.context("decoding embedding response")?;
        if parsed.data.len() != texts.len() {
            bail!("embedding response has {} vectors for {} inputs", parsed.data.len(), texts.len());
        }
        parsed.data.sort_by_key(|d| d.index);
        let mut out = Vec::with_capacity(parsed.data.len());
        for item in parsed.data {
            if item.embedding.len() != self.dim {
                bail!("embedding dimension {} does not match configured {}", item.embedding.len(), self.dim);
            }
            out.push(item.embedding);
        }
        Ok(out)
    }
}

impl Embedder for HttpEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
        Box::pin(async move {
            let mut all = Vec::with_capacity(texts.len());
            for chunk in texts.chunks(BATCH_SIZE) {
                debug!(n = chunk.len(), model = %self.model, "embedding batch");
                all.extend(self.embed_chunk(chunk).await?);
            }
            Ok(all)
        })
    }
}
