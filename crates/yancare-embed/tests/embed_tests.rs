use yancare_core::config::{EmbeddingConfig, EmbeddingProvider};
use yancare_core::traits::Embedder;
use yancare_embed::{build_embedder, HashingEmbedder, HttpEmbedder};

fn cosine(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }

#[tokio::test]
async fn hashing_embedder_shapes_and_determinism() {
    let embedder = HashingEmbedder::new(384);
    let texts = vec!["月卡多少钱".to_string(), "月卡多少钱".to_string(), "".to_string()];
    let embs = embedder.embed_batch(&texts).await.expect("embed_batch");
    assert_eq!(embs.len(), 3);
    assert_eq!(embs[0].len(), 384, "embedding dim");

    let norm: f32 = embs[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    for (a, b) in embs[0].iter().zip(embs[1].iter()) { assert!((a - b).abs() <= 1e-6); }
    assert!(embs[2].iter().all(|x| *x == 0.0), "empty text embeds to zero");
}

#[test]
fn shared_tokens_mean_closer_vectors() {
    let e = HashingEmbedder::new(256);
    let q = e.embed_text("monthly card price");
    let near = e.embed_text("the monthly card costs 399");
    let far = e.embed_text("downtown store parking");
    assert!(cosine(&q, &near) > cosine(&q, &far));
}

#[test]
fn build_embedder_follows_provider() {
    let cfg = EmbeddingConfig { dimension: 64, ..EmbeddingConfig::default() };
    let e = build_embedder(&cfg).expect("hashing");
    assert_eq!(e.embedder_id(), "hashing:d64");
    assert_eq!(e.dim(), 64);
}

#[test]
fn http_embedder_reads_key_from_env_and_hides_it() {
    std::env::set_var("YANCARE_TEST_EMBED_KEY", "sk-secret");
    let cfg = EmbeddingConfig {
        provider: EmbeddingProvider::Http,
        endpoint: "http://127.0.0.1:9/v1/".to_string(),
        api_key_env: "YANCARE_TEST_EMBED_KEY".to_string(),
        ..EmbeddingConfig::default()
    };
    let e = HttpEmbedder::from_config(&cfg).expect("client");
    assert!(e.has_api_key());
    assert_eq!(e.embedder_id(), "http:text2vec-base-chinese:d384");
    let dbg = format!("{e:?}");
    assert!(!dbg.contains("sk-secret"));
    assert!(dbg.contains("http://127.0.0.1:9/v1\""), "trailing slash trimmed: {dbg}");
}

#[tokio::test]
async fn http_embedder_surfaces_connection_errors() {
    let cfg = EmbeddingConfig {
        provider: EmbeddingProvider::Http,
        endpoint: "http://127.0.0.1:9/v1".to_string(),
        api_key_env: "YANCARE_TEST_UNSET_KEY".to_string(),
        timeout_ms: 200,
        ..EmbeddingConfig::default()
    };
    let e = HttpEmbedder::from_config(&cfg).expect("client");
    assert!(!e.has_api_key());
    assert!(e.embed_batch(&["hi".to_string()]).await.is_err());
    assert!(e.embed_batch(&[]).await.expect("empty batch").is_empty());
}
