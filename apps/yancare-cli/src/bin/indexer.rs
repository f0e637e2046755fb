use std::env;
use std::path::PathBuf;

use tracing::info;

use yancare_cli::{init_tracing, load_config, load_corpus};
use yancare_core::config::expand_path;
use yancare_embed::build_embedder;
use yancare_vector::LanceVectorWriter;

/// Embed a corpus snapshot and (re)write the LanceDB knowledge table.
///
/// `yancare-indexer [corpus_path] [--table NAME]`
fn main() -> anyhow::Result<()> {
    init_tracing();
    let cfg = load_config()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut corpus_path = None; let mut table = cfg.data.lancedb_table.clone();
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--table" | "-t" => { match args.get(i + 1) { Some(t) => { table = t.clone(); i += 1; } None => { eprintln!("Error: --table requires a name"); std::process::exit(1); } } }
        a if !a.starts_with('-') => corpus_path = Some(a.to_string()), _ => {} } i += 1; }

    let corpus = load_corpus(&cfg, corpus_path.as_deref())?;
    let lancedb_path: PathBuf = expand_path(&cfg.data.lancedb_dir);
    std::fs::create_dir_all(&lancedb_path)?;
    let embedder = build_embedder(&cfg.embedding)?;
    info!(documents = corpus.len(), table = %table, dir = %lancedb_path.display(), "indexing corpus");
    let written = tokio::runtime::Runtime::new()?.block_on(async {
        let writer = LanceVectorWriter::new(&lancedb_path, &table).await?;
        writer.write(&corpus, embedder.as_ref()).await
    })?;
    println!("Indexed {} documents into {}/{}", written, lancedb_path.display(), table);
    Ok(())
}
