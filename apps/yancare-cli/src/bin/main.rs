use std::env;

use yancare_cli::{init_tracing, load_config, load_corpus};
use yancare_hybrid::RetrievalPipeline;
use yancare_intent::IntentClassifier;

const USAGE: &str = "Usage: yancare <classify|retrieve|search|answer|stats> [args...]
  classify <text>
  retrieve <text> [n]
  search <text> [category|-] [n]
  answer <text>
  stats";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() { eprintln!("{USAGE}"); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

fn text_arg(args: &[String]) -> String {
    args.first().cloned().unwrap_or_else(|| { eprintln!("{USAGE}"); std::process::exit(1) })
}

fn count_arg(args: &[String], i: usize, default: usize) -> anyhow::Result<usize> {
    match args.get(i) {
        Some(s) => s.parse().map_err(|_| anyhow::anyhow!("expected a result count, got '{}'", s)),
        None => Ok(default),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cfg = load_config()?;
    let (cmd, args) = parse_args();

    if cmd == "classify" {
        let classifier = IntentClassifier::from_config(&cfg.intent);
        let result = classifier.classify(&text_arg(&args));
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "intent": result.intent,
            "confidence": result.confidence,
            "needs_retrieval": classifier.needs_retrieval(result.intent),
            "category": classifier.category_for(result.intent),
        }))?);
        return Ok(());
    }

    let corpus = load_corpus(&cfg, None)?;
    tokio::runtime::Runtime::new()?.block_on(async {
        let pipeline = RetrievalPipeline::from_config(&cfg, corpus).await?;
        match cmd.as_str() {
            "retrieve" => {
                let n = count_arg(&args, 1, cfg.retrieval.default_results)?;
                let out = pipeline.retrieve(&text_arg(&args), n, cfg.retrieval.use_reranking).await;
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            "search" => {
                let category = args.get(1).filter(|c| c.as_str() != "-").map(String::as_str);
                let n = count_arg(&args, 2, cfg.retrieval.default_results)?;
                let out = pipeline.search(&text_arg(&args), n, category, cfg.retrieval.use_reranking).await;
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            "answer" => {
                let out = pipeline.answer(&text_arg(&args)).await;
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            "stats" => {
                let state = pipeline.lexical().warm_up();
                println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                    "corpus_size": pipeline.corpus_size(),
                    "generation": pipeline.lexical().generation(),
                    "lexical_state": format!("{state:?}"),
                    "semantic_backend": pipeline.semantic().backend_name(),
                }))?);
            }
            _ => { eprintln!("Unknown command: {}\n{USAGE}", cmd); std::process::exit(1); }
        }
        Ok::<(), anyhow::Error>(())
    })
}
