//! Command-line front end: build a constellation from a JSON article file,
//! emit the presentation view, and optionally answer a question over it.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use constellation_chat::{Analyst, Embedder, RemoteMemoryStore, RetrievalSettings};
use constellation_common::{Article, ColorMode, Config};
use constellation_graph::{render_view, Constellation, GraphSettings};

#[derive(Parser, Debug)]
#[command(name = "constellation", about = "Semantic news graph builder and analyst")]
struct Args {
    /// JSON file containing the article batch (array of articles)
    #[arg(long)]
    articles: PathBuf,

    /// Similarity above which a pair is strongly connected
    #[arg(long, default_value_t = constellation_graph::builder::DEFAULT_STRONG_THRESHOLD)]
    threshold: f64,

    /// Node coloring: cluster, sentiment or politics
    #[arg(long, default_value = "cluster")]
    mode: ColorMode,

    /// Write the graph view JSON here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Question to answer over the constellation
    #[arg(long)]
    ask: Option<String>,

    /// Articles of context per question
    #[arg(long, default_value_t = constellation_chat::retriever::DEFAULT_TOP_K)]
    top_k: usize,

    /// Minimum query-article similarity for retrieval
    #[arg(long, default_value_t = constellation_chat::retriever::DEFAULT_MIN_SCORE)]
    min_score: f64,

    /// Persist the session's articles to the configured memory store
    #[arg(long)]
    remember: bool,

    /// Memory namespace for this session
    #[arg(long, default_value = "default")]
    namespace: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("constellation=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    config.log_redacted();

    let raw = fs::read_to_string(&args.articles)
        .with_context(|| format!("reading {}", args.articles.display()))?;
    let articles: Vec<Article> =
        serde_json::from_str(&raw).context("parsing article batch JSON")?;
    info!(count = articles.len(), "Loaded article batch");

    let embedder = Arc::new(Embedder::new(
        &config.embedding_api_key,
        &config.embedding_base_url,
        &config.embedding_model,
    ));

    let settings = GraphSettings {
        strong_threshold: args.threshold,
        ..GraphSettings::default()
    };
    let constellation = Constellation::build(embedder.as_ref(), articles, &settings).await?;

    let batch: Vec<Article> = constellation
        .articles
        .iter()
        .map(|e| e.article.clone())
        .collect();
    let view = render_view(&constellation.graph, &batch, args.mode);
    let json = serde_json::to_string_pretty(&view)?;
    match &args.out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Graph view written");
        }
        None => println!("{json}"),
    }

    if args.ask.is_none() && !args.remember {
        return Ok(());
    }

    let mut generator = OpenAi::new(&config.generation_api_key, &config.generation_model);
    if let Some(base_url) = &config.generation_base_url {
        generator = generator.with_base_url(base_url);
    }

    let mut analyst =
        Analyst::new(embedder, Arc::new(generator)).with_settings(RetrievalSettings {
            top_k: args.top_k,
            min_score: args.min_score,
        });
    if let Some(memory_url) = &config.memory_api_url {
        let store = RemoteMemoryStore::new(memory_url, config.memory_api_key.clone());
        analyst = analyst.with_memory(Arc::new(store), &args.namespace);
    }

    if args.remember {
        let stored = analyst.memorize(&constellation).await?;
        info!(stored, namespace = args.namespace.as_str(), "Session memorized");
    }

    if let Some(question) = &args.ask {
        let outcome = analyst.answer(&constellation, &[], question).await?;
        println!("{}", outcome.response);
        if outcome.context_used {
            for source in &outcome.sources {
                let article = &constellation.articles[source.index].article;
                println!("  [{:.0}%] {}", source.score * 100.0, article.url);
            }
        }
    }

    Ok(())
}
