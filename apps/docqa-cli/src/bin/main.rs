use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use docqa_core::config::{Config, EmbeddingBackend, Settings};
use docqa_core::document::read_document;
use docqa_core::Error;
use docqa_embed::get_default_embedder;
use docqa_engine::RetrievalEngine;

#[derive(Parser)]
#[command(name = "docqa", version, about = "Answer questions from a plain-text document")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Words per chunk (overrides chunking.size)
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Candidates retrieved before reranking (overrides retrieval.top_k)
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Use the hashing embedder instead of loading model weights
    #[arg(long, global = true)]
    fake_embeddings: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Index DOCUMENT and answer a single QUESTION
    Ask { document: PathBuf, question: String },
    /// Index DOCUMENT, then answer questions read from stdin until EOF
    Chat { document: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = apply_overrides(config.settings()?, &cli)?;

    let embedding = settings.embedding.clone();
    let embedder = tokio::task::spawn_blocking(move || get_default_embedder(&embedding)).await??;
    let engine = RetrievalEngine::from_settings(embedder, &settings)?;

    match cli.command {
        Command::Ask { document, question } => {
            index_document(&engine, &document).await?;
            answer(&engine, &question).await?;
        }
        Command::Chat { document } => {
            index_document(&engine, &document).await?;
            chat(&engine).await?;
        }
    }
    Ok(())
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> anyhow::Result<Settings> {
    if let Some(size) = cli.chunk_size { settings.chunking.size = size; }
    if let Some(k) = cli.top_k { settings.retrieval.top_k = k; }
    if cli.fake_embeddings { settings.embedding.backend = EmbeddingBackend::Hash; }
    settings.validate()?;
    Ok(settings)
}

async fn index_document(engine: &RetrievalEngine, path: &Path) -> anyhow::Result<()> {
    let text = read_document(path)?;
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Indexing {}", path.display()));
    pb.enable_steady_tick(Duration::from_millis(100));
    match engine.build_from_document(&text).await {
        Ok(summary) => {
            pb.finish_with_message(format!(
                "Indexed {} words into {} chunks (dim {}, generation {})",
                summary.words, summary.chunks, summary.dim, summary.generation
            ));
            Ok(())
        }
        Err(Error::EmptyCorpus) => {
            pb.abandon_with_message("No text could be extracted from the document");
            Err(Error::EmptyCorpus.into())
        }
        Err(e) => {
            pb.abandon_with_message("Indexing failed");
            Err(e.into())
        }
    }
}

async fn answer(engine: &RetrievalEngine, question: &str) -> anyhow::Result<()> {
    let answer = engine.ask(question).await?;
    let mut out = std::io::stdout().lock();
    for token in answer.into_stream() {
        out.write_all(token.as_bytes())?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

async fn chat(engine: &RetrievalEngine) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("Ask a question (\"exit\" to quit).");
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if matches!(question, "exit" | "quit") { break; }
        match answer(engine, question).await {
            Ok(()) => {}
            Err(e) => match e.downcast_ref::<Error>() {
                Some(Error::EmptyQuery) => continue,
                Some(err) => eprintln!("⚠️  {}", err),
                None => return Err(e),
            },
        }
    }
    Ok(())
}
