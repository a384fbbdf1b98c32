//! # pdfchat CLI
//!
//! Ask questions about a PDF document. Answers are generated by a chat model
//! from the passages of the document most similar to the question.
//!
//! ## Commands
//!
//! - `pdfchat ask <PDF> <QUESTION>...` - Answer one question
//! - `pdfchat chat <PDF>` - Interactive conversation about a document
//! - `pdfchat inspect <PDF>` - Show extracted pages and chunks (no network)
//! - `pdfchat search <PDF> <QUERY>` - Show the most similar passages
//! - `pdfchat demo <OUT>` - Write a small sample PDF
//!
//! ## Examples
//!
//! ```bash
//! export OPENAI_API_KEY=...
//! pdfchat ask report.pdf "What are the key findings?"
//!
//! # Retrieval only, without an API key
//! pdfchat --offline search report.pdf "budget" --format json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdfchat_core::{Chunk, Embedder, LanguageModel, PageBlock, Role, ScoredChunk};
use pdfchat_embed::{HashEmbedder, OpenAiEmbedder};
use pdfchat_llm::OpenAiChatModel;
use pdfchat_session::{Answerer, AskReply, Ingestor, PdfChat, Session, SUGGESTED_QUESTIONS};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;

use config::Config;

/// Pages of the document written by `pdfchat demo`.
const DEMO_PAGES: &[&str] = &["Alpha content.", "Beta content.", "Gamma content."];

#[derive(Parser)]
#[command(name = "pdfchat")]
#[command(about = "Chat with a PDF document using retrieval-augmented generation")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/pdfchat/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Embed locally instead of calling the embedding API
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question about a PDF
    Ask {
        /// PDF file
        pdf: PathBuf,

        /// Question (remaining words are joined)
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Start an interactive conversation about a PDF
    Chat {
        /// PDF file
        pdf: PathBuf,
    },

    /// Show extracted pages and chunks without calling any provider
    Inspect {
        /// PDF file
        pdf: PathBuf,
    },

    /// Show the passages most similar to a query
    Search {
        /// PDF file
        pdf: PathBuf,

        /// Query string
        query: String,

        /// Maximum results (default: retrieval.top_k)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Write a three-page sample PDF
    Demo {
        /// Output file
        out: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Output structure for a single answer.
#[derive(Serialize)]
struct AskOutput {
    question: String,
    answer: String,
    answered: bool,
    sources: Vec<SourceItem>,
}

/// Output structure for search results.
#[derive(Serialize)]
struct SearchOutput {
    query: String,
    results: Vec<SourceItem>,
}

#[derive(Serialize)]
struct SourceItem {
    page: u32,
    chunk: u32,
    score: f32,
    content: String,
}

impl From<&ScoredChunk> for SourceItem {
    fn from(hit: &ScoredChunk) -> Self {
        Self {
            page: hit.chunk.source_page,
            chunk: hit.chunk.sequence_index,
            score: hit.score,
            content: truncate(&hit.chunk.text, 200),
        }
    }
}

/// Output structure for inspect.
#[derive(Serialize)]
struct InspectOutput {
    file: String,
    pages: Vec<PageItem>,
    chunks: Vec<ChunkItem>,
}

#[derive(Serialize)]
struct PageItem {
    page: u32,
    chars: usize,
    preview: String,
}

impl From<&PageBlock> for PageItem {
    fn from(block: &PageBlock) -> Self {
        Self {
            page: block.page_number,
            chars: block.text.chars().count(),
            preview: truncate(&block.text, 80),
        }
    }
}

#[derive(Serialize)]
struct ChunkItem {
    index: u32,
    page: u32,
    chars: usize,
}

impl From<&Chunk> for ChunkItem {
    fn from(chunk: &Chunk) -> Self {
        Self {
            index: chunk.sequence_index,
            page: chunk.source_page,
            chars: chunk.text.chars().count(),
        }
    }
}

fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Embedder selected by `--offline` and the provider config.
fn create_embedder(config: &Config, offline: bool) -> Result<Arc<dyn Embedder>> {
    if offline {
        info!("Using local feature-hash embeddings");
        return Ok(Arc::new(HashEmbedder::new()));
    }

    let provider = &config.provider;
    let embedder = OpenAiEmbedder::new(
        provider.api_key()?,
        provider.embedding_model.as_str(),
        provider.embedding_dimension,
    )
    .with_base_url(provider.base_url.as_str())
    .with_timeout(provider.request_timeout());
    Ok(Arc::new(embedder))
}

fn create_model(config: &Config) -> Result<Arc<dyn LanguageModel>> {
    let provider = &config.provider;
    let model = OpenAiChatModel::new(provider.api_key()?, provider.chat_model.as_str())
        .with_base_url(provider.base_url.as_str())
        .with_temperature(provider.temperature)
        .with_max_tokens(provider.max_tokens)
        .with_timeout(provider.request_timeout());
    Ok(Arc::new(model))
}

fn create_ingestor(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Ingestor> {
    Ingestor::pdf(embedder, config.chunk_config(), config.index_config())
        .context("Invalid chunking configuration")
}

/// Create the full chat stack.
fn create_chat(config: &Config, offline: bool) -> Result<PdfChat> {
    let ingestor = create_ingestor(config, create_embedder(config, offline)?)?;
    let answerer = Answerer::new(create_model(config)?, config.answer_config())
        .context("Invalid retrieval configuration")?;
    Ok(PdfChat::new(ingestor, answerer))
}

async fn ingest(chat: &mut PdfChat, path: &Path) -> Result<()> {
    let bytes = read_pdf(path)?;
    let report = chat.ingest(&bytes).await;
    if !report.success {
        anyhow::bail!("{}", report.message);
    }
    println!("{}", report.message);
    Ok(())
}

fn print_reply(reply: &AskReply) {
    println!("{}", reply.answer);
    let pages = reply.source_pages();
    if !pages.is_empty() {
        let pages: Vec<String> = pages.iter().map(u32::to_string).collect();
        println!("\nSources: page {}", pages.join(", "));
    }
}

fn print_history(chat: &PdfChat) {
    if chat.history().is_empty() {
        println!("No conversation yet.");
        return;
    }
    for turn in chat.history() {
        let who = match turn.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
        };
        println!("{who}: {}", turn.text);
    }
}

async fn run_chat(chat: &mut PdfChat, pdf: &Path) -> Result<()> {
    use std::io::Write as _;

    ingest(chat, pdf).await?;
    println!("\nTry these sample questions:");
    for question in SUGGESTED_QUESTIONS {
        println!("  - {question}");
    }
    println!("\nCommands: /reset, /load <PDF>, /history, /quit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("", _) => {}
            ("/quit" | "/exit", _) => break,
            ("/reset", _) => {
                chat.reset();
                println!("Session cleared. Load a PDF with /load <PDF>.");
            }
            ("/history", _) => print_history(chat),
            ("/load", "") => println!("Usage: /load <PDF>"),
            ("/load", path) => {
                if let Err(e) = ingest(chat, Path::new(path)).await {
                    println!("{e:#}");
                }
            }
            _ => {
                let reply = chat.ask(line).await;
                print_reply(&reply);
                println!();
            }
        }
    }
    Ok(())
}

/// `--verbose` wins, then `RUST_LOG`, then the configured level.
fn log_filter(verbose: bool, level: &str) -> Result<EnvFilter> {
    if verbose {
        return EnvFilter::try_new("debug").context("Invalid log level: debug");
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context(format!("Invalid log level: {level}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(Some(path.clone()))
            .context(format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load().context("Failed to load config")?
    };

    // Setup logging
    let filter = log_filter(cli.verbose, &config.logging.level)?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Ask { pdf, question } => {
            let question = question.join(" ");
            let mut chat = create_chat(&config, cli.offline)?;

            let bytes = read_pdf(&pdf)?;
            let report = chat.ingest(&bytes).await;
            if !report.success {
                anyhow::bail!("{}", report.message);
            }
            info!("{}", report.message);

            let reply = chat.ask(&question).await;

            match cli.format {
                OutputFormat::Json => {
                    let output = AskOutput {
                        question,
                        answer: reply.answer.clone(),
                        answered: reply.answered,
                        sources: reply.sources.iter().map(SourceItem::from).collect(),
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => print_reply(&reply),
            }

            if !reply.answered {
                std::process::exit(1);
            }
        }

        Commands::Chat { pdf } => {
            let mut chat = create_chat(&config, cli.offline)?;
            run_chat(&mut chat, &pdf).await?;
        }

        Commands::Inspect { pdf } => {
            // Preparing never embeds, so the local embedder is enough
            let ingestor = create_ingestor(&config, Arc::new(HashEmbedder::new()))?;
            let bytes = read_pdf(&pdf)?;
            let prepared = ingestor
                .prepare(&bytes)
                .await
                .context(format!("Failed to process {}", pdf.display()))?;

            match cli.format {
                OutputFormat::Json => {
                    let output = InspectOutput {
                        file: pdf.display().to_string(),
                        pages: prepared.pages.iter().map(PageItem::from).collect(),
                        chunks: prepared.chunks.iter().map(ChunkItem::from).collect(),
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    let chunk_config = ingestor.chunk_config();
                    println!("File: {}", pdf.display());
                    println!(
                        "Pages: {}  Chunks: {}  (size {}, overlap {})\n",
                        prepared.pages.len(),
                        prepared.chunks.len(),
                        chunk_config.chunk_size,
                        chunk_config.overlap
                    );
                    for page in &prepared.pages {
                        let chunks = prepared
                            .chunks
                            .iter()
                            .filter(|c| c.source_page == page.page_number)
                            .count();
                        println!(
                            "Page {:>3}: {:>6} chars, {:>3} chunks  {}",
                            page.page_number,
                            page.text.chars().count(),
                            chunks,
                            truncate(&page.text, 60)
                        );
                    }
                }
            }
        }

        Commands::Search { pdf, query, limit } => {
            let limit = limit.unwrap_or(config.retrieval.top_k);
            let ingestor = create_ingestor(&config, create_embedder(&config, cli.offline)?)?;

            let bytes = read_pdf(&pdf)?;
            let mut session = Session::new();
            ingestor
                .ingest_into(&mut session, &bytes)
                .await
                .context(format!("Failed to index {}", pdf.display()))?;
            let index = session
                .index()
                .context("Index missing after successful ingest")?;

            let results = index
                .search(&query, limit)
                .await
                .context("Search failed")?;

            match cli.format {
                OutputFormat::Json => {
                    let output = SearchOutput {
                        query: query.clone(),
                        results: results.iter().map(SourceItem::from).collect(),
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    let stats = index.stats();
                    println!(
                        "Indexed {} chunks from {} pages with {} ({} dims)",
                        stats.chunk_count, stats.page_count, stats.model, stats.dimension
                    );
                    println!("Query: {query}\n");
                    if results.is_empty() {
                        println!("No results found.");
                    } else {
                        for (i, result) in results.iter().enumerate() {
                            println!(
                                "{}. page {} (score: {:.3})",
                                i + 1,
                                result.chunk.source_page,
                                result.score
                            );
                            println!("   {}", truncate(&result.chunk.text, 100));
                            println!();
                        }
                    }
                }
            }
        }

        Commands::Demo { out } => {
            let bytes = pdfchat_extract::fixture::text_pdf(DEMO_PAGES)
                .context("Failed to build sample PDF")?;
            std::fs::write(&out, bytes)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote {}-page sample PDF to {}", DEMO_PAGES.len(), out.display());
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&config)
                            .context("Failed to serialize config")?
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "{}",
                        toml::to_string_pretty(&config).context("Failed to serialize config")?
                    );
                }
            },
            ConfigAction::Init => {
                println!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("Could not determine config directory");
                }
            }
        },
    }

    Ok(())
}

/// Collapse newlines and cut to `max_len` characters, adding an ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ").replace('\r', "");
    if s.chars().count() <= max_len {
        s
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
