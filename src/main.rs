//! # CivicLang CLI (`civic`)
//!
//! ## Usage
//!
//! ```bash
//! civic --config ./config/civic.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `civic sources` | List corpus sources and their load status |
//! | `civic search "<query>"` | Show ranked local documents |
//! | `civic context "<query>"` | Show the prompt context for a query |
//! | `civic ask "<question>"` | Answer a question with local context |
//! | `civic explain <file>` | Explain a civic form (.txt, .rtf, .pdf) |
//! | `civic serve` | Start the HTTP API |
//!
//! Without an `OPENAI_API_KEY` (or with `llm.provider = "disabled"`), `ask`
//! and `explain` print deterministic offline replies.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use civiclang::assist::{Assistant, ChatRequest, DEFAULT_FORM_LANGUAGE};
use civiclang::config::{self, Config};
use civiclang::extract::{extract_form_text, FormKind};
use civiclang::{search, server, sources};

/// CivicLang CLI — a multilingual civic assistant grounded in local
/// Irvine documents.
#[derive(Parser)]
#[command(
    name = "civic",
    about = "CivicLang — a multilingual civic assistant grounded in local Irvine documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/civic.toml`. A missing file at the default
    /// path means "use defaults"; an explicit path must exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug diagnostics to stderr (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

const DEFAULT_CONFIG_PATH: &str = "./config/civic.toml";

#[derive(Subcommand)]
enum Commands {
    /// List corpus sources and their status.
    ///
    /// Loads every configured source and prints whether it was found,
    /// how many documents it contributed, and where it was read from.
    Sources,

    /// Show ranked local documents for a query.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results (defaults to `retrieval.bullet_k`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Show the prompt context for a query.
    Context {
        /// The query string.
        query: String,

        /// Render citation-labeled blocks instead of bullets.
        #[arg(long)]
        labeled: bool,

        /// Number of documents (defaults to `retrieval.bullet_k`, or
        /// `retrieval.chat_k` with `--labeled`).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Answer a question using local context.
    Ask {
        /// The question.
        question: String,

        /// Reply language as an ISO code (`en`, `es`, `ko`, ...), or `auto`.
        #[arg(long)]
        lang: Option<String>,

        /// Use the single-shot prompt with bullet context instead of a
        /// conversational turn.
        #[arg(long, conflicts_with = "lang")]
        single_shot: bool,
    },

    /// Explain a civic form step by step.
    Explain {
        /// Path to a `.txt`, `.rtf`, or `.pdf` file.
        file: PathBuf,

        /// Output language name (e.g. `Spanish`).
        #[arg(long, default_value = DEFAULT_FORM_LANGUAGE)]
        lang: String,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "civiclang=debug" } else { "civiclang=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Search { query, k } => {
            search::run_search(&cfg, &query, k)?;
        }
        Commands::Context { query, labeled, k } => {
            search::run_context(&cfg, &query, labeled, k)?;
        }
        Commands::Ask {
            question,
            lang,
            single_shot,
        } => {
            let assistant = Assistant::from_config(&cfg)?;
            if single_shot {
                println!("{}", assistant.ask(&question).await?);
            } else {
                let reply = assistant
                    .chat(ChatRequest::from_question(question, lang))
                    .await?;
                println!("{}", reply.reply);
                println!();
                println!("language: {}", reply.detected_language);
                if !reply.sources.is_empty() {
                    println!("context:  {}", reply.sources.join(", "));
                }
            }
        }
        Commands::Explain { file, lang } => {
            let text = read_form(&file)?;
            let assistant = Assistant::from_config(&cfg)?;
            println!("{}", assistant.explain_form(&text, &lang).await?);
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => config::load_config(path),
        None => config::load_config_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    }
}

fn read_form(path: &Path) -> anyhow::Result<String> {
    let name = path.file_name().and_then(|n| n.to_str());
    let Some(kind) = FormKind::detect(None, name) else {
        bail!(
            "Unsupported file type: {} (expected .txt, .rtf, or .pdf)",
            path.display()
        );
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(extract_form_text(&bytes, kind)?)
}
