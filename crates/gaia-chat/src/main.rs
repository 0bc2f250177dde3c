//! Ask the agent one question, optionally with uploaded files, and print the answer.
//!
//! Reads the API key from the `OPENROUTER_KEY` environment variable.
//!
//! # Examples
//!
//! ```sh
//! # Plain question
//! gaia-chat --question "What is the capital of France?"
//!
//! # Question about files
//! gaia-chat --question "Summarize these" --file report.pdf --file notes.md
//!
//! # Files only, with a transcript written to ./exports
//! gaia-chat --file sales.csv --export exports
//!
//! # Pipe the question from stdin
//! cat question.txt | gaia-chat --stdin --model google/gemini-2.5-flash
//! ```

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use gaia_chat::prelude::*;
use gaia_chat::session::ERROR_PREFIX;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Ask the agent one question and print the answer.
///
/// Reads the API key from the OPENROUTER_KEY environment variable.
#[derive(Parser)]
#[command(name = "gaia-chat")]
struct Cli {
    // ── Input ──────────────────────────────────────────────────
    /// Question to ask
    #[arg(long, short)]
    question: Option<String>,

    /// Read the question from stdin (appended after --question)
    #[arg(long)]
    stdin: bool,

    /// File to upload with the question (repeatable)
    #[arg(long = "file", short = 'f')]
    files: Vec<PathBuf>,

    // ── Agent ──────────────────────────────────────────────────
    /// Model to use
    #[arg(long, default_value = gaia_chat::DEFAULT_MODEL)]
    model: String,

    /// System prompt for the agent
    #[arg(long)]
    system: Option<String>,

    /// Maximum tokens in the response
    #[arg(long, default_value_t = 4096)]
    max_tokens: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.3)]
    temperature: f32,

    /// Retries for transient API failures
    #[arg(long, default_value_t = 2)]
    retries: u32,

    // ── Output ─────────────────────────────────────────────────
    /// Write a Markdown transcript into this directory
    #[arg(long)]
    export: Option<PathBuf>,
}

fn read_stdin_content() -> Result<String, String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("failed to read stdin: {e}"))?;
    Ok(buf)
}

fn build_question(cli: &Cli) -> Result<String, String> {
    let piped = if cli.stdin {
        Some(read_stdin_content()?)
    } else {
        None
    };

    Ok(match (&cli.question, piped) {
        (Some(q), Some(p)) => format!("{q}\n\n{p}"),
        (Some(q), None) => q.clone(),
        (None, Some(p)) => p,
        (None, None) => String::new(),
    })
}

fn build_config(cli: &Cli) -> ChatConfig {
    let mut config = ChatConfig::default()
        .with_model(&cli.model)
        .with_export_dir(cli.export.clone().unwrap_or_else(|| PathBuf::from(".")));
    if let Some(ref system) = cli.system {
        config = config.with_system_prompt(system);
    }
    config.max_tokens = cli.max_tokens;
    config.temperature = cli.temperature;
    config.retry = RetryConfig::with_retries(cli.retries);
    config
}

async fn run(cli: &Cli) -> Result<String, String> {
    let question = build_question(cli)?;
    if question.trim().is_empty() && cli.files.is_empty() {
        return Err("provide --question, --stdin, or at least one --file".to_string());
    }

    let config = build_config(cli);
    let agent = OpenRouterAgent::new(ChatConfig::api_key_from_env()?, &config)?;
    let session = ChatSession::new(Arc::new(agent), config.export_dir.clone());

    let (_, history) = session
        .process(&question, History::new(), &cli.files)
        .await;
    let turn = history
        .last()
        .ok_or_else(|| "nothing to send: all uploaded files were skipped".to_string())?;

    if cli.export.is_some() {
        let path = session.export(&history)?;
        eprintln!("Transcript written to {}", path.display());
    }

    answer_of(turn)
}

/// The answer text, or the agent failure recorded in the turn.
fn answer_of(turn: &Turn) -> Result<String, String> {
    match turn.response.strip_prefix(ERROR_PREFIX) {
        Some(error) => Err(error.to_string()),
        None => Ok(turn.response.clone()),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(answer) => println!("{answer}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
