//! GAIA Q&A chatbot served to the browser.
//!
//! Starts the web server in front of an OpenRouter-backed agent. Questions
//! and file uploads come in from the browser, run through the gaia-chat
//! pipeline, and the updated conversation is sent back.
//!
//! # Usage
//!
//! ```bash
//! OPENROUTER_KEY=sk-... cargo run -p gaia-chat-web
//! OPENROUTER_KEY=sk-... cargo run -p gaia-chat-web -- --model google/gemini-2.5-flash
//! OPENROUTER_KEY=sk-... cargo run -p gaia-chat-web -- --port 8080 --export-dir exports
//! ```
//!
//! Then open the printed URL in a browser, or use curl:
//!
//! ```bash
//! curl -F question="Summarize this" -F files=@report.pdf http://localhost:7860/api/ask
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use gaia_chat::prelude::*;
use gaia_chat_web::{WebConfig, spawn_web};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Browser-based Q&A chatbot.
#[derive(Parser)]
#[command(about = "Q&A chatbot with a browser-based UI")]
struct Args {
    /// LLM model to use.
    #[arg(long, default_value = gaia_chat::DEFAULT_MODEL)]
    model: String,

    /// System prompt for the agent.
    #[arg(long)]
    system: Option<String>,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the web UI server.
    #[arg(long, default_value_t = 7860)]
    port: u16,

    /// Directory for Markdown exports.
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Directory for in-flight uploads (default: system temp dir).
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Serve a static frontend build from this directory instead of the
    /// embedded page.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Origin allowed to call the API cross-origin (repeatable).
    #[arg(long = "allow-origin")]
    allowed_origins: Vec<String>,

    /// Retries for transient API failures.
    #[arg(long, default_value_t = 2)]
    retries: u32,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // 1. Agent collaborator.
    let mut config = ChatConfig::default()
        .with_model(&args.model)
        .with_export_dir(&args.export_dir);
    if let Some(ref system) = args.system {
        config = config.with_system_prompt(system);
    }
    config.retry = RetryConfig::with_retries(args.retries);

    let agent = OpenRouterAgent::new(ChatConfig::api_key_from_env()?, &config)?;
    info!("Agent ready (model: {})", agent.model());

    // 2. Session shared by every request.
    let session = Arc::new(ChatSession::new(Arc::new(agent), config.export_dir.clone()));

    // 3. Web server.
    let mut web_config = WebConfig {
        bind_addr: (args.host, args.port).into(),
        static_dir: args.static_dir,
        allowed_origins: args.allowed_origins,
        ..Default::default()
    };
    if let Some(dir) = args.upload_dir {
        web_config.upload_dir = dir;
    }

    let (addr, _history) = spawn_web(session, web_config)
        .await
        .map_err(|e| format!("failed to start web server: {e}"))?;
    println!("{}: http://{addr}", gaia_chat::APP_TITLE);

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {e}"))?;
    info!("Shutting down");
    Ok(())
}
