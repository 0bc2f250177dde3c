//! Q&A chat core for a pre-built conversational agent.
//!
//! `gaia-chat` turns a typed question plus any uploaded files into a single
//! prompt, hands it to an opaque agent collaborator, and records the answer in
//! a caller-owned conversation history. The agent itself (tool routing,
//! reasoning, planning) lives behind the [`Agent`](agent::Agent) trait; an
//! OpenRouter-backed implementation is provided in [`client`].
//!
//! # Getting started
//!
//! ```ignore
//! use std::sync::Arc;
//! use gaia_chat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let api_key = std::env::var("OPENROUTER_KEY").map_err(|_| "OPENROUTER_KEY not set")?;
//!     let config = ChatConfig::default();
//!     let agent = OpenRouterAgent::new(api_key, &config)?;
//!     let session = ChatSession::new(Arc::new(agent), config.export_dir.clone());
//!
//!     let (_, history) = session
//!         .process("Summarize this file", History::default(), &["notes.md".into()])
//!         .await;
//!     println!("{}", history.last().map_or("", |t| t.response.as_str()));
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! ```text
//! files ──encode_files──▶ fragments ─┐
//!                                     ├─compose──▶ prompt ──ask──▶ Agent ──▶ Turn ──▶ History
//! question ───────────────────────────┘
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`files`] | [`FileKind`](files::FileKind) classification and per-file prompt fragments |
//! | [`prompt`] | [`PromptContext`](prompt::PromptContext) composition gate |
//! | [`agent`] | [`Agent`](agent::Agent) trait and the invocation adapter |
//! | [`history`] | Append-only [`History`](history::History) of [`Turn`](history::Turn)s |
//! | [`export`] | Markdown transcript export |
//! | [`session`] | [`ChatSession`](session::ChatSession) tying the pipeline together |
//! | [`client`] | OpenRouter chat-completions collaborator |
//! | [`retry`] | Transient-error detection and backoff |

pub mod agent;
pub mod client;
pub mod config;
pub mod examples;
pub mod export;
pub mod files;
pub mod history;
pub mod prelude;
pub mod prompt;
pub mod retry;
pub mod session;

use serde::{Deserialize, Serialize};

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for agent calls.
pub const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4";

/// Title shown by the presentation layers.
pub const APP_TITLE: &str = "GAIA Agent - Q&A Chatbot";

// ── Message types ──────────────────────────────────────────────────

/// Role of a message exchanged with the agent collaborator.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A role-tagged message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
        }
    }

    /// Text content, or `""` for content-less messages.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}
