//! Chat configuration with sensible defaults.
//!
//! [`ChatConfig`] carries the settings both binaries share: which model the
//! OpenRouter collaborator calls, how it samples, how failures are retried,
//! and where transcripts are exported. Binaries fill it from CLI flags.

use std::path::PathBuf;

use crate::retry::RetryConfig;
use crate::{DEFAULT_MODEL, OPENROUTER_URL};

/// Environment variable holding the OpenRouter API key.
pub const API_KEY_ENV: &str = "OPENROUTER_KEY";

/// Configuration for a chat session and its agent collaborator.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// System prompt prepended to every request. Default: none.
    pub system_prompt: Option<String>,
    /// Maximum tokens per response. Default: `4096`.
    pub max_tokens: u32,
    /// Sampling temperature. Default: `0.3`.
    pub temperature: f32,
    /// Retry policy for transient API failures. Default: 2 retries.
    pub retry: RetryConfig,
    /// Directory for Markdown exports. Default: `"."`.
    pub export_dir: PathBuf,
    /// Chat-completions endpoint. Default: [`OPENROUTER_URL`].
    pub base_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: 0.3,
            retry: RetryConfig::default(),
            export_dir: PathBuf::from("."),
            base_url: OPENROUTER_URL.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Read the API key from [`API_KEY_ENV`].
    pub fn api_key_from_env() -> Result<String, String> {
        std::env::var(API_KEY_ENV)
            .map_err(|_| format!("{API_KEY_ENV} environment variable is not set"))
    }
}
