//! OpenRouter-backed agent collaborator.
//!
//! [`OpenRouterAgent`] implements [`Agent`] over the OpenRouter
//! chat-completions API. It prepends the configured system prompt, sends the
//! request with retries on transient failures, and returns the request
//! messages followed by the assistant's reply.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::agent::{Agent, AgentFuture};
use crate::config::ChatConfig;
use crate::retry::{RetryConfig, retry};
use crate::Message;

// ── Request / response types ──────────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub temperature: f32,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
fn is_zero_f32(v: &f32) -> bool {
    *v == 0.0
}

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Extract the assistant text from a successful response body.
pub fn parse_completion(body: &str) -> Result<String, String> {
    let parsed: RawChatResponse =
        serde_json::from_str(body).map_err(|e| format!("failed to parse response: {e}"))?;

    if let Some(err) = parsed.error {
        return Err(format!("OpenRouter API error: {}", err.message));
    }

    if let Some(ref usage) = parsed.usage {
        debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0),
            usage.total_tokens.unwrap_or(0),
        );
    }

    parsed
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message.content)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| "Empty LLM response".to_string())
}

// ── Agent ─────────────────────────────────────────────────────────────

/// Agent collaborator that calls the OpenRouter chat-completions API.
pub struct OpenRouterAgent {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    system_prompt: Option<String>,
    max_tokens: u32,
    temperature: f32,
    retry: RetryConfig,
}

impl OpenRouterAgent {
    /// Create an agent from the given API key and chat settings.
    pub fn new(api_key: impl Into<String>, config: &ChatConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gaia-chat/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            retry: config.retry.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request body: optional system prompt, then `messages`.
    pub fn build_request(&self, messages: &[Message]) -> ChatRequest {
        let mut all = Vec::with_capacity(messages.len() + 1);
        if let Some(ref system) = self.system_prompt {
            all.push(Message::system(system));
        }
        all.extend(messages.iter().cloned());
        ChatRequest {
            model: self.model.clone(),
            messages: all,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    async fn send(&self, body: &ChatRequest) -> Result<String, String> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();
        let resp = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Title", crate::APP_TITLE)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("OpenRouter API HTTP {status}: {text}"));
        }
        parse_completion(&text)
    }

    /// Run one completion and return `messages` plus the assistant reply.
    pub async fn complete(&self, mut messages: Vec<Message>) -> Result<Vec<Message>, String> {
        let body = self.build_request(&messages);
        let answer = retry(&self.retry, || self.send(&body)).await?;
        messages.push(Message::assistant(answer));
        Ok(messages)
    }
}

impl Agent for OpenRouterAgent {
    fn invoke(&self, messages: Vec<Message>) -> AgentFuture<'_> {
        Box::pin(self.complete(messages))
    }
}
