//! The agent collaborator boundary and the invocation adapter.
//!
//! The agent is opaque: it receives a sequence of role-tagged messages and
//! returns a sequence of messages, the last of which carries the answer.
//! [`ask`] is the only way the rest of the crate talks to it. It sends
//! exactly one user message and returns the cleaned answer text, or the
//! failure as an `Err` for the caller to record.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

use futures::FutureExt;
use tracing::{debug, trace};

use crate::Message;

/// Prefix some agents prepend to their final answer.
pub const ASSISTANT_PREFIX: &str = "Assistant: ";

/// Boxed future returned by [`Agent::invoke`].
pub type AgentFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Message>, String>> + Send + 'a>>;

/// An external conversational agent.
///
/// Implementations return the full message sequence produced for the
/// request; only the last message is read. Failures should be returned as
/// `Err` rather than panicking, although [`ask`] also contains panics.
///
/// Uses a boxed future so that the trait is dyn-compatible.
pub trait Agent: Send + Sync {
    fn invoke(&self, messages: Vec<Message>) -> AgentFuture<'_>;
}

// ── FnAgent ───────────────────────────────────────────────────────────

/// Type-erased async handler for [`FnAgent`].
type ErasedAgentHandler = Box<dyn Fn(Vec<Message>) -> AgentFuture<'static> + Send + Sync>;

/// A closure-based agent.
///
/// Handy for tests, demos, and wiring an in-process model without a
/// dedicated struct.
///
/// ```
/// use gaia_chat::agent::FnAgent;
///
/// let echo = FnAgent::answering(|prompt| Ok(format!("Assistant: you said {prompt}")));
/// ```
pub struct FnAgent {
    handler: ErasedAgentHandler,
}

impl FnAgent {
    /// Wrap an async handler over the raw message sequence.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Vec<Message>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Message>, String>> + Send + 'static,
    {
        Self {
            handler: Box::new(move |messages| Box::pin(handler(messages))),
        }
    }

    /// Wrap a synchronous prompt → answer function. The returned sequence is
    /// the request followed by one assistant message.
    pub fn answering<F>(answer: F) -> Self
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        Self::new(move |mut messages: Vec<Message>| {
            let prompt = messages.last().map(|m| m.text().to_string());
            let result = answer(prompt.as_deref().unwrap_or_default()).map(|text| {
                messages.push(Message::assistant(text));
                messages
            });
            async move { result }
        })
    }
}

impl Agent for FnAgent {
    fn invoke(&self, messages: Vec<Message>) -> AgentFuture<'_> {
        (self.handler)(messages)
    }
}

// ── Adapter ───────────────────────────────────────────────────────────

/// Remove a single leading `"Assistant: "` if present.
pub fn strip_assistant_prefix(answer: &str) -> &str {
    answer.strip_prefix(ASSISTANT_PREFIX).unwrap_or(answer)
}

/// Send `prompt` to the agent as one user message and return its answer.
///
/// The answer is the content of the last returned message with
/// [`ASSISTANT_PREFIX`] stripped. An empty reply, an agent error, or a panic
/// inside the agent all come back as `Err`.
pub async fn ask(agent: &dyn Agent, prompt: &str) -> Result<String, String> {
    let request = vec![Message::user(prompt)];
    debug!("Invoking agent ({} chars)", prompt.len());

    // Build the future inside the guarded block so synchronous panics in
    // `invoke` itself are contained too.
    let reply = AssertUnwindSafe(async move { agent.invoke(request).await })
        .catch_unwind()
        .await
        .map_err(|panic| format!("agent panicked: {}", panic_message(panic.as_ref())))??;

    debug!("Received {} message(s) from agent", reply.len());
    for (i, msg) in reply.iter().enumerate() {
        trace!("Message {}: {} ({} chars)", i + 1, msg.role, msg.text().len());
    }

    let last = reply
        .last()
        .ok_or_else(|| "agent returned no messages".to_string())?;
    let answer = last.text();
    if answer.starts_with(ASSISTANT_PREFIX) {
        debug!("Cleaned 'Assistant: ' prefix from response");
    }
    Ok(strip_assistant_prefix(answer).to_string())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
