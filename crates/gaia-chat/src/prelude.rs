//! Convenience re-exports for common `gaia-chat` types.
//!
//! ```ignore
//! use gaia_chat::prelude::*;
//! ```

pub use crate::agent::{Agent, AgentFuture, FnAgent, ask};
pub use crate::client::OpenRouterAgent;
pub use crate::config::ChatConfig;
pub use crate::files::{FileKind, SUPPORTED_EXTENSIONS, UploadedFile, encode_file, encode_files};
pub use crate::history::{History, Turn};
pub use crate::prompt::PromptContext;
pub use crate::retry::RetryConfig;
pub use crate::session::ChatSession;
pub use crate::{Message, MessageRole};
