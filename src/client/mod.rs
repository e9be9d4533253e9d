//! Remote model access.
//!
//! [`ChatBackend`] is the seam between the conversation and the network:
//! the app talks to it through [`ReplyWorker`], which runs each request on
//! its own thread and hands the result back over a channel.

mod gemini;
mod worker;

use thiserror::Error;

use crate::conversation::Turn;

pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient, GeminiConfig};
pub use worker::{Reply, ReplyWorker, RequestId};

/// Anything that can turn a conversation context into one model reply.
pub trait ChatBackend: Send + Sync {
    /// Generate the next model turn for `context` (oldest turn first).
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] describing why no reply text was produced.
    fn generate(&self, context: &[Turn]) -> Result<String, ClientError>;

    /// Model identifier shown in the status bar.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("API key not configured (set GEMINI_API_KEY or add it to config.json)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("no response text received")]
    EmptyReply,
    #[error("response blocked: {0}")]
    Blocked(String),
}
