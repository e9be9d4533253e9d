//! One outbound turn at a time over a [`ConversationWindow`].
//!
//! A send is staged: [`ChatSession::begin`] builds the context for the remote
//! call without touching the window, and the user turn only lands in the
//! window together with the reply in [`ChatSession::complete`]. A failed call
//! is [`ChatSession::abort`]ed and leaves the window exactly as it was.

use thiserror::Error;
use tracing::debug;

use super::window::{ConversationWindow, Turn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a reply is still pending")]
    Busy,
    #[error("message is empty")]
    EmptyMessage,
    #[error("no message is pending")]
    NothingPending,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    window: ConversationWindow,
    pending: Option<Turn>,
}

impl ChatSession {
    pub const fn new(window: ConversationWindow) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Stage a user message and return the context to send.
    ///
    /// The context is the window plus the staged turn, trimmed by the same
    /// eviction rule the window applies.
    ///
    /// # Errors
    ///
    /// [`SessionError::Busy`] while another message is staged,
    /// [`SessionError::EmptyMessage`] when `text` is blank.
    pub fn begin(&mut self, text: &str) -> Result<Vec<Turn>, SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::Busy);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let turn = Turn::user(text);
        let mut outbound = self.window.clone();
        outbound.append(turn.clone());
        self.pending = Some(turn);

        let context = outbound.snapshot();
        debug!(turns = context.len(), "staged user turn");
        Ok(context)
    }

    /// Commit the staged user turn followed by the model's reply.
    ///
    /// # Errors
    ///
    /// [`SessionError::NothingPending`] when no message is staged.
    pub fn complete(&mut self, reply: impl Into<String>) -> Result<(), SessionError> {
        let user = self.pending.take().ok_or(SessionError::NothingPending)?;
        self.window.append(user);
        self.window.append(Turn::model(reply));
        debug!(window = self.window.len(), "committed exchange");
        Ok(())
    }

    /// Drop the staged turn, returning it.
    ///
    /// # Errors
    ///
    /// [`SessionError::NothingPending`] when no message is staged.
    pub fn abort(&mut self) -> Result<Turn, SessionError> {
        self.pending.take().ok_or(SessionError::NothingPending)
    }

    /// Forget all history, including a staged turn.
    ///
    /// A reply that arrives afterwards has nothing to complete.
    pub fn clear(&mut self) {
        self.window.clear();
        self.pending = None;
    }

    pub const fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub const fn pending(&self) -> Option<&Turn> {
        self.pending.as_ref()
    }

    pub const fn window(&self) -> &ConversationWindow {
        &self.window
    }
}
