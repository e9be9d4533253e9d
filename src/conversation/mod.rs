//! Conversation history kept for the remote model.
//!
//! [`ConversationWindow`] is the bounded turn buffer; [`ChatSession`] owns it
//! and stages at most one outbound message at a time.

mod session;
mod window;

pub use session::{ChatSession, SessionError};
pub use window::{ConversationWindow, Role, Turn, WindowError};

/// Default number of turns kept in the window.
pub const DEFAULT_HISTORY: usize = 50;
