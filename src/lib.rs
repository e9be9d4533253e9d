// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. client::ClientError)
    clippy::module_name_repetitions
)]

//! # gemtalk
//!
//! A terminal chat client for Google's Gemini models.
//!
//! gemtalk keeps a bounded window of recent turns as conversation context
//! and renders replies with a small markup dialect:
//! - Headers, bullet and numbered items
//! - `**bold**`, `*italic*` and `` `inline code` ``
//! - Fenced code blocks with syntax highlighting
//!
//! ## Architecture
//!
//! gemtalk uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! Requests run on worker threads and report back through a channel the
//! event loop polls.
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`markup`]: Reply markup parsing
//! - [`conversation`]: Bounded turn history
//! - [`client`]: Gemini transport and request worker
//! - [`composer`]: Input buffer
//! - [`ui`]: Terminal UI components
//! - [`highlight`]: Syntax highlighting
//! - [`config`]: Flags, rc files and credentials

pub mod app;
pub mod client;
pub mod composer;
pub mod config;
pub mod conversation;
pub mod highlight;
pub mod markup;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::conversation::{ChatSession, ConversationWindow, Turn};
    pub use crate::markup::{Document, parse};
    pub use crate::ui::viewport::Viewport;
}
