//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Requests to the model run on worker threads owned by [`App`]; their
//! replies come back into the loop as [`Message::ReplyReceived`].

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{ChatEntry, Model, Sender, ToastLevel, WELCOME_TEXT, timestamp_now};
pub use update::{CLEARED_NOTICE, Message, update};

use std::path::PathBuf;

use crate::client::ReplyWorker;
use crate::conversation::ChatSession;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    worker: ReplyWorker,
    session: ChatSession,
    welcome: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application sending through `worker`.
    pub fn new(worker: ReplyWorker, session: ChatSession) -> Self {
        Self {
            worker,
            session,
            welcome: true,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Show or skip the greeting bubble.
    #[must_use]
    pub const fn with_welcome(mut self, enabled: bool) -> Self {
        self.welcome = enabled;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}
