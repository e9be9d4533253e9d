use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::client::RequestId;
use crate::composer::InputBuffer;
use crate::conversation::{ChatSession, Turn};
use crate::markup::{self, Document};
use crate::ui::layout::{layout_entry, layout_transcript};
use crate::ui::style::Theme;
use crate::ui::viewport::Viewport;

const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Greeting shown before the first message.
pub const WELCOME_TEXT: &str =
    "👋 Welcome to gemtalk!\n\nType your message and press **Enter** to send. Press `F1` for help.";

/// Who a transcript bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Model,
    Notice,
    Error,
}

/// One bubble in the transcript.
///
/// Model replies keep their parsed markup so relayout on resize does not
/// parse again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    sender: Sender,
    timestamp: String,
    text: String,
    document: Option<Document>,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self::plain(Sender::User, text, timestamp)
    }

    pub fn model(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        let text = text.into();
        let document = markup::parse(&text);
        Self {
            sender: Sender::Model,
            timestamp: timestamp.into(),
            text,
            document: Some(document),
        }
    }

    pub fn notice(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self::plain(Sender::Notice, text, timestamp)
    }

    pub fn error(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self::plain(Sender::Error, text, timestamp)
    }

    fn plain(sender: Sender, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            sender,
            timestamp: timestamp.into(),
            text: text.into(),
            document: None,
        }
    }

    pub const fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }
}

/// Local wall-clock time as `HH:MM`.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug, Default)]
pub struct Model {
    /// Transcript bubbles, oldest first
    pub entries: Vec<ChatEntry>,
    /// Wrapped transcript rows for `layout_width`
    rows: Vec<Line<'static>>,
    /// Width the rows were wrapped for (0 until the first layout)
    layout_width: u16,
    pub theme: Theme,
    /// Window plus the staged outbound turn
    pub session: ChatSession,
    /// Message being composed
    pub input: InputBuffer,
    /// Scroll state of the transcript pane
    pub viewport: Viewport,
    /// Name of the remote model, shown in the status bar
    pub model_name: String,
    /// Full terminal size
    pub terminal_size: (u16, u16),
    /// Context waiting to be handed to the worker
    pub(super) outbound: Option<Vec<Turn>>,
    /// Request whose reply the session is waiting for
    pub(super) in_flight: Option<RequestId>,
    toast: Option<Toast>,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl Model {
    pub fn new(session: ChatSession, model_name: impl Into<String>, terminal_size: (u16, u16)) -> Self {
        let mut model = Self {
            session,
            model_name: model_name.into(),
            terminal_size,
            ..Self::default()
        };
        model.sync_layout();
        model
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self.relayout();
        self
    }

    /// Whether a request is outstanding.
    pub const fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Wrapped transcript rows at the current layout width.
    pub fn rows(&self) -> &[Line<'static>] {
        &self.rows
    }

    pub const fn layout_width(&self) -> u16 {
        self.layout_width
    }

    /// Append a bubble and its rows.
    pub fn push_entry(&mut self, entry: ChatEntry) {
        if self.layout_width > 0 {
            self.rows
                .extend(layout_entry(&entry, self.layout_width, &self.theme));
            self.viewport.set_total_lines(self.rows.len());
        }
        self.entries.push(entry);
    }

    /// Drop every bubble from the transcript.
    pub(super) fn clear_transcript(&mut self) {
        self.entries.clear();
        self.rows.clear();
        self.viewport.set_total_lines(0);
        self.viewport.follow_tail();
    }

    /// Fit the transcript pane to the terminal and the current footer.
    pub fn sync_layout(&mut self) {
        let (width, height) = self.terminal_size;
        let area = crate::ui::transcript_area(self, Rect::new(0, 0, width, height));
        self.fit_transcript(area);
    }

    /// Resize the viewport to `area`, rewrapping when the width changed.
    pub fn fit_transcript(&mut self, area: Rect) {
        self.viewport.resize(area.width, area.height);
        if area.width != self.layout_width {
            self.layout_width = area.width;
            self.relayout();
        }
    }

    fn relayout(&mut self) {
        if self.layout_width == 0 {
            return;
        }
        self.rows = layout_transcript(&self.entries, self.layout_width, &self.theme);
        self.viewport.set_total_lines(self.rows.len());
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
