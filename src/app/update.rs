use tracing::{debug, warn};

use crate::app::Model;
use crate::app::model::{ChatEntry, ToastLevel, timestamp_now};
use crate::client::{ClientError, RequestId};
use crate::composer::Direction;
use crate::conversation::SessionError;

/// Notice shown after the history is cleared.
pub const CLEARED_NOTICE: &str = "Conversation history cleared.";

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Composing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Insert a line break (Alt/Shift+Enter)
    InsertNewline,
    /// Insert pasted text
    Paste(String),
    /// Delete character before cursor (Backspace)
    DeleteBack,
    /// Delete character at cursor (Delete)
    DeleteForward,
    /// Move cursor in a direction
    MoveCursor(Direction),
    /// Move cursor to beginning of line (Home)
    MoveHome,
    /// Move cursor to end of line (End)
    MoveEnd,
    /// Move cursor one word left (Ctrl+Left)
    MoveWordLeft,
    /// Move cursor one word right (Ctrl+Right)
    MoveWordRight,

    // Conversation
    /// Send the composed message (Enter)
    Submit,
    /// The worker finished a request
    ReplyReceived(RequestId, Result<String, ClientError>),
    /// Forget the window and the transcript (Ctrl+L)
    ClearHistory,

    // Navigation
    /// Scroll up by n rows
    ScrollUp(usize),
    /// Scroll down by n rows
    ScrollDown(usize),
    /// Scroll up one page
    PageUp,
    /// Scroll down one page
    PageDown,
    /// Go to the first bubble
    GoToTop,
    /// Jump to the newest bubble and keep following it
    FollowTail,

    // Other
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Terminal resized
    Resize(u16, u16),
    /// Force redraw
    Redraw,
    /// Quit the application
    Quit,
}

impl Message {
    const fn edits_input(&self) -> bool {
        matches!(
            self,
            Self::InsertChar(_)
                | Self::InsertNewline
                | Self::Paste(_)
                | Self::DeleteBack
                | Self::DeleteForward
                | Self::MoveCursor(_)
                | Self::MoveHome
                | Self::MoveEnd
                | Self::MoveWordLeft
                | Self::MoveWordRight
        )
    }
}

/// Update the model in response to a message.
///
/// This is a pure state transition. Handing the outbound context to the
/// worker is a side effect performed by the event loop.
pub fn update(mut model: Model, msg: Message) -> Model {
    // The composer is locked while a reply is pending.
    if msg.edits_input() && model.is_busy() {
        return model;
    }

    match msg {
        Message::InsertChar(c) => model.input.insert_char(c),
        Message::InsertNewline => model.input.insert_newline(),
        Message::Paste(text) => model.input.insert_str(&text),
        Message::DeleteBack => {
            model.input.delete_back();
        }
        Message::DeleteForward => {
            model.input.delete_forward();
        }
        Message::MoveCursor(direction) => model.input.move_cursor(direction),
        Message::MoveHome => model.input.move_home(),
        Message::MoveEnd => model.input.move_end(),
        Message::MoveWordLeft => model.input.move_word_left(),
        Message::MoveWordRight => model.input.move_word_right(),

        Message::Submit => submit(&mut model),
        Message::ReplyReceived(id, result) => receive_reply(&mut model, id, result),
        Message::ClearHistory => {
            model.session.clear();
            model.outbound = None;
            model.in_flight = None;
            model.clear_transcript();
            model.push_entry(ChatEntry::notice(CLEARED_NOTICE, timestamp_now()));
            model.show_toast(ToastLevel::Info, "History cleared");
        }

        Message::ScrollUp(n) => model.viewport.scroll_up(n),
        Message::ScrollDown(n) => model.viewport.scroll_down(n),
        Message::PageUp => model.viewport.page_up(),
        Message::PageDown => model.viewport.page_down(),
        Message::GoToTop => model.viewport.go_to_top(),
        Message::FollowTail => model.viewport.follow_tail(),

        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Resize(width, height) => model.terminal_size = (width, height),
        Message::Redraw => {}
        Message::Quit => model.should_quit = true,
    }

    // Footer height depends on the input and on whether a reply is pending.
    model.sync_layout();
    model
}

fn submit(model: &mut Model) {
    let text = model.input.text();
    match model.session.begin(&text) {
        Ok(context) => {
            debug!(turns = context.len(), "message staged");
            let staged = model
                .session
                .pending()
                .map_or_else(|| text.trim().to_string(), |turn| turn.text().to_string());
            model.input.clear();
            model.push_entry(ChatEntry::user(staged, timestamp_now()));
            model.viewport.follow_tail();
            model.outbound = Some(context);
        }
        Err(SessionError::Busy) => {
            model.show_toast(ToastLevel::Warning, "Wait for the current reply");
        }
        Err(err) => debug!(error = %err, "submit ignored"),
    }
}

fn receive_reply(model: &mut Model, id: RequestId, result: Result<String, ClientError>) {
    if model.in_flight != Some(id) {
        debug!(?id, "dropping reply for a discarded request");
        return;
    }
    model.in_flight = None;

    match result {
        Ok(reply) => {
            if let Err(err) = model.session.complete(reply.as_str()) {
                warn!(error = %err, "reply arrived without a staged message");
                return;
            }
            model.push_entry(ChatEntry::model(reply, timestamp_now()));
        }
        Err(err) => {
            warn!(error = %err, "request failed");
            if let Err(abort_err) = model.session.abort() {
                debug!(error = %abort_err, "nothing to abort");
            }
            model.push_entry(ChatEntry::error(
                format!("❌ Error: {err}"),
                timestamp_now(),
            ));
            model.show_toast(ToastLevel::Error, "Request failed");
        }
    }
}
