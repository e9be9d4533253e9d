use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::app::{App, Message, Model};
use crate::composer::Direction;

use super::event_loop::ResizeDebouncer;

/// Rows scrolled per mouse wheel notch.
pub(super) const WHEEL_SCROLL_ROWS: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) => Some(Message::Paste(text.clone())),
            Event::Resize(w, h) => {
                debug!(width = w, height = h, "resize queued");
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('c' | 'q')) {
            return Some(Message::Quit);
        }
        if model.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => Some(Message::HideHelp),
                KeyCode::PageUp => Some(Message::PageUp),
                KeyCode::PageDown => Some(Message::PageDown),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Esc => Some(Message::Quit),
            KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Char('l') if ctrl => Some(Message::ClearHistory),
            // Terminals without keyboard enhancement send Ctrl+J for Shift+Enter.
            KeyCode::Char('j') if ctrl => Some(Message::InsertNewline),
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                Some(Message::InsertNewline)
            }
            KeyCode::Enter => Some(Message::Submit),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Left if ctrl => Some(Message::MoveWordLeft),
            KeyCode::Right if ctrl => Some(Message::MoveWordRight),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Up => Some(Self::vertical_key(model, Direction::Up)),
            KeyCode::Down => Some(Self::vertical_key(model, Direction::Down)),
            KeyCode::Home if ctrl => Some(Message::GoToTop),
            KeyCode::End if ctrl => Some(Message::FollowTail),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Char(c) if !ctrl => Some(Message::InsertChar(c)),
            _ => None,
        }
    }

    /// Up/Down move inside a multi-line message, otherwise they scroll.
    fn vertical_key(model: &Model, direction: Direction) -> Message {
        let cursor = model.input.cursor();
        let last_line = model.input.line_count().saturating_sub(1);
        match direction {
            Direction::Up if cursor.line > 0 => Message::MoveCursor(Direction::Up),
            Direction::Down if cursor.line < last_line => Message::MoveCursor(Direction::Down),
            Direction::Up => Message::ScrollUp(1),
            _ => Message::ScrollDown(1),
        }
    }

    pub(super) const fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(WHEEL_SCROLL_ROWS)),
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(WHEEL_SCROLL_ROWS)),
            _ => None,
        }
    }
}
