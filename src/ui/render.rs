use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::Model;

use super::{MAX_INPUT_ROWS, overlays, status};

const INPUT_PLACEHOLDER: &str = "Type a message · Enter sends · Alt+Enter adds a line";

/// Regions of the chat screen, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    pub transcript: Rect,
    pub typing: Option<Rect>,
    pub input: Rect,
    pub toast: Option<Rect>,
    pub status: Rect,
}

/// Split `area` into transcript, typing row, input box, toast row and status bar.
pub fn screen_areas(model: &Model, area: Rect) -> ScreenAreas {
    // Bounded by MAX_INPUT_ROWS
    #[allow(clippy::cast_possible_truncation)]
    let input_rows = model.input.line_count().clamp(1, MAX_INPUT_ROWS) as u16;
    let input_height = input_rows + 2;
    let typing_rows = u16::from(model.is_busy());
    let toast_rows = u16::from(model.active_toast().is_some());
    let footer_rows = typing_rows + input_height + toast_rows + 1;

    let transcript = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let mut y = transcript.y + transcript.height;
    let mut next_row = |height: u16| {
        let rect = Rect {
            y,
            height,
            ..area
        }
        .intersection(area);
        y = y.saturating_add(height);
        rect
    };
    let typing = (typing_rows > 0).then(|| next_row(1));
    let input = next_row(input_height);
    let toast = (toast_rows > 0).then(|| next_row(1));
    let status = next_row(1);

    ScreenAreas {
        transcript,
        typing,
        input,
        toast,
        status,
    }
}

/// Transcript region for a screen of `area`.
pub fn transcript_area(model: &Model, area: Rect) -> Rect {
    screen_areas(model, area).transcript
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let areas = screen_areas(model, area);
    model.fit_transcript(areas.transcript);

    render_transcript(model, frame, areas.transcript);
    if let Some(typing_area) = areas.typing {
        status::render_typing_indicator(model, frame, typing_area);
    }
    render_input(model, frame, areas.input);
    if let Some(toast_area) = areas.toast {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, areas.status);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_transcript(model: &Model, frame: &mut Frame, area: Rect) {
    let range = model.viewport.visible_range();
    let rows = model.rows()[range].to_vec();
    frame.render_widget(Paragraph::new(rows), area);
}

fn render_input(model: &Model, frame: &mut Frame, area: Rect) {
    let busy = model.is_busy();
    let (title, border_style) = if busy {
        (" Waiting for reply ", model.theme.typing)
    } else {
        (" Message ", model.theme.user_label)
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if model.input.is_empty() {
        if !busy {
            let hint = Line::styled(INPUT_PLACEHOLDER, model.theme.notice);
            frame.render_widget(Paragraph::new(hint), inner);
        }
        if !busy && !model.help_visible {
            frame.set_cursor_position(Position::new(inner.x, inner.y));
        }
        return;
    }

    // Keep the cursor inside the box; long lines scroll sideways.
    let cursor = model.input.cursor();
    let cursor_col = model.input.cursor_display_col();
    let v_off = cursor.line.saturating_sub(usize::from(inner.height) - 1);
    let h_off = cursor_col.saturating_sub(usize::from(inner.width) - 1);

    let style = if busy {
        model.theme.notice
    } else {
        model.theme.user_text
    };
    let lines: Vec<Line> = model
        .input
        .lines()
        .into_iter()
        .map(|line| Line::styled(line, style))
        .collect();
    let scroll = (
        u16::try_from(v_off).unwrap_or(u16::MAX),
        u16::try_from(h_off).unwrap_or(u16::MAX),
    );
    frame.render_widget(Paragraph::new(lines).scroll(scroll), inner);

    if !busy && !model.help_visible {
        let x = u16::try_from(cursor_col - h_off).unwrap_or(0);
        let y = u16::try_from(cursor.line - v_off).unwrap_or(0);
        frame.set_cursor_position(Position::new(inner.x + x, inner.y + y));
    }
}
