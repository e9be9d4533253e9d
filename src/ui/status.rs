use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

use super::layout::{BODY_INDENT, MODEL_LABEL};

pub fn render_typing_indicator(model: &Model, frame: &mut Frame, area: Rect) {
    let text = format!("{}{MODEL_LABEL} is typing…", " ".repeat(BODY_INDENT));
    frame.render_widget(Paragraph::new(Line::styled(text, model.theme.typing)), area);
}

/// Status line text: model, context fill and scroll position.
pub fn status_text(model: &Model) -> String {
    let window = model.session.window();
    let scroll = if model.viewport.is_following() {
        "[end]".to_string()
    } else {
        format!("[{}%]", model.viewport.scroll_percent())
    };
    format!(
        " {}  context {}/{}  {}  F1:help",
        model.model_name,
        window.len(),
        window.capacity(),
        scroll
    )
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let status_bar = Paragraph::new(status_text(model)).style(
        Style::default()
            .bg(model.theme.status_bg)
            .fg(model.theme.status_fg),
    );
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
