//! Transcript layout: chat entries to wrapped terminal rows.
//!
//! Every entry becomes a header row, its body rows and one blank separator.
//! Model replies are laid out from their parsed markup; fenced code blocks
//! get a frame with the language label and are truncated rather than wrapped.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{ChatEntry, Sender};
use crate::highlight::highlight_code;
use crate::markup::{self, BULLET_GLYPH, LineKind, SpanKind};

use super::style::{Theme, fg_color_for_terminal};

/// Left margin of bubble bodies.
pub const BODY_INDENT: usize = 2;
/// Columns kept free on the opposite side of a user's bubble.
const USER_MARGIN: usize = 6;
const CODE_FRAME_OVERHEAD: usize = 4;

pub const USER_LABEL: &str = "You";
pub const MODEL_LABEL: &str = "Gemini";
pub const ERROR_LABEL: &str = "Error";

/// Lay out the whole transcript for a given width.
pub fn layout_transcript(entries: &[ChatEntry], width: u16, theme: &Theme) -> Vec<Line<'static>> {
    entries
        .iter()
        .flat_map(|entry| layout_entry(entry, width, theme))
        .collect()
}

/// Rows of one entry, separator included.
pub fn layout_entry(entry: &ChatEntry, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let width = usize::from(width).max(BODY_INDENT + 1);
    let mut rows = match entry.sender() {
        Sender::User => layout_user(entry, width, theme),
        Sender::Model => layout_model(entry, width, theme),
        Sender::Notice => layout_notice(entry, width, theme),
        Sender::Error => layout_error(entry, width, theme),
    };
    rows.push(Line::default());
    rows
}

fn header(label: &str, label_style: Style, timestamp: &str, theme: &Theme) -> Vec<Span<'static>> {
    vec![
        Span::styled(label.to_string(), label_style),
        Span::raw("  "),
        Span::styled(timestamp.to_string(), theme.timestamp),
    ]
}

fn layout_user(entry: &ChatEntry, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(USER_MARGIN).max(1);
    let mut rows = vec![right_align(
        vec![
            Span::styled(entry.timestamp().to_string(), theme.timestamp),
            Span::raw("  "),
            Span::styled(USER_LABEL.to_string(), theme.user_label),
        ],
        width,
    )];
    for raw in entry.text().split('\n') {
        let spans = [Span::styled(raw.to_string(), theme.user_text)];
        for row in wrap_spans(&spans, body_width, &[], &[]) {
            rows.push(right_align(row, width));
        }
    }
    rows
}

fn layout_model(entry: &ChatEntry, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut rows = vec![Line::from(header(
        MODEL_LABEL,
        theme.model_label,
        entry.timestamp(),
        theme,
    ))];
    let parsed;
    let document = if let Some(doc) = entry.document() {
        doc
    } else {
        parsed = markup::parse(entry.text());
        &parsed
    };
    let body_width = width - BODY_INDENT;
    let indent = " ".repeat(BODY_INDENT);
    for line in document.lines() {
        for row in layout_markup_line(line, body_width, theme) {
            rows.push(indent_row(&indent, row));
        }
    }
    rows
}

fn layout_notice(entry: &ChatEntry, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let prefix = [Span::styled("· ".to_string(), theme.notice)];
    let next = [Span::raw("  ")];
    let mut rows = Vec::new();
    for (idx, raw) in entry.text().split('\n').enumerate() {
        let first: &[Span<'static>] = if idx == 0 { &prefix } else { &next };
        let text = [Span::styled(raw.to_string(), theme.notice)];
        rows.extend(
            wrap_spans(&text, width, first, &next)
                .into_iter()
                .map(Line::from),
        );
    }
    rows
}

fn layout_error(entry: &ChatEntry, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut rows = vec![Line::from(header(
        ERROR_LABEL,
        theme.error.add_modifier(Modifier::BOLD),
        entry.timestamp(),
        theme,
    ))];
    let indent = [Span::raw(" ".repeat(BODY_INDENT))];
    for raw in entry.text().split('\n') {
        let text = [Span::styled(raw.to_string(), theme.error)];
        rows.extend(
            wrap_spans(&text, width, &indent, &indent)
                .into_iter()
                .map(Line::from),
        );
    }
    rows
}

/// Rows for one markup line at `width` columns.
pub fn layout_markup_line(
    line: &markup::Line,
    width: usize,
    theme: &Theme,
) -> Vec<Vec<Span<'static>>> {
    if line.kind() == LineKind::Blank {
        return vec![Vec::new()];
    }

    let base = theme.line_style(line.kind());
    let (mut first_prefix, next_prefix) = list_prefixes(line, theme);
    let mut rows = Vec::new();
    let mut pending: Vec<Span<'static>> = Vec::new();
    let mut skip = prefix_chars(line);

    for span in line.spans() {
        if let SpanKind::CodeBlock { language } = span.kind() {
            if !pending.is_empty() || !first_prefix.is_empty() {
                rows.extend(wrap_spans(&pending, width, &first_prefix, &next_prefix));
                pending.clear();
                first_prefix.clone_from(&next_prefix);
            }
            rows.extend(code_frame(language.as_deref(), span.text(), width, theme));
            continue;
        }
        let mut text = span.text();
        if skip > 0 {
            // The list marker was moved into the prefix.
            let cut = text.char_indices().nth(skip).map_or(text.len(), |(i, _)| i);
            skip -= text[..cut].chars().count();
            text = &text[cut..];
        }
        if !text.is_empty() {
            pending.push(Span::styled(
                text.to_string(),
                theme.span_style(base, span.kind()),
            ));
        }
    }
    if !pending.is_empty() || rows.is_empty() {
        rows.extend(wrap_spans(&pending, width, &first_prefix, &next_prefix));
    }
    rows
}

/// Marker prefix for the first row and hanging indent for the rest.
fn list_prefixes(line: &markup::Line, theme: &Theme) -> (Vec<Span<'static>>, Vec<Span<'static>>) {
    let marker = match line.kind() {
        LineKind::BulletItem => BULLET_GLYPH.to_string(),
        LineKind::NumberedItem => numbered_prefix(&line.plain_text()).to_string(),
        _ => return (Vec::new(), Vec::new()),
    };
    let hang = " ".repeat(marker.width());
    (
        vec![Span::styled(marker, theme.list_marker)],
        vec![Span::raw(hang)],
    )
}

/// Chars of the leading list marker held in the first spans.
fn prefix_chars(line: &markup::Line) -> usize {
    match line.kind() {
        LineKind::BulletItem => BULLET_GLYPH.chars().count(),
        LineKind::NumberedItem => numbered_prefix(&line.plain_text()).chars().count(),
        _ => 0,
    }
}

fn numbered_prefix(text: &str) -> &str {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    let after_dot = digits + 1;
    let spacing = text
        .get(after_dot..)
        .map_or(0, |rest| rest.len() - rest.trim_start_matches([' ', '\t']).len());
    text.get(..after_dot + spacing).unwrap_or("")
}

/// Framed, syntax-colored code block.
fn code_frame(
    language: Option<&str>,
    code: &str,
    width: usize,
    theme: &Theme,
) -> Vec<Vec<Span<'static>>> {
    let mut highlighted = highlight_code(language, code);
    if highlighted.is_empty() {
        highlighted.push(Vec::new());
    }
    let content_width = highlighted
        .iter()
        .map(|segments| segments.iter().map(|s| s.text.width()).sum::<usize>())
        .max()
        .unwrap_or(0)
        .min(width.saturating_sub(CODE_FRAME_OVERHEAD))
        .max(1);
    let inner = content_width + 2;

    let label: String = format!(" {} ", language.unwrap_or("code"));
    let label = truncate_to_width(&label, inner);
    let mut rows = vec![vec![
        Span::styled("┌".to_string(), theme.code_frame),
        Span::styled(label.clone(), theme.code_frame.add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("{}┐", "─".repeat(inner.saturating_sub(label.width()))),
            theme.code_frame,
        ),
    ]];

    for segments in highlighted {
        let mut row = vec![Span::styled("│ ".to_string(), theme.code_frame)];
        let mut used = 0usize;
        for segment in segments {
            let remaining = content_width - used;
            if remaining == 0 {
                break;
            }
            let text = truncate_to_width(&segment.text, remaining);
            used += text.width();
            let style = segment
                .fg
                .map_or(theme.code, |fg| theme.code.fg(fg_color_for_terminal(fg)));
            if !text.is_empty() {
                row.push(Span::styled(text, style));
            }
        }
        row.push(Span::styled(
            format!("{} │", " ".repeat(content_width - used)),
            theme.code_frame,
        ));
        rows.push(row);
    }

    rows.push(vec![Span::styled(
        format!("└{}┘", "─".repeat(inner)),
        theme.code_frame,
    )]);
    rows
}

/// Word-wrap styled spans to `width` display columns.
///
/// Whitespace at the start of continuation rows is dropped; words wider than
/// a full row are split.
pub fn wrap_spans(
    spans: &[Span<'static>],
    width: usize,
    prefix_first: &[Span<'static>],
    prefix_next: &[Span<'static>],
) -> Vec<Vec<Span<'static>>> {
    let width = width.max(1);
    let mut rows: Vec<Vec<Span<'static>>> = Vec::new();
    let mut current: Vec<Span<'static>> = prefix_first.to_vec();
    let mut used: usize = prefix_first.iter().map(Span::width).sum();
    let mut has_word = false;
    let next_width: usize = prefix_next.iter().map(Span::width).sum();

    for token in spans.iter().flat_map(split_tokens) {
        let token_width = token.width();
        let is_ws = token.content.chars().all(char::is_whitespace);

        if used + token_width > width && has_word {
            rows.push(std::mem::replace(&mut current, prefix_next.to_vec()));
            used = next_width;
            has_word = false;
        }
        if is_ws && !has_word && !rows.is_empty() {
            continue;
        }
        if !is_ws && used + token_width > width {
            // Hard-split a word that cannot fit on an empty row.
            let mut rest = token.content.to_string();
            while !rest.is_empty() {
                let room = width.saturating_sub(used).max(1);
                let piece = truncate_to_width(&rest, room);
                let piece = if piece.is_empty() {
                    rest.chars().next().map(String::from).unwrap_or_default()
                } else {
                    piece
                };
                rest = rest[piece.len()..].to_string();
                used += piece.width();
                current.push(Span::styled(piece, token.style));
                if !rest.is_empty() {
                    rows.push(std::mem::replace(&mut current, prefix_next.to_vec()));
                    used = next_width;
                }
            }
            has_word = true;
            continue;
        }
        used += token_width;
        current.push(token);
        has_word |= !is_ws;
    }
    rows.push(current);
    rows
}

/// Split a span into alternating whitespace and non-whitespace runs.
fn split_tokens(span: &Span<'static>) -> Vec<Span<'static>> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;
    for ch in span.content.chars() {
        let is_ws = ch.is_whitespace();
        if ws_state.is_some_and(|state| state != is_ws) {
            out.push(Span::styled(std::mem::take(&mut buf), span.style));
        }
        buf.push(ch);
        ws_state = Some(is_ws);
    }
    if !buf.is_empty() {
        out.push(Span::styled(buf, span.style));
    }
    out
}

fn truncate_to_width(text: &str, max: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

fn right_align(row: Vec<Span<'static>>, width: usize) -> Line<'static> {
    let used: usize = row.iter().map(Span::width).sum();
    let mut spans = Vec::with_capacity(row.len() + 1);
    if used < width {
        spans.push(Span::raw(" ".repeat(width - used)));
    }
    spans.extend(row);
    Line::from(spans)
}

fn indent_row(indent: &str, row: Vec<Span<'static>>) -> Line<'static> {
    let mut spans = Vec::with_capacity(row.len() + 1);
    spans.push(Span::raw(indent.to_string()));
    spans.extend(row);
    Line::from(spans)
}

/// Plain text of a row, for tests and width checks.
pub fn row_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}
