//! Theming and color definitions.
//!
//! Maps markup kinds and chat roles to terminal styles. Uses indexed ANSI
//! colors that read well on the detected background.

use ratatui::style::{Color, Modifier, Style};

use crate::highlight::{HighlightBackground, Rgb, background_mode};
use crate::markup::{LineKind, SpanKind};

/// Theme configuration for the entire application.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Header level 1 style
    pub h1: Style,
    /// Header level 2 style
    pub h2: Style,
    /// Header level 3 style
    pub h3: Style,
    /// Header level 4+ style
    pub h4: Style,
    /// Inline code style
    pub inline_code: Style,
    /// Code block text without syntax colors
    pub code: Style,
    /// Code block frame and language label
    pub code_frame: Style,
    /// Bullet glyph and list number style
    pub list_marker: Style,
    /// Sender label of the user's bubbles
    pub user_label: Style,
    /// Sender label of the model's bubbles
    pub model_label: Style,
    /// Body of the user's bubbles
    pub user_text: Style,
    /// Informational notices
    pub notice: Style,
    /// Failed requests
    pub error: Style,
    /// Message timestamps
    pub timestamp: Style,
    /// Typing indicator
    pub typing: Style,
    /// Status bar background
    pub status_bg: Color,
    /// Status bar foreground
    pub status_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            h1: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            h4: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            inline_code: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::Indexed(250)),
            code_frame: Style::default().fg(Color::Indexed(240)),
            list_marker: Style::default().fg(Color::Yellow),
            user_label: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            model_label: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            user_text: Style::default().fg(Color::Indexed(153)),
            notice: Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::ITALIC),
            error: Style::default().fg(Color::LightRed),
            timestamp: Style::default().fg(Color::Indexed(242)),
            typing: Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::ITALIC),
            status_bg: Color::Indexed(236),
            status_fg: Color::Indexed(252),
        }
    }
}

impl Theme {
    /// Create a theme optimized for dark terminals.
    pub fn dark() -> Self {
        Self::default()
    }

    /// Create a theme optimized for light terminals.
    pub fn light() -> Self {
        Self {
            h1: Style::default()
                .fg(Color::Indexed(31))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::Indexed(28))
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Indexed(136))
                .add_modifier(Modifier::BOLD),
            h4: Style::default()
                .fg(Color::Indexed(25))
                .add_modifier(Modifier::BOLD),
            inline_code: Style::default()
                .fg(Color::Indexed(124))
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::Indexed(238)),
            code_frame: Style::default().fg(Color::Indexed(247)),
            list_marker: Style::default().fg(Color::Indexed(136)),
            user_label: Style::default()
                .fg(Color::Indexed(25))
                .add_modifier(Modifier::BOLD),
            model_label: Style::default()
                .fg(Color::Indexed(28))
                .add_modifier(Modifier::BOLD),
            user_text: Style::default().fg(Color::Indexed(24)),
            notice: Style::default()
                .fg(Color::Indexed(242))
                .add_modifier(Modifier::ITALIC),
            error: Style::default().fg(Color::Indexed(124)),
            timestamp: Style::default().fg(Color::Indexed(245)),
            typing: Style::default()
                .fg(Color::Indexed(242))
                .add_modifier(Modifier::ITALIC),
            status_bg: Color::Indexed(252),
            status_fg: Color::Indexed(235),
        }
    }

    /// Theme matching the current terminal background.
    pub fn current() -> Self {
        match background_mode() {
            HighlightBackground::Light => Self::light(),
            HighlightBackground::Dark => Self::dark(),
        }
    }

    /// Base style for every span of a line.
    pub const fn line_style(&self, kind: LineKind) -> Style {
        match kind {
            LineKind::Header(1) => self.h1,
            LineKind::Header(2) => self.h2,
            LineKind::Header(3) => self.h3,
            LineKind::Header(_) => self.h4,
            LineKind::Paragraph | LineKind::BulletItem | LineKind::NumberedItem | LineKind::Blank => {
                Style::new()
            }
        }
    }

    /// Style of one span, layered over its line's base style.
    pub fn span_style(&self, base: Style, kind: &SpanKind) -> Style {
        match kind {
            SpanKind::Plain => base,
            SpanKind::Bold => base.add_modifier(Modifier::BOLD),
            SpanKind::Italic => base.add_modifier(Modifier::ITALIC),
            SpanKind::InlineCode => base.patch(self.inline_code),
            SpanKind::CodeBlock { .. } => self.code,
        }
    }
}

/// Terminal color for a syntax highlight foreground.
pub fn fg_color_for_terminal(fg: Rgb) -> Color {
    if supports_truecolor() {
        Color::Rgb(fg.r, fg.g, fg.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(fg.r, fg.g, fg.b))
    }
}

fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("GEMTALK_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    let has = |value: Option<&str>, needles: &[&str]| {
        value.is_some_and(|v| {
            let lower = v.to_ascii_lowercase();
            needles.iter().any(|needle| lower.contains(needle))
        })
    };
    has(colorterm, &["truecolor", "24bit"]) || has(term, &["direct", "truecolor"])
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_styles_are_bold() {
        let theme = Theme::dark();
        for level in 1..=6 {
            let style = theme.line_style(LineKind::Header(level));
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn test_h1_is_underlined() {
        let style = Theme::light().line_style(LineKind::Header(1));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_paragraph_has_no_base_style() {
        assert_eq!(Theme::dark().line_style(LineKind::Paragraph), Style::new());
    }

    #[test]
    fn test_span_styles_layer_over_line() {
        let theme = Theme::dark();
        let base = theme.line_style(LineKind::Header(2));

        let bold = theme.span_style(Style::new(), &SpanKind::Bold);
        assert!(bold.add_modifier.contains(Modifier::BOLD));

        let italic = theme.span_style(base, &SpanKind::Italic);
        assert!(italic.add_modifier.contains(Modifier::ITALIC));
        assert!(italic.add_modifier.contains(Modifier::BOLD));
        assert_eq!(italic.fg, base.fg);

        let code = theme.span_style(base, &SpanKind::InlineCode);
        assert_eq!(code.fg, theme.inline_code.fg);
    }

    #[test]
    fn test_truecolor_detection() {
        assert!(!supports_truecolor_from_env(None, Some("xterm-256color")));
        assert!(supports_truecolor_from_env(
            Some("truecolor"),
            Some("xterm-256color")
        ));
        assert!(supports_truecolor_from_env(None, Some("xterm-direct")));
    }

    #[test]
    fn test_fallback_indexed_color_when_not_truecolor() {
        assert_eq!(rgb_to_xterm_256(255, 0, 0), 196);
        assert_eq!(rgb_to_xterm_256(0, 0, 0), 16);
    }
}
