//! Syntax highlighting for fenced code blocks.
//!
//! Uses syntect with the bundled Sublime Text syntax definitions. Colors are
//! toned down on light terminal backgrounds so they stay readable.

use std::sync::{Mutex, OnceLock, PoisonError};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use tracing::debug;

/// 24-bit foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    fn luma(self) -> f32 {
        0.0722f32.mul_add(
            f32::from(self.b),
            0.2126f32.mul_add(f32::from(self.r), 0.7152 * f32::from(self.g)),
        )
    }
}

/// A run of code text with an optional syntax color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSegment {
    pub text: String,
    pub fg: Option<Rgb>,
}

impl CodeSegment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fg: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightBackground {
    Light,
    Dark,
}

/// Highlight `code` line by line.
///
/// Unknown or missing languages yield uncolored segments, one per line.
pub fn highlight_code(language: Option<&str>, code: &str) -> Vec<Vec<CodeSegment>> {
    let syntax_set = syntax_set();
    let syntax = language
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .and_then(|lang| {
            syntax_set
                .find_syntax_by_token(lang)
                .or_else(|| syntax_set.find_syntax_by_name(lang))
        });

    let Some(syntax) = syntax else {
        return code.lines().map(|line| vec![CodeSegment::plain(line)]).collect();
    };

    let mode = background_mode();
    let mut highlighter = HighlightLines::new(syntax, theme(mode));
    code.lines()
        .map(|line| match highlighter.highlight_line(line, syntax_set) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| CodeSegment {
                    text: text.to_string(),
                    fg: Some(adjust_fg_for_background(
                        Rgb {
                            r: style.foreground.r,
                            g: style.foreground.g,
                            b: style.foreground.b,
                        },
                        mode,
                    )),
                })
                .collect(),
            Err(err) => {
                debug!(error = %err, "highlight failed, using plain line");
                vec![CodeSegment::plain(line)]
            }
        })
        .collect()
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme(mode: HighlightBackground) -> &'static Theme {
    static DARK: OnceLock<Theme> = OnceLock::new();
    static LIGHT: OnceLock<Theme> = OnceLock::new();
    let (cell, preferred) = match mode {
        HighlightBackground::Dark => (
            &DARK,
            [
                "Monokai Extended",
                "Monokai Extended Bright",
                "Solarized (dark)",
                "base16-ocean.dark",
            ]
            .as_slice(),
        ),
        HighlightBackground::Light => (
            &LIGHT,
            ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"].as_slice(),
        ),
    };
    cell.get_or_init(|| {
        let theme_set = ThemeSet::load_defaults();
        preferred
            .iter()
            .find_map(|name| theme_set.themes.get(*name).cloned())
            .or_else(|| theme_set.themes.values().next().cloned())
            .unwrap_or_default()
    })
}

static BACKGROUND_OVERRIDE: Mutex<Option<HighlightBackground>> = Mutex::new(None);

pub fn set_background_mode(mode: Option<HighlightBackground>) {
    *BACKGROUND_OVERRIDE
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = mode;
}

/// Forced background if set, else a guess from `COLORFGBG`.
pub fn background_mode() -> HighlightBackground {
    let forced = *BACKGROUND_OVERRIDE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    forced.unwrap_or_else(|| {
        background_mode_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
    })
}

fn background_mode_from_colorfgbg(colorfgbg: Option<&str>) -> HighlightBackground {
    let Some(value) = colorfgbg else {
        return HighlightBackground::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    match bg_str.parse::<u8>() {
        Ok(bg) if bg >= 7 => HighlightBackground::Light,
        _ => HighlightBackground::Dark,
    }
}

/// Classify a terminal background color.
pub fn background_from_rgb(r: u8, g: u8, b: u8) -> HighlightBackground {
    if (Rgb { r, g, b }).luma() >= 140.0 {
        HighlightBackground::Light
    } else {
        HighlightBackground::Dark
    }
}

/// Parse an OSC 11 reply: `ESC ] 11 ; rgb:RRRR/GGGG/BBBB` ended by BEL or ST.
pub fn parse_osc11_reply(reply: &str) -> Option<(u8, u8, u8)> {
    let start = reply.find("rgb:")?;
    let data = &reply[start + 4..];
    let mut parts = data.split(['/', '\x07', '\x1b']);
    let r = parse_osc_component(parts.next()?)?;
    let g = parse_osc_component(parts.next()?)?;
    let b = parse_osc_component(parts.next()?)?;
    Some((r, g, b))
}

fn parse_osc_component(s: &str) -> Option<u8> {
    let hex = s.trim();
    match hex.len() {
        4.. => u16::from_str_radix(&hex[..4], 16)
            .ok()
            .and_then(|v| u8::try_from(v >> 8).ok()),
        2 => u8::from_str_radix(hex, 16).ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn adjust_fg_for_background(color: Rgb, mode: HighlightBackground) -> Rgb {
    match mode {
        HighlightBackground::Dark => color,
        HighlightBackground::Light => {
            if color.luma() < 155.0 {
                return color;
            }
            let dim = |c: u8| (f32::from(c) * 0.42).round() as u8;
            Rgb {
                r: dim(color.r),
                g: dim(color.g),
                b: dim(color.b),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rust_produces_colored_segments() {
        let code = "fn main() {\n    let x = 1;\n}\n";
        let lines = highlight_code(Some("rust"), code);

        assert_eq!(lines.len(), 3);
        assert!(
            lines.iter().flatten().any(|seg| seg.fg.is_some()),
            "Expected at least one colored segment for Rust"
        );
        let rebuilt: String = lines[1].iter().map(|seg| seg.text.as_str()).collect();
        assert_eq!(rebuilt, "    let x = 1;");
    }

    #[test]
    fn test_highlight_unknown_language_falls_back_to_plain() {
        let lines = highlight_code(Some("nope"), "just text");
        assert_eq!(lines, vec![vec![CodeSegment::plain("just text")]]);
    }

    #[test]
    fn test_highlight_without_language_is_plain() {
        let lines = highlight_code(None, "a\nb");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().flatten().all(|seg| seg.fg.is_none()));
    }

    #[test]
    fn test_highlight_finds_language_by_extension_token() {
        let lines = highlight_code(Some("py"), "print(1)");
        assert!(lines.iter().flatten().any(|seg| seg.fg.is_some()));
    }

    #[test]
    fn test_colorfgbg_dark_background() {
        assert_eq!(
            background_mode_from_colorfgbg(Some("15;0")),
            HighlightBackground::Dark
        );
        assert_eq!(background_mode_from_colorfgbg(None), HighlightBackground::Dark);
    }

    #[test]
    fn test_colorfgbg_light_background() {
        assert_eq!(
            background_mode_from_colorfgbg(Some("0;15")),
            HighlightBackground::Light
        );
    }

    #[test]
    fn test_background_override() {
        set_background_mode(Some(HighlightBackground::Light));
        assert_eq!(background_mode(), HighlightBackground::Light);
        set_background_mode(Some(HighlightBackground::Dark));
        assert_eq!(background_mode(), HighlightBackground::Dark);
        set_background_mode(None);
    }

    #[test]
    fn test_light_mode_darkens_bright_fg() {
        let bright = Rgb {
            r: 240,
            g: 230,
            b: 120,
        };
        let adjusted = adjust_fg_for_background(bright, HighlightBackground::Light);
        assert!(adjusted.r < bright.r && adjusted.g < bright.g && adjusted.b < bright.b);
        assert!(adjusted.luma() < 120.0, "still too bright: {}", adjusted.luma());
        assert_eq!(
            adjust_fg_for_background(bright, HighlightBackground::Dark),
            bright
        );
    }

    #[test]
    fn test_parse_osc11_reply() {
        assert_eq!(
            parse_osc11_reply("\x1b]11;rgb:ffff/ffff/ffff\x07"),
            Some((255, 255, 255))
        );
        assert_eq!(
            parse_osc11_reply("\x1b]11;rgb:1e1e/2020/2828\x1b\\"),
            Some((0x1e, 0x20, 0x28))
        );
        assert_eq!(parse_osc11_reply("garbage"), None);
    }

    #[test]
    fn test_background_from_rgb() {
        assert_eq!(background_from_rgb(255, 255, 255), HighlightBackground::Light);
        assert_eq!(background_from_rgb(30, 30, 30), HighlightBackground::Dark);
    }
}
