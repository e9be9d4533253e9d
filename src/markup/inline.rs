//! Inline tokenizer for `` `code` ``, `**bold**` and `*italic*` runs.
//!
//! The scanner walks a byte cursor through one line fragment. All delimiters
//! are ASCII, so every slice boundary it produces is a char boundary.
//!
//! Precedence at each position is code, then bold, then italic. A code span
//! also wins inside an open bold or italic run: the run is split around it.
//! Spans belonging to a bold or italic run stay pending until the closer is
//! seen. If the line ends inside a bold run, or a code span opened outside an
//! italic run, everything from the opener on is plain text. An italic opener
//! without a partner is only a literal `*`: the scan restarts right after it.

use super::types::{Span, SpanBuilder, SpanKind};

/// The run a code span returns to once its closing backtick is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Plain,
    Bold { open: usize },
    Italic { open: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ScanningPlain,
    InCode { open: usize, resume: Resume },
    InBold { open: usize },
    InItalic { open: usize },
}

impl Resume {
    const fn state(self) -> State {
        match self {
            Self::Plain => State::ScanningPlain,
            Self::Bold { open } => State::InBold { open },
            Self::Italic { open } => State::InItalic { open },
        }
    }
}

/// Tokenize `text` and append the resulting spans to `out`.
pub(crate) fn tokenize_into(text: &str, out: &mut SpanBuilder) {
    let mut scanner = Scanner::new(text);
    loop {
        scanner.scan(out);

        // End of line: whatever is still open never found its closer.
        match scanner.state {
            State::ScanningPlain => {
                out.push_plain(&text[scanner.run_start..]);
                return;
            }
            State::InItalic { open }
            | State::InCode {
                resume: Resume::Italic { open },
                ..
            } => {
                out.push_plain(&text[open..=open]);
                scanner.restart_at(open + 1);
            }
            State::InCode {
                open,
                resume: Resume::Plain,
            }
            | State::InCode {
                resume: Resume::Bold { open },
                ..
            }
            | State::InBold { open } => {
                out.push_plain(&text[open..]);
                return;
            }
        }
    }
}

struct Scanner<'a> {
    text: &'a str,
    state: State,
    /// Start of the text not yet assigned to a span.
    run_start: usize,
    /// Spans inside a bold/italic run, committed only when the run closes.
    pending: Vec<Span>,
    pos: usize,
}

impl<'a> Scanner<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            state: State::ScanningPlain,
            run_start: 0,
            pending: Vec::new(),
            pos: 0,
        }
    }

    /// Drop the open run and scan plain text again from `pos`.
    fn restart_at(&mut self, pos: usize) {
        self.pending.clear();
        self.state = State::ScanningPlain;
        self.pos = pos;
        self.run_start = pos;
    }

    /// Step over a `width`-byte delimiter; the next span starts after it.
    fn advance_past(&mut self, width: usize) {
        self.pos += width;
        self.run_start = self.pos;
    }

    fn scan(&mut self, out: &mut SpanBuilder) {
        let text = self.text;
        let bytes = text.as_bytes();
        while self.pos < bytes.len() {
            let i = self.pos;
            match self.state {
                State::ScanningPlain => match bytes[i] {
                    b'`' => {
                        out.push_plain(&text[self.run_start..i]);
                        self.state = State::InCode {
                            open: i,
                            resume: Resume::Plain,
                        };
                        self.advance_past(1);
                    }
                    b'*' if is_double_star(bytes, i) => {
                        out.push_plain(&text[self.run_start..i]);
                        self.state = State::InBold { open: i };
                        self.advance_past(2);
                    }
                    b'*' if is_single_star(bytes, i) => {
                        out.push_plain(&text[self.run_start..i]);
                        self.state = State::InItalic { open: i };
                        self.advance_past(1);
                    }
                    _ => self.pos += 1,
                },
                State::InCode { resume, .. } => {
                    if bytes[i] == b'`' {
                        let span = Span::new(SpanKind::InlineCode, &text[self.run_start..i]);
                        if resume == Resume::Plain {
                            out.push(span);
                        } else {
                            self.pending.push(span);
                        }
                        self.state = resume.state();
                        self.advance_past(1);
                    } else {
                        self.pos += 1;
                    }
                }
                State::InBold { open } => {
                    if bytes[i] == b'`' {
                        self.pending
                            .push(Span::new(SpanKind::Bold, &text[self.run_start..i]));
                        self.state = State::InCode {
                            open: i,
                            resume: Resume::Bold { open },
                        };
                        self.advance_past(1);
                    } else if is_double_star(bytes, i) {
                        self.pending
                            .push(Span::new(SpanKind::Bold, &text[self.run_start..i]));
                        out.extend(self.pending.drain(..));
                        self.state = State::ScanningPlain;
                        self.advance_past(2);
                    } else {
                        self.pos += 1;
                    }
                }
                State::InItalic { open } => {
                    if bytes[i] == b'`' {
                        self.pending
                            .push(Span::new(SpanKind::Italic, &text[self.run_start..i]));
                        self.state = State::InCode {
                            open: i,
                            resume: Resume::Italic { open },
                        };
                        self.advance_past(1);
                    } else if is_single_star(bytes, i) {
                        self.pending
                            .push(Span::new(SpanKind::Italic, &text[self.run_start..i]));
                        out.extend(self.pending.drain(..));
                        self.state = State::ScanningPlain;
                        self.advance_past(1);
                    } else {
                        self.pos += 1;
                    }
                }
            }
        }
    }
}

/// Tokenize a standalone line.
pub fn tokenize(text: &str) -> Vec<Span> {
    let mut out = SpanBuilder::new();
    tokenize_into(text, &mut out);
    out.finish()
}

fn is_double_star(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'*')
}

/// A `*` that is not part of a `**` run on either side.
fn is_single_star(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'*'
        && (i == 0 || bytes[i - 1] != b'*')
        && bytes.get(i + 1) != Some(&b'*')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(text: &str) -> Span {
        Span::new(SpanKind::Bold, text)
    }

    fn italic(text: &str) -> Span {
        Span::new(SpanKind::Italic, text)
    }

    fn code(text: &str) -> Span {
        Span::new(SpanKind::InlineCode, text)
    }

    #[test]
    fn test_plain_text_is_single_span() {
        assert_eq!(tokenize("hello world"), vec![Span::plain("hello world")]);
    }

    #[test]
    fn test_empty_text_has_no_spans() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_bold_run() {
        assert_eq!(tokenize("**bold**"), vec![bold("bold")]);
    }

    #[test]
    fn test_italic_run() {
        assert_eq!(
            tokenize("an *emphasized* word"),
            vec![Span::plain("an "), italic("emphasized"), Span::plain(" word")]
        );
    }

    #[test]
    fn test_inline_code_run() {
        assert_eq!(tokenize("`code`"), vec![code("code")]);
    }

    #[test]
    fn test_mixed_runs_in_order() {
        assert_eq!(
            tokenize("**a** then *b* then `c`"),
            vec![
                bold("a"),
                Span::plain(" then "),
                italic("b"),
                Span::plain(" then "),
                code("c"),
            ]
        );
    }

    #[test]
    fn test_unterminated_bold_is_plain() {
        assert_eq!(tokenize("**unterminated"), vec![Span::plain("**unterminated")]);
    }

    #[test]
    fn test_unterminated_bold_makes_rest_of_line_plain() {
        assert_eq!(
            tokenize("x **a *b* `c`"),
            vec![Span::plain("x **a *b* `c`")]
        );
    }

    #[test]
    fn test_unterminated_backtick_is_plain_for_rest_of_line() {
        assert_eq!(
            tokenize("run `cargo **now**"),
            vec![Span::plain("run `cargo **now**")]
        );
    }

    #[test]
    fn test_unterminated_italic_is_plain() {
        assert_eq!(tokenize("5 * 3 = 15"), vec![Span::plain("5 * 3 = 15")]);
    }

    #[test]
    fn test_lone_star_before_bold_keeps_bold() {
        assert_eq!(
            tokenize("5 * 3 is **important**"),
            vec![Span::plain("5 * 3 is "), bold("important")]
        );
    }

    #[test]
    fn test_lone_star_before_code_keeps_code() {
        assert_eq!(
            tokenize("a * b then `x`"),
            vec![Span::plain("a * b then "), code("x")]
        );
    }

    #[test]
    fn test_lone_star_between_bold_runs() {
        assert_eq!(
            tokenize("**a** 5 * 3 **b**"),
            vec![bold("a"), Span::plain(" 5 * 3 "), bold("b")]
        );
    }

    #[test]
    fn test_lone_star_after_italics_is_plain() {
        assert_eq!(
            tokenize("*a* and *b* cost 5 * 3"),
            vec![
                italic("a"),
                Span::plain(" and "),
                italic("b"),
                Span::plain(" cost 5 * 3"),
            ]
        );
    }

    #[test]
    fn test_trailing_lone_star() {
        assert_eq!(tokenize("**x** *"), vec![bold("x"), Span::plain(" *")]);
    }

    #[test]
    fn test_code_inside_bold_wins() {
        assert_eq!(tokenize("**`x`**"), vec![code("x")]);
    }

    #[test]
    fn test_bold_split_around_code() {
        assert_eq!(
            tokenize("**use `cargo` here**"),
            vec![bold("use "), code("cargo"), bold(" here")]
        );
    }

    #[test]
    fn test_italic_split_around_code() {
        assert_eq!(
            tokenize("*run `ls` first*"),
            vec![italic("run "), code("ls"), italic(" first")]
        );
    }

    #[test]
    fn test_unclosed_code_inside_bold_degrades_whole_run() {
        assert_eq!(
            tokenize("ok **a `b**"),
            vec![Span::plain("ok **a `b**")]
        );
    }

    #[test]
    fn test_stars_inside_code_are_literal() {
        assert_eq!(
            tokenize("`a * b ** c`"),
            vec![code("a * b ** c")]
        );
    }

    #[test]
    fn test_no_nested_styles_in_bold() {
        assert_eq!(tokenize("**a *b* c**"), vec![bold("a *b* c")]);
    }

    #[test]
    fn test_no_nested_styles_in_italic() {
        assert_eq!(tokenize("*a **b** c*"), vec![italic("a **b** c")]);
    }

    #[test]
    fn test_triple_star_run() {
        assert_eq!(tokenize("***x***"), vec![bold("*x"), Span::plain("*")]);
    }

    #[test]
    fn test_empty_delimited_runs_vanish() {
        assert_eq!(tokenize("a****b``c"), vec![Span::plain("abc")]);
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        assert_eq!(
            tokenize("naïve **café** `λ`"),
            vec![Span::plain("naïve "), bold("café"), Span::plain(" "), code("λ")]
        );
    }

    #[test]
    fn test_single_star_helpers() {
        let bytes = b"a*b**c";
        assert!(is_single_star(bytes, 1));
        assert!(!is_single_star(bytes, 3));
        assert!(!is_single_star(bytes, 4));
        assert!(is_double_star(bytes, 3));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        /// Plain words, bold runs and code runs, with no single stars.
        fn bold_and_code_text() -> impl Strategy<Value = String> {
            prop::collection::vec(
                prop_oneof![
                    "[a-z ]{0,8}",
                    "[a-z]{1,5}".prop_map(|w| format!("**{w}**")),
                    "[a-z ]{1,5}".prop_map(|w| format!("`{w}`")),
                ],
                0..6,
            )
            .prop_map(|parts| parts.concat())
        }

        fn styled(spans: &[Span]) -> Vec<Span> {
            spans
                .iter()
                .filter(|span| *span.kind() != SpanKind::Plain)
                .cloned()
                .collect()
        }

        proptest! {
            #[test]
            fn lone_star_does_not_hide_later_runs(tail in bold_and_code_text()) {
                let with_star = tokenize(&format!("5 * {tail}"));
                prop_assert_eq!(styled(&with_star), styled(&tokenize(&tail)));
            }
        }
    }
}
