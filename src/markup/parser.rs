//! Markup parsing: fence extraction followed by per-line classification.

use std::sync::LazyLock;

use regex::Regex;

use super::inline::tokenize_into;
use super::types::{Document, Line, LineKind, Span, SpanBuilder};

/// Glyph that replaces `-`, `*` and `+` list markers.
pub const BULLET_GLYPH: &str = "• ";

/// Deepest header level; longer `#` runs are clamped to it.
const MAX_HEADER_LEVEL: usize = 6;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([\w+#.\-]*)[ \t]*\n(.*?)```").expect("fence pattern is valid")
});

/// Parse markup text into a Document.
///
/// Never fails: malformed markup degrades to plain text.
///
/// # Example
///
/// ```
/// use gemtalk::markup::{parse, LineKind, SpanKind};
///
/// let doc = parse("# Title\n**bold** text");
/// assert_eq!(doc.line_count(), 2);
/// assert_eq!(doc.lines()[0].kind(), LineKind::Header(1));
/// assert_eq!(doc.lines()[1].spans()[0].kind(), &SpanKind::Bold);
/// ```
pub fn parse(source: &str) -> Document {
    let normalized = source.replace("\r\n", "\n");
    let (tokens, fences) = extract_fences(&normalized);

    let lines = split_lines(&tokens)
        .into_iter()
        .map(|fragments| classify_line(&fragments, &fences))
        .collect();

    Document::from_lines(lines)
}

/// A fenced code block lifted out of the working text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fence {
    language: Option<String>,
    body: String,
}

/// Working text after pass 1: literal text and opaque fence placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Fence(usize),
}

fn extract_fences(text: &str) -> (Vec<Token<'_>>, Vec<Fence>) {
    let mut tokens = Vec::new();
    let mut fences = Vec::new();
    let mut last = 0;

    for caps in FENCE_RE.captures_iter(text) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token::Text(&text[last..whole.start()]));
        }
        let language = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|lang| !lang.is_empty())
            .map(ToString::to_string);
        let body = body.as_str();
        let body = body.strip_suffix('\n').unwrap_or(body);
        tokens.push(Token::Fence(fences.len()));
        fences.push(Fence {
            language,
            body: body.to_string(),
        });
        last = whole.end();
    }
    if last < text.len() || tokens.is_empty() {
        tokens.push(Token::Text(&text[last..]));
    }

    (tokens, fences)
}

/// Split the working text on `\n`; fences never contain a line break.
fn split_lines<'a>(tokens: &[Token<'a>]) -> Vec<Vec<Token<'a>>> {
    let mut lines = vec![Vec::new()];
    for token in tokens {
        match *token {
            Token::Text(text) => {
                let mut pieces = text.split('\n');
                if let Some(first) = pieces.next() {
                    push_fragment(&mut lines, first);
                }
                for piece in pieces {
                    lines.push(Vec::new());
                    push_fragment(&mut lines, piece);
                }
            }
            Token::Fence(idx) => {
                if let Some(current) = lines.last_mut() {
                    current.push(Token::Fence(idx));
                }
            }
        }
    }
    lines
}

fn push_fragment<'a>(lines: &mut [Vec<Token<'a>>], text: &'a str) {
    if text.is_empty() {
        return;
    }
    if let Some(current) = lines.last_mut() {
        current.push(Token::Text(text));
    }
}

fn classify_line(fragments: &[Token<'_>], fences: &[Fence]) -> Line {
    if let Some(fence) = sole_fence(fragments, fences) {
        return Line::new(
            LineKind::Paragraph,
            vec![Span::code_block(fence.language.clone(), fence.body.clone())],
        );
    }

    let Some(first) = fragments.first() else {
        return Line::blank();
    };
    let Token::Text(head) = *first else {
        return paragraph(fragments, fences);
    };
    let rest = &fragments[1..];
    let trimmed = head.trim_start();

    if let Some((level, content)) = header_marker(trimmed) {
        let mut out = SpanBuilder::new();
        let content = content.trim_start();
        if rest.is_empty() {
            tokenize_into(content.trim_end(), &mut out);
        } else {
            tokenize_into(content, &mut out);
            push_fragments(&trimmed_tail(rest), fences, &mut out);
        }
        return Line::new(LineKind::Header(level), out.finish());
    }

    if let Some(content) = bullet_marker(trimmed) {
        let mut out = SpanBuilder::new();
        out.push_plain(BULLET_GLYPH);
        tokenize_into(content, &mut out);
        push_fragments(rest, fences, &mut out);
        return Line::new(LineKind::BulletItem, out.finish());
    }

    if let Some((prefix, content)) = numbered_marker(trimmed) {
        let mut out = SpanBuilder::new();
        out.push_plain(prefix);
        tokenize_into(content, &mut out);
        push_fragments(rest, fences, &mut out);
        return Line::new(LineKind::NumberedItem, out.finish());
    }

    paragraph(fragments, fences)
}

fn paragraph(fragments: &[Token<'_>], fences: &[Fence]) -> Line {
    let mut out = SpanBuilder::new();
    push_fragments(fragments, fences, &mut out);
    Line::new(LineKind::Paragraph, out.finish())
}

fn push_fragments(fragments: &[Token<'_>], fences: &[Fence], out: &mut SpanBuilder) {
    for fragment in fragments {
        match *fragment {
            Token::Text(text) => tokenize_into(text, out),
            Token::Fence(idx) => {
                if let Some(fence) = fences.get(idx) {
                    out.push(Span::code_block(fence.language.clone(), fence.body.clone()));
                }
            }
        }
    }
}

/// Trailing whitespace of a header is dropped, even after a fence.
fn trimmed_tail<'a>(fragments: &[Token<'a>]) -> Vec<Token<'a>> {
    let mut tail = fragments.to_vec();
    if let Some(Token::Text(text)) = tail.last_mut() {
        *text = text.trim_end();
    }
    tail
}

/// The fence of a line made of one placeholder and optional whitespace.
fn sole_fence<'f>(fragments: &[Token<'_>], fences: &'f [Fence]) -> Option<&'f Fence> {
    let mut found = None;
    for fragment in fragments {
        match *fragment {
            Token::Text(text) if text.trim().is_empty() => {}
            Token::Fence(idx) if found.is_none() => found = Some(idx),
            _ => return None,
        }
    }
    found.and_then(|idx| fences.get(idx))
}

/// `#`-run followed by whitespace: returns the clamped level and the remainder.
fn header_marker(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 {
        return None;
    }
    let rest = &line[hashes..];
    if !starts_with_space(rest) {
        return None;
    }
    let level = u8::try_from(hashes.min(MAX_HEADER_LEVEL)).unwrap_or(6);
    Some((level, rest))
}

/// `-`, `*` or `+` followed by whitespace: returns the text after the spacing.
fn bullet_marker(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('+'))?;
    if !starts_with_space(rest) {
        return None;
    }
    Some(rest.trim_start_matches([' ', '\t']))
}

/// Digits, `.`, whitespace: returns the verbatim prefix and the remainder.
fn numbered_marker(line: &str) -> Option<(&str, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || line.as_bytes().get(digits) != Some(&b'.') {
        return None;
    }
    let after_dot = &line[digits + 1..];
    if !starts_with_space(after_dot) {
        return None;
    }
    let spacing = after_dot.len() - after_dot.trim_start_matches([' ', '\t']).len();
    let split = digits + 1 + spacing;
    Some((&line[..split], &line[split..]))
}

fn starts_with_space(text: &str) -> bool {
    text.starts_with([' ', '\t'])
}
