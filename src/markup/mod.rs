//! Lightweight chat markup parsing.
//!
//! This module handles:
//! - Lifting fenced code blocks out of the text before anything else
//! - Classifying each line (header, bullet, numbered item, paragraph, blank)
//! - Splitting line content into bold, italic and inline-code spans
//!
//! Parsing is total: unterminated or malformed markup degrades to plain text.

mod inline;
mod parser;
mod types;

pub use inline::tokenize;
pub use parser::{BULLET_GLYPH, parse};
pub use types::{Document, Line, LineKind, Span, SpanKind};
