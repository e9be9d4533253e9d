//! Core markup types.

/// Formatting kind of a [`Span`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    /// Unstyled text
    Plain,
    /// `**strong**` text
    Bold,
    /// `*emphasis*` text
    Italic,
    /// `` `code` `` inside a line
    InlineCode,
    /// Fenced block, with the language tag written after the opening fence
    CodeBlock { language: Option<String> },
}

/// A contiguous run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    kind: SpanKind,
    text: String,
}

impl Span {
    pub fn new(kind: SpanKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(SpanKind::Plain, text)
    }

    pub fn code_block(language: Option<String>, text: impl Into<String>) -> Self {
        Self::new(SpanKind::CodeBlock { language }, text)
    }

    pub const fn kind(&self) -> &SpanKind {
        &self.kind
    }

    /// Raw content with the markup delimiters stripped.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Language tag of a fenced code block, if one was written.
    pub fn language_hint(&self) -> Option<&str> {
        match &self.kind {
            SpanKind::CodeBlock { language } => language.as_deref(),
            _ => None,
        }
    }

    pub const fn is_code_block(&self) -> bool {
        matches!(self.kind, SpanKind::CodeBlock { .. })
    }
}

/// Block-level classification of a [`Line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Normal text, also used for lines holding a fenced code block
    Paragraph,
    /// `#` header with level (1-6)
    Header(u8),
    /// `-`, `*` or `+` list item, marker already replaced by a bullet glyph
    BulletItem,
    /// `1.` list item, number prefix kept verbatim
    NumberedItem,
    /// Empty line
    Blank,
}

/// One display row: a classified, ordered group of spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    kind: LineKind,
    spans: Vec<Span>,
}

impl Line {
    pub const fn new(kind: LineKind, spans: Vec<Span>) -> Self {
        Self { kind, spans }
    }

    pub const fn blank() -> Self {
        Self {
            kind: LineKind::Blank,
            spans: Vec::new(),
        }
    }

    pub const fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Concatenated span text, delimiters already stripped.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(Span::text).collect()
    }
}

/// The ordered output of one parse call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    /// Create an empty document.
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    pub(crate) const fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Plain text of every line joined by `\n`.
    ///
    /// Re-parsing this text never reintroduces styling that the markup
    /// delimiters produced, since the delimiters are gone.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(Line::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Accumulates spans for one line, merging neighbouring plain runs.
#[derive(Debug, Default)]
pub(crate) struct SpanBuilder {
    spans: Vec<Span>,
}

impl SpanBuilder {
    pub(crate) const fn new() -> Self {
        Self { spans: Vec::new() }
    }

    pub(crate) fn push_plain(&mut self, text: &str) {
        self.push(Span::plain(text));
    }

    pub(crate) fn push(&mut self, span: Span) {
        if span.text.is_empty() && !span.is_code_block() {
            return;
        }
        if span.kind == SpanKind::Plain
            && let Some(last) = self.spans.last_mut()
            && last.kind == SpanKind::Plain
        {
            last.text.push_str(&span.text);
            return;
        }
        self.spans.push(span);
    }

    pub(crate) fn extend(&mut self, spans: impl IntoIterator<Item = Span>) {
        for span in spans {
            self.push(span);
        }
    }

    pub(crate) fn finish(self) -> Vec<Span> {
        self.spans
    }
}
