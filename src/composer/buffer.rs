use ropey::Rope;
use unicode_width::UnicodeWidthStr;

/// Cursor location in the input buffer, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column in chars within the line.
    pub col: usize,
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Multi-line message being composed, backed by a rope.
///
/// The cursor is a char offset into the rope; line and column are derived
/// from it on demand. Vertical moves remember the column they started from.
pub struct InputBuffer {
    rope: Rope,
    pos: usize,
    col_memory: Option<usize>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            pos: 0,
            col_memory: None,
        }
    }

    /// Buffer holding `text` with the cursor at its end.
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let pos = rope.len_chars();
        Self {
            rope,
            pos,
            col_memory: None,
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// True when there is nothing but whitespace to send.
    pub fn is_blank(&self) -> bool {
        self.rope.chars().all(char::is_whitespace)
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line content without its trailing newline.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(line_idx).to_string();
        Some(line.trim_end_matches('\n').to_string())
    }

    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .filter_map(|idx| self.line_at(idx))
            .collect()
    }

    pub fn cursor(&self) -> Cursor {
        let line = self.rope.char_to_line(self.pos);
        Cursor {
            line,
            col: self.pos - self.rope.line_to_char(line),
        }
    }

    /// Terminal column of the cursor within its line.
    pub fn cursor_display_col(&self) -> usize {
        let cursor = self.cursor();
        let start = self.rope.line_to_char(cursor.line);
        self.rope.slice(start..self.pos).to_string().width()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.rope.insert_char(self.pos, ch);
        self.pos += 1;
        self.col_memory = None;
    }

    /// Insert text at the cursor, e.g. a paste. `\r\n` becomes `\n`.
    pub fn insert_str(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if text.is_empty() {
            return;
        }
        self.rope.insert(self.pos, &text);
        self.pos += text.chars().count();
        self.col_memory = None;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the char before the cursor. Returns `true` if one was removed.
    pub fn delete_back(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.rope.remove(self.pos - 1..self.pos);
        self.pos -= 1;
        self.col_memory = None;
        true
    }

    /// Delete the char under the cursor. Returns `true` if one was removed.
    pub fn delete_forward(&mut self) -> bool {
        if self.pos >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(self.pos..=self.pos);
        self.col_memory = None;
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                self.pos = self.pos.saturating_sub(1);
                self.col_memory = None;
            }
            Direction::Right => {
                self.pos = (self.pos + 1).min(self.rope.len_chars());
                self.col_memory = None;
            }
            Direction::Up => self.move_vertical(false),
            Direction::Down => self.move_vertical(true),
        }
    }

    /// Move to the start of the current line.
    pub fn move_home(&mut self) {
        let line = self.cursor().line;
        self.pos = self.rope.line_to_char(line);
        self.col_memory = None;
    }

    /// Move to the end of the current line.
    pub fn move_end(&mut self) {
        let line = self.cursor().line;
        self.pos = self.rope.line_to_char(line) + self.line_len_chars(line);
        self.col_memory = None;
    }

    /// Move to the start of the previous word (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        let mut pos = self.pos;
        while pos > 0 && !is_word_char(self.rope.char(pos - 1)) {
            pos -= 1;
        }
        while pos > 0 && is_word_char(self.rope.char(pos - 1)) {
            pos -= 1;
        }
        self.pos = pos;
        self.col_memory = None;
    }

    /// Move past the current word and the gap after it (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        let len = self.rope.len_chars();
        let mut pos = self.pos;
        while pos < len && is_word_char(self.rope.char(pos)) {
            pos += 1;
        }
        while pos < len && !is_word_char(self.rope.char(pos)) {
            pos += 1;
        }
        self.pos = pos;
        self.col_memory = None;
    }

    pub fn clear(&mut self) {
        self.rope = Rope::new();
        self.pos = 0;
        self.col_memory = None;
    }

    /// Return the whole text and leave the buffer empty.
    pub fn take_text(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }

    fn line_len_chars(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    fn move_vertical(&mut self, down: bool) {
        let cursor = self.cursor();
        let target = if down {
            if cursor.line + 1 >= self.line_count() {
                return;
            }
            cursor.line + 1
        } else {
            if cursor.line == 0 {
                return;
            }
            cursor.line - 1
        };
        let want = *self.col_memory.get_or_insert(cursor.col);
        self.pos = self.rope.line_to_char(target) + want.min(self.line_len_chars(target));
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBuffer")
            .field("chars", &self.rope.len_chars())
            .field("lines", &self.rope.len_lines())
            .field("cursor", &self.cursor())
            .finish()
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
