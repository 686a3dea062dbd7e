//! Screen state handed to the renderer each frame, and the input line editor.
//!
//! The loop owns both. [`ScreenState`] is rebuilt from the session before every draw;
//! [`LineEditor`] persists across frames.

use ratatui::text::Line;

/// Submitted lines remembered for Up/Down recall.
const MAX_HISTORY: usize = 100;

/// One entry of the channel bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTab {
    pub name: String,
    pub current: bool,
    pub unread: bool,
    pub highlight: bool,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct ScreenState {
    /// Topic bar text for the current channel.
    pub topic: String,
    pub tabs: Vec<ChannelTab>,
    /// Lines of the foreground surface that fit the view.
    pub lines: Vec<Line<'static>>,
    pub wrap: bool,
    /// Draw a border around the surface.
    pub frame: bool,
    /// True while the foreground surface is scrolled back.
    pub scrolled: bool,
    pub nick: String,
    pub connected: bool,
    pub input: String,
    /// Cursor position in the input line, in characters.
    pub cursor: usize,
}

impl ScreenState {
    /// `[nick] (offline)` plus a scroll marker, shown left of the channel tabs.
    pub fn status_prefix(&self) -> String {
        let mut prefix = format!("[{}]", self.nick);
        if !self.connected {
            prefix.push_str(" (offline)");
        }
        if self.scrolled {
            prefix.push_str(" -more-");
        }
        prefix
    }
}

/// Result of a tab completion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Nothing matched.
    None,
    /// The word was replaced by the only candidate.
    Unique,
    /// Several candidates; the word was extended to their common prefix.
    Ambiguous(Vec<String>),
}

/// Single-line editor with history.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    buffer: String,
    /// Byte offset, always on a char boundary.
    cursor: usize,
    history: Vec<String>,
    recall: Option<usize>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].chars().count()
    }

    pub fn insert(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.buffer.remove(idx);
            self.cursor = idx;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn right(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.recall = None;
    }

    /// Take the line for submission, remembering it in history.
    pub fn take(&mut self) -> String {
        let line = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        self.recall = None;
        if !line.trim().is_empty() && self.history.last() != Some(&line) {
            self.history.push(line.clone());
            if self.history.len() > MAX_HISTORY {
                self.history.remove(0);
            }
        }
        line
    }

    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let idx = match self.recall {
            Some(0) => 0,
            Some(idx) => idx - 1,
            None => self.history.len() - 1,
        };
        self.recall = Some(idx);
        self.set_buffer(self.history[idx].clone());
    }

    pub fn history_next(&mut self) {
        match self.recall {
            Some(idx) if idx + 1 < self.history.len() => {
                self.recall = Some(idx + 1);
                self.set_buffer(self.history[idx + 1].clone());
            }
            Some(_) => {
                self.recall = None;
                self.set_buffer(String::new());
            }
            None => {}
        }
    }

    fn set_buffer(&mut self, text: String) {
        self.buffer = text;
        self.cursor = self.buffer.len();
    }

    fn word_start(&self) -> usize {
        self.buffer[..self.cursor]
            .rfind(char::is_whitespace)
            .map_or(0, |idx| idx + 1)
    }

    /// The word ending at the cursor, and whether it is the first word of the line.
    pub fn current_word(&self) -> (&str, bool) {
        let start = self.word_start();
        (&self.buffer[start..self.cursor], start == 0)
    }

    /// Replace the word at the cursor using `candidates`.
    ///
    /// A unique nick completed at the start of the line gets a `: ` suffix, anywhere
    /// else a space. Command words (leading `/`) keep their slash.
    pub fn complete(&mut self, candidates: Vec<String>) -> Completion {
        let start = self.word_start();
        let (word, first) = self.current_word();
        let slash = if first && word.starts_with('/') { "/" } else { "" };

        let replacement = match candidates.len() {
            0 => return Completion::None,
            1 => {
                let suffix = if first && slash.is_empty() { ": " } else { " " };
                format!("{}{}{}", slash, candidates[0], suffix)
            }
            _ => format!("{}{}", slash, common_prefix(&candidates)),
        };

        self.buffer.replace_range(start..self.cursor, &replacement);
        self.cursor = start + replacement.len();

        if candidates.len() == 1 {
            Completion::Unique
        } else {
            Completion::Ambiguous(candidates)
        }
    }
}

fn common_prefix(words: &[String]) -> String {
    let Some(first) = words.first() else {
        return String::new();
    };
    let mut len = first.len();
    for word in &words[1..] {
        len = first
            .char_indices()
            .zip(word.chars())
            .take_while(|((_, a), b)| a == b)
            .map(|((idx, a), _)| idx + a.len_utf8())
            .last()
            .unwrap_or(0)
            .min(len);
    }
    first[..len].to_string()
}
