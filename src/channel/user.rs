//! Channel participants.

use crate::color;
use ratatui::text::Span;
use std::fmt;

/// Rank marker carried in front of a nick in NAMES replies and nick listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NickMode {
    /// `@`
    Op,
    /// `%`
    HalfOp,
    /// `+`
    Voice,
    #[default]
    Normal,
}

impl NickMode {
    /// Mode for a prefix character; `None` for anything that is not a rank marker.
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '@' => Some(NickMode::Op),
            '%' => Some(NickMode::HalfOp),
            '+' => Some(NickMode::Voice),
            _ => None,
        }
    }

    fn rank(self) -> u8 {
        match self {
            NickMode::Op => 3,
            NickMode::HalfOp => 2,
            NickMode::Voice => 1,
            NickMode::Normal => 0,
        }
    }

    /// Prefix string shown before the nick (empty for normal users).
    pub fn prefix(self) -> &'static str {
        match self {
            NickMode::Op => "@",
            NickMode::HalfOp => "%",
            NickMode::Voice => "+",
            NickMode::Normal => "",
        }
    }
}

/// Split leading rank markers off a raw nick token.
///
/// `"@alice"` yields `(Op, "alice")`; `"alice"` yields `(Normal, "alice")`.
/// Multi-prefix tokens such as `"@+eve"` keep the highest rank.
pub fn split_prefix(raw: &str) -> (NickMode, &str) {
    let mut mode = NickMode::Normal;
    let mut rest = raw;
    while let Some(found) = rest.chars().next().and_then(NickMode::from_prefix) {
        if found.rank() > mode.rank() {
            mode = found;
        }
        rest = &rest[1..];
    }
    (mode, rest)
}

/// One participant of one channel. Channels never share `User` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub nick: String,
    pub mode: NickMode,
    /// 256-color palette index.
    pub color: u8,
}

impl User {
    pub fn new(nick: impl Into<String>, mode: NickMode, color: u8) -> Self {
        Self {
            nick: nick.into(),
            mode,
            color,
        }
    }

    /// `<mode><nick>`, optionally styled with the user's color.
    pub fn styled(&self, colored: bool) -> Span<'static> {
        if colored {
            color::format(self.color, self.to_string())
        } else {
            Span::raw(self.to_string())
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mode.prefix(), self.nick)
    }
}
