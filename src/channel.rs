//! Channel state shared between the session loop and network threads.
//!
//! Every field of [`Channel`] is behind its own guard so that a network thread can
//! add or remove nicks, change the topic or raise flags while the loop thread is
//! formatting or painting the same channel. Readers take the same lock as writers,
//! so the render path never observes a half-applied membership change.

pub mod store;
pub mod user;

pub use store::ChannelStore;
pub use user::{split_prefix, NickMode, User};

use crate::color::{self, NICK_COLOR_MAX, NICK_COLOR_MIN};
use crate::config::ColorConfig;
use parking_lot::{Mutex, RwLock};
use ratatui::text::{Line, Span};
use std::sync::atomic::{AtomicBool, Ordering};

/// Name of the always-present meta channel.
pub const STATUS_CHANNEL: &str = "status";

/// Label used in channel summaries.
pub const CLIENT_NAME: &str = "ircterm";

/// What a channel is; fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Status,
    Private,
    Normal,
}

impl ChannelKind {
    /// Classify a channel name: the status channel, a `#`/`&` channel, or a query.
    pub fn classify(name: &str) -> Self {
        if name == STATUS_CHANNEL {
            ChannelKind::Status
        } else if name.starts_with('#') || name.starts_with('&') {
            ChannelKind::Normal
        } else {
            ChannelKind::Private
        }
    }
}

/// Topic text and who set it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topic {
    pub text: String,
    pub set_by: Option<String>,
}

/// Last known size of the channel's surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub max_width: u16,
    pub max_height: u16,
}

/// Per-mode head count of a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NickMetrics {
    pub op: usize,
    pub halfop: usize,
    pub voice: usize,
    pub normal: usize,
}

impl NickMetrics {
    pub fn total(&self) -> usize {
        self.op + self.halfop + self.voice + self.normal
    }
}

/// A named conversation surface with membership and topic.
#[derive(Debug)]
pub struct Channel {
    name: String,
    kind: ChannelKind,
    palette: (u8, u8),
    users: RwLock<Vec<User>>,
    topic: RwLock<Topic>,
    geometry: RwLock<Geometry>,
    backlog: Mutex<Vec<Line<'static>>>,
    ready: AtomicBool,
    unread: AtomicBool,
    highlight: AtomicBool,
}

impl Channel {
    /// Create a channel using the default nick color range.
    pub fn new(name: impl Into<String>, kind: ChannelKind) -> Self {
        Self::with_palette(name, kind, NICK_COLOR_MIN, NICK_COLOR_MAX)
    }

    /// Create a channel whose nicks are colored from `min..=max`.
    pub fn with_palette(name: impl Into<String>, kind: ChannelKind, min: u8, max: u8) -> Self {
        Self {
            name: name.into(),
            kind,
            palette: (min, max),
            users: RwLock::new(Vec::new()),
            topic: RwLock::new(Topic::default()),
            geometry: RwLock::new(Geometry::default()),
            backlog: Mutex::new(Vec::new()),
            ready: AtomicBool::new(false),
            unread: AtomicBool::new(false),
            highlight: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn is_status(&self) -> bool {
        self.kind == ChannelKind::Status
    }

    pub fn is_private(&self) -> bool {
        self.kind == ChannelKind::Private
    }

    // --- membership -------------------------------------------------------

    /// Look up a user by nick (a leading mode prefix is ignored).
    pub fn find_user(&self, nick: &str) -> Option<User> {
        let (_, nick) = split_prefix(nick);
        self.users.read().iter().find(|u| u.nick == nick).cloned()
    }

    /// Add a nick if it is not already present.
    ///
    /// A leading `@`, `%` or `+` sets the user's mode. Re-adding a present nick with
    /// a prefix updates its mode; without one it is a no-op.
    pub fn add_nick(&self, raw: &str) {
        let (mode, nick) = split_prefix(raw);
        if nick.is_empty() {
            return;
        }

        let mut users = self.users.write();
        if let Some(existing) = users.iter_mut().find(|u| u.nick == nick) {
            if mode != NickMode::Normal {
                existing.mode = mode;
            }
            return;
        }

        let (min, max) = self.palette;
        users.push(User::new(nick, mode, color::palette_index(nick, min, max)));
    }

    /// Remove a nick; absent nicks are ignored.
    pub fn remove_nick(&self, raw: &str) {
        let (_, nick) = split_prefix(raw);
        let mut users = self.users.write();
        if let Some(pos) = users.iter().position(|u| u.nick == nick) {
            users.remove(pos);
        }
    }

    /// Change a present user's mode. Returns false if the nick is unknown.
    pub fn set_mode(&self, nick: &str, mode: NickMode) -> bool {
        let mut users = self.users.write();
        match users.iter_mut().find(|u| u.nick == nick) {
            Some(user) => {
                user.mode = mode;
                true
            }
            None => false,
        }
    }

    /// Rename a user, keeping its mode. The color follows the new nick.
    ///
    /// Returns false if `old` is unknown or `new` is already taken.
    pub fn rename_nick(&self, old: &str, new: &str) -> bool {
        let mut users = self.users.write();
        if users.iter().any(|u| u.nick == new) {
            return false;
        }
        let (min, max) = self.palette;
        match users.iter_mut().find(|u| u.nick == old) {
            Some(user) => {
                user.nick = new.to_string();
                user.color = color::palette_index(new, min, max);
                true
            }
            None => false,
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    /// Copy of the current membership, sorted by nick in byte order.
    pub fn users_sorted(&self) -> Vec<User> {
        let mut users = self.users.read().clone();
        users.sort_by(|a, b| a.nick.cmp(&b.nick));
        users
    }

    /// Nicks starting with `prefix`, sorted.
    pub fn complete_nick(&self, prefix: &str) -> Vec<String> {
        self.users_sorted()
            .into_iter()
            .filter(|u| u.nick.starts_with(prefix))
            .map(|u| u.nick)
            .collect()
    }

    // --- formatting -------------------------------------------------------

    /// Bracketed, comma-delimited listing of the members sorted by nick.
    pub fn nick_list_lines(&self, colors: &ColorConfig, colored: bool) -> Vec<Line<'static>> {
        let users = self.users_sorted();
        let mut listing = Vec::with_capacity(users.len() * 2);
        for (i, user) in users.iter().enumerate() {
            if i > 0 {
                listing.push(Span::raw(", "));
            }
            listing.push(user.styled(colored));
        }

        vec![
            Line::from(color::format(colors.green, "== NICK LIST START")),
            Line::from(listing),
            Line::from(color::format(colors.green, "== NICK LIST END")),
        ]
    }

    /// Plain-text form of [`Channel::nick_list_lines`].
    pub fn nick_list_string(&self) -> String {
        let listing = self
            .users_sorted()
            .iter()
            .map(User::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("== NICK LIST START\n{}\n== NICK LIST END", listing)
    }

    /// Head count by mode. Counts always add up to [`Channel::user_count`].
    pub fn nick_metrics(&self) -> NickMetrics {
        self.users
            .read()
            .iter()
            .fold(NickMetrics::default(), |mut metrics, user| {
                match user.mode {
                    NickMode::Op => metrics.op += 1,
                    NickMode::HalfOp => metrics.halfop += 1,
                    NickMode::Voice => metrics.voice += 1,
                    NickMode::Normal => metrics.normal += 1,
                }
                metrics
            })
    }

    /// `<client>: <channel>: Total of N nicks [a ops, b halfops, c voices, d normal]`
    pub fn nick_metrics_string(&self) -> String {
        let m = self.nick_metrics();
        format!(
            "{}: {}: Total of {} nicks [{} ops, {} halfops, {} voices, {} normal]",
            CLIENT_NAME,
            self.name,
            m.total(),
            m.op,
            m.halfop,
            m.voice,
            m.normal
        )
    }

    /// Metrics summary prefixed with a colored `**` marker.
    pub fn nick_metrics_line(&self, colors: &ColorConfig) -> Line<'static> {
        Line::from(vec![
            color::format(colors.green, "**"),
            Span::raw(format!(" {}", self.nick_metrics_string())),
        ])
    }

    // --- topic and flags --------------------------------------------------

    pub fn topic(&self) -> Topic {
        self.topic.read().clone()
    }

    pub fn set_topic(&self, text: impl Into<String>, set_by: Option<String>) {
        let mut topic = self.topic.write();
        topic.text = text.into();
        topic.set_by = set_by;
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn is_unread(&self) -> bool {
        self.unread.load(Ordering::Acquire)
    }

    pub fn set_unread(&self, unread: bool) {
        self.unread.store(unread, Ordering::Release);
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight.load(Ordering::Acquire)
    }

    pub fn set_highlight(&self, highlight: bool) {
        self.highlight.store(highlight, Ordering::Release);
    }

    // --- geometry and backlog ---------------------------------------------

    pub fn geometry(&self) -> Geometry {
        *self.geometry.read()
    }

    pub fn set_geometry(&self, max_width: u16, max_height: u16) {
        *self.geometry.write() = Geometry {
            max_width,
            max_height,
        };
    }

    /// Queue a line for the loop to append to this channel's surface.
    pub fn push_line(&self, line: Line<'static>) {
        self.backlog.lock().push(line);
    }

    /// Take all queued lines.
    pub fn drain_backlog(&self) -> Vec<Line<'static>> {
        std::mem::take(&mut *self.backlog.lock())
    }

    pub fn has_backlog(&self) -> bool {
        !self.backlog.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> Channel {
        Channel::new("#test", ChannelKind::Normal)
    }

    #[test]
    fn classify_channel_names() {
        assert_eq!(ChannelKind::classify(STATUS_CHANNEL), ChannelKind::Status);
        assert_eq!(ChannelKind::classify("#rust"), ChannelKind::Normal);
        assert_eq!(ChannelKind::classify("&local"), ChannelKind::Normal);
        assert_eq!(ChannelKind::classify("alice"), ChannelKind::Private);
    }

    #[test]
    fn add_nick_twice_keeps_one_user() {
        let channel = channel();
        channel.add_nick("dave");
        channel.add_nick("dave");
        assert_eq!(channel.user_count(), 1);
        assert_eq!(channel.find_user("dave").unwrap().nick, "dave");
    }

    #[test]
    fn add_nick_with_prefix_updates_mode() {
        let channel = channel();
        channel.add_nick("dave");
        channel.add_nick("@dave");
        assert_eq!(channel.user_count(), 1);
        assert_eq!(channel.find_user("dave").unwrap().mode, NickMode::Op);

        // A bare re-add does not demote.
        channel.add_nick("dave");
        assert_eq!(channel.find_user("dave").unwrap().mode, NickMode::Op);
    }

    #[test]
    fn multi_prefix_nick_is_stored_bare() {
        let channel = channel();
        channel.add_nick("@+eve");
        let eve = channel.find_user("eve").unwrap();
        assert_eq!((eve.nick.as_str(), eve.mode), ("eve", NickMode::Op));

        channel.remove_nick("eve");
        assert_eq!(channel.user_count(), 0);
    }

    #[test]
    fn remove_missing_nick_is_noop() {
        let channel = channel();
        channel.add_nick("alice");
        channel.remove_nick("ghost");
        assert_eq!(channel.user_count(), 1);

        channel.remove_nick("@alice");
        assert_eq!(channel.user_count(), 0);
    }

    #[test]
    fn nick_list_is_sorted_by_nick_only() {
        let channel = channel();
        channel.add_nick("carol");
        channel.add_nick("@zed");
        channel.add_nick("alice");
        channel.add_nick("+bob");

        assert_eq!(
            channel.nick_list_string(),
            "== NICK LIST START\nalice, +bob, carol, @zed\n== NICK LIST END"
        );
    }

    #[test]
    fn nick_list_sort_is_case_sensitive() {
        let channel = channel();
        channel.add_nick("bob");
        channel.add_nick("Zoe");
        channel.add_nick("alice");
        let nicks: Vec<_> = channel.users_sorted().into_iter().map(|u| u.nick).collect();
        assert_eq!(nicks, vec!["Zoe", "alice", "bob"]);
    }

    #[test]
    fn empty_channel_formats_cleanly() {
        let channel = channel();
        assert_eq!(
            channel.nick_list_string(),
            "== NICK LIST START\n\n== NICK LIST END"
        );
        assert_eq!(
            channel.nick_metrics_string(),
            "ircterm: #test: Total of 0 nicks [0 ops, 0 halfops, 0 voices, 0 normal]"
        );
        assert_eq!(channel.nick_list_lines(&ColorConfig::default(), true).len(), 3);
    }

    #[test]
    fn metrics_scenario() {
        let channel = channel();
        for nick in ["@alice", "%bob", "carol", "+dan"] {
            channel.add_nick(nick);
        }

        let metrics = channel.nick_metrics();
        assert_eq!(
            metrics,
            NickMetrics {
                op: 1,
                halfop: 1,
                voice: 1,
                normal: 1
            }
        );
        assert_eq!(metrics.total(), 4);
        assert_eq!(
            channel.nick_metrics_string(),
            "ircterm: #test: Total of 4 nicks [1 ops, 1 halfops, 1 voices, 1 normal]"
        );
    }

    #[test]
    fn rename_keeps_mode_and_rejects_collisions() {
        let channel = channel();
        channel.add_nick("@alice");
        channel.add_nick("bob");

        assert!(!channel.rename_nick("alice", "bob"));
        assert!(channel.rename_nick("alice", "alicia"));
        assert_eq!(channel.find_user("alicia").unwrap().mode, NickMode::Op);
        assert!(channel.find_user("alice").is_none());
        assert!(!channel.rename_nick("ghost", "spirit"));
    }

    #[test]
    fn same_nick_gets_same_color_in_every_channel() {
        let a = Channel::new("#a", ChannelKind::Normal);
        let b = Channel::new("#b", ChannelKind::Normal);
        a.add_nick("alice");
        b.add_nick("alice");
        assert_eq!(
            a.find_user("alice").unwrap().color,
            b.find_user("alice").unwrap().color
        );
    }

    #[test]
    fn complete_nick_filters_by_prefix() {
        let channel = channel();
        for nick in ["alice", "albert", "bob"] {
            channel.add_nick(nick);
        }
        assert_eq!(channel.complete_nick("al"), vec!["albert", "alice"]);
        assert!(channel.complete_nick("z").is_empty());
    }

    #[test]
    fn backlog_drains_once() {
        let channel = channel();
        channel.push_line(Line::from("one"));
        channel.push_line(Line::from("two"));
        assert!(channel.has_backlog());
        assert_eq!(channel.drain_backlog().len(), 2);
        assert!(channel.drain_backlog().is_empty());
    }

    #[test]
    fn concurrent_mutation_keeps_nicks_unique() {
        use std::sync::Arc;

        let channel = Arc::new(channel());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let channel = Arc::clone(&channel);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        channel.add_nick(&format!("user{i}"));
                        let _ = channel.nick_list_string();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(channel.user_count(), 50);
    }
}
