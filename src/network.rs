//! Network boundary.
//!
//! The wire protocol lives outside this crate. [`NetworkClient`] is what commands call
//! to act on the network; [`NetworkEvent`] is what a network thread feeds back, applied
//! to the channel store by an [`EventSink`] from that thread.

pub mod loopback;

pub use loopback::LoopbackClient;

use crate::channel::{ChannelKind, ChannelStore, NickMode, STATUS_CHANNEL};
use crate::color;
use crate::config::{ColorConfig, ServerConfig};
use crate::error::Result;
use ratatui::text::{Line, Span};
use std::sync::Arc;

/// Parameters for opening a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub nick: String,
    pub user: String,
    pub password: Option<String>,
}

impl ConnectOptions {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            tls: server.tls,
            nick: server.nick.clone(),
            user: server.user.clone(),
            password: server.password.clone(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Operations the client core asks of the network layer.
pub trait NetworkClient: Send + Sync {
    fn connect(&self, options: &ConnectOptions) -> Result<()>;
    fn is_connected(&self) -> bool;
    fn join(&self, channel: &str) -> Result<()>;
    fn part(&self, channel: &str, reason: Option<&str>) -> Result<()>;
    fn privmsg(&self, target: &str, text: &str) -> Result<()>;
    fn set_nick(&self, nick: &str) -> Result<()>;
    fn set_topic(&self, channel: &str, topic: &str) -> Result<()>;
    fn send_raw(&self, line: &str) -> Result<()>;
    fn quit(&self, reason: Option<&str>) -> Result<()>;
}

/// Protocol-level happenings, already decoded by the network layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Connected { server: String },
    Disconnected { reason: String },
    /// We joined `channel`.
    SelfJoined { channel: String },
    UserJoined { channel: String, nick: String },
    Parted { channel: String, nick: String, reason: Option<String> },
    Quit { nick: String, reason: Option<String> },
    NickChanged { old: String, new: String },
    /// One batch of a NAMES reply; nicks may carry mode prefixes.
    Names { channel: String, nicks: Vec<String> },
    NamesEnd { channel: String },
    Topic { channel: String, topic: String, set_by: Option<String> },
    ModeChanged { channel: String, nick: String, mode: NickMode },
    /// A PRIVMSG; `target` is a channel or our own nick.
    Message { target: String, from: String, text: String },
    Notice { text: String },
}

/// Applies [`NetworkEvent`]s to the store and queues the lines they produce.
///
/// Safe to use from any thread; it only touches the store's guarded state.
#[derive(Debug, Clone)]
pub struct EventSink {
    store: Arc<ChannelStore>,
    colors: ColorConfig,
    own_nick: String,
}

impl EventSink {
    pub fn new(store: Arc<ChannelStore>, colors: ColorConfig, own_nick: impl Into<String>) -> Self {
        Self {
            store,
            colors,
            own_nick: own_nick.into(),
        }
    }

    pub fn own_nick(&self) -> &str {
        &self.own_nick
    }

    pub fn apply(&mut self, event: NetworkEvent) {
        log::trace!("network event: {:?}", event);
        match event {
            NetworkEvent::Connected { server } => {
                self.status(format!("Connected to {}", server));
            }
            NetworkEvent::Disconnected { reason } => {
                self.status(format!("Disconnected: {}", reason));
                for channel in self.store.all() {
                    channel.set_ready(channel.is_status());
                }
            }
            NetworkEvent::SelfJoined { channel } => {
                let (chan, _) = self.store.get_or_insert(&channel, ChannelKind::classify(&channel));
                chan.add_nick(&self.own_nick);
            }
            NetworkEvent::UserJoined { channel, nick } => {
                if let Some(chan) = self.store.get(&channel) {
                    chan.add_nick(&nick);
                    chan.push_line(self.notice_line(format!("{} has joined {}", nick, channel)));
                }
            }
            NetworkEvent::Parted {
                channel,
                nick,
                reason,
            } => {
                if nick == self.own_nick {
                    self.store.remove(&channel);
                    return;
                }
                if let Some(chan) = self.store.get(&channel) {
                    chan.remove_nick(&nick);
                    chan.push_line(self.notice_line(with_reason(
                        format!("{} has left {}", nick, channel),
                        reason.as_deref(),
                    )));
                }
            }
            NetworkEvent::Quit { nick, reason } => {
                for chan in self.store.all() {
                    if chan.find_user(&nick).is_some() {
                        chan.remove_nick(&nick);
                        chan.push_line(self.notice_line(with_reason(
                            format!("{} has quit", nick),
                            reason.as_deref(),
                        )));
                    }
                }
            }
            NetworkEvent::NickChanged { old, new } => {
                if old == self.own_nick {
                    self.own_nick = new.clone();
                    self.status(format!("You are now known as {}", new));
                }
                for chan in self.store.all() {
                    if chan.rename_nick(&old, &new) {
                        chan.push_line(
                            self.notice_line(format!("{} is now known as {}", old, new)),
                        );
                    }
                }
            }
            NetworkEvent::Names { channel, nicks } => {
                if let Some(chan) = self.store.get(&channel) {
                    for nick in nicks {
                        chan.add_nick(&nick);
                    }
                }
            }
            NetworkEvent::NamesEnd { channel } => {
                if let Some(chan) = self.store.get(&channel) {
                    chan.set_ready(true);
                    chan.push_line(chan.nick_metrics_line(&self.colors));
                }
            }
            NetworkEvent::Topic {
                channel,
                topic,
                set_by,
            } => {
                if let Some(chan) = self.store.get(&channel) {
                    let line = match &set_by {
                        Some(who) => format!("{} changed the topic to: {}", who, topic),
                        None => format!("Topic: {}", topic),
                    };
                    chan.set_topic(topic, set_by);
                    chan.push_line(self.notice_line(line));
                }
            }
            NetworkEvent::ModeChanged {
                channel,
                nick,
                mode,
            } => {
                if let Some(chan) = self.store.get(&channel) {
                    chan.set_mode(&nick, mode);
                }
            }
            NetworkEvent::Message { target, from, text } => {
                // Messages addressed to us open a query named after the sender.
                let name = if target == self.own_nick { from.clone() } else { target };
                let (chan, created) = self.store.get_or_insert(&name, ChannelKind::classify(&name));
                if created && chan.is_private() {
                    chan.add_nick(&from);
                }
                if text.contains(&self.own_nick) {
                    chan.set_highlight(true);
                }
                let color = chan
                    .find_user(&from)
                    .map(|u| u.color)
                    .unwrap_or(self.colors.white);
                chan.push_line(message_line(color, &from, &text));
            }
            NetworkEvent::Notice { text } => self.status(text),
        }
    }

    fn status(&self, text: String) {
        if let Some(status) = self.store.get(STATUS_CHANNEL) {
            status.push_line(self.notice_line(text));
        }
    }

    fn notice_line(&self, text: String) -> Line<'static> {
        notice_line(&self.colors, text)
    }
}

fn with_reason(text: String, reason: Option<&str>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => format!("{} ({})", text, reason),
        _ => text,
    }
}

/// `<nick> text` with the nick in its palette color.
pub fn message_line(color: u8, from: &str, text: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("<"),
        color::format(color, from.to_string()),
        Span::raw(format!("> {}", text)),
    ])
}

/// `** text` with a green marker, used for membership and server notices.
pub fn notice_line(colors: &ColorConfig, text: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        color::format(colors.green, "**"),
        Span::raw(format!(" {}", text.into())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::line_text;

    fn sink() -> (Arc<ChannelStore>, EventSink) {
        let store = Arc::new(ChannelStore::default());
        let sink = EventSink::new(Arc::clone(&store), ColorConfig::default(), "me");
        (store, sink)
    }

    #[test]
    fn join_and_names_populate_channel() {
        let (store, mut sink) = sink();
        sink.apply(NetworkEvent::SelfJoined {
            channel: "#rust".into(),
        });
        sink.apply(NetworkEvent::Names {
            channel: "#rust".into(),
            nicks: vec!["@alice".into(), "+bob".into(), "me".into()],
        });
        sink.apply(NetworkEvent::NamesEnd {
            channel: "#rust".into(),
        });

        let chan = store.get("#rust").unwrap();
        assert!(chan.is_ready());
        assert_eq!(chan.user_count(), 3);
        let backlog: Vec<_> = chan.drain_backlog().iter().map(line_text).collect();
        assert_eq!(
            backlog,
            vec!["** ircterm: #rust: Total of 3 nicks [1 ops, 0 halfops, 1 voices, 1 normal]"]
        );
    }

    #[test]
    fn own_part_removes_channel() {
        let (store, mut sink) = sink();
        sink.apply(NetworkEvent::SelfJoined {
            channel: "#rust".into(),
        });
        sink.apply(NetworkEvent::Parted {
            channel: "#rust".into(),
            nick: "me".into(),
            reason: None,
        });
        assert!(store.get("#rust").is_none());
    }

    #[test]
    fn quit_removes_nick_everywhere() {
        let (store, mut sink) = sink();
        for name in ["#a", "#b"] {
            sink.apply(NetworkEvent::SelfJoined {
                channel: name.into(),
            });
            sink.apply(NetworkEvent::UserJoined {
                channel: name.into(),
                nick: "alice".into(),
            });
        }
        sink.apply(NetworkEvent::Quit {
            nick: "alice".into(),
            reason: Some("bye".into()),
        });

        for name in ["#a", "#b"] {
            let chan = store.get(name).unwrap();
            assert!(chan.find_user("alice").is_none());
            let last = chan.drain_backlog().last().map(line_text).unwrap();
            assert_eq!(last, "** alice has quit (bye)");
        }
    }

    #[test]
    fn private_message_opens_query_and_highlights() {
        let (store, mut sink) = sink();
        sink.apply(NetworkEvent::Message {
            target: "me".into(),
            from: "alice".into(),
            text: "hey me".into(),
        });

        let chan = store.get("alice").unwrap();
        assert!(chan.is_private());
        assert!(chan.is_highlighted());
        assert_eq!(
            chan.drain_backlog().iter().map(line_text).collect::<Vec<_>>(),
            vec!["<alice> hey me"]
        );
    }

    #[test]
    fn own_nick_change_is_tracked() {
        let (store, mut sink) = sink();
        sink.apply(NetworkEvent::SelfJoined {
            channel: "#a".into(),
        });
        sink.apply(NetworkEvent::NickChanged {
            old: "me".into(),
            new: "myself".into(),
        });
        assert_eq!(sink.own_nick(), "myself");
        assert!(store.get("#a").unwrap().find_user("myself").is_some());
    }

    #[test]
    fn topic_event_sets_topic() {
        let (store, mut sink) = sink();
        sink.apply(NetworkEvent::SelfJoined {
            channel: "#a".into(),
        });
        sink.apply(NetworkEvent::Topic {
            channel: "#a".into(),
            topic: "rust things".into(),
            set_by: Some("alice".into()),
        });
        let topic = store.get("#a").unwrap().topic();
        assert_eq!(topic.text, "rust things");
        assert_eq!(topic.set_by.as_deref(), Some("alice"));
    }
}
