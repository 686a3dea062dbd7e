//! A network client that never leaves the machine.
//!
//! Requests are answered on a dedicated thread with the events a server would send
//! back, applied straight onto the shared channel store. Used by the binary when no
//! real transport is plugged in, and by tests that need the cross-thread path.

use super::{ConnectOptions, EventSink, NetworkClient, NetworkEvent};
use crate::channel::ChannelStore;
use crate::config::ColorConfig;
use crate::error::{ChatError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc::{self, UnboundedSender};

/// Nicks seeded into every joined channel so listings have content.
const RESIDENT_NICKS: &[&str] = &["@ChanServ", "%helper", "+voiced", "lurker"];

#[derive(Debug)]
enum Request {
    Join(String),
    Part(String, Option<String>),
    Privmsg(String, String),
    Nick(String),
    Topic(String, String),
    Raw(String),
    Quit(Option<String>),
}

/// Loopback implementation of [`NetworkClient`].
pub struct LoopbackClient {
    store: Arc<ChannelStore>,
    colors: ColorConfig,
    connected: Arc<AtomicBool>,
    tx: Mutex<Option<UnboundedSender<Request>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl LoopbackClient {
    pub fn new(store: Arc<ChannelStore>, colors: ColorConfig) -> Self {
        Self {
            store,
            colors,
            connected: Arc::new(AtomicBool::new(false)),
            tx: Mutex::new(None),
            worker: Mutex::new(None),
        }
    }

    fn send(&self, request: Request) -> Result<()> {
        let guard = self.tx.lock();
        let tx = guard
            .as_ref()
            .ok_or_else(|| ChatError::network("not connected"))?;
        tx.send(request)
            .map_err(|_| ChatError::network("connection closed"))
    }
}

impl NetworkClient for LoopbackClient {
    fn connect(&self, options: &ConnectOptions) -> Result<()> {
        if self.is_connected() {
            return Err(ChatError::network(format!(
                "already connected to {}",
                options.address()
            )));
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<Request>();
        let mut sink = EventSink::new(
            Arc::clone(&self.store),
            self.colors.clone(),
            options.nick.clone(),
        );
        let connected = Arc::clone(&self.connected);
        let server = options.address();
        connected.store(true, Ordering::SeqCst);
        log::info!("loopback connect to {} as {}", server, options.nick);

        let handle = thread::spawn(move || {
            sink.apply(NetworkEvent::Connected { server });
            while let Some(request) = rx.blocking_recv() {
                if !answer(&mut sink, request) {
                    break;
                }
            }
            connected.store(false, Ordering::SeqCst);
            sink.apply(NetworkEvent::Disconnected {
                reason: "connection closed".to_string(),
            });
        });

        *self.tx.lock() = Some(tx);
        *self.worker.lock() = Some(handle);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn join(&self, channel: &str) -> Result<()> {
        self.send(Request::Join(channel.to_string()))
    }

    fn part(&self, channel: &str, reason: Option<&str>) -> Result<()> {
        self.send(Request::Part(
            channel.to_string(),
            reason.map(str::to_string),
        ))
    }

    fn privmsg(&self, target: &str, text: &str) -> Result<()> {
        self.send(Request::Privmsg(target.to_string(), text.to_string()))
    }

    fn set_nick(&self, nick: &str) -> Result<()> {
        self.send(Request::Nick(nick.to_string()))
    }

    fn set_topic(&self, channel: &str, topic: &str) -> Result<()> {
        self.send(Request::Topic(channel.to_string(), topic.to_string()))
    }

    fn send_raw(&self, line: &str) -> Result<()> {
        self.send(Request::Raw(line.to_string()))
    }

    fn quit(&self, reason: Option<&str>) -> Result<()> {
        let sent = self.send(Request::Quit(reason.map(str::to_string)));
        self.tx.lock().take();
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                log::error!("loopback worker panicked");
            }
        }
        // Quitting while disconnected is fine.
        match sent {
            Err(ChatError::Network { .. }) | Ok(()) => Ok(()),
            Err(other) => Err(other),
        }
    }
}

impl Drop for LoopbackClient {
    fn drop(&mut self) {
        let _ = self.quit(None);
    }
}

/// Translate one request into the events a server would answer with.
/// Returns false once the connection should close.
fn answer(sink: &mut EventSink, request: Request) -> bool {
    let own = sink.own_nick().to_string();
    match request {
        Request::Join(channel) => {
            sink.apply(NetworkEvent::SelfJoined {
                channel: channel.clone(),
            });
            let mut nicks: Vec<String> = RESIDENT_NICKS.iter().map(|n| n.to_string()).collect();
            nicks.push(own);
            sink.apply(NetworkEvent::Names {
                channel: channel.clone(),
                nicks,
            });
            sink.apply(NetworkEvent::NamesEnd { channel });
        }
        Request::Part(channel, reason) => sink.apply(NetworkEvent::Parted {
            channel,
            nick: own,
            reason,
        }),
        Request::Privmsg(target, text) => {
            log::debug!("loopback privmsg to {}: {}", target, text);
        }
        Request::Nick(new) => sink.apply(NetworkEvent::NickChanged { old: own, new }),
        Request::Topic(channel, topic) => sink.apply(NetworkEvent::Topic {
            channel,
            topic,
            set_by: Some(own),
        }),
        Request::Raw(line) => sink.apply(NetworkEvent::Notice {
            text: format!("-> {}", line),
        }),
        Request::Quit(_) => return false,
    }
    true
}
