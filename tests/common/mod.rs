//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use ircterm::channel::ChannelStore;
use ircterm::config::Config;
use ircterm::error::{ChatError, Result};
use ircterm::network::{ConnectOptions, NetworkClient};
use ircterm::render::paint::PaintTable;
use ircterm::render::surface::ViewStack;
use ircterm::render::RenderCoordinator;
use ircterm::Session;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Network double that records every request as a protocol-ish line.
#[derive(Default)]
pub struct RecordingNetwork {
    connected: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl RecordingNetwork {
    pub fn connected() -> Arc<Self> {
        let network = Self::default();
        network.connected.store(true, Ordering::SeqCst);
        Arc::new(network)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        if !self.is_connected() {
            return Err(ChatError::network("not connected"));
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

impl NetworkClient for RecordingNetwork {
    fn connect(&self, options: &ConnectOptions) -> Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        self.calls
            .lock()
            .push(format!("CONNECT {} {}", options.address(), options.nick));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn join(&self, channel: &str) -> Result<()> {
        self.record(format!("JOIN {}", channel))
    }

    fn part(&self, channel: &str, reason: Option<&str>) -> Result<()> {
        self.record(format!("PART {} {}", channel, reason.unwrap_or("")).trim_end().to_string())
    }

    fn privmsg(&self, target: &str, text: &str) -> Result<()> {
        self.record(format!("PRIVMSG {} :{}", target, text))
    }

    fn set_nick(&self, nick: &str) -> Result<()> {
        self.record(format!("NICK {}", nick))
    }

    fn set_topic(&self, channel: &str, topic: &str) -> Result<()> {
        self.record(format!("TOPIC {} :{}", channel, topic))
    }

    fn send_raw(&self, line: &str) -> Result<()> {
        self.record(line.to_string())
    }

    fn quit(&self, reason: Option<&str>) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        self.calls
            .lock()
            .push(format!("QUIT {}", reason.unwrap_or("")).trim_end().to_string());
        Ok(())
    }
}

pub fn session_with(network: Arc<RecordingNetwork>) -> Arc<Session> {
    let config = Config::default();
    let store = Arc::new(ChannelStore::default());
    Arc::new(Session::new(
        config,
        store,
        network,
        Box::new(ViewStack::new(100, 30)),
    ))
}

pub fn session_with_paints(network: Arc<RecordingNetwork>, paints: PaintTable) -> Arc<Session> {
    let config = Config::default();
    let coordinator = RenderCoordinator::with_paint_table(config.colors.clone(), paints);
    Arc::new(Session::with_coordinator(
        config,
        Arc::new(ChannelStore::default()),
        network,
        Box::new(ViewStack::new(100, 30)),
        coordinator,
    ))
}

/// Plain text of a channel's surface.
pub fn surface_text(session: &Session, name: &str) -> Vec<String> {
    session
        .with_surfaces(|surfaces| surfaces.view(name).map(|view| view.text()))
        .unwrap_or_default()
}
