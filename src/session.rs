//! The session context shared by commands, the render coordinator and the loop.
//!
//! A single [`Session`] is built at startup and handed around as `Arc<Session>`. It
//! owns the channel store, the network client and the surface host, and tracks which
//! channel is in the foreground.

use crate::channel::{Channel, ChannelKind, ChannelStore, STATUS_CHANNEL};
use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::network::{message_line, notice_line, ConnectOptions, NetworkClient};
use crate::render::coordinator::RenderCoordinator;
use crate::render::surface::SurfaceHost;
use parking_lot::{Mutex, RwLock};
use ratatui::text::Line;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared state of one client session.
pub struct Session {
    config: Config,
    channels: Arc<ChannelStore>,
    network: Arc<dyn NetworkClient>,
    surfaces: Mutex<Box<dyn SurfaceHost>>,
    coordinator: RenderCoordinator,
    current: RwLock<String>,
    nick: RwLock<String>,
    password: RwLock<Option<String>>,
    quitting: AtomicBool,
}

impl Session {
    pub fn new(
        config: Config,
        channels: Arc<ChannelStore>,
        network: Arc<dyn NetworkClient>,
        surfaces: Box<dyn SurfaceHost>,
    ) -> Self {
        let coordinator = RenderCoordinator::new(config.colors.clone());
        Self::with_coordinator(config, channels, network, surfaces, coordinator)
    }

    pub fn with_coordinator(
        config: Config,
        channels: Arc<ChannelStore>,
        network: Arc<dyn NetworkClient>,
        surfaces: Box<dyn SurfaceHost>,
        coordinator: RenderCoordinator,
    ) -> Self {
        let nick = config.server.nick.clone();
        let password = config.server.password.clone();
        Self {
            config,
            channels,
            network,
            surfaces: Mutex::new(surfaces),
            coordinator,
            current: RwLock::new(STATUS_CHANNEL.to_string()),
            nick: RwLock::new(nick),
            password: RwLock::new(password),
            quitting: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn channels(&self) -> &Arc<ChannelStore> {
        &self.channels
    }

    pub fn network(&self) -> &Arc<dyn NetworkClient> {
        &self.network
    }

    pub fn auto_connect(&self) -> bool {
        self.config.server.auto_connect
    }

    pub fn current_channel_name(&self) -> String {
        self.current.read().clone()
    }

    /// The foreground channel; falls back to status if it has gone away.
    pub fn current_channel(&self) -> Arc<Channel> {
        let name = self.current_channel_name();
        self.channels
            .get(&name)
            .unwrap_or_else(|| self.channels.status())
    }

    pub fn nick(&self) -> String {
        self.nick.read().clone()
    }

    pub fn set_nick(&self, nick: impl Into<String>) {
        *self.nick.write() = nick.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        *self.password.write() = Some(password.into());
    }

    /// Connection parameters from config, with `/nick` and `/pass` applied.
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::from_config(&self.config.server);
        options.nick = self.nick();
        options.password = self.password.read().clone();
        options
    }

    /// Run `f` against the surface host.
    pub fn with_surfaces<R>(&self, f: impl FnOnce(&mut dyn SurfaceHost) -> R) -> R {
        let mut surfaces = self.surfaces.lock();
        f(surfaces.as_mut())
    }

    /// Render `channel` through the coordinator.
    pub fn render(&self, channel: &Channel, is_update: bool) -> Result<()> {
        self.with_surfaces(|surfaces| self.coordinator.render(surfaces, channel, is_update))
    }

    /// Bring `name` to the foreground and make it current.
    pub fn focus(&self, name: &str) -> Result<()> {
        let channel = self
            .channels
            .get(name)
            .ok_or_else(|| ChatError::unknown_view(name))?;
        self.render(&channel, false)?;
        self.with_surfaces(|surfaces| surfaces.set_surface_on_top(name))?;
        channel.set_unread(false);
        channel.set_highlight(false);
        *self.current.write() = name.to_string();
        log::debug!("focused {}", name);
        Ok(())
    }

    /// Create (if needed), render and focus a channel.
    pub fn open_channel(&self, name: &str) -> Result<Arc<Channel>> {
        let (channel, created) = self
            .channels
            .get_or_insert(name, ChannelKind::classify(name));
        if created && channel.is_private() {
            channel.add_nick(name);
            channel.add_nick(&self.nick());
        }
        self.focus(name)?;
        Ok(channel)
    }

    /// Drop a channel and its surface; focus returns to status if it was current.
    pub fn close_channel(&self, name: &str) -> Result<()> {
        if name == STATUS_CHANNEL {
            return Err(ChatError::command("part", "cannot leave the status channel"));
        }
        self.channels.remove(name);
        let had_view = self.with_surfaces(|surfaces| surfaces.view(name).is_some());
        if had_view {
            self.with_surfaces(|surfaces| surfaces.delete_view(name))?;
        }
        if self.current_channel_name() == name {
            self.focus(STATUS_CHANNEL)?;
        }
        Ok(())
    }

    /// Append lines to a channel's surface, queueing them if it has none yet.
    pub fn write_to(&self, name: &str, lines: Vec<Line<'static>>) {
        let leftover = self.with_surfaces(|surfaces| match surfaces.view_mut(name) {
            Some(view) => {
                view.append_lines(lines);
                None
            }
            None => Some(lines),
        });
        if let Some(lines) = leftover {
            if let Some(channel) = self.channels.get(name) {
                for line in lines {
                    channel.push_line(line);
                }
            }
        }
    }

    pub fn write_status(&self, lines: Vec<Line<'static>>) {
        self.write_to(STATUS_CHANNEL, lines);
    }

    pub fn write_current(&self, lines: Vec<Line<'static>>) {
        let name = self.current_channel_name();
        self.write_to(&name, lines);
    }

    /// Write a `** text` notice to the status channel.
    pub fn notice(&self, text: impl Into<String>) {
        self.write_status(vec![notice_line(&self.config.colors, text)]);
    }

    /// Write an `error: ...` line to the status channel.
    pub fn report_error(&self, err: &ChatError) {
        log::warn!("{}", err);
        self.write_status(vec![Line::from(crate::color::format(
            self.config.colors.red,
            format!("error: {}", err),
        ))]);
    }

    /// Send a message to the current channel and echo it locally.
    pub fn say(&self, text: &str) -> Result<()> {
        let channel = self.current_channel();
        if channel.is_status() {
            return Err(ChatError::command(
                "say",
                "not in a channel; use /join <channel> or /msg <nick>",
            ));
        }
        self.send_message(channel.name(), text)
    }

    /// Send a message to `target` and echo it into the target's channel.
    pub fn send_message(&self, target: &str, text: &str) -> Result<()> {
        self.network.privmsg(target, text)?;
        let nick = self.nick();
        let color = crate::color::palette_index(
            &nick,
            self.config.ui.nick_color_min,
            self.config.ui.nick_color_max,
        );
        self.write_to(target, vec![message_line(color, &nick, text)]);
        Ok(())
    }

    /// Per-tick bookkeeping: render channels created by the network and move
    /// queued lines onto their surfaces.
    pub fn sync(&self) -> Result<()> {
        for channel in self.channels.all() {
            let has_view = self.with_surfaces(|surfaces| surfaces.view(channel.name()).is_some());
            if !has_view {
                self.render(&channel, false)?;
                if channel.is_private() {
                    *self.current.write() = channel.name().to_string();
                }
            }
            let is_current = channel.name() == self.current_channel_name();
            self.with_surfaces(|surfaces| {
                self.coordinator
                    .flush_backlog(surfaces, &channel, is_current)
            })?;
        }

        // Surfaces whose channel was removed by the network thread.
        let orphans: Vec<String> = self.with_surfaces(|surfaces| {
            surfaces
                .names()
                .into_iter()
                .filter(|name| self.channels.get(name).is_none())
                .collect()
        });
        for name in orphans {
            log::debug!("dropping surface of departed channel {}", name);
            self.with_surfaces(|surfaces| surfaces.delete_view(&name))?;
        }
        if self.channels.get(&self.current_channel_name()).is_none() {
            self.focus(STATUS_CHANNEL)?;
        }
        Ok(())
    }

    /// Terminal was resized: refresh every surface's geometry.
    pub fn resize(&self, width: u16, height: u16) -> Result<()> {
        self.with_surfaces(|surfaces| {
            surfaces.set_size(width, height);
            for channel in self.channels.all() {
                self.coordinator.refresh(surfaces, &channel)?;
            }
            Ok(())
        })
    }

    /// Scroll the current surface; positive is towards older lines.
    pub fn scroll(&self, lines: i32) {
        let name = self.current_channel_name();
        self.with_surfaces(|surfaces| {
            if let Some(view) = surfaces.view_mut(&name) {
                if lines >= 0 {
                    view.scroll_up(lines as usize);
                } else {
                    view.scroll_down(lines.unsigned_abs() as usize);
                }
            }
        });
    }

    /// Tear down: leave the network, close the surfaces, stop the loop.
    pub fn quit(&self) -> Result<()> {
        if self.quitting.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        log::info!("session quitting");
        let result = self.network.quit(Some("leaving"));
        self.with_surfaces(|surfaces| surfaces.quit());
        result
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::LoopbackClient;
    use crate::render::surface::ViewStack;

    fn session() -> Session {
        let config = Config::default();
        let channels = Arc::new(ChannelStore::default());
        let network = Arc::new(LoopbackClient::new(
            Arc::clone(&channels),
            config.colors.clone(),
        ));
        Session::new(config, channels, network, Box::new(ViewStack::new(80, 24)))
    }

    #[test]
    fn lines_for_unrendered_channel_are_queued() {
        let session = session();
        let (channel, _) = session.channels().get_or_insert("#rust", ChannelKind::Normal);

        session.write_to("#rust", vec![Line::from("early")]);
        assert!(channel.has_backlog());

        session.sync().unwrap();
        assert!(!channel.has_backlog());
        let text = session.with_surfaces(|s| s.view("#rust").map(|v| v.text()));
        assert_eq!(text.unwrap().last().map(String::as_str), Some("early"));
    }

    #[test]
    fn status_channel_cannot_be_closed() {
        let session = session();
        assert!(session.close_channel(STATUS_CHANNEL).is_err());
        assert!(session.channels().get(STATUS_CHANNEL).is_some());
    }

    #[test]
    fn scroll_moves_current_surface_only() {
        let session = session();
        session.focus(STATUS_CHANNEL).unwrap();
        session.write_status((0..100).map(|i| Line::from(format!("{}", i))).collect());

        session.scroll(5);
        session.scroll(-2);
        let offset = session.with_surfaces(|s| s.view(STATUS_CHANNEL).map(|v| v.scroll_offset()));
        assert_eq!(offset, Some(3));
    }

    #[test]
    fn pass_and_nick_override_config() {
        let session = session();
        session.set_nick("carol");
        session.set_password("hunter2");
        let options = session.connect_options();
        assert_eq!(options.nick, "carol");
        assert_eq!(options.password.as_deref(), Some("hunter2"));
    }
}
