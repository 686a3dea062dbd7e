//! Name-keyed collection of channels in join order.

use super::{Channel, ChannelKind, STATUS_CHANNEL};
use parking_lot::RwLock;
use std::sync::Arc;

/// All channels of a session. The status channel is created up front and always
/// occupies index 0.
#[derive(Debug)]
pub struct ChannelStore {
    channels: RwLock<Vec<Arc<Channel>>>,
    palette: (u8, u8),
}

impl ChannelStore {
    /// Create a store whose channels color nicks from `min..=max`.
    pub fn new(min: u8, max: u8) -> Self {
        let status = Arc::new(Channel::with_palette(
            STATUS_CHANNEL,
            ChannelKind::Status,
            min,
            max,
        ));
        status.set_ready(true);
        Self {
            channels: RwLock::new(vec![status]),
            palette: (min, max),
        }
    }

    pub fn status(&self) -> Arc<Channel> {
        Arc::clone(&self.channels.read()[0])
    }

    pub fn get(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels
            .read()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }

    /// Return the channel called `name`, creating it with `kind` if needed.
    ///
    /// The boolean is true when the channel was created by this call. An existing
    /// channel keeps its original kind.
    pub fn get_or_insert(&self, name: &str, kind: ChannelKind) -> (Arc<Channel>, bool) {
        let mut channels = self.channels.write();
        if let Some(existing) = channels.iter().find(|c| c.name() == name) {
            return (Arc::clone(existing), false);
        }

        let (min, max) = self.palette;
        let channel = Arc::new(Channel::with_palette(name, kind, min, max));
        channels.push(Arc::clone(&channel));
        log::debug!("created channel {} ({:?})", name, kind);
        (channel, true)
    }

    /// Remove a channel. The status channel cannot be removed.
    pub fn remove(&self, name: &str) -> Option<Arc<Channel>> {
        if name == STATUS_CHANNEL {
            return None;
        }
        let mut channels = self.channels.write();
        let pos = channels.iter().position(|c| c.name() == name)?;
        Some(channels.remove(pos))
    }

    pub fn names(&self) -> Vec<String> {
        self.channels
            .read()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn all(&self) -> Vec<Arc<Channel>> {
        self.channels.read().clone()
    }

    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nth(&self, index: usize) -> Option<Arc<Channel>> {
        self.channels.read().get(index).cloned()
    }

    /// The channel after `name`, wrapping to the first. Unknown names map to status.
    pub fn next_after(&self, name: &str) -> Arc<Channel> {
        self.step(name, 1)
    }

    /// The channel before `name`, wrapping to the last. Unknown names map to status.
    pub fn prev_before(&self, name: &str) -> Arc<Channel> {
        self.step(name, -1)
    }

    fn step(&self, name: &str, delta: isize) -> Arc<Channel> {
        let channels = self.channels.read();
        let len = channels.len() as isize;
        match channels.iter().position(|c| c.name() == name) {
            Some(pos) => {
                let next = (pos as isize + delta).rem_euclid(len) as usize;
                Arc::clone(&channels[next])
            }
            None => Arc::clone(&channels[0]),
        }
    }
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new(crate::color::NICK_COLOR_MIN, crate::color::NICK_COLOR_MAX)
    }
}
