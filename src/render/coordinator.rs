//! Render coordination.
//!
//! Makes a channel's surface exist and keeps it consistent: the first render styles
//! and seeds the surface and runs the kind's paint routine; later renders only update
//! geometry. Any surface failure other than "already exists" is returned to the loop,
//! which treats it as fatal.

use crate::channel::Channel;
use crate::config::ColorConfig;
use crate::error::{ChatError, Result};
use crate::render::paint::{PaintContext, PaintTable};
use crate::render::surface::SurfaceHost;
use ratatui::layout::Rect;

/// Rows taken by the topic bar, the status bar and the input line.
pub const RESERVED_ROWS: u16 = 3;

/// Blank lines seeded into a new normal channel surface.
const NORMAL_SEED_LINES: usize = 3;
/// Blank lines seeded into a new private channel surface.
const PRIVATE_SEED_LINES: usize = 2;

/// Area of a channel surface for a terminal of `width` x `height`.
pub fn view_rect(width: u16, height: u16) -> Rect {
    Rect::new(0, 1, width, height.saturating_sub(RESERVED_ROWS))
}

/// Coordinates surface creation, styling and painting for channels.
#[derive(Debug, Clone)]
pub struct RenderCoordinator {
    paints: PaintTable,
    context: PaintContext,
}

impl RenderCoordinator {
    pub fn new(colors: ColorConfig) -> Self {
        Self::with_paint_table(colors, PaintTable::default())
    }

    pub fn with_paint_table(colors: ColorConfig, paints: PaintTable) -> Self {
        Self {
            paints,
            context: PaintContext { colors },
        }
    }

    /// Ensure `channel` has a surface.
    ///
    /// On first creation a non-status surface is made wrapping, auto-scrolling and
    /// borderless and seeded with blank lines; a private channel also gets a
    /// synthesized topic. Unless `is_update` is set the kind's paint routine then
    /// fills it. Private channels are raised to the foreground. An existing surface
    /// only has its geometry refreshed.
    pub fn render(
        &self,
        surfaces: &mut dyn SurfaceHost,
        channel: &Channel,
        is_update: bool,
    ) -> Result<()> {
        let (width, height) = surfaces.size();
        channel.set_geometry(width, height);

        let (view, existed) = surfaces.get_or_create_view(channel.name(), view_rect(width, height))?;
        if existed {
            return Ok(());
        }
        log::debug!("created surface for {}", channel.name());

        if !channel.is_status() {
            view.wrap = true;
            view.autoscroll = true;
            view.frame = false;

            if channel.is_private() {
                channel.set_topic(format!("Private Chat: {}", channel.name()), None);
                view.write_blank(PRIVATE_SEED_LINES);
            } else {
                view.write_blank(NORMAL_SEED_LINES);
            }
        }
        view.wrap = true;

        if !is_update {
            let paint = self.paints.for_kind(channel.kind());
            paint(&self.context, channel, view)?;
        }

        if channel.is_private() {
            surfaces.set_surface_on_top(channel.name())?;
        }

        Ok(())
    }

    /// Re-apply geometry after a resize without repainting.
    pub fn refresh(&self, surfaces: &mut dyn SurfaceHost, channel: &Channel) -> Result<()> {
        let (width, height) = surfaces.size();
        channel.set_geometry(width, height);
        match surfaces.view_mut(channel.name()) {
            Some(view) => {
                view.rect = view_rect(width, height);
                Ok(())
            }
            None => self.render(surfaces, channel, true),
        }
    }

    /// Move queued lines onto the channel's surface.
    ///
    /// Returns true if anything was appended. Lines landing on a channel that is not
    /// in the foreground mark it unread.
    pub fn flush_backlog(
        &self,
        surfaces: &mut dyn SurfaceHost,
        channel: &Channel,
        is_current: bool,
    ) -> Result<bool> {
        if !channel.has_backlog() {
            return Ok(false);
        }
        let view = surfaces
            .view_mut(channel.name())
            .ok_or_else(|| ChatError::unknown_view(channel.name()))?;
        view.append_lines(channel.drain_backlog());
        if !is_current {
            channel.set_unread(true);
        }
        Ok(true)
    }
}
