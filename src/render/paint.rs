//! Initial content painted into a freshly created channel surface.
//!
//! Which routine runs is decided by the channel's [`ChannelKind`] through a
//! [`PaintTable`], never by a function stored on the channel itself.

use crate::channel::{Channel, ChannelKind};
use crate::color;
use crate::config::ColorConfig;
use crate::error::Result;
use crate::network::notice_line;
use crate::render::surface::ViewSurface;
use ratatui::text::{Line, Span};
use std::sync::Arc;

/// Inputs shared by every paint routine.
#[derive(Debug, Clone, Default)]
pub struct PaintContext {
    pub colors: ColorConfig,
}

/// A paint routine: fill `view` with the opening content for `channel`.
pub type PaintFn = Arc<dyn Fn(&PaintContext, &Channel, &mut ViewSurface) -> Result<()> + Send + Sync>;

const LOGO: &[&str] = &[
    r"  _              _                      ",
    r" (_)_ __ ___ ___| |_ ___ _ __ _ __ ___  ",
    r" | | '__/ __/ __| __/ _ \ '__| '_ ` _ \ ",
    r" | | | | (__\__ \ ||  __/ |  | | | | | |",
    r" |_|_|  \___|___/\__\___|_|  |_| |_| |_|",
];

/// The client banner.
pub fn logo_lines(colors: &ColorConfig) -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|row| Line::from(color::format(colors.blue, *row)))
        .collect()
}

/// `Version: x.y.z  Source Code: <repository>`
pub fn version_line(colors: &ColorConfig) -> Line<'static> {
    Line::from(vec![
        Span::raw("  Version: "),
        color::format(colors.yellow, crate::VERSION),
        Span::raw("  Source Code: "),
        color::format(colors.green, env!("CARGO_PKG_REPOSITORY")),
    ])
}

/// Dispatch table from channel kind to paint routine.
#[derive(Clone)]
pub struct PaintTable {
    status: PaintFn,
    private: PaintFn,
    normal: PaintFn,
}

impl PaintTable {
    pub fn new(status: PaintFn, private: PaintFn, normal: PaintFn) -> Self {
        Self {
            status,
            private,
            normal,
        }
    }

    /// Replace the routine for one kind.
    pub fn with(mut self, kind: ChannelKind, paint: PaintFn) -> Self {
        match kind {
            ChannelKind::Status => self.status = paint,
            ChannelKind::Private => self.private = paint,
            ChannelKind::Normal => self.normal = paint,
        }
        self
    }

    pub fn for_kind(&self, kind: ChannelKind) -> &PaintFn {
        match kind {
            ChannelKind::Status => &self.status,
            ChannelKind::Private => &self.private,
            ChannelKind::Normal => &self.normal,
        }
    }
}

impl Default for PaintTable {
    fn default() -> Self {
        Self::new(
            Arc::new(paint_status),
            Arc::new(paint_private),
            Arc::new(paint_normal),
        )
    }
}

impl std::fmt::Debug for PaintTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintTable").finish_non_exhaustive()
    }
}

fn paint_status(ctx: &PaintContext, _channel: &Channel, view: &mut ViewSurface) -> Result<()> {
    view.append_lines(logo_lines(&ctx.colors));
    view.append(Line::default());
    view.append(version_line(&ctx.colors));
    view.append(Line::default());
    view.append(notice_line(
        &ctx.colors,
        "Type /help for a list of commands, /connect to go online.",
    ));
    Ok(())
}

fn paint_normal(ctx: &PaintContext, channel: &Channel, view: &mut ViewSurface) -> Result<()> {
    view.append(notice_line(
        &ctx.colors,
        format!("You have joined {}", channel.name()),
    ));
    let topic = channel.topic();
    if !topic.text.is_empty() {
        let text = match topic.set_by {
            Some(who) => format!("Topic: {} (set by {})", topic.text, who),
            None => format!("Topic: {}", topic.text),
        };
        view.append(notice_line(&ctx.colors, text));
    }
    if channel.user_count() > 0 {
        view.append_lines(channel.nick_list_lines(&ctx.colors, true));
        view.append(channel.nick_metrics_line(&ctx.colors));
    }
    Ok(())
}

fn paint_private(ctx: &PaintContext, channel: &Channel, view: &mut ViewSurface) -> Result<()> {
    view.append(notice_line(
        &ctx.colors,
        format!("Private conversation with {}", channel.name()),
    ));
    Ok(())
}
