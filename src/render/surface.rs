//! View surfaces: one scrollable text buffer per channel, stacked by focus.
//!
//! [`SurfaceHost`] is the narrow interface the render coordinator and commands use.
//! [`ViewStack`] is the in-memory host the terminal front end draws from.

use crate::error::{ChatError, Result};
use ratatui::layout::Rect;
use ratatui::text::Line;

/// Scrollback kept per surface before the oldest lines are dropped.
pub const DEFAULT_SCROLLBACK: usize = 5_000;

/// A named text buffer with its presentation flags.
#[derive(Debug, Clone)]
pub struct ViewSurface {
    name: String,
    pub rect: Rect,
    pub wrap: bool,
    pub autoscroll: bool,
    pub frame: bool,
    lines: Vec<Line<'static>>,
    /// Lines scrolled back from the bottom; 0 follows new output.
    scroll: usize,
    scrollback: usize,
}

impl ViewSurface {
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            name: name.into(),
            rect,
            wrap: false,
            autoscroll: false,
            frame: true,
            lines: Vec::new(),
            scroll: 0,
            scrollback: DEFAULT_SCROLLBACK,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn append(&mut self, line: Line<'static>) {
        self.lines.push(line);
        if self.lines.len() > self.scrollback {
            let excess = self.lines.len() - self.scrollback;
            self.lines.drain(..excess);
        }
        // Hold the window still while scrolled back, or always without autoscroll.
        let overflow = self.lines.len() > usize::from(self.rect.height);
        if self.scroll > 0 || (!self.autoscroll && overflow) {
            self.scroll = (self.scroll + 1).min(self.max_scroll());
        }
    }

    pub fn append_lines(&mut self, lines: impl IntoIterator<Item = Line<'static>>) {
        for line in lines {
            self.append(line);
        }
    }

    pub fn write_blank(&mut self, count: usize) {
        for _ in 0..count {
            self.append(Line::default());
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.max_scroll());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    fn max_scroll(&self) -> usize {
        self.lines
            .len()
            .saturating_sub(usize::from(self.rect.height).max(1))
    }

    /// The slice that fits `height` rows, honoring the scroll offset.
    pub fn visible(&self, height: usize) -> &[Line<'static>] {
        let end = self.lines.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(height);
        &self.lines[start..end]
    }

    /// Plain text of every line, for logging and tests.
    pub fn text(&self) -> Vec<String> {
        self.lines.iter().map(line_text).collect()
    }
}

/// Concatenate the span contents of a line.
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

/// Host of channel surfaces.
pub trait SurfaceHost: Send {
    /// Return the surface called `name`, creating it when absent.
    ///
    /// The flag is true when the surface already existed; that is not an error.
    /// Existing surfaces take the new `rect`.
    fn get_or_create_view(&mut self, name: &str, rect: Rect) -> Result<(&mut ViewSurface, bool)>;

    fn view(&self, name: &str) -> Option<&ViewSurface>;

    /// Surface names from bottom to foreground.
    fn names(&self) -> Vec<String>;

    fn view_mut(&mut self, name: &str) -> Option<&mut ViewSurface>;

    /// Raise `name` above every other surface.
    fn set_surface_on_top(&mut self, name: &str) -> Result<()>;

    /// The surface currently in the foreground.
    fn top(&self) -> Option<&ViewSurface>;

    fn delete_view(&mut self, name: &str) -> Result<()>;

    /// Terminal size as (width, height).
    fn size(&self) -> (u16, u16);

    fn set_size(&mut self, width: u16, height: u16);

    /// Teardown hook; later surface creation fails.
    fn quit(&mut self);
}

/// In-memory surface host. The last element is the foreground surface.
#[derive(Debug, Clone)]
pub struct ViewStack {
    views: Vec<ViewSurface>,
    size: (u16, u16),
    closed: bool,
}

impl ViewStack {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            views: Vec::new(),
            size: (width, height),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.views.iter().position(|v| v.name == name)
    }
}

impl SurfaceHost for ViewStack {
    fn get_or_create_view(&mut self, name: &str, rect: Rect) -> Result<(&mut ViewSurface, bool)> {
        if self.closed {
            return Err(ChatError::surface("view host has been shut down"));
        }
        if name.is_empty() {
            return Err(ChatError::surface("view name must not be empty"));
        }

        match self.position(name) {
            Some(pos) => {
                let view = &mut self.views[pos];
                view.rect = rect;
                Ok((view, true))
            }
            None => {
                // New views open underneath the current foreground.
                let pos = self.views.len().saturating_sub(1);
                self.views.insert(pos, ViewSurface::new(name, rect));
                Ok((&mut self.views[pos], false))
            }
        }
    }

    fn view(&self, name: &str) -> Option<&ViewSurface> {
        self.views.iter().find(|v| v.name == name)
    }

    fn names(&self) -> Vec<String> {
        self.views.iter().map(|v| v.name.clone()).collect()
    }

    fn view_mut(&mut self, name: &str) -> Option<&mut ViewSurface> {
        self.views.iter_mut().find(|v| v.name == name)
    }

    fn set_surface_on_top(&mut self, name: &str) -> Result<()> {
        let pos = self
            .position(name)
            .ok_or_else(|| ChatError::unknown_view(name))?;
        let view = self.views.remove(pos);
        self.views.push(view);
        Ok(())
    }

    fn top(&self) -> Option<&ViewSurface> {
        self.views.last()
    }

    fn delete_view(&mut self, name: &str) -> Result<()> {
        let pos = self
            .position(name)
            .ok_or_else(|| ChatError::unknown_view(name))?;
        self.views.remove(pos);
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn set_size(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    fn quit(&mut self) {
        self.closed = true;
    }
}
