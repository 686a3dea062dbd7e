//! UI renderer trait.
//!
//! Separates the loop from the terminal so the loop can run against a mock in tests.

use crate::error::Result;
use crate::render::ui::state::ScreenState;

/// Draws frames and owns the terminal lifecycle.
pub trait UIRenderer {
    /// Draw one frame: topic bar, foreground surface, status bar and input line.
    fn render(&mut self, screen: &ScreenState) -> Result<()>;

    /// Enter raw mode and the alternate screen.
    fn initialize(&mut self) -> Result<()>;

    /// Restore the terminal. Safe to call more than once.
    fn cleanup(&mut self) -> Result<()>;

    /// Current terminal dimensions as (width, height).
    fn get_terminal_size(&self) -> Result<(u16, u16)>;
}
