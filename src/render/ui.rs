//! Terminal rendering components.
//!
//! This module hosts the concrete terminal UI implementation along with the per-frame
//! screen state, the input line editor and styling.

pub mod renderer;
pub mod state;
pub mod terminal;
pub mod theme;

pub use renderer::UIRenderer;
pub use state::{ChannelTab, Completion, LineEditor, ScreenState};
pub use terminal::TerminalUI;
pub use theme::ColorTheme;

#[cfg(test)]
pub use renderer::tests::MockUIRenderer;
