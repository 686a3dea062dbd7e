//! # ircterm - Terminal IRC Client Core
//!
//! The state and rendering core of a terminal chat client: channels and their members,
//! a registry of slash commands, and a coordinator that keeps one scrollable surface per
//! channel in step with the channel state.
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`config`] - TOML configuration with defaults
//! - [`channel`] - Channels, members and the channel store
//! - [`command`] - Command registry and the built-in commands
//! - [`render`] - Surfaces, paint routines, the render coordinator and the terminal UI
//! - [`network`] - Network client interface and the event sink applied to channels
//! - [`session`] - Shared context tying the pieces together
//! - [`input`] - Terminal input collection and key bindings
//! - [`app`] - The session loop

// Core modules
pub mod color;
pub mod config;
pub mod error;

// Domain state
pub mod channel;
pub mod command;
pub mod network;
pub mod session;

// Terminal front end
pub mod input;
pub mod render;

pub mod app;

// Re-export commonly used types for convenience
pub use error::{ChatError, Result};

pub use app::Application;
pub use channel::{Channel, ChannelKind, ChannelStore};
pub use command::{Command, CommandMetadata, CommandRegistry};
pub use config::Config;
pub use session::Session;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
