//! Error types and handling infrastructure for ircterm.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types. The binary layers `anyhow` on top for context at the boundary.
//!
//! Failures fall into three groups:
//!
//! - **Resolution misses**: an unknown command token. These never become an error;
//!   the registry maps them to a no-op command.
//! - **Command failures**: returned by a command's `exec` and handed back to the
//!   caller unchanged.
//! - **Render faults**: any surface failure other than "already exists". The
//!   session loop treats these as fatal.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ircterm operations.
#[derive(Error, Debug)]
pub enum ChatError {
    /// A command rejected its arguments or could not complete
    #[error("{command}: {message}")]
    Command { command: String, message: String },

    /// A view surface was requested that the host does not know about
    #[error("Unknown view: {name}")]
    UnknownView { name: String },

    /// Any other view surface failure
    #[error("Surface operation failed: {message}")]
    Surface { message: String },

    /// The network collaborator refused or failed an operation
    #[error("Network operation failed: {message}")]
    Network { message: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// UI and terminal related errors
    #[error("UI operation failed: {message}")]
    UIError { message: String },

    /// Terminal IO failure
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for ircterm operations.
pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    /// Create a command failure attributed to `command`
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a usage error for a command invoked with missing arguments
    pub fn usage(command: impl Into<String>, usage: &str) -> Self {
        Self::Command {
            command: command.into(),
            message: format!("usage: {}", usage),
        }
    }

    /// Create an UnknownView error
    pub fn unknown_view(name: impl Into<String>) -> Self {
        Self::UnknownView { name: name.into() }
    }

    /// Create a Surface error with a descriptive message
    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface {
            message: message.into(),
        }
    }

    /// Create a Network error with a descriptive message
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a Config error for the given file
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a UIError with a descriptive message
    pub fn ui(message: impl Into<String>) -> Self {
        Self::UIError {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Render faults end the session; everything else is reported and survived.
    pub fn is_render_fault(&self) -> bool {
        matches!(
            self,
            ChatError::UnknownView { .. }
                | ChatError::Surface { .. }
                | ChatError::UIError { .. }
                | ChatError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let usage = ChatError::usage("join", "/join <channel>");
        assert_eq!(usage.to_string(), "join: usage: /join <channel>");

        let view = ChatError::unknown_view("#rust");
        assert_eq!(view.to_string(), "Unknown view: #rust");

        let config = ChatError::config("/tmp/config.toml", "bad port");
        assert_eq!(
            config.to_string(),
            "Configuration error in /tmp/config.toml: bad port"
        );
    }

    #[test]
    fn test_render_fault_classification() {
        assert!(ChatError::surface("no room").is_render_fault());
        assert!(ChatError::unknown_view("x").is_render_fault());
        assert!(!ChatError::command("nick", "taken").is_render_fault());
        assert!(!ChatError::network("not connected").is_render_fault());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: ChatError = io_err.into();

        match err {
            ChatError::Io(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::BrokenPipe),
            _ => panic!("Expected Io variant"),
        }
    }
}
