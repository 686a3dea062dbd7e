//! User command resolution and dispatch.
//!
//! The registry holds the built-in commands in a fixed order. A token resolves to
//! the first command whose name, or failing that one of whose aliases, equals it.
//! Tokens that match nothing resolve to a no-op command, so callers never deal with
//! a missing command.

pub mod builtin;

use crate::error::Result;
use crate::session::Session;
use std::collections::HashMap;
use std::sync::Arc;

/// Name, description and aliases of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMetadata {
    name: String,
    description: String,
    aliases: Vec<String>,
}

impl CommandMetadata {
    pub fn new(name: &str, description: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Name match first, then aliases.
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|alias| alias == token)
    }

    /// Every token this command answers to.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// An executable user command.
pub trait Command: Send + Sync {
    fn metadata(&self) -> &CommandMetadata;

    fn exec(&self, args: &[String]) -> Result<()>;
}

/// What unknown tokens resolve to. Does nothing and never fails.
#[derive(Debug)]
pub struct EmptyCommand {
    metadata: CommandMetadata,
}

impl EmptyCommand {
    pub fn new() -> Self {
        Self {
            metadata: CommandMetadata::new("", "does nothing", &[]),
        }
    }
}

impl Default for EmptyCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for EmptyCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn exec(&self, _args: &[String]) -> Result<()> {
        Ok(())
    }
}

/// Ordered table of commands.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
    empty: Arc<dyn Command>,
    collisions: Vec<String>,
}

impl CommandRegistry {
    /// Build the built-in command set bound to `session`.
    pub fn register(session: &Arc<Session>) -> Self {
        Self::from_commands(builtin::all(session))
    }

    /// Build a registry from an explicit list, in resolution order.
    ///
    /// Tokens claimed by more than one command are logged and recorded; the first
    /// registered command keeps them.
    pub fn from_commands(commands: Vec<Arc<dyn Command>>) -> Self {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        let mut collisions = Vec::new();
        for command in &commands {
            let metadata = command.metadata();
            for token in metadata.tokens() {
                if let Some(owner) = owners.get(token) {
                    log::warn!(
                        "command token '{}' of '{}' is shadowed by '{}'",
                        token,
                        metadata.name(),
                        owner
                    );
                    collisions.push(token.to_string());
                } else {
                    owners.insert(token, metadata.name());
                }
            }
        }
        log::debug!("registered {} commands", commands.len());

        Self {
            commands,
            empty: Arc::new(EmptyCommand::new()),
            collisions,
        }
    }

    /// The command `token` names, or the no-op command.
    pub fn resolve(&self, token: &str) -> Arc<dyn Command> {
        match self
            .commands
            .iter()
            .find(|command| command.metadata().matches(token))
        {
            Some(command) => Arc::clone(command),
            None => {
                log::debug!("unknown command '{}'", token);
                Arc::clone(&self.empty)
            }
        }
    }

    /// Resolve `token` and execute it; failures are returned as-is.
    pub fn run(&self, token: &str, args: &[String]) -> Result<()> {
        self.resolve(token).exec(args)
    }

    pub fn commands(&self) -> &[Arc<dyn Command>] {
        &self.commands
    }

    /// Tokens that were claimed by an earlier command.
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    pub fn is_empty_command(&self, command: &Arc<dyn Command>) -> bool {
        Arc::ptr_eq(command, &self.empty)
    }

    /// Command names starting with `prefix`, in registration order.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        self.commands
            .iter()
            .map(|c| c.metadata().name())
            .filter(|name| name.starts_with(prefix))
            .map(str::to_string)
            .collect()
    }
}

/// A line typed into the input bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    /// `/name args...`
    Command { name: String, args: Vec<String> },
    /// Anything else is said to the current channel.
    Message(String),
    Empty,
}

/// Split a submitted line into a command invocation or a message.
///
/// `//text` sends `/text` as a message.
pub fn parse_line(line: &str) -> InputLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputLine::Empty;
    }
    match trimmed.strip_prefix('/') {
        Some(rest) if rest.starts_with('/') => InputLine::Message(rest.to_string()),
        Some(rest) => {
            let mut parts = rest.split_whitespace().map(str::to_string);
            match parts.next() {
                Some(name) => InputLine::Command {
                    name: name.to_lowercase(),
                    args: parts.collect(),
                },
                None => InputLine::Empty,
            }
        }
        None => InputLine::Message(trimmed.to_string()),
    }
}
