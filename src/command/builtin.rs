//! Built-in commands.

use super::{Command, CommandMetadata};
use crate::channel::STATUS_CHANNEL;
use crate::error::{ChatError, Result};
use crate::network::notice_line;
use crate::render::paint::{logo_lines, version_line};
use crate::session::Session;
use ratatui::text::{Line, Span};
use std::sync::Arc;

type Handler = fn(&Session, &[String]) -> Result<()>;

/// A command implemented by a plain function over the session.
pub struct Builtin {
    metadata: CommandMetadata,
    session: Arc<Session>,
    handler: Handler,
}

impl Builtin {
    fn new(
        session: &Arc<Session>,
        name: &str,
        description: &str,
        aliases: &[&str],
        handler: Handler,
    ) -> Self {
        Self {
            metadata: CommandMetadata::new(name, description, aliases),
            session: Arc::clone(session),
            handler,
        }
    }
}

impl Command for Builtin {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn exec(&self, args: &[String]) -> Result<()> {
        log::debug!("exec /{} {:?}", self.metadata.name(), args);
        (self.handler)(&self.session, args)
    }
}

/// `/help`: lists every command with its aliases.
pub struct HelpCommand {
    metadata: CommandMetadata,
    session: Arc<Session>,
    entries: Vec<CommandMetadata>,
}

impl Command for HelpCommand {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    fn exec(&self, _args: &[String]) -> Result<()> {
        let colors = &self.session.config().colors;
        let mut lines = vec![notice_line(colors, "Commands:")];
        for entry in &self.entries {
            let aliases = if entry.aliases().is_empty() {
                String::new()
            } else {
                format!(" ({})", entry.aliases().join(", "))
            };
            lines.push(Line::from(vec![
                Span::raw("  "),
                crate::color::format(colors.yellow, format!("/{}", entry.name())),
                Span::raw(format!("{} - {}", aliases, entry.description())),
            ]));
        }
        self.session.write_status(lines);
        self.session.focus(STATUS_CHANNEL)
    }
}

/// The built-in command set in resolution order.
pub fn all(session: &Arc<Session>) -> Vec<Arc<dyn Command>> {
    let b = |name: &str, description: &str, aliases: &[&str], handler: Handler| {
        Arc::new(Builtin::new(session, name, description, aliases, handler)) as Arc<dyn Command>
    };

    let mut commands = vec![
        b("exit", "quit the client", &["quit", "q"], exit),
        b("connect", "connect to the configured server", &["c"], connect),
        b("status", "switch to the status window", &["s"], status),
        b("join", "join a channel", &["j"], join),
        b("part", "leave a channel", &["p", "leave"], part),
        b("clear", "clear the current window", &["cl"], clear),
        b("logo", "show the client banner", &[], logo),
        b("version", "show the client version", &["v"], version),
        b("nick", "change your nick", &["n"], nick),
        b("pass", "set the server password for the next connect", &[], pass),
        b("raw", "send a raw protocol line", &["r"], raw),
        b("topic", "show or change the channel topic", &["t"], topic),
        b("names", "list the members of the current channel", &["ns"], names),
        b("msg", "open a private conversation", &["query", "m"], msg),
    ];

    let help_metadata = CommandMetadata::new("help", "list commands", &["h", "?"]);
    let mut entries: Vec<CommandMetadata> =
        commands.iter().map(|c| c.metadata().clone()).collect();
    entries.insert(3, help_metadata.clone());

    commands.insert(
        3,
        Arc::new(HelpCommand {
            metadata: help_metadata,
            session: Arc::clone(session),
            entries,
        }),
    );
    commands
}

fn required<'a>(args: &'a [String], command: &str, usage: &str) -> Result<&'a str> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| ChatError::usage(command, usage))
}

fn rest(args: &[String]) -> Option<String> {
    match args.get(1..) {
        Some(tail) if !tail.is_empty() => Some(tail.join(" ")),
        _ => None,
    }
}

/// Prefix bare channel names with `#`.
fn channel_name(raw: &str) -> String {
    if raw.starts_with('#') || raw.starts_with('&') {
        raw.to_string()
    } else {
        format!("#{}", raw)
    }
}

fn exit(session: &Session, _args: &[String]) -> Result<()> {
    session.quit()
}

fn connect(session: &Session, _args: &[String]) -> Result<()> {
    if session.network().is_connected() {
        return Err(ChatError::command("connect", "already connected"));
    }
    let options = session.connect_options();
    session.notice(format!("Connecting to {} as {}", options.address(), options.nick));
    session.network().connect(&options)
}

fn status(session: &Session, _args: &[String]) -> Result<()> {
    session.focus(STATUS_CHANNEL)
}

fn join(session: &Session, args: &[String]) -> Result<()> {
    let name = channel_name(required(args, "join", "/join <channel>")?);
    session.network().join(&name)?;
    session.open_channel(&name)?;
    Ok(())
}

fn part(session: &Session, args: &[String]) -> Result<()> {
    let name = match args.first() {
        Some(raw) if session.channels().get(raw).is_some() => raw.clone(),
        Some(raw) => channel_name(raw),
        None => session.current_channel_name(),
    };
    if name == STATUS_CHANNEL {
        return Err(ChatError::command("part", "cannot leave the status channel"));
    }
    let channel = session
        .channels()
        .get(&name)
        .ok_or_else(|| ChatError::command("part", format!("not in {}", name)))?;
    // Queries are local windows; only real channels are parted on the server.
    if !channel.is_private() && session.network().is_connected() {
        let reason = rest(args);
        session.network().part(&name, reason.as_deref())?;
    }
    session.close_channel(&name)
}

fn clear(session: &Session, _args: &[String]) -> Result<()> {
    let name = session.current_channel_name();
    session.with_surfaces(|surfaces| {
        if let Some(view) = surfaces.view_mut(&name) {
            view.clear();
        }
    });
    Ok(())
}

fn logo(session: &Session, _args: &[String]) -> Result<()> {
    let colors = &session.config().colors;
    let mut lines = logo_lines(colors);
    lines.push(version_line(colors));
    session.write_current(lines);
    Ok(())
}

fn version(session: &Session, _args: &[String]) -> Result<()> {
    session.write_current(vec![version_line(&session.config().colors)]);
    Ok(())
}

fn nick(session: &Session, args: &[String]) -> Result<()> {
    let nick = required(args, "nick", "/nick <nick>")?;
    if session.network().is_connected() {
        session.network().set_nick(nick)?;
    } else {
        session.notice(format!("Nick set to {} for the next connect", nick));
    }
    session.set_nick(nick);
    Ok(())
}

fn pass(session: &Session, args: &[String]) -> Result<()> {
    let password = required(args, "pass", "/pass <password>")?;
    session.set_password(password);
    session.notice("Password set for the next connect");
    Ok(())
}

fn raw(session: &Session, args: &[String]) -> Result<()> {
    if args.is_empty() {
        return Err(ChatError::usage("raw", "/raw <line>"));
    }
    session.network().send_raw(&args.join(" "))
}

fn topic(session: &Session, args: &[String]) -> Result<()> {
    let channel = session.current_channel();
    if channel.is_status() {
        return Err(ChatError::command("topic", "not in a channel"));
    }
    if args.is_empty() {
        let topic = channel.topic();
        let text = if topic.text.is_empty() {
            format!("No topic set for {}", channel.name())
        } else {
            format!("Topic for {}: {}", channel.name(), topic.text)
        };
        session.write_current(vec![notice_line(&session.config().colors, text)]);
        return Ok(());
    }
    session.network().set_topic(channel.name(), &args.join(" "))
}

fn names(session: &Session, _args: &[String]) -> Result<()> {
    let channel = session.current_channel();
    if channel.is_status() {
        return Err(ChatError::command("names", "not in a channel"));
    }
    let colors = &session.config().colors;
    let mut lines = channel.nick_list_lines(colors, true);
    lines.push(channel.nick_metrics_line(colors));
    session.write_current(lines);
    Ok(())
}

fn msg(session: &Session, args: &[String]) -> Result<()> {
    let target = required(args, "msg", "/msg <nick> [message]")?;
    if target == STATUS_CHANNEL {
        return Err(ChatError::command("msg", "cannot message the status channel"));
    }
    session.open_channel(target)?;
    if let Some(text) = rest(args) {
        session.send_message(target, &text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_name_adds_hash() {
        assert_eq!(channel_name("rust"), "#rust");
        assert_eq!(channel_name("#rust"), "#rust");
        assert_eq!(channel_name("&local"), "&local");
    }

    #[test]
    fn rest_joins_trailing_args() {
        let args: Vec<String> = vec!["#a".into(), "see".into(), "you".into()];
        assert_eq!(rest(&args).as_deref(), Some("see you"));
        assert_eq!(rest(&args[..1]), None);
        assert_eq!(rest(&[]), None);
    }
}
