//! Built-in command behavior against a recording network.

mod common;

use common::{session_with, surface_text, RecordingNetwork};
use ircterm::channel::STATUS_CHANNEL;
use ircterm::CommandRegistry;
use std::sync::Arc;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn join_by_name_and_alias_are_equivalent() {
    let mut outcomes = Vec::new();
    for token in ["join", "j"] {
        let network = RecordingNetwork::connected();
        let session = session_with(Arc::clone(&network));
        let registry = CommandRegistry::register(&session);

        registry.run(token, &args(&["#rust"])).unwrap();

        outcomes.push((
            network.calls(),
            session.channels().names(),
            session.current_channel_name(),
        ));
    }
    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[0].0, vec!["JOIN #rust"]);
    assert_eq!(outcomes[0].1, vec![STATUS_CHANNEL, "#rust"]);
    assert_eq!(outcomes[0].2, "#rust");
}

#[test]
fn join_adds_channel_prefix() {
    let network = RecordingNetwork::connected();
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    registry.run("join", &args(&["rust"])).unwrap();
    assert_eq!(network.calls(), vec!["JOIN #rust"]);
    assert!(session.channels().get("#rust").is_some());
}

#[test]
fn unknown_command_is_a_silent_noop() {
    let network = RecordingNetwork::connected();
    let session = session_with(Arc::clone(&network));
    session.focus(STATUS_CHANNEL).unwrap();
    let before = surface_text(&session, STATUS_CHANNEL);
    let registry = CommandRegistry::register(&session);

    assert!(registry.run("frobnicate", &args(&["x", "y"])).is_ok());
    assert!(registry.is_empty_command(&registry.resolve("frobnicate")));
    assert!(network.calls().is_empty());
    assert_eq!(session.channels().len(), 1);
    assert_eq!(surface_text(&session, STATUS_CHANNEL), before);
}

#[test]
fn builtin_aliases_resolve_to_their_command() {
    let session = session_with(RecordingNetwork::connected());
    let registry = CommandRegistry::register(&session);

    assert!(registry.collisions().is_empty());
    for command in registry.commands() {
        let metadata = command.metadata();
        assert!(Arc::ptr_eq(&registry.resolve(metadata.name()), command));
        for alias in metadata.aliases() {
            assert!(
                Arc::ptr_eq(&registry.resolve(alias), command),
                "alias {} of {}",
                alias,
                metadata.name()
            );
        }
    }
    let names: Vec<&str> = registry
        .commands()
        .iter()
        .map(|c| c.metadata().name())
        .collect();
    assert_eq!(
        names,
        vec![
            "exit", "connect", "status", "help", "join", "part", "clear", "logo", "version",
            "nick", "pass", "raw", "topic", "names", "msg"
        ]
    );
}

#[test]
fn missing_arguments_return_usage() {
    let session = session_with(RecordingNetwork::connected());
    let registry = CommandRegistry::register(&session);

    let err = registry.run("join", &[]).unwrap_err();
    assert_eq!(err.to_string(), "join: usage: /join <channel>");
    assert!(!err.is_render_fault());
    assert!(registry.run("msg", &[]).is_err());
    assert!(registry.run("raw", &[]).is_err());
}

#[test]
fn join_while_offline_fails_without_creating_channel() {
    let network = Arc::new(RecordingNetwork::default());
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    assert!(registry.run("j", &args(&["#rust"])).is_err());
    assert!(session.channels().get("#rust").is_none());
}

#[test]
fn part_leaves_and_returns_to_status() {
    let network = RecordingNetwork::connected();
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    registry.run("join", &args(&["#rust"])).unwrap();
    registry.run("leave", &args(&["#rust", "bye", "all"])).unwrap();

    assert_eq!(network.calls(), vec!["JOIN #rust", "PART #rust bye all"]);
    assert!(session.channels().get("#rust").is_none());
    assert_eq!(session.current_channel_name(), STATUS_CHANNEL);
    assert!(registry.run("part", &[]).is_err());
}

#[test]
fn part_closes_query_by_nick_without_network_part() {
    let network = RecordingNetwork::connected();
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    session.open_channel("alice").unwrap();
    session.focus(STATUS_CHANNEL).unwrap();
    registry.run("part", &args(&["alice"])).unwrap();

    assert!(session.channels().get("alice").is_none());
    assert_eq!(session.channels().names(), vec![STATUS_CHANNEL]);
    assert!(network.calls().is_empty());
}

#[test]
fn part_without_argument_closes_current_query() {
    let network = RecordingNetwork::connected();
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    session.open_channel("bob").unwrap();
    assert_eq!(session.current_channel_name(), "bob");
    registry.run("leave", &[]).unwrap();

    assert!(session.channels().get("bob").is_none());
    assert_eq!(session.current_channel_name(), STATUS_CHANNEL);
    assert!(network.calls().is_empty());
}

#[test]
fn msg_opens_query_and_echoes() {
    let network = RecordingNetwork::connected();
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    registry
        .run("query", &args(&["alice", "hi", "there"]))
        .unwrap();

    assert_eq!(network.calls(), vec!["PRIVMSG alice :hi there"]);
    let query = session.channels().get("alice").unwrap();
    assert!(query.is_private());
    assert!(query.find_user("alice").is_some());
    assert_eq!(session.current_channel_name(), "alice");
    let text = surface_text(&session, "alice");
    assert_eq!(text.last().unwrap(), "<ircterm> hi there");
}

#[test]
fn nick_and_pass_feed_the_next_connect() {
    let network = Arc::new(RecordingNetwork::default());
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    registry.run("n", &args(&["bob"])).unwrap();
    registry.run("pass", &args(&["secret"])).unwrap();
    assert_eq!(session.connect_options().password.as_deref(), Some("secret"));

    registry.run("c", &[]).unwrap();
    assert_eq!(network.calls(), vec!["CONNECT irc.libera.chat:6697 bob"]);
    assert!(registry.run("connect", &[]).is_err());
}

#[test]
fn raw_and_topic_go_to_the_network() {
    let network = RecordingNetwork::connected();
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    registry.run("r", &args(&["WHOIS", "alice"])).unwrap();
    assert!(registry.run("topic", &[]).is_err());

    registry.run("join", &args(&["#rust"])).unwrap();
    registry.run("t", &args(&["all", "things", "rust"])).unwrap();
    registry.run("topic", &[]).unwrap();

    assert_eq!(
        network.calls(),
        vec!["WHOIS alice", "JOIN #rust", "TOPIC #rust :all things rust"]
    );
    let text = surface_text(&session, "#rust");
    assert_eq!(text.last().unwrap(), "** No topic set for #rust");
}

#[test]
fn names_prints_list_and_metrics() {
    let network = RecordingNetwork::connected();
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    registry.run("join", &args(&["#test"])).unwrap();
    let channel = session.channels().get("#test").unwrap();
    for nick in ["@op", "%half", "+voice", "plain"] {
        channel.add_nick(nick);
    }
    registry.run("ns", &[]).unwrap();

    let text = surface_text(&session, "#test");
    let tail = &text[text.len() - 4..];
    assert_eq!(
        tail,
        [
            "== NICK LIST START",
            "%half, @op, plain, +voice",
            "== NICK LIST END",
            "** ircterm: #test: Total of 4 nicks [1 ops, 1 halfops, 1 voices, 1 normal]",
        ]
    );
}

#[test]
fn help_lists_commands_on_status() {
    let session = session_with(RecordingNetwork::connected());
    let registry = CommandRegistry::register(&session);
    registry.run("join", &args(&["#rust"])).unwrap();

    registry.run("?", &[]).unwrap();

    assert_eq!(session.current_channel_name(), STATUS_CHANNEL);
    let text = surface_text(&session, STATUS_CHANNEL);
    assert!(text.iter().any(|line| line == "  /join (j) - join a channel"));
    assert!(text.iter().any(|line| line.starts_with("  /help (h, ?)")));
}

#[test]
fn clear_empties_the_current_surface() {
    let session = session_with(RecordingNetwork::connected());
    let registry = CommandRegistry::register(&session);
    session.focus(STATUS_CHANNEL).unwrap();
    assert!(!surface_text(&session, STATUS_CHANNEL).is_empty());

    registry.run("cl", &[]).unwrap();
    assert!(surface_text(&session, STATUS_CHANNEL).is_empty());

    registry.run("v", &[]).unwrap();
    let text = surface_text(&session, STATUS_CHANNEL);
    assert_eq!(text.len(), 1);
    assert!(text[0].contains(ircterm::VERSION));
}

#[test]
fn exit_quits_once() {
    let network = RecordingNetwork::connected();
    let session = session_with(Arc::clone(&network));
    let registry = CommandRegistry::register(&session);

    registry.run("q", &[]).unwrap();
    registry.run("quit", &[]).unwrap();

    assert!(session.is_quitting());
    assert_eq!(network.calls(), vec!["QUIT leaving"]);
}
