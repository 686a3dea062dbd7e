//! ircterm - Terminal IRC Client
//!
//! Loads the configuration, wires the session together and runs the loop.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use ircterm::channel::ChannelStore;
use ircterm::config::Config;
use ircterm::network::LoopbackClient;
use ircterm::render::surface::ViewStack;
use ircterm::render::ui::{ColorTheme, TerminalUI};
use ircterm::{Application, Session};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

fn cli() -> Command {
    Command::new("ircterm")
        .version(ircterm::VERSION)
        .about("A terminal IRC client")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to the configuration file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .help("Server host, overrides the config file"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .help("Server port, overrides the config file")
                .value_parser(value_parser!(u16)),
        )
        .arg(
            Arg::new("nick")
                .long("nick")
                .short('n')
                .help("Nick to connect with"),
        )
        .arg(
            Arg::new("auto-connect")
                .long("auto-connect")
                .help("Connect as soon as the client starts")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write logs to this file (the terminal is in raw mode)")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        None => env_logger::init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_one::<PathBuf>("log-file"))?;

    let mut config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        .context("failed to load configuration")?;
    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }
    if let Some(nick) = matches.get_one::<String>("nick") {
        config.server.nick = nick.clone();
    }
    if matches.get_flag("auto-connect") {
        config.server.auto_connect = true;
    }
    log::info!("ircterm {} starting", ircterm::VERSION);

    let channels = Arc::new(ChannelStore::new(
        config.ui.nick_color_min,
        config.ui.nick_color_max,
    ));
    let network = Arc::new(LoopbackClient::new(
        Arc::clone(&channels),
        config.colors.clone(),
    ));
    let (width, height) = ratatui::crossterm::terminal::size().unwrap_or((80, 24));
    let theme = ColorTheme::from_colors(&config.colors);
    let session = Arc::new(Session::new(
        config,
        channels,
        network,
        Box::new(ViewStack::new(width, height)),
    ));

    let ui_renderer = Box::new(TerminalUI::with_theme(theme)?);
    let mut app = Application::new(session, ui_renderer);

    if let Err(err) = app.run().await {
        log::error!("fatal: {}", err);
        return Err(err.into());
    }
    Ok(())
}
