//! The session loop.
//!
//! Owns the terminal renderer and the input line. Each turn it applies pending input,
//! lets the session render channels created in the background and flush queued lines,
//! then draws a frame. Command failures are reported on the status channel; render
//! faults end the loop with an error.

mod runtime;

pub use runtime::InputRuntime;

use crate::channel::{CLIENT_NAME, STATUS_CHANNEL};
use crate::command::{parse_line, CommandRegistry, InputLine};
use crate::error::Result;
use crate::input::{InputAction, ScrollDirection};
use crate::network::notice_line;
use crate::render::ui::{ChannelTab, Completion, LineEditor, ScreenState, UIRenderer};
use crate::session::Session;
use std::sync::Arc;
use std::time::Duration;

/// Application orchestrator.
pub struct Application {
    session: Arc<Session>,
    registry: CommandRegistry,
    ui_renderer: Box<dyn UIRenderer>,
    editor: LineEditor,
}

impl Application {
    /// Wire the built-in commands to `session`.
    pub fn new(session: Arc<Session>, ui_renderer: Box<dyn UIRenderer>) -> Self {
        let registry = CommandRegistry::register(&session);
        Self::with_registry(session, registry, ui_renderer)
    }

    pub fn with_registry(
        session: Arc<Session>,
        registry: CommandRegistry,
        ui_renderer: Box<dyn UIRenderer>,
    ) -> Self {
        Self {
            session,
            registry,
            ui_renderer,
            editor: LineEditor::new(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn input_line(&self) -> &str {
        self.editor.buffer()
    }

    /// Run until the session quits or a render fault occurs.
    pub async fn run(&mut self) -> Result<()> {
        self.ui_renderer.initialize()?;

        let tick = Duration::from_millis(self.session.config().ui.tick_ms.max(1));
        let mut input = InputRuntime::start(tick);
        let result = self.run_loop(&mut input, tick).await;
        input.stop();

        let cleanup = self.ui_renderer.cleanup();
        if let Err(err) = &result {
            log::error!("session loop failed: {}", err);
        }
        result.and(cleanup)
    }

    async fn run_loop(&mut self, input: &mut InputRuntime, tick: Duration) -> Result<()> {
        self.start()?;
        while !self.session.is_quitting() {
            self.tick()?;
            match input.next_batch(tick).await {
                Some(actions) => {
                    for action in actions {
                        if self.session.is_quitting() {
                            break;
                        }
                        self.handle_action(action)?;
                    }
                }
                None => {
                    log::warn!("input closed, quitting");
                    self.session.quit()?;
                }
            }
        }
        Ok(())
    }

    /// Size the surfaces, show the status channel and auto-connect if configured.
    pub fn start(&mut self) -> Result<()> {
        let (width, height) = self.ui_renderer.get_terminal_size()?;
        self.session
            .with_surfaces(|surfaces| surfaces.set_size(width, height));
        self.session.focus(STATUS_CHANNEL)?;

        if self.session.auto_connect() {
            log::info!("auto-connecting");
            let result = self.registry.run("connect", &[]);
            self.absorb(result)?;
        }
        Ok(())
    }

    /// Bring surfaces up to date and draw a frame.
    pub fn tick(&mut self) -> Result<()> {
        self.session.sync()?;
        let screen = self.screen_state();
        self.ui_renderer.render(&screen)
    }

    /// Report command failures; pass render faults through.
    fn absorb(&self, result: Result<()>) -> Result<()> {
        match result {
            Err(err) if err.is_render_fault() => Err(err),
            Err(err) => {
                self.session.report_error(&err);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Apply one input action. Ignored once the session is quitting.
    pub fn handle_action(&mut self, action: InputAction) -> Result<()> {
        if self.session.is_quitting() {
            log::debug!("ignoring {:?} after quit", action);
            return Ok(());
        }
        let result = match action {
            InputAction::Insert(ch) => {
                self.editor.insert(ch);
                Ok(())
            }
            InputAction::Backspace => {
                self.editor.backspace();
                Ok(())
            }
            InputAction::Delete => {
                self.editor.delete();
                Ok(())
            }
            InputAction::CursorLeft => {
                self.editor.left();
                Ok(())
            }
            InputAction::CursorRight => {
                self.editor.right();
                Ok(())
            }
            InputAction::CursorHome => {
                self.editor.home();
                Ok(())
            }
            InputAction::CursorEnd => {
                self.editor.end();
                Ok(())
            }
            InputAction::ClearLine => {
                self.editor.clear();
                Ok(())
            }
            InputAction::HistoryPrev => {
                self.editor.history_prev();
                Ok(())
            }
            InputAction::HistoryNext => {
                self.editor.history_next();
                Ok(())
            }
            InputAction::Submit => {
                let line = self.editor.take();
                self.submit(&line)
            }
            InputAction::Complete => {
                self.complete();
                Ok(())
            }
            InputAction::Scroll { direction, lines } => {
                let lines = i32::from(lines);
                self.session.scroll(match direction {
                    ScrollDirection::Up => lines,
                    ScrollDirection::Down => -lines,
                });
                Ok(())
            }
            InputAction::PageUp => {
                self.session
                    .scroll(i32::from(self.session.config().ui.page_lines));
                Ok(())
            }
            InputAction::PageDown => {
                self.session
                    .scroll(-i32::from(self.session.config().ui.page_lines));
                Ok(())
            }
            InputAction::NextChannel => {
                let next = self
                    .session
                    .channels()
                    .next_after(&self.session.current_channel_name());
                self.session.focus(next.name())
            }
            InputAction::PrevChannel => {
                let prev = self
                    .session
                    .channels()
                    .prev_before(&self.session.current_channel_name());
                self.session.focus(prev.name())
            }
            InputAction::SelectChannel(index) => match self.session.channels().nth(index) {
                Some(channel) => self.session.focus(channel.name()),
                None => Ok(()),
            },
            InputAction::FocusStatus => self.session.focus(STATUS_CHANNEL),
            InputAction::Resize { width, height } => self.session.resize(width, height),
            InputAction::Quit => self.registry.run("exit", &[]),
            InputAction::NoAction => Ok(()),
        };
        self.absorb(result)
    }

    /// Run a submitted line: `/command args` or a message to the current channel.
    pub fn submit(&mut self, line: &str) -> Result<()> {
        match parse_line(line) {
            InputLine::Command { name, args } => self.registry.run(&name, &args),
            InputLine::Message(text) => self.session.say(&text),
            InputLine::Empty => Ok(()),
        }
    }

    fn complete(&mut self) {
        let (word, first) = self.editor.current_word();
        let candidates = match word.strip_prefix('/') {
            Some(prefix) if first => self.registry.complete(prefix),
            _ if word.is_empty() => Vec::new(),
            _ => self.session.current_channel().complete_nick(word),
        };
        if let Completion::Ambiguous(options) = self.editor.complete(candidates) {
            let colors = &self.session.config().colors;
            self.session
                .write_current(vec![notice_line(colors, options.join(" "))]);
        }
    }

    /// Snapshot of everything the renderer draws.
    pub fn screen_state(&self) -> ScreenState {
        let current = self.session.current_channel();
        let tabs = self
            .session
            .channels()
            .all()
            .iter()
            .map(|channel| ChannelTab {
                name: channel.name().to_string(),
                current: channel.name() == current.name(),
                unread: channel.is_unread(),
                highlight: channel.is_highlighted(),
            })
            .collect();

        let topic = if current.is_status() {
            format!("{} {}", CLIENT_NAME, crate::VERSION)
        } else {
            current.topic().text
        };

        let mut screen = ScreenState {
            topic,
            tabs,
            nick: self.session.nick(),
            connected: self.session.network().is_connected(),
            input: self.editor.buffer().to_string(),
            cursor: self.editor.cursor_column(),
            ..Default::default()
        };

        self.session.with_surfaces(|surfaces| {
            if let Some(view) = surfaces.view(current.name()) {
                screen.lines = view.visible(usize::from(view.rect.height)).to_vec();
                screen.wrap = view.wrap;
                screen.frame = view.frame;
                screen.scrolled = view.scroll_offset() > 0;
            }
        });
        screen
    }
}
