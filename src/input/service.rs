//! Key bindings and the input thread.
//!
//! Turns raw events into [`InputAction`]s for the session loop. Line editing itself
//! happens in the loop, which owns the input line.

use crate::error::Result;
use crate::input::raw::{RawInputCollector, RawInputEvent, ScrollDirection};
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// What a key press asks the loop to do.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Insert(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    ClearLine,
    HistoryPrev,
    HistoryNext,
    /// Submit the input line.
    Submit,
    /// Tab completion of the word at the cursor.
    Complete,
    Scroll {
        direction: ScrollDirection,
        lines: u16,
    },
    PageUp,
    PageDown,
    NextChannel,
    PrevChannel,
    /// Zero-based index into the channel list.
    SelectChannel(usize),
    FocusStatus,
    Resize {
        width: u16,
        height: u16,
    },
    Quit,
    NoAction,
}

/// Maps key presses to actions.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyMap;

impl KeyMap {
    pub fn new() -> Self {
        Self
    }

    pub fn action_for(&self, key: KeyEvent) -> InputAction {
        if key.kind != KeyEventKind::Press {
            return InputAction::NoAction;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') if ctrl && !alt => InputAction::Quit,

            KeyCode::Char('p') if ctrl && alt => InputAction::PageUp,
            KeyCode::Char('n') if ctrl && alt => InputAction::PageDown,
            KeyCode::PageUp => InputAction::PageUp,
            KeyCode::PageDown => InputAction::PageDown,

            KeyCode::Char('n') if ctrl => InputAction::NextChannel,
            KeyCode::Char('p') if ctrl => InputAction::PrevChannel,
            KeyCode::Right if alt => InputAction::NextChannel,
            KeyCode::Left if alt => InputAction::PrevChannel,
            KeyCode::Char(digit @ '1'..='9') if alt && !ctrl => {
                InputAction::SelectChannel(digit as usize - '1' as usize)
            }
            KeyCode::Esc => InputAction::FocusStatus,

            KeyCode::Char('a') if ctrl => InputAction::CursorHome,
            KeyCode::Char('e') if ctrl => InputAction::CursorEnd,
            KeyCode::Char('u') if ctrl => InputAction::ClearLine,
            KeyCode::Char(ch) if !ctrl && !alt => InputAction::Insert(ch),

            KeyCode::Tab => InputAction::Complete,
            KeyCode::Enter => InputAction::Submit,
            KeyCode::Backspace => InputAction::Backspace,
            KeyCode::Delete => InputAction::Delete,
            KeyCode::Left => InputAction::CursorLeft,
            KeyCode::Right => InputAction::CursorRight,
            KeyCode::Home => InputAction::CursorHome,
            KeyCode::End => InputAction::CursorEnd,
            KeyCode::Up => InputAction::HistoryPrev,
            KeyCode::Down => InputAction::HistoryNext,

            _ => InputAction::NoAction,
        }
    }
}

/// Produces actions from terminal events.
#[derive(Debug, Default)]
pub struct InputService {
    keys: KeyMap,
    raw_input: RawInputCollector,
}

impl InputService {
    pub fn new() -> Self {
        Self {
            keys: KeyMap::new(),
            raw_input: RawInputCollector::new(),
        }
    }

    /// Wait up to `timeout` and return every action that became ready.
    pub fn poll_actions(&mut self, timeout: Option<Duration>) -> Result<Vec<InputAction>> {
        let mut actions = Vec::new();
        if let Some(event) = self.raw_input.poll_event(timeout)? {
            actions.extend(self.translate(event));
            while let Some(event) = self.raw_input.next_ready() {
                actions.extend(self.translate(event));
            }
        }
        Ok(actions)
    }

    /// Feed one terminal event and return the actions ready so far.
    pub fn process_event(&mut self, event: Event) -> Vec<InputAction> {
        self.raw_input.process_event(event);
        let mut actions = Vec::new();
        while let Some(event) = self.raw_input.next_ready() {
            actions.extend(self.translate(event));
        }
        actions
    }

    fn translate(&self, event: RawInputEvent) -> Option<InputAction> {
        let action = match event {
            RawInputEvent::Key(key) => self.keys.action_for(key),
            RawInputEvent::Resize { width, height } => InputAction::Resize { width, height },
            RawInputEvent::Scroll { direction, lines } => InputAction::Scroll { direction, lines },
        };
        (action != InputAction::NoAction).then_some(action)
    }
}

/// Spawn a thread that polls the terminal and forwards actions to the loop.
pub fn spawn_input_thread(
    tx: UnboundedSender<InputAction>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut service = InputService::new();
        while !shutdown.load(Ordering::SeqCst) {
            match service.poll_actions(Some(poll_interval)) {
                Ok(actions) => {
                    for action in actions {
                        if tx.send(action).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => {
                    log::error!("input thread stopped: {}", err);
                    break;
                }
            }
        }
        log::debug!("input thread exiting");
    })
}
