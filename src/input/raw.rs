//! Low-level input collection.
//!
//! Polls crossterm, merges bursts of mouse wheel ticks into one scroll step and hands
//! keys, resizes and scrolls to the key-binding layer in arrival order.

use crate::error::Result;
use ratatui::crossterm::event::{self, Event, KeyEvent, MouseEventKind};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Wheel ticks closer together than this are merged.
const WHEEL_MERGE_WINDOW_MS: u64 = 12;
/// Lines per wheel tick.
const WHEEL_LINES: u16 = 3;
/// Poll timeout used when the caller does not provide one.
const DEFAULT_POLL_TIMEOUT_MS: u64 = 50;

/// Wheel direction; `Up` moves towards older lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Events surfaced by the collector.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Scroll { direction: ScrollDirection, lines: u16 },
}

/// Pending run of wheel ticks in one direction.
#[derive(Debug, Clone)]
struct WheelRun {
    direction: ScrollDirection,
    lines: u16,
    last_tick: Instant,
}

impl WheelRun {
    fn into_event(self) -> RawInputEvent {
        RawInputEvent::Scroll {
            direction: self.direction,
            lines: self.lines,
        }
    }
}

/// Collects terminal events into [`RawInputEvent`]s.
#[derive(Debug)]
pub struct RawInputCollector {
    window: Duration,
    wheel: Option<WheelRun>,
    queue: VecDeque<RawInputEvent>,
}

impl Default for RawInputCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl RawInputCollector {
    pub fn new() -> Self {
        Self::with_window(Duration::from_millis(WHEEL_MERGE_WINDOW_MS))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            wheel: None,
            queue: VecDeque::new(),
        }
    }

    /// Feed one terminal event.
    pub fn process_event(&mut self, event: Event) {
        self.process_event_at(event, Instant::now());
    }

    fn process_event_at(&mut self, event: Event, now: Instant) {
        match event {
            Event::Mouse(mouse) => {
                let direction = match mouse.kind {
                    MouseEventKind::ScrollUp => ScrollDirection::Up,
                    MouseEventKind::ScrollDown => ScrollDirection::Down,
                    _ => return,
                };
                self.wheel_tick(direction, now);
            }
            Event::Key(key) => {
                self.close_wheel_run();
                self.queue.push_back(RawInputEvent::Key(key));
            }
            Event::Resize(width, height) => {
                self.close_wheel_run();
                self.queue.push_back(RawInputEvent::Resize { width, height });
            }
            _ => {}
        }
    }

    fn wheel_tick(&mut self, direction: ScrollDirection, now: Instant) {
        match self.wheel.as_mut() {
            Some(run) if run.direction == direction => {
                run.lines = run.lines.saturating_add(WHEEL_LINES);
                run.last_tick = now;
            }
            _ => {
                self.close_wheel_run();
                self.wheel = Some(WheelRun {
                    direction,
                    lines: WHEEL_LINES,
                    last_tick: now,
                });
            }
        }
    }

    fn close_wheel_run(&mut self) {
        if let Some(run) = self.wheel.take() {
            self.queue.push_back(run.into_event());
        }
    }

    /// Next ready event without polling the terminal. A wheel run is ready once no
    /// tick arrived for the merge window.
    pub fn next_ready(&mut self) -> Option<RawInputEvent> {
        self.next_ready_at(Instant::now())
    }

    fn next_ready_at(&mut self, now: Instant) -> Option<RawInputEvent> {
        if let Some(event) = self.queue.pop_front() {
            return Some(event);
        }
        let stale = self
            .wheel
            .as_ref()
            .is_some_and(|run| now.duration_since(run.last_tick) >= self.window);
        if stale {
            return self.wheel.take().map(WheelRun::into_event);
        }
        None
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.wheel.is_none()
    }

    /// Wait up to `timeout` for the next event.
    pub fn poll_event(&mut self, timeout: Option<Duration>) -> Result<Option<RawInputEvent>> {
        if let Some(event) = self.next_ready() {
            return Ok(Some(event));
        }

        let timeout = timeout.unwrap_or(Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS));
        let timeout = if self.wheel.is_some() {
            timeout.min(self.window)
        } else {
            timeout
        };

        if event::poll(timeout)? {
            self.process_event(event::read()?);
        }
        Ok(self.next_ready())
    }
}
