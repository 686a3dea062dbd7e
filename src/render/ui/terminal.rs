//! Terminal UI implementation using ratatui
//!
//! Draws the topic bar, the foreground channel surface, the status bar with the
//! channel tabs and the input line. All chat state comes in through [`ScreenState`].

use crate::error::Result;
use crate::render::ui::state::{ChannelTab, ScreenState};
use crate::render::ui::{ColorTheme, UIRenderer};
use ratatui::crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Prompt shown in front of the input line.
const PROMPT: &str = "> ";

/// Terminal UI with a crossterm backend.
pub struct TerminalUI {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
}

impl TerminalUI {
    pub fn new() -> Result<Self> {
        Self::with_theme(ColorTheme::default())
    }

    pub fn with_theme(theme: ColorTheme) -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme,
        })
    }

    fn split(area: Rect) -> [Rect; 4] {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);
        [chunks[0], chunks[1], chunks[2], chunks[3]]
    }

    fn render_topic(frame: &mut Frame, area: Rect, screen: &ScreenState, theme: &ColorTheme) {
        let topic = Paragraph::new(screen.topic.as_str()).style(theme.topic_bar);
        frame.render_widget(topic, area);
    }

    fn render_surface(frame: &mut Frame, area: Rect, screen: &ScreenState, theme: &ColorTheme) {
        let inner = if screen.frame {
            let block = Block::default().borders(Borders::ALL).style(theme.frame);
            let inner = block.inner(area);
            frame.render_widget(block, area);
            inner
        } else {
            area
        };

        let start = if screen.wrap {
            tail_start(&screen.lines, inner.width, inner.height)
        } else {
            screen.lines.len().saturating_sub(usize::from(inner.height))
        };
        let mut paragraph = Paragraph::new(screen.lines[start..].to_vec());
        if screen.wrap {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }
        frame.render_widget(paragraph, inner);
    }

    fn render_status(frame: &mut Frame, area: Rect, screen: &ScreenState, theme: &ColorTheme) {
        let mut spans = vec![Span::styled(screen.status_prefix(), theme.status_bar)];
        for (idx, tab) in screen.tabs.iter().enumerate() {
            spans.push(Span::styled(" ", theme.status_bar));
            spans.push(Span::styled(
                format!("{}:{}", idx + 1, tab.name),
                tab_style(tab, theme),
            ));
        }
        let status = Paragraph::new(Line::from(spans)).style(theme.status_bar);
        frame.render_widget(status, area);
    }

    fn render_input(frame: &mut Frame, area: Rect, screen: &ScreenState, theme: &ColorTheme) {
        let prompt_width = PROMPT.chars().count();
        let room = usize::from(area.width).saturating_sub(prompt_width + 1);
        let skip = screen.cursor.saturating_sub(room);
        let shown: String = screen.input.chars().skip(skip).collect();

        let input = Paragraph::new(format!("{}{}", PROMPT, shown)).style(theme.input);
        frame.render_widget(input, area);

        let column = prompt_width + screen.cursor - skip;
        frame.set_cursor(area.x + column as u16, area.y);
    }
}

fn tab_style(tab: &ChannelTab, theme: &ColorTheme) -> ratatui::style::Style {
    if tab.current {
        theme.current_tab
    } else if tab.highlight {
        theme.highlight_tab
    } else if tab.unread {
        theme.unread_tab
    } else {
        theme.status_bar
    }
}

/// Index of the first line such that the wrapped tail fills at most `height` rows.
fn tail_start(lines: &[Line<'_>], width: u16, height: u16) -> usize {
    let width = usize::from(width.max(1));
    let mut rows = 0;
    let mut start = lines.len();
    for line in lines.iter().rev() {
        let needed = line.width().max(1).div_ceil(width);
        if rows + needed > usize::from(height) {
            break;
        }
        rows += needed;
        start -= 1;
    }
    start
}

impl UIRenderer for TerminalUI {
    fn render(&mut self, screen: &ScreenState) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            let theme = &self.theme;

            terminal.draw(move |frame| {
                let [topic, surface, status, input] = Self::split(frame.size());
                Self::render_topic(frame, topic, screen, theme);
                Self::render_surface(frame, surface, screen, theme);
                Self::render_status(frame, status, screen, theme);
                Self::render_input(frame, input, screen, theme);
            })?;
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);
        log::debug!("terminal initialized");

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
            self.terminal = None;
            log::debug!("terminal restored");
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        Ok((cols, rows))
    }
}

impl Drop for TerminalUI {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn screen() -> ScreenState {
        ScreenState {
            topic: "Rust talk".into(),
            tabs: vec![
                ChannelTab {
                    name: "status".into(),
                    current: false,
                    unread: false,
                    highlight: false,
                },
                ChannelTab {
                    name: "#rust".into(),
                    current: true,
                    unread: false,
                    highlight: false,
                },
            ],
            lines: (0..30).map(|i| Line::from(format!("line {i}"))).collect(),
            wrap: true,
            nick: "me".into(),
            connected: true,
            input: "hello".into(),
            cursor: 5,
            ..Default::default()
        }
    }

    fn row(buffer: &ratatui::buffer::Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer.get(x, y).symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn draws_bars_and_newest_lines() {
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let theme = ColorTheme::default();
        let screen = screen();
        terminal
            .draw(|frame| {
                let [topic, surface, status, input] = TerminalUI::split(frame.size());
                TerminalUI::render_topic(frame, topic, &screen, &theme);
                TerminalUI::render_surface(frame, surface, &screen, &theme);
                TerminalUI::render_status(frame, status, &screen, &theme);
                TerminalUI::render_input(frame, input, &screen, &theme);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        assert_eq!(row(buffer, 0), "Rust talk");
        assert_eq!(row(buffer, 1), "line 25");
        assert_eq!(row(buffer, 5), "line 29");
        assert_eq!(row(buffer, 6), "[me] 1:status 2:#rust");
        assert_eq!(row(buffer, 7), "> hello");
    }

    #[test]
    fn tail_start_accounts_for_wrapping() {
        let lines = vec![
            Line::from("a"),
            Line::from("0123456789"),
            Line::from("b"),
        ];
        // "0123456789" takes two rows at width 5.
        assert_eq!(tail_start(&lines, 5, 3), 1);
        assert_eq!(tail_start(&lines, 5, 2), 2);
        assert_eq!(tail_start(&lines, 5, 10), 0);
    }

    #[test]
    fn tab_styles_prefer_current_then_highlight() {
        let theme = ColorTheme::default();
        let mut tab = ChannelTab {
            name: "#a".into(),
            current: false,
            unread: true,
            highlight: true,
        };
        assert_eq!(tab_style(&tab, &theme), theme.highlight_tab);
        tab.highlight = false;
        assert_eq!(tab_style(&tab, &theme).fg, theme.unread_tab.fg);
        tab.current = true;
        assert_eq!(tab_style(&tab, &theme), theme.current_tab);
    }

    #[test]
    fn terminal_ui_starts_uninitialized() {
        let ui = TerminalUI::with_theme(ColorTheme::monochrome()).unwrap();
        assert!(ui.terminal.is_none());
    }
}
