//! Color theme for the chrome around the channel surfaces.

use crate::config::ColorConfig;
use ratatui::style::{Color, Modifier, Style};

/// Colors of the topic bar, status bar and input line.
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub topic_bar: Style,
    pub status_bar: Style,
    /// The current channel in the channel bar.
    pub current_tab: Style,
    /// Channels with unread lines.
    pub unread_tab: Style,
    /// Channels where the user was mentioned.
    pub highlight_tab: Style,
    pub input: Style,
    /// Frame drawn around surfaces that ask for one.
    pub frame: Style,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self::from_colors(&ColorConfig::default())
    }
}

impl ColorTheme {
    /// Derive the theme from the configured palette.
    pub fn from_colors(colors: &ColorConfig) -> Self {
        let bar = Style::default().fg(Color::Indexed(colors.white)).bg(Color::Blue);
        Self {
            topic_bar: bar,
            status_bar: bar,
            current_tab: bar.add_modifier(Modifier::BOLD),
            unread_tab: bar.fg(Color::Indexed(colors.yellow)),
            highlight_tab: bar
                .fg(Color::Indexed(colors.red))
                .add_modifier(Modifier::BOLD),
            input: Style::default(),
            frame: Style::default().fg(Color::Indexed(colors.frame)),
        }
    }

    /// Plain theme for terminals without color support.
    pub fn monochrome() -> Self {
        let bar = Style::default().add_modifier(Modifier::REVERSED);
        Self {
            topic_bar: bar,
            status_bar: bar,
            current_tab: bar.add_modifier(Modifier::BOLD),
            unread_tab: bar.add_modifier(Modifier::UNDERLINED),
            highlight_tab: bar.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            input: Style::default(),
            frame: Style::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_follows_palette() {
        let colors = ColorConfig {
            yellow: 11,
            frame: 240,
            ..ColorConfig::default()
        };
        let theme = ColorTheme::from_colors(&colors);
        assert_eq!(theme.unread_tab.fg, Some(Color::Indexed(11)));
        assert_eq!(theme.frame.fg, Some(Color::Indexed(240)));
        assert_eq!(theme.status_bar.bg, Some(Color::Blue));
    }

    #[test]
    fn monochrome_has_no_colors() {
        let theme = ColorTheme::monochrome();
        assert_eq!(theme.status_bar.fg, None);
        assert_eq!(theme.status_bar.bg, None);
        assert!(theme.current_tab.add_modifier.contains(Modifier::BOLD));
    }
}
