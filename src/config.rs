//! Client configuration loaded from TOML.
//!
//! Lookup order: an explicit `--config` path, then `<config_dir>/ircterm/config.toml`.
//! A missing file is not an error; every field has a default so a partial file only
//! overrides what it names.

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "ircterm";
/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub colors: ColorConfig,
    pub ui: UiConfig,
}

/// Connection settings handed to the network client by `/connect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub nick: String,
    pub user: String,
    pub password: Option<String>,
    /// Issue `/connect` once before entering the input loop.
    pub auto_connect: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "irc.libera.chat".to_string(),
            port: 6697,
            tls: true,
            nick: "ircterm".to_string(),
            user: "ircterm".to_string(),
            password: None,
            auto_connect: false,
        }
    }
}

/// Named entries of the 256-color palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub green: u8,
    pub red: u8,
    pub yellow: u8,
    pub blue: u8,
    pub white: u8,
    /// Border color of framed surfaces.
    pub frame: u8,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            green: 119,
            red: 160,
            yellow: 185,
            blue: 75,
            white: 255,
            frame: 245,
        }
    }
}

/// Terminal presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Lower bound of the palette range used for nick colors.
    pub nick_color_min: u8,
    /// Upper bound (inclusive) of the palette range used for nick colors.
    pub nick_color_max: u8,
    /// Input poll interval in milliseconds.
    pub tick_ms: u64,
    /// Lines moved per PageUp/PageDown.
    pub page_lines: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            nick_color_min: 22,
            nick_color_max: 231,
            tick_ms: 50,
            page_lines: 10,
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from `path` if given, else from [`Config::default_path`].
    ///
    /// An explicit path must exist; the default path may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    log::debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|err| ChatError::config(path, err.to_string()))?;
        let config = Self::from_toml(&contents).map_err(|err| match err {
            ChatError::Config { message, .. } => ChatError::config(path, message),
            other => other,
        })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|err| ChatError::config("<inline>", err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ui.nick_color_min > self.ui.nick_color_max {
            return Err(ChatError::config(
                "<inline>",
                format!(
                    "nick_color_min ({}) exceeds nick_color_max ({})",
                    self.ui.nick_color_min, self.ui.nick_color_max
                ),
            ));
        }
        if self.server.nick.trim().is_empty() {
            return Err(ChatError::config("<inline>", "server.nick must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.server.port, 6697);
        assert!(!config.server.auto_connect);
        assert_eq!(config.ui.nick_color_min, 22);
        assert_eq!(config.ui.nick_color_max, 231);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = Config::from_toml(
            r#"
            [server]
            nick = "dave"
            auto_connect = true

            [colors]
            green = 2
            frame = 240
            "#,
        )
        .unwrap();

        assert_eq!(config.server.nick, "dave");
        assert!(config.server.auto_connect);
        assert_eq!(config.server.host, "irc.libera.chat");
        assert_eq!(config.colors.green, 2);
        assert_eq!(config.colors.frame, 240);
        assert_eq!(config.colors.red, ColorConfig::default().red);
    }

    #[test]
    fn inverted_palette_range_is_rejected() {
        let err = Config::from_toml("[ui]\nnick_color_min = 200\nnick_color_max = 100\n")
            .unwrap_err();
        assert!(err.to_string().contains("nick_color_min"));
    }

    #[test]
    fn from_file_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server\nbroken").unwrap();

        match Config::from_file(file.path()) {
            Err(ChatError::Config { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn explicit_missing_path_fails() {
        let result = Config::load(Some(Path::new("/nonexistent/ircterm.toml")));
        assert!(result.is_err());
    }
}
