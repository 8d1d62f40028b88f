//! Configuration loading and typed config structures.
//!
//! The configuration lives in `emoteguess.yaml` next to the binary's working
//! directory. Every field has a default, so an absent file or a partial one
//! both work. A handful of environment variables override the file.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `emoteguess.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerSection,

    /// Round behaviour.
    #[serde(default)]
    pub game: GameSection,

    /// Leaderboard scoping and size.
    #[serde(default)]
    pub leaderboard: LeaderboardSection,

    /// Outbound HTTP (channel resolution, emote fetches).
    #[serde(default)]
    pub http: HttpSection,

    /// Live chat feed.
    #[serde(default)]
    pub chat: ChatSection,

    /// Persistent store location.
    #[serde(default)]
    pub storage: StorageSection,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override file values:
    /// - `EMOTEGUESS_HOST` overrides `server.host`
    /// - `EMOTEGUESS_PORT` overrides `server.port`
    /// - `EMOTEGUESS_DATA_DIR` overrides `storage.path`
    /// - `TWITCH_ANNOUNCER_LOGIN` / `TWITCH_ANNOUNCER_TOKEN` set
    ///   `chat.announcer_login` / `chat.announcer_token`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("EMOTEGUESS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("EMOTEGUESS_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(dir) = std::env::var("EMOTEGUESS_DATA_DIR") {
            self.storage.path = dir;
        }
        if let Ok(login) = std::env::var("TWITCH_ANNOUNCER_LOGIN") {
            self.chat.announcer_login = Some(login);
        }
        if let Ok(token) = std::env::var("TWITCH_ANNOUNCER_TOKEN") {
            self.chat.announcer_token = Some(token);
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Round behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameSection {
    /// Chat command that prefixes a guess (`!guess pog`). Bare messages
    /// count as guesses too.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// How long the answer stays revealed before the next round opens.
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,

    /// Open the next round automatically after the reveal. When false the
    /// player presses Next.
    #[serde(default = "default_true")]
    pub auto_advance: bool,

    /// Guesser id recorded for guesses typed on the game page.
    #[serde(default = "default_local_guesser")]
    pub local_guesser: String,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            reveal_delay_ms: default_reveal_delay_ms(),
            auto_advance: true,
            local_guesser: default_local_guesser(),
        }
    }
}

/// How wins are partitioned across leaderboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
    /// Channel loads count toward that channel; manual loads go global.
    #[default]
    PerChannel,
    /// Every win goes to the global board.
    Global,
}

/// Leaderboard settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaderboardSection {
    /// Scope selection.
    #[serde(default)]
    pub scoping: ScopeMode,

    /// Whether wins typed on the game page are recorded.
    #[serde(default = "default_true")]
    pub record_local_wins: bool,

    /// Entries returned by default.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for LeaderboardSection {
    fn default() -> Self {
        Self {
            scoping: ScopeMode::default(),
            record_local_wins: true,
            top_n: default_top_n(),
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpSection {
    /// Per-request timeout.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,

    /// Client ID sent to the Twitch Helix API. Without one the Helix
    /// request goes out anonymously and usually fails.
    #[serde(default)]
    pub twitch_client_id: Option<String>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            twitch_client_id: None,
        }
    }
}

/// Live chat settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatSection {
    /// Connect to chat when a channel is loaded.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// IRC host.
    #[serde(default = "default_chat_host")]
    pub host: String,

    /// IRC port (plain text).
    #[serde(default = "default_chat_port")]
    pub port: u16,

    /// Announce-bot login, used when no credentials are stored.
    #[serde(default)]
    pub announcer_login: Option<String>,

    /// Announce-bot OAuth token, used when no credentials are stored.
    #[serde(default)]
    pub announcer_token: Option<String>,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_chat_host(),
            port: default_chat_port(),
            announcer_login: None,
            announcer_token: None,
        }
    }
}

/// Persistent store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageSection {
    /// Directory for JSON blobs. Empty keeps everything in memory.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSection {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    String::from("127.0.0.1")
}

const fn default_port() -> u16 {
    8080
}

fn default_command_prefix() -> String {
    String::from("!guess")
}

const fn default_reveal_delay_ms() -> u64 {
    1500
}

const fn default_true() -> bool {
    true
}

fn default_local_guesser() -> String {
    String::from("You")
}

const fn default_top_n() -> usize {
    10
}

const fn default_http_timeout_ms() -> u64 {
    8000
}

fn default_chat_host() -> String {
    String::from("irc.chat.twitch.tv")
}

const fn default_chat_port() -> u16 {
    6667
}

fn default_storage_path() -> String {
    String::from("emoteguess-data")
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: GameConfig = serde_yml::from_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.game.command_prefix, "!guess");
        assert_eq!(config.game.local_guesser, "You");
        assert_eq!(config.leaderboard.top_n, 10);
        assert_eq!(config.leaderboard.scoping, ScopeMode::PerChannel);
        assert!(config.leaderboard.record_local_wins);
        assert_eq!(config.http.timeout_ms, 8000);
        assert_eq!(config.chat.port, 6667);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = r"
game:
  reveal_delay_ms: 0
  auto_advance: false
leaderboard:
  scoping: global
  record_local_wins: false
";
        let config: GameConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.game.reveal_delay_ms, 0);
        assert!(!config.game.auto_advance);
        assert_eq!(config.game.command_prefix, "!guess");
        assert_eq!(config.leaderboard.scoping, ScopeMode::Global);
        assert!(!config.leaderboard.record_local_wins);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result: Result<GameConfig, ConfigError> =
            serde_yml::from_str::<GameConfig>("game: [").map_err(ConfigError::from);
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
