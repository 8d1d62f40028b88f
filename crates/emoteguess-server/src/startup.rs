//! Process startup: configuration, storage, and wiring.
//!
//! [`run`] is everything `main` does after logging is up: open the store,
//! build the controller and sources, start the game actor, and serve HTTP
//! until shutdown.

use std::path::Path;
use std::time::Duration;

use emoteguess_core::{ConfigError, ControllerSettings, GameConfig, GameController};
use emoteguess_ledger::{JsonFileStore, KvStore, Leaderboard, MemoryStore, StoreError};
use emoteguess_sources::{ChannelSources, SourceError};
use tracing::{info, warn};

use crate::actor::spawn_game;
use crate::server::{ServerError, start_server};

/// Default configuration file, relative to the working directory.
pub const CONFIG_PATH: &str = "emoteguess.yaml";

/// Top-level failure of the binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// The persistent store could not be opened.
    #[error("storage: {0}")]
    Store(#[from] StoreError),

    /// The HTTP client could not be built.
    #[error("sources: {0}")]
    Sources(#[from] SourceError),

    /// The HTTP server failed.
    #[error("server: {0}")]
    Server(#[from] ServerError),
}

/// Load `path` if it exists, else defaults. Env overrides apply either way.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<GameConfig, AppError> {
    if path.exists() {
        return Ok(GameConfig::from_file(path)?);
    }
    info!(path = %path.display(), "no config file, using defaults");
    let mut config = GameConfig::default();
    config.apply_env_overrides();
    Ok(config)
}

/// Open the configured store. An empty path keeps everything in memory.
///
/// # Errors
///
/// Returns [`StoreError`] if the data directory cannot be created.
pub fn open_store(config: &GameConfig) -> Result<Box<dyn KvStore>, AppError> {
    let path = config.storage.path.trim();
    if path.is_empty() {
        warn!("storage.path is empty, leaderboards will not survive a restart");
        return Ok(Box::new(MemoryStore::new()));
    }
    let store = JsonFileStore::open(path)?;
    info!(path = %store.dir().display(), "opened data directory");
    Ok(Box::new(store))
}

/// Run the game server until shutdown.
///
/// # Errors
///
/// Returns [`AppError`] if the store, HTTP client, or listener fails.
pub async fn run(config: GameConfig) -> Result<(), AppError> {
    let store = open_store(&config)?;
    let controller =
        GameController::new(ControllerSettings::from(&config), Leaderboard::new(store));
    let sources = ChannelSources::new(
        Duration::from_millis(config.http.timeout_ms),
        config.http.twitch_client_id.clone(),
    )?;

    let (state, game) = spawn_game(&config, controller, sources);
    info!(
        chat_enabled = config.chat.enabled,
        auto_advance = config.game.auto_advance,
        reveal_delay_ms = config.game.reveal_delay_ms,
        "game loop spawned"
    );

    let served = start_server(&config.server.host, config.server.port, state).await;
    game.abort();
    served?;
    info!("Emoteguess stopped");
    Ok(())
}
