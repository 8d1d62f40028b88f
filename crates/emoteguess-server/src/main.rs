//! Emoteguess binary.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `emoteguess.yaml` (defaults when absent) and
//!    apply its log level unless `RUST_LOG` is set
//! 3. Open the data directory
//! 4. Spawn the game actor
//! 5. Serve HTTP until Ctrl-C

use std::path::Path;

use emoteguess_server::startup::{self, CONFIG_PATH};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, reload};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    let from_env = EnvFilter::try_from_default_env().ok();
    let rust_log_set = from_env.is_some();
    let (filter, filter_handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();

    // 2. Load configuration.
    let config = startup::load_config(Path::new(CONFIG_PATH))?;
    if !rust_log_set {
        filter_handle.reload(EnvFilter::new(&config.logging.level))?;
    }

    info!(
        host = config.server.host,
        port = config.server.port,
        storage = config.storage.path,
        log_level = config.logging.level,
        "emoteguess starting"
    );

    startup::run(config).await?;
    Ok(())
}
