//! Background channel loads.
//!
//! Resolving a channel and fetching its emotes takes a couple of HTTP round
//! trips, so it runs on its own task and reports back to the actor through
//! the command queue. Every report carries the generation it was started
//! under; the actor drops reports from superseded loads.

use emoteguess_sources::ChannelSources;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::actor::Command;

/// Resolve `login` and fetch its emotes, reporting to `commands`.
pub fn spawn_channel_load(
    sources: ChannelSources,
    login: String,
    generation: u64,
    commands: mpsc::UnboundedSender<Command>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let report_resolved = |twitch_id: &str| {
            let progress = Command::LoadProgress {
                generation,
                message: format!("Twitch ID: {twitch_id}, fetching 7TV emotes..."),
            };
            if commands.send(progress).is_err() {
                debug!(generation, "game loop gone during load");
            }
        };
        let result = sources.load(&login, report_resolved).await;
        let outcome = match result {
            Ok(channel) => Command::ChannelLoaded {
                generation,
                login: channel.login,
                emotes: channel.emotes,
            },
            Err(e) => Command::LoadFailed {
                generation,
                login,
                error: e.to_string(),
            },
        };
        if commands.send(outcome).is_err() {
            debug!(generation, "game loop gone before load finished");
        }
    })
}
