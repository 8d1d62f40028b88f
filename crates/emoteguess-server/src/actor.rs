//! The game actor: sole owner of the [`GameController`].
//!
//! HTTP handlers, the chat feed, loader tasks, and reveal timers all talk
//! to the game by queueing a [`Command`]. The actor handles one command at
//! a time, so local and chat guesses never interleave inside a submit.
//! After each command it broadcasts the produced events and refreshes the
//! shared snapshot.

use std::sync::Arc;
use std::time::Duration;

use emoteguess_chat::{Announcer, ChatAdapter, ChatEvent, ChatHandler, attempt_from_message};
use emoteguess_core::{GameConfig, GameController, Session, Verdict};
use emoteguess_ledger::{AnnouncerCredentials, clear_announcer, load_announcer, save_announcer};
use emoteguess_sources::{ChannelSources, sanitize_channel};
use emoteguess_types::{Emote, GameEvent, LeaderboardEntry, RoundId, Scope, SessionId};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::loader;
use crate::state::AppState;

/// A request to the game actor.
#[derive(Debug)]
pub enum Command {
    /// Start loading a channel's emotes. Replies with the load generation.
    LoadChannel {
        /// Channel name as typed.
        channel: String,
        /// Reply slot.
        reply: oneshot::Sender<Result<u64, ApiError>>,
    },
    /// Load a pasted JSON payload.
    LoadManual {
        /// Raw JSON text.
        payload: String,
        /// Reply slot.
        reply: oneshot::Sender<Result<SessionId, ApiError>>,
    },
    /// Intermediate status from a loader task.
    LoadProgress {
        /// Load this belongs to.
        generation: u64,
        /// Status line.
        message: String,
    },
    /// A loader task finished.
    ChannelLoaded {
        /// Load this belongs to.
        generation: u64,
        /// Sanitised login.
        login: String,
        /// Fetched emotes.
        emotes: Vec<Emote>,
    },
    /// A loader task failed.
    LoadFailed {
        /// Load this belongs to.
        generation: u64,
        /// Sanitised login.
        login: String,
        /// Human-readable reason.
        error: String,
    },
    /// A guess typed on the game page.
    Guess {
        /// Raw guess text.
        text: String,
        /// Reply slot.
        reply: oneshot::Sender<Verdict>,
    },
    /// Something from the chat feed.
    Chat(ChatEvent),
    /// Lock the current round with no winner.
    Skip {
        /// Replies `false` if nothing was skipped.
        reply: oneshot::Sender<bool>,
    },
    /// Open the next round now.
    Next {
        /// Replies `false` if no session is loaded.
        reply: oneshot::Sender<bool>,
    },
    /// Reshuffle the current session.
    Reshuffle {
        /// Reply slot.
        reply: oneshot::Sender<Result<SessionId, ApiError>>,
    },
    /// Reveal delay for `round_id` elapsed.
    AdvanceAfterReveal {
        /// Round the timer was started for.
        round_id: RoundId,
    },
    /// Read a leaderboard. `None` means the current session's scope.
    Leaderboard {
        /// Scope to read.
        scope: Option<Scope>,
        /// Reply slot.
        reply: oneshot::Sender<LeaderboardView>,
    },
    /// Reset a leaderboard. `None` means the current session's scope.
    ClearLeaderboard {
        /// Scope to clear.
        scope: Option<Scope>,
        /// Replies with the scope that was cleared.
        reply: oneshot::Sender<Scope>,
    },
    /// Store announce-bot credentials.
    SetAnnouncer {
        /// New credentials.
        credentials: AnnouncerCredentials,
        /// Reply slot.
        reply: oneshot::Sender<Result<(), ApiError>>,
    },
    /// Forget announce-bot credentials.
    ClearAnnouncer {
        /// Reply slot.
        reply: oneshot::Sender<Result<(), ApiError>>,
    },
}

/// A ranked leaderboard for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardView {
    /// Scope the entries belong to.
    pub scope: Scope,
    /// Entries, best first.
    pub entries: Vec<LeaderboardEntry>,
}

/// Actor settings derived from [`GameConfig`].
#[derive(Debug, Clone)]
pub struct ActorSettings {
    /// Chat command prefix for guesses.
    pub command_prefix: String,
    /// How long an answer stays revealed.
    pub reveal_delay: Duration,
    /// Whether to advance after the reveal.
    pub auto_advance: bool,
    /// Leaderboard size for reads.
    pub top_n: usize,
    /// Whether to open a chat feed on channel loads.
    pub chat_enabled: bool,
    /// Chat server host.
    pub chat_host: String,
    /// Chat server port.
    pub chat_port: u16,
}

impl From<&GameConfig> for ActorSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            command_prefix: config.game.command_prefix.clone(),
            reveal_delay: Duration::from_millis(config.game.reveal_delay_ms),
            auto_advance: config.game.auto_advance,
            top_n: config.leaderboard.top_n,
            chat_enabled: config.chat.enabled,
            chat_host: config.chat.host.clone(),
            chat_port: config.chat.port,
        }
    }
}

/// Forwards chat feed events into the command queue.
struct ChatForwarder(mpsc::UnboundedSender<Command>);

impl ChatHandler for ChatForwarder {
    fn on_event(&self, event: ChatEvent) {
        if self.0.send(Command::Chat(event)).is_err() {
            debug!("game loop gone, dropping chat event");
        }
    }
}

/// Owner of the controller and every side effect around it.
pub struct GameActor {
    controller: GameController,
    settings: ActorSettings,
    sources: ChannelSources,
    state: Arc<AppState>,
    commands: mpsc::UnboundedSender<Command>,
    chat: Option<ChatAdapter>,
    announcer: Option<Announcer>,
    generation: u64,
}

/// Start the game actor and return the state handlers share.
///
/// Announce-bot credentials come from the store first, then from the
/// `chat` config section.
pub fn spawn_game(
    config: &GameConfig,
    mut controller: GameController,
    sources: ChannelSources,
) -> (Arc<AppState>, JoinHandle<()>) {
    let (commands, rx) = mpsc::unbounded_channel();
    let state = Arc::new(AppState::new(commands.clone()));
    let settings = ActorSettings::from(config);

    let chat = settings.chat_enabled.then(|| {
        let forwarder: Arc<dyn ChatHandler> = Arc::new(ChatForwarder(commands.clone()));
        ChatAdapter::new(&settings.chat_host, settings.chat_port, forwarder)
    });

    let stored = match load_announcer(controller.ledger_mut().store()) {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "could not read stored announcer credentials");
            None
        }
    };
    let credentials = stored.or_else(|| {
        AnnouncerCredentials::new(
            config.chat.announcer_login.as_deref()?,
            config.chat.announcer_token.as_deref()?,
        )
    });
    let announcer = credentials.map(|c| {
        info!(login = c.login, "announce-bot configured");
        Announcer::new(&settings.chat_host, settings.chat_port, &c.login, &c.irc_pass())
    });

    let actor = GameActor {
        controller,
        settings,
        sources,
        state: Arc::clone(&state),
        commands,
        chat,
        announcer,
        generation: 0,
    };
    let handle = tokio::spawn(actor.run(rx));
    (state, handle)
}

/// A reply held back until the command's events are published.
type Reply = Box<dyn FnOnce() + Send>;

fn respond<T: Send + 'static>(reply: oneshot::Sender<T>, value: T) -> Option<Reply> {
    Some(Box::new(move || {
        if reply.send(value).is_err() {
            debug!("requester went away before the reply");
        }
    }))
}

impl GameActor {
    /// Process commands until every sender is gone.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        info!("game loop started");
        while let Some(command) = rx.recv().await {
            let mut events = Vec::new();
            let reply = self.handle(command, &mut events);
            if !events.is_empty() {
                self.publish(&events);
                let snapshot = self.controller.snapshot();
                let shared = Arc::clone(&self.state);
                *shared.snapshot.write().await = snapshot;
            }
            if let Some(reply) = reply {
                reply();
            }
        }
        info!("game loop stopped");
    }

    fn handle(&mut self, command: Command, events: &mut Vec<GameEvent>) -> Option<Reply> {
        match command {
            Command::LoadChannel { channel, reply } => {
                respond(reply, self.start_channel_load(&channel, events))
            }
            Command::LoadManual { payload, reply } => {
                respond(reply, self.load_manual(&payload, events))
            }
            Command::LoadProgress {
                generation,
                message,
            } => {
                if generation == self.generation {
                    events.push(GameEvent::status(message));
                }
                None
            }
            Command::ChannelLoaded {
                generation,
                login,
                emotes,
            } => {
                self.finish_channel_load(generation, &login, emotes, events);
                None
            }
            Command::LoadFailed {
                generation,
                login,
                error,
            } => {
                if generation == self.generation {
                    warn!(channel = login, generation, error, "channel load failed");
                    events.push(GameEvent::error(format!("Failed: {error}")));
                } else {
                    debug!(channel = login, generation, "ignoring stale load failure");
                }
                None
            }
            Command::Guess { text, reply } => {
                respond(reply, self.controller.submit_local(&text, events))
            }
            Command::Chat(event) => {
                self.handle_chat(event, events);
                None
            }
            Command::Skip { reply } => respond(reply, self.controller.skip(events)),
            Command::Next { reply } => respond(reply, self.controller.advance(events).is_some()),
            Command::Reshuffle { reply } => {
                let result = self.controller.reshuffle(events).map_err(ApiError::from);
                if result.is_ok() {
                    events.push(GameEvent::status("Reshuffled. Starting over."));
                }
                respond(reply, result)
            }
            Command::AdvanceAfterReveal { round_id } => {
                self.controller.advance_from(round_id, events);
                None
            }
            Command::Leaderboard { scope, reply } => {
                let scope = scope.unwrap_or_else(|| self.current_scope());
                let entries = self.controller.leaderboard(&scope, self.settings.top_n);
                respond(reply, LeaderboardView { scope, entries })
            }
            Command::ClearLeaderboard { scope, reply } => {
                let scope = scope.unwrap_or_else(|| self.current_scope());
                self.controller.clear_leaderboard(&scope, events);
                respond(reply, scope)
            }
            Command::SetAnnouncer { credentials, reply } => {
                respond(reply, self.set_announcer(&credentials, events))
            }
            Command::ClearAnnouncer { reply } => {
                let result = clear_announcer(self.controller.ledger_mut().store_mut())
                    .map_err(ApiError::from);
                if result.is_ok() {
                    self.announcer = None;
                    events.push(GameEvent::status("Announce-bot removed."));
                }
                respond(reply, result)
            }
        }
    }

    fn current_scope(&self) -> Scope {
        self.controller
            .session()
            .map_or(Scope::Global, |s| s.scope().clone())
    }

    fn start_channel_load(
        &mut self,
        raw: &str,
        events: &mut Vec<GameEvent>,
    ) -> Result<u64, ApiError> {
        let Some(login) = sanitize_channel(raw) else {
            events.push(GameEvent::error("Enter a channel name."));
            return Err(ApiError::BadRequest(format!("invalid channel name {raw:?}")));
        };
        self.generation = self.generation.wrapping_add(1);
        info!(channel = login, generation = self.generation, "loading channel");
        events.push(GameEvent::status(format!(
            "Resolving {login} to a Twitch ID..."
        )));
        if let Some(chat) = self.chat.as_mut() {
            chat.connect(&login);
        }
        loader::spawn_channel_load(
            self.sources.clone(),
            login,
            self.generation,
            self.commands.clone(),
        );
        Ok(self.generation)
    }

    fn finish_channel_load(
        &mut self,
        generation: u64,
        login: &str,
        emotes: Vec<Emote>,
        events: &mut Vec<GameEvent>,
    ) {
        if generation != self.generation {
            debug!(channel = login, generation, "ignoring stale channel load");
            return;
        }
        match self.controller.load(emotes, Some(login), events) {
            Ok(_) => {
                let total = self.controller.session().map_or(0, Session::total);
                events.push(GameEvent::status(format!(
                    "Loaded {total} emotes. Good luck!"
                )));
            }
            Err(e) => events.push(GameEvent::error(format!("{login}: {e}"))),
        }
    }

    fn load_manual(
        &mut self,
        payload: &str,
        events: &mut Vec<GameEvent>,
    ) -> Result<SessionId, ApiError> {
        let emotes = match emoteguess_core::parse_manual_payload(payload) {
            Ok(emotes) => emotes,
            Err(e) => {
                events.push(GameEvent::error(format!("Invalid JSON: {e}")));
                return Err(e.into());
            }
        };
        // A manual set supersedes any channel load still in flight.
        self.generation = self.generation.wrapping_add(1);
        let session_id = self.controller.load(emotes, None, events)?;
        let total = self.controller.session().map_or(0, Session::total);
        events.push(GameEvent::status(format!(
            "Loaded manual JSON ({total} emotes)."
        )));
        Ok(session_id)
    }

    fn feed_channel(&self) -> Option<&str> {
        self.chat.as_ref().and_then(ChatAdapter::channel)
    }

    fn handle_chat(&mut self, event: ChatEvent, events: &mut Vec<GameEvent>) {
        match event {
            ChatEvent::Message(message) => {
                if self.feed_channel() != Some(message.channel.as_str()) {
                    debug!(channel = message.channel, "dropping line from closed feed");
                    return;
                }
                events.push(GameEvent::ChatLine {
                    sender: message.sender_display_name.clone(),
                    text: message.text.clone(),
                });
                if let Some(attempt) = attempt_from_message(&message, &self.settings.command_prefix)
                {
                    self.controller.submit_chat(&message, &attempt, events);
                }
            }
            ChatEvent::Connected { channel } => {
                if self.feed_channel() == Some(channel.as_str()) {
                    events.push(GameEvent::status(format!("Connected to #{channel} chat.")));
                }
            }
            ChatEvent::Dropped { channel, reason } => {
                if self.feed_channel() == Some(channel.as_str()) {
                    events.push(GameEvent::error(format!(
                        "Chat for #{channel} disconnected: {reason}"
                    )));
                }
            }
        }
    }

    fn set_announcer(
        &mut self,
        credentials: &AnnouncerCredentials,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), ApiError> {
        save_announcer(self.controller.ledger_mut().store_mut(), credentials)?;
        self.announcer = Some(Announcer::new(
            &self.settings.chat_host,
            self.settings.chat_port,
            &credentials.login,
            &credentials.irc_pass(),
        ));
        info!(login = credentials.login, "announce-bot configured");
        events.push(GameEvent::status(format!(
            "Announcing winners as {}.",
            credentials.login
        )));
        Ok(())
    }

    fn publish(&self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::RoundWon {
                    round_id,
                    guesser_id,
                    emote_name,
                    ..
                } => {
                    self.schedule_advance(*round_id);
                    self.announce(guesser_id, emote_name);
                }
                GameEvent::RoundSkipped { round_id, .. } => self.schedule_advance(*round_id),
                _ => {}
            }
            let receivers = self.state.broadcast(event);
            debug!(receivers, "game event broadcast");
        }
    }

    fn schedule_advance(&self, round_id: RoundId) {
        if !self.settings.auto_advance {
            return;
        }
        let commands = self.commands.clone();
        let delay = self.settings.reveal_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if commands
                .send(Command::AdvanceAfterReveal { round_id })
                .is_err()
            {
                debug!(%round_id, "game loop gone before reveal elapsed");
            }
        });
    }

    fn announce(&self, guesser_id: &str, emote_name: &str) {
        let Some(announcer) = self.announcer.clone() else {
            return;
        };
        let Some(channel) = self
            .controller
            .session()
            .and_then(Session::channel)
            .map(ToOwned::to_owned)
        else {
            return;
        };
        let text = format!("{guesser_id} guessed {emote_name} first!");
        tokio::spawn(async move {
            if let Err(e) = announcer.announce(&channel, &text).await {
                warn!(channel, error = %e, "announcement failed");
            }
        });
    }
}
