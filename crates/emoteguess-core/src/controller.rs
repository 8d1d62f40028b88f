//! The game controller: single owner of the active [`Session`].
//!
//! All guesses, skips, advances, and loads go through one
//! [`GameController`]. Each operation is synchronous, so the round lock is
//! checked and set without any suspension point in between. Results are
//! published to an [`EventSink`]; the controller never touches
//! presentation state.
//!
//! On an accepted guess the side effects are strictly ordered:
//! lock, then leaderboard, then score.

use emoteguess_ledger::Leaderboard;
use emoteguess_types::{
    ChatMessage, Emote, GameEvent, GuessAttempt, GuessSource, LeaderboardEntry, RejectionReason,
    RoundId, Scope, SessionId,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::arbiter::{self, Verdict};
use crate::config::{GameConfig, ScopeMode};
use crate::error::CoreError;
use crate::sequencer::{Advance, Session};

/// Receiver for events published by the controller.
pub trait EventSink: Send {
    /// Called once per event, in emission order.
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Controller settings derived from [`GameConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Guesser id for guesses typed on the game page.
    pub local_guesser: String,
    /// Whether local wins reach the leaderboard.
    pub record_local_wins: bool,
    /// How sessions pick their leaderboard scope.
    pub scoping: ScopeMode,
    /// Size of the leaderboard attached to update events.
    pub top_n: usize,
}

impl From<&GameConfig> for ControllerSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            local_guesser: config.game.local_guesser.clone(),
            record_local_wins: config.leaderboard.record_local_wins,
            scoping: config.leaderboard.scoping,
            top_n: config.leaderboard.top_n,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}

/// Point-in-time view of the controller, for status endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct GameSnapshot {
    /// Active session, if any.
    pub session_id: Option<SessionId>,
    /// Channel the session was loaded from.
    pub channel: Option<String>,
    /// Leaderboard scope of the session.
    pub scope: Option<Scope>,
    /// Zero-based position.
    pub position: usize,
    /// Sequence length.
    pub total: usize,
    /// Rounds won.
    pub score: u64,
    /// Current round, if one exists.
    pub round: Option<RoundView>,
    /// Whether the sequence ran out.
    pub exhausted: bool,
}

/// Presentation-safe view of the current round.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RoundView {
    /// Round identifier.
    pub round_id: RoundId,
    /// Image to show.
    pub emote_url: String,
    /// Whether the round has an outcome.
    pub locked: bool,
    /// Winner, once won.
    pub winner: Option<String>,
    /// The answer, only once the round is locked.
    pub revealed_name: Option<String>,
}

/// Owner of the session and the leaderboard.
pub struct GameController {
    settings: ControllerSettings,
    session: Option<Session>,
    ledger: Leaderboard,
    rng: StdRng,
}

impl GameController {
    /// Create a controller with OS-seeded randomness.
    pub fn new(settings: ControllerSettings, ledger: Leaderboard) -> Self {
        Self {
            settings,
            session: None,
            ledger,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a controller with a fixed shuffle seed.
    pub fn with_seed(settings: ControllerSettings, ledger: Leaderboard, seed: u64) -> Self {
        Self {
            settings,
            session: None,
            ledger,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Settings in effect.
    pub const fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// The active session, if any.
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Mutable access to the leaderboard (and its store).
    pub const fn ledger_mut(&mut self) -> &mut Leaderboard {
        &mut self.ledger
    }

    /// Scope wins would be recorded in for a load from `channel`.
    pub fn scope_for(&self, channel: Option<&str>) -> Scope {
        match (self.settings.scoping, channel) {
            (ScopeMode::PerChannel, Some(name)) => Scope::channel(name),
            _ => Scope::Global,
        }
    }

    /// Replace the session with a freshly shuffled one.
    ///
    /// On failure the previous session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyInput`] if no valid emote remains.
    pub fn load(
        &mut self,
        emotes: Vec<Emote>,
        channel: Option<&str>,
        sink: &mut impl EventSink,
    ) -> Result<SessionId, CoreError> {
        let scope = self.scope_for(channel);
        let channel = channel.map(|c| c.trim().trim_start_matches('#').to_lowercase());
        let session = Session::load(emotes, scope.clone(), channel, &mut self.rng)?;
        let session_id = session.id();

        info!(
            session_id = %session_id,
            scope = %scope,
            total = session.total(),
            "session loaded"
        );
        sink.emit(GameEvent::SessionLoaded {
            session_id,
            scope: scope.clone(),
            total: session.total(),
        });
        if let Some(round) = session.current() {
            sink.emit(GameEvent::RoundStarted {
                round_id: round.id(),
                position: session.position(),
                total: session.total(),
                emote: round.emote().clone(),
            });
        }
        self.session = Some(session);
        self.publish_leaderboard(&scope, sink);
        Ok(session_id)
    }

    /// Reshuffle the current session's emotes and start over at round 0.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoSession`] if no session is loaded.
    pub fn reshuffle(&mut self, sink: &mut impl EventSink) -> Result<SessionId, CoreError> {
        let (emotes, channel) = self
            .session
            .as_ref()
            .map(|s| (s.sequence().to_vec(), s.channel().map(ToOwned::to_owned)))
            .ok_or(CoreError::NoSession)?;
        self.load(emotes, channel.as_deref(), sink)
    }

    /// Submit a guess typed on the game page.
    pub fn submit_local(&mut self, text: &str, sink: &mut impl EventSink) -> Verdict {
        let attempt = GuessAttempt::local(&self.settings.local_guesser, text);
        self.submit(&attempt, sink)
    }

    /// Submit a guess extracted from `message`.
    ///
    /// Returns `None` when the message comes from a channel other than the
    /// session's (a stale feed); such attempts never reach the arbiter.
    pub fn submit_chat(
        &mut self,
        message: &ChatMessage,
        attempt: &GuessAttempt,
        sink: &mut impl EventSink,
    ) -> Option<Verdict> {
        if let Some(channel) = self.session.as_ref().and_then(Session::channel)
            && channel != message.channel
        {
            debug!(
                expected = channel,
                got = message.channel,
                "dropping chat guess from stale channel"
            );
            return None;
        }
        Some(self.submit(attempt, sink))
    }

    /// Arbitrate one attempt against the current round.
    pub fn submit(&mut self, attempt: &GuessAttempt, sink: &mut impl EventSink) -> Verdict {
        let Some(session) = self.session.as_mut() else {
            return Verdict::Rejected(RejectionReason::NoActiveRound);
        };

        let verdict = arbiter::submit(attempt, session.current_mut());
        if !verdict.is_accepted() {
            return verdict;
        }

        let Some(round) = session.current() else {
            return verdict;
        };
        let round_id = round.id();
        let emote_name = round.emote().name.clone();
        let scope = session.scope().clone();

        let records = attempt.source == GuessSource::Chat || self.settings.record_local_wins;
        if records {
            self.ledger.record_win(&attempt.guesser_id, &scope);
        }

        let score = self.session.as_mut().map_or(0, Session::bump_score);

        info!(
            round_id = %round_id,
            guesser_id = attempt.guesser_id,
            source = ?attempt.source,
            emote = emote_name,
            score,
            "round won"
        );
        sink.emit(GameEvent::RoundWon {
            round_id,
            guesser_id: attempt.guesser_id.clone(),
            emote_name,
            source: attempt.source,
            score,
        });
        if records {
            self.publish_leaderboard(&scope, sink);
        }
        verdict
    }

    /// Lock the current round with no winner.
    ///
    /// Returns `false` when there is no round or it is already locked.
    pub fn skip(&mut self, sink: &mut impl EventSink) -> bool {
        let Some(round) = self.session.as_mut().and_then(Session::current_mut) else {
            return false;
        };
        if !round.try_lock() {
            return false;
        }
        debug!(round_id = %round.id(), "round skipped");
        sink.emit(GameEvent::RoundSkipped {
            round_id: round.id(),
            emote_name: round.emote().name.clone(),
        });
        true
    }

    /// Open the next round. An open round is skipped first.
    ///
    /// Returns `None` when no session is loaded.
    pub fn advance(&mut self, sink: &mut impl EventSink) -> Option<Advance> {
        self.session.as_ref()?;
        self.skip(sink);

        let session = self.session.as_mut()?;
        let outcome = session.advance();
        match &outcome {
            Advance::Round(round) => sink.emit(GameEvent::RoundStarted {
                round_id: round.id(),
                position: session.position(),
                total: session.total(),
                emote: round.emote().clone(),
            }),
            Advance::SequenceExhausted { final_score, total } => {
                info!(final_score, total, "sequence exhausted");
                sink.emit(GameEvent::SequenceExhausted {
                    final_score: *final_score,
                    total: *total,
                });
            }
        }
        Some(outcome)
    }

    /// Advance only if `round_id` is still the current, locked round.
    ///
    /// Used for delayed advances scheduled after a reveal; a tag that no
    /// longer matches is ignored.
    pub fn advance_from(
        &mut self,
        round_id: RoundId,
        sink: &mut impl EventSink,
    ) -> Option<Advance> {
        let current = self.session.as_ref().and_then(Session::current)?;
        if current.id() != round_id || !current.is_locked() {
            debug!(round_id = %round_id, "ignoring stale advance");
            return None;
        }
        self.advance(sink)
    }

    /// Current ranking for `scope`.
    pub fn leaderboard(&mut self, scope: &Scope, n: usize) -> Vec<LeaderboardEntry> {
        self.ledger.top_n(scope, n)
    }

    /// Explicit user reset of one scope.
    pub fn clear_leaderboard(&mut self, scope: &Scope, sink: &mut impl EventSink) {
        info!(scope = %scope, "clearing leaderboard");
        self.ledger.clear(scope);
        self.publish_leaderboard(scope, sink);
    }

    /// Summarize the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        let Some(session) = self.session.as_ref() else {
            return GameSnapshot::default();
        };
        GameSnapshot {
            session_id: Some(session.id()),
            channel: session.channel().map(ToOwned::to_owned),
            scope: Some(session.scope().clone()),
            position: session.position(),
            total: session.total(),
            score: session.score(),
            round: session.current().map(|round| RoundView {
                round_id: round.id(),
                emote_url: round.emote().url.clone(),
                locked: round.is_locked(),
                winner: round.winner().map(ToOwned::to_owned),
                revealed_name: round.is_locked().then(|| round.emote().name.clone()),
            }),
            exhausted: session.is_exhausted(),
        }
    }

    fn publish_leaderboard(&mut self, scope: &Scope, sink: &mut impl EventSink) {
        let entries = self.ledger.top_n(scope, self.settings.top_n);
        sink.emit(GameEvent::LeaderboardUpdated {
            scope: scope.clone(),
            entries,
        });
    }
}

impl core::fmt::Debug for GameController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameController")
            .field("settings", &self.settings)
            .field("session", &self.session.as_ref().map(Session::id))
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use emoteguess_ledger::{Leaderboard, MemoryStore};
    use emoteguess_types::{ChatMessage, Emote, GameEvent, GuessAttempt, RejectionReason, Scope};

    use super::*;

    fn emote(name: &str) -> Emote {
        Emote::new(name, &format!("https://cdn.example/{name}.webp")).unwrap()
    }

    fn controller() -> GameController {
        let ledger = Leaderboard::new(Box::new(MemoryStore::new()));
        GameController::with_seed(ControllerSettings::default(), ledger, 7)
    }

    fn current_name(c: &GameController) -> String {
        c.session().unwrap().current().unwrap().emote().name.clone()
    }

    fn chat(channel: &str, sender: &str, text: &str) -> ChatMessage {
        ChatMessage {
            channel: channel.to_owned(),
            sender_id: sender.to_lowercase(),
            sender_display_name: sender.to_owned(),
            text: text.to_owned(),
        }
    }

    #[test]
    fn guess_before_load_has_no_active_round() {
        let mut c = controller();
        let mut events = Vec::new();
        assert_eq!(
            c.submit_local("pog", &mut events),
            Verdict::Rejected(RejectionReason::NoActiveRound)
        );
        assert!(events.is_empty());
    }

    #[test]
    fn local_win_scores_and_records() {
        let mut c = controller();
        let mut events = Vec::new();
        c.load(vec![emote("Pog")], None, &mut events).unwrap();
        assert!(matches!(events[0], GameEvent::SessionLoaded { total: 1, .. }));
        assert!(matches!(events[1], GameEvent::RoundStarted { position: 0, .. }));

        events.clear();
        assert_eq!(c.submit_local("POG ", &mut events), Verdict::Accepted);
        assert_eq!(c.session().unwrap().score(), 1);

        let board = c.leaderboard(&Scope::Global, 10);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].guesser_id, "You");
        assert_eq!(board[0].wins, 1);

        match &events[0] {
            GameEvent::RoundWon {
                guesser_id, score, ..
            } => {
                assert_eq!(guesser_id, "You");
                assert_eq!(*score, 1);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(events[1], GameEvent::LeaderboardUpdated { .. }));
    }

    #[test]
    fn local_wins_can_skip_the_leaderboard() {
        let settings = ControllerSettings {
            record_local_wins: false,
            ..ControllerSettings::default()
        };
        let ledger = Leaderboard::new(Box::new(MemoryStore::new()));
        let mut c = GameController::with_seed(settings, ledger, 1);
        let mut events = Vec::new();
        c.load(vec![emote("Pog")], None, &mut events).unwrap();

        assert!(c.submit_local("pog", &mut events).is_accepted());
        assert_eq!(c.session().unwrap().score(), 1);
        assert!(c.leaderboard(&Scope::Global, 10).is_empty());
    }

    #[test]
    fn second_correct_guess_is_already_won() {
        let mut c = controller();
        let mut events = Vec::new();
        c.load(vec![emote("Kappa")], Some("#Streamer"), &mut events).unwrap();

        let first = GuessAttempt::chat("alice", "kappa");
        let second = GuessAttempt::chat("bob", "KAPPA");
        let msg = chat("streamer", "alice", "!guess kappa");
        assert_eq!(
            c.submit_chat(&msg, &first, &mut events),
            Some(Verdict::Accepted)
        );
        assert_eq!(
            c.submit_chat(&msg, &second, &mut events),
            Some(Verdict::Rejected(RejectionReason::AlreadyWon))
        );
        assert_eq!(c.session().unwrap().score(), 1);

        let board = c.leaderboard(&Scope::channel("streamer"), 10);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].guesser_id, "alice");
    }

    #[test]
    fn chat_from_another_channel_is_dropped() {
        let mut c = controller();
        let mut events = Vec::new();
        c.load(vec![emote("Kappa")], Some("streamer"), &mut events).unwrap();
        let msg = chat("someone_else", "alice", "!guess kappa");
        let attempt = GuessAttempt::chat("alice", "kappa");
        assert_eq!(c.submit_chat(&msg, &attempt, &mut events), None);
        assert!(!c.session().unwrap().current().unwrap().is_locked());
    }

    #[test]
    fn skip_locks_without_winner() {
        let mut c = controller();
        let mut events = Vec::new();
        c.load(vec![emote("Pog")], None, &mut events).unwrap();
        events.clear();

        assert!(c.skip(&mut events));
        assert!(!c.skip(&mut events));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::RoundSkipped { .. }));
        assert_eq!(
            c.submit_local("pog", &mut events),
            Verdict::Rejected(RejectionReason::AlreadyWon)
        );
        assert_eq!(c.session().unwrap().score(), 0);
    }

    #[test]
    fn advance_runs_out_and_stays_out() {
        let mut c = controller();
        let mut events = Vec::new();
        c.load(vec![emote("A"), emote("B")], None, &mut events).unwrap();
        let name = current_name(&c);
        assert!(c.submit_local(&name, &mut events).is_accepted());

        assert!(matches!(c.advance(&mut events), Some(Advance::Round(_))));
        assert!(matches!(
            c.advance(&mut events),
            Some(Advance::SequenceExhausted {
                final_score: 1,
                total: 2
            })
        ));
        assert!(matches!(
            c.advance(&mut events),
            Some(Advance::SequenceExhausted { .. })
        ));
        assert_eq!(
            c.submit_local("a", &mut events),
            Verdict::Rejected(RejectionReason::NoActiveRound)
        );
    }

    #[test]
    fn advance_skips_an_open_round_first() {
        let mut c = controller();
        let mut events = Vec::new();
        c.load(vec![emote("A"), emote("B")], None, &mut events).unwrap();
        events.clear();

        c.advance(&mut events).unwrap();
        assert!(matches!(events[0], GameEvent::RoundSkipped { .. }));
        assert!(matches!(events[1], GameEvent::RoundStarted { position: 1, .. }));
    }

    #[test]
    fn stale_advance_is_ignored() {
        let mut c = controller();
        let mut events = Vec::new();
        c.load(vec![emote("A"), emote("B"), emote("C")], None, &mut events).unwrap();
        let first = c.session().unwrap().current().unwrap().id();
        c.skip(&mut events);
        assert!(c.advance_from(first, &mut events).is_some());
        // The same tag no longer matches the reopened round.
        assert!(c.advance_from(first, &mut events).is_none());
        assert_eq!(c.session().unwrap().position(), 1);
    }

    #[test]
    fn failed_load_keeps_previous_session() {
        let mut c = controller();
        let mut events = Vec::new();
        let id = c.load(vec![emote("A")], None, &mut events).unwrap();
        let bad = vec![Emote {
            name: " ".to_owned(),
            url: "x".to_owned(),
        }];
        assert!(matches!(
            c.load(bad, None, &mut events),
            Err(CoreError::EmptyInput)
        ));
        assert_eq!(c.session().unwrap().id(), id);
    }

    #[test]
    fn reshuffle_without_session_is_an_error() {
        let mut c = controller();
        let mut events = Vec::new();
        assert!(matches!(c.reshuffle(&mut events), Err(CoreError::NoSession)));
        assert!(events.is_empty());
    }

    #[test]
    fn reshuffle_restarts_with_same_emotes() {
        let mut c = controller();
        let mut events = Vec::new();
        c.load(vec![emote("A"), emote("B")], Some("chan"), &mut events).unwrap();
        c.advance(&mut events);
        let id = c.reshuffle(&mut events).unwrap();

        let session = c.session().unwrap();
        assert_eq!(session.id(), id);
        assert_eq!(session.position(), 0);
        assert_eq!(session.total(), 2);
        assert_eq!(session.channel(), Some("chan"));
    }

    #[test]
    fn leaderboard_is_capped() {
        let mut c = controller();
        let mut events = Vec::new();
        let emotes: Vec<Emote> = (0..15).map(|i| emote(&format!("e{i}"))).collect();
        c.load(emotes, None, &mut events).unwrap();
        for i in 0..15 {
            let name = current_name(&c);
            let attempt = GuessAttempt::local(&format!("user{i:02}"), &name);
            assert!(c.submit(&attempt, &mut events).is_accepted());
            c.advance(&mut events);
        }
        let board = c.leaderboard(&Scope::Global, 10);
        assert_eq!(board.len(), 10);
        assert_eq!(board[0].guesser_id, "user00");
    }

    #[test]
    fn snapshot_hides_the_answer_until_locked() {
        let mut c = controller();
        let mut events = Vec::new();
        assert!(c.snapshot().session_id.is_none());

        c.load(vec![emote("Pog")], None, &mut events).unwrap();
        let open = c.snapshot().round.unwrap();
        assert!(open.revealed_name.is_none());
        assert!(!open.locked);

        c.submit_local("pog", &mut events);
        let locked = c.snapshot().round.unwrap();
        assert_eq!(locked.revealed_name.as_deref(), Some("Pog"));
        assert_eq!(locked.winner.as_deref(), Some("You"));
    }

    #[test]
    fn clearing_publishes_empty_board() {
        let mut c = controller();
        let mut events = Vec::new();
        c.load(vec![emote("Pog")], None, &mut events).unwrap();
        c.submit_local("pog", &mut events);
        events.clear();

        c.clear_leaderboard(&Scope::Global, &mut events);
        match &events[0] {
            GameEvent::LeaderboardUpdated { entries, .. } => assert!(entries.is_empty()),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
