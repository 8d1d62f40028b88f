//! A single round and its single-winner guard.
//!
//! A round moves `Open -> Locked` exactly once. [`Round::try_lock`] is the
//! only way to get there and is the one synchronization point behind the
//! at-most-one-winner guarantee. The check and the set happen in the same
//! synchronous call with no suspension point between them, so two guesses
//! dispatched from the same event loop can never both observe `Open`.

use chrono::{DateTime, Utc};
use emoteguess_types::{Emote, RoundId};

/// The period during which one emote is the guessing target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    id: RoundId,
    emote: Emote,
    locked: bool,
    winner: Option<String>,
    started_at: DateTime<Utc>,
}

/// Lifecycle state of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// Accepting guesses.
    Open,
    /// Won or skipped; waiting to be replaced.
    Locked,
}

impl Round {
    /// Open a fresh, unlocked round for `emote`.
    pub(crate) fn open(emote: Emote) -> Self {
        Self {
            id: RoundId::new(),
            emote,
            locked: false,
            winner: None,
            started_at: Utc::now(),
        }
    }

    /// Identifier used to tag delayed work against this round.
    pub const fn id(&self) -> RoundId {
        self.id
    }

    /// The target emote.
    pub const fn emote(&self) -> &Emote {
        &self.emote
    }

    /// Whether the round already has an outcome.
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> RoundState {
        if self.locked {
            RoundState::Locked
        } else {
            RoundState::Open
        }
    }

    /// Who won, if anyone. `None` for open and skipped rounds.
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// When the round opened.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Transition `Open -> Locked`.
    ///
    /// Returns `true` if this call performed the transition, `false` (with no
    /// mutation) if the round was already locked.
    pub const fn try_lock(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    /// Record the winner of a round this caller just locked.
    pub(crate) fn set_winner(&mut self, guesser_id: &str) {
        if self.locked && self.winner.is_none() {
            self.winner = Some(guesser_id.to_owned());
        }
    }

    /// Reuse this slot for the next emote: swap the target and reset.
    pub(crate) fn reopen(&mut self, emote: Emote) {
        self.emote = emote;
        self.reset();
    }

    /// Return the round to `Open`. Only the sequencer calls this, when it
    /// opens a fresh round; never mid-round.
    pub(crate) fn reset(&mut self) {
        self.locked = false;
        self.winner = None;
        self.id = RoundId::new();
        self.started_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round() -> Round {
        Round::open(Emote {
            name: String::from("pog"),
            url: String::from("a"),
        })
    }

    #[test]
    fn first_lock_wins_rest_fail() {
        let mut r = round();
        assert_eq!(r.state(), RoundState::Open);
        assert!(r.try_lock());
        assert!(!r.try_lock());
        assert!(!r.try_lock());
        assert_eq!(r.state(), RoundState::Locked);
    }

    #[test]
    fn reset_reopens_with_new_id() {
        let mut r = round();
        let first_id = r.id();
        assert!(r.try_lock());
        r.set_winner("bob");
        r.reset();
        assert!(!r.is_locked());
        assert!(r.winner().is_none());
        assert_ne!(r.id(), first_id);
        assert!(r.try_lock());
    }

    #[test]
    fn winner_only_set_once_and_only_when_locked() {
        let mut r = round();
        r.set_winner("early");
        assert!(r.winner().is_none());
        assert!(r.try_lock());
        r.set_winner("bob");
        r.set_winner("alice");
        assert_eq!(r.winner(), Some("bob"));
    }
}
