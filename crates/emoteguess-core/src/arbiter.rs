//! Guess arbitration: decide whether an attempt wins the current round.
//!
//! Local input and chat both funnel through [`submit`]. The lock is taken
//! inside this synchronous call, so two correct attempts racing for the
//! same round yield exactly one [`Verdict::Accepted`].

use emoteguess_types::{GuessAttempt, RejectionReason};

use crate::normalize::{names_match, normalize};
use crate::round::Round;

/// Outcome of a single guess attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The attempt won the round. The caller must record the win and bump
    /// the score, in that order.
    Accepted,
    /// The attempt did not win.
    Rejected(RejectionReason),
}

impl Verdict {
    /// Whether the attempt won.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Evaluate `attempt` against `round`.
///
/// 1. No round -> `NoActiveRound`.
/// 2. Empty after normalization -> `EmptyGuess`.
/// 3. Different canonical name -> `Mismatch`.
/// 4. Correct but the lock is already held -> `AlreadyWon`.
/// 5. Otherwise the round is locked, the winner noted, and the attempt
///    accepted.
pub fn submit(attempt: &GuessAttempt, round: Option<&mut Round>) -> Verdict {
    let Some(round) = round else {
        return Verdict::Rejected(RejectionReason::NoActiveRound);
    };

    if normalize(&attempt.raw_text).is_empty() {
        return Verdict::Rejected(RejectionReason::EmptyGuess);
    }
    if !names_match(&attempt.raw_text, &round.emote().name) {
        return Verdict::Rejected(RejectionReason::Mismatch);
    }

    if !round.try_lock() {
        return Verdict::Rejected(RejectionReason::AlreadyWon);
    }
    round.set_winner(&attempt.guesser_id);
    Verdict::Accepted
}
