//! Emote ordering and round progression.
//!
//! A [`Session`] owns the shuffled emote sequence, the current position,
//! and the score. It is created by [`Session::load`] and replaced wholesale
//! whenever a new channel or manual set is loaded.
//!
//! `position` never decreases and never exceeds `sequence.len()`. Reaching
//! `sequence.len()` means the session is exhausted and no round is open.

use emoteguess_types::{Emote, Scope, SessionId};
use rand::Rng;
use tracing::debug;

use crate::error::CoreError;
use crate::round::Round;

/// Result of moving to the next emote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// A fresh round opened.
    Round(Round),
    /// The sequence ran out.
    SequenceExhausted {
        /// Rounds won during the session.
        final_score: u64,
        /// Sequence length.
        total: usize,
    },
}

/// One loaded game.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    sequence: Vec<Emote>,
    position: usize,
    score: u64,
    scope: Scope,
    channel: Option<String>,
    round: Option<Round>,
}

impl Session {
    /// Build a session from raw emotes.
    ///
    /// Items with a blank name or url are dropped. The survivors are
    /// shuffled and round 0 is opened.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyInput`] if nothing valid remains.
    pub fn load<R: Rng + ?Sized>(
        emotes: Vec<Emote>,
        scope: Scope,
        channel: Option<String>,
        rng: &mut R,
    ) -> Result<Self, CoreError> {
        let offered = emotes.len();
        let mut sequence: Vec<Emote> = emotes
            .into_iter()
            .filter_map(|e| Emote::new(&e.name, &e.url))
            .collect();
        if sequence.is_empty() {
            return Err(CoreError::EmptyInput);
        }
        debug!(
            offered,
            kept = sequence.len(),
            scope = %scope,
            "loading emote sequence"
        );

        shuffle(&mut sequence, rng);
        let round = sequence.first().cloned().map(Round::open);

        Ok(Self {
            id: SessionId::new(),
            sequence,
            position: 0,
            score: 0,
            scope,
            channel,
            round,
        })
    }

    /// Move to the next emote.
    ///
    /// Returns [`Advance::SequenceExhausted`] once the end is passed; further
    /// calls keep returning it without moving `position`.
    pub fn advance(&mut self) -> Advance {
        let total = self.sequence.len();
        self.position = self.position.saturating_add(1).min(total);

        match self.sequence.get(self.position).cloned() {
            Some(emote) => {
                let round = match self.round.take() {
                    Some(mut slot) => {
                        slot.reopen(emote);
                        slot
                    }
                    None => Round::open(emote),
                };
                self.round = Some(round.clone());
                Advance::Round(round)
            }
            None => {
                self.round = None;
                Advance::SequenceExhausted {
                    final_score: self.score,
                    total,
                }
            }
        }
    }

    /// The open or locked round, or `None` once exhausted.
    pub const fn current(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Mutable access to the current round, for the arbiter.
    pub const fn current_mut(&mut self) -> Option<&mut Round> {
        self.round.as_mut()
    }

    /// Add one to the score.
    pub(crate) const fn bump_score(&mut self) -> u64 {
        self.score = self.score.saturating_add(1);
        self.score
    }

    /// Session identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The shuffled emote order.
    pub fn sequence(&self) -> &[Emote] {
        &self.sequence
    }

    /// Zero-based index of the current emote.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of emotes in the sequence.
    pub fn total(&self) -> usize {
        self.sequence.len()
    }

    /// Rounds won so far.
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Leaderboard scope wins count toward.
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Channel the emotes came from; `None` for manual sets.
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Whether every emote has been played.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.sequence.len()
    }
}

/// Unbiased in-place shuffle (backward Fisher-Yates).
///
/// For `i` from the last index down to 1, swap element `i` with a uniformly
/// chosen element in `[0, i]`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let mut i = items.len();
    while i > 1 {
        i = i.saturating_sub(1);
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::arithmetic_side_effects
)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn emote(name: &str, url: &str) -> Emote {
        Emote {
            name: name.to_owned(),
            url: url.to_owned(),
        }
    }

    fn sorted_names(emotes: &[Emote]) -> Vec<String> {
        let mut names: Vec<String> = emotes.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn load_is_a_permutation_at_position_zero() {
        let input: Vec<Emote> = (0..20).map(|i| emote(&format!("e{i}"), "u")).collect();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let session = Session::load(input.clone(), Scope::Global, None, &mut rng).unwrap();
            assert_eq!(session.position(), 0);
            assert_eq!(session.score(), 0);
            assert_eq!(sorted_names(session.sequence()), sorted_names(&input));
            assert_eq!(
                session.current().map(|r| r.emote().clone()),
                session.sequence().first().cloned()
            );
        }
    }

    #[test]
    fn load_drops_invalid_items() {
        let mut rng = StdRng::seed_from_u64(1);
        let input = vec![emote("", "u"), emote("pog", ""), emote("kappa", "b")];
        let session = Session::load(input, Scope::Global, None, &mut rng).unwrap();
        assert_eq!(session.total(), 1);
        assert_eq!(session.sequence()[0].name, "kappa");
    }

    #[test]
    fn load_rejects_empty_after_validation() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = Session::load(vec![emote(" ", " ")], Scope::Global, None, &mut rng);
        assert!(matches!(result, Err(CoreError::EmptyInput)));
        let result = Session::load(Vec::new(), Scope::Global, None, &mut rng);
        assert!(matches!(result, Err(CoreError::EmptyInput)));
    }

    #[test]
    fn advance_walks_then_exhausts() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut session = Session::load(
            vec![emote("pog", "a"), emote("kappa", "b")],
            Scope::Global,
            None,
            &mut rng,
        )
        .unwrap();
        let second = session.sequence()[1].clone();
        let first_id = session.current().unwrap().id();

        match session.advance() {
            Advance::Round(round) => {
                assert_eq!(round.emote(), &second);
                assert!(!round.is_locked());
                assert_ne!(round.id(), first_id);
            }
            Advance::SequenceExhausted { .. } => panic!("expected a round"),
        }
        assert_eq!(session.position(), 1);

        assert_eq!(
            session.advance(),
            Advance::SequenceExhausted {
                final_score: 0,
                total: 2
            }
        );
        assert!(session.current().is_none());
        assert!(session.is_exhausted());

        // Further advances stay exhausted and do not move past the end.
        assert!(matches!(session.advance(), Advance::SequenceExhausted { .. }));
        assert_eq!(session.position(), 2);
    }

    #[test]
    fn shuffle_hits_every_permutation_of_three() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::BTreeMap::new();
        for _ in 0..6000 {
            let mut items = [1, 2, 3];
            shuffle(&mut items, &mut rng);
            *seen.entry(items).or_insert(0_u32) += 1;
        }
        assert_eq!(seen.len(), 6);
        // Each permutation should land near 1000; allow generous slack.
        assert!(seen.values().all(|&count| (800..1200).contains(&count)));
    }

    #[test]
    fn shuffle_handles_tiny_inputs() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut empty: [u8; 0] = [];
        shuffle(&mut empty, &mut rng);
        let mut one = [9];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, [9]);
    }
}
