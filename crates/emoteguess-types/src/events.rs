//! Discrete status events emitted by the game core.
//!
//! The rendering layer subscribes to these; the core never manipulates
//! presentation state directly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{GuessSource, Scope};
use crate::ids::{RoundId, SessionId};
use crate::structs::{Emote, LeaderboardEntry};

/// An event published by the game controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", content = "data")]
pub enum GameEvent {
    /// A new emote set replaced the previous session.
    SessionLoaded {
        /// The new session.
        session_id: SessionId,
        /// Leaderboard scope wins in this session count toward.
        scope: Scope,
        /// Number of emotes in the sequence.
        total: usize,
    },
    /// A fresh round opened.
    RoundStarted {
        /// The round that opened.
        round_id: RoundId,
        /// Zero-based position in the sequence.
        position: usize,
        /// Sequence length.
        total: usize,
        /// The emote to guess.
        emote: Emote,
    },
    /// The first correct guess locked the round.
    RoundWon {
        /// The round that was won.
        round_id: RoundId,
        /// Winner.
        guesser_id: String,
        /// The answer.
        emote_name: String,
        /// Where the winning guess came from.
        source: GuessSource,
        /// Session score after the win.
        score: u64,
    },
    /// The round was skipped without a winner.
    RoundSkipped {
        /// The round that was skipped.
        round_id: RoundId,
        /// The answer.
        emote_name: String,
    },
    /// The sequence ran out.
    SequenceExhausted {
        /// Rounds won during the session.
        final_score: u64,
        /// Sequence length.
        total: usize,
    },
    /// The ranking for a scope changed.
    LeaderboardUpdated {
        /// The scope that changed.
        scope: Scope,
        /// Top entries, best first.
        entries: Vec<LeaderboardEntry>,
    },
    /// A line arrived from the chat feed.
    ChatLine {
        /// Display name of the sender.
        sender: String,
        /// Message body.
        text: String,
    },
    /// Free-form status line.
    Status {
        /// Human-readable text.
        message: String,
        /// Whether the status reports a failure.
        is_error: bool,
    },
}

impl GameEvent {
    /// Informational status line.
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
            is_error: false,
        }
    }

    /// Failure status line.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(GameEvent::status("loading")).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({
                "type": "Status",
                "data": {"message": "loading", "is_error": false}
            }))
        );
    }

    #[test]
    fn exhausted_roundtrips() {
        let event = GameEvent::SequenceExhausted {
            final_score: 3,
            total: 5,
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        let back: Result<GameEvent, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(event));
    }
}
