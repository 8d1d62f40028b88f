//! Core data structs: emotes, guess attempts, chat messages, and
//! leaderboard entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::GuessSource;

/// A single guessable emote.
///
/// Both fields are non-empty once constructed through [`Emote::new`].
/// Emotes are immutable after they are loaded into a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Emote {
    /// The emote code viewers type in chat.
    pub name: String,
    /// Resolvable image reference.
    pub url: String,
}

impl Emote {
    /// Build an emote, trimming both fields.
    ///
    /// Returns `None` when either field is blank.
    pub fn new(name: &str, url: &str) -> Option<Self> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_owned(),
            url: url.to_owned(),
        })
    }
}

/// One candidate answer from any input source.
///
/// Produced per incoming guess and consumed immediately by the arbiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GuessAttempt {
    /// Who is guessing (chat display name, or the local player label).
    pub guesser_id: String,
    /// The guess exactly as typed.
    pub raw_text: String,
    /// Local input or live chat.
    pub source: GuessSource,
}

impl GuessAttempt {
    /// A guess typed on the game page.
    pub fn local(guesser_id: &str, raw_text: &str) -> Self {
        Self {
            guesser_id: guesser_id.to_owned(),
            raw_text: raw_text.to_owned(),
            source: GuessSource::Local,
        }
    }

    /// A guess extracted from a chat message.
    pub fn chat(guesser_id: &str, raw_text: &str) -> Self {
        Self {
            guesser_id: guesser_id.to_owned(),
            raw_text: raw_text.to_owned(),
            source: GuessSource::Chat,
        }
    }
}

/// A chat line delivered by the ingestion adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// Channel the message was posted in (lower-case, no `#`).
    pub channel: String,
    /// Stable sender identifier (Twitch user id, or login when absent).
    pub sender_id: String,
    /// Name shown in chat.
    pub sender_display_name: String,
    /// Message body.
    pub text: String,
}

/// Durable tally of wins for one guesser within one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardEntry {
    /// The guesser this entry belongs to.
    pub guesser_id: String,
    /// Number of rounds this guesser won first. Only ever increases.
    pub wins: u64,
    /// When the most recent win was recorded.
    pub last_win_at: Option<DateTime<Utc>>,
}

impl LeaderboardEntry {
    /// A fresh entry with no wins.
    pub fn new(guesser_id: &str) -> Self {
        Self {
            guesser_id: guesser_id.to_owned(),
            wins: 0,
            last_win_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emote_rejects_blank_fields() {
        assert!(Emote::new("", "https://cdn/x").is_none());
        assert!(Emote::new("pog", "   ").is_none());
        let emote = Emote::new(" pog ", " a ");
        assert_eq!(
            emote,
            Some(Emote {
                name: String::from("pog"),
                url: String::from("a"),
            })
        );
    }

    #[test]
    fn attempt_constructors_set_source() {
        assert_eq!(GuessAttempt::local("You", "x").source, GuessSource::Local);
        assert_eq!(GuessAttempt::chat("bob", "x").source, GuessSource::Chat);
    }
}
