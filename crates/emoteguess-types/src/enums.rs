//! Enumeration types for the Emoteguess game.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Where a guess came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GuessSource {
    /// Typed into the game page by the local player.
    Local,
    /// Sent as a message in the live channel chat.
    Chat,
}

/// Why a guess attempt was not accepted.
///
/// These are expected outcomes of normal play, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// No session is loaded, or the sequence is exhausted.
    NoActiveRound,
    /// The guess was empty after normalization.
    EmptyGuess,
    /// The guess does not name the current emote.
    Mismatch,
    /// The guess was correct but another attempt already won the round.
    AlreadyWon,
}

impl core::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::NoActiveRound => "no active round",
            Self::EmptyGuess => "empty guess",
            Self::Mismatch => "wrong name",
            Self::AlreadyWon => "round already won",
        };
        f.write_str(text)
    }
}

/// Leaderboard partition key.
///
/// A guesser's wins in one scope never affect another scope's ranking.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", content = "channel", rename_all = "snake_case")]
pub enum Scope {
    /// The shared, channel-independent board.
    Global,
    /// A board for one channel (lower-cased login name).
    Channel(String),
}

impl Scope {
    /// Build a channel scope, normalizing the channel name.
    pub fn channel(name: &str) -> Self {
        Self::Channel(name.trim().trim_start_matches('#').to_lowercase())
    }

    /// Stable string form used as a storage key suffix.
    pub fn key(&self) -> String {
        match self {
            Self::Global => String::from("global"),
            Self::Channel(name) => format!("channel:{name}"),
        }
    }

    /// Parse the string form produced by [`Scope::key`].
    ///
    /// Bare names are treated as channel names so that query strings like
    /// `?scope=forsen` work.
    pub fn from_key(key: &str) -> Self {
        let key = key.trim();
        if key.is_empty() || key.eq_ignore_ascii_case("global") {
            return Self::Global;
        }
        Self::channel(key.strip_prefix("channel:").unwrap_or(key))
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_key_roundtrip() {
        assert_eq!(Scope::from_key(&Scope::Global.key()), Scope::Global);
        let chan = Scope::channel("#Forsen ");
        assert_eq!(chan, Scope::Channel(String::from("forsen")));
        assert_eq!(Scope::from_key(&chan.key()), chan);
    }

    #[test]
    fn bare_scope_key_is_a_channel() {
        assert_eq!(Scope::from_key("xQc"), Scope::Channel(String::from("xqc")));
        assert_eq!(Scope::from_key(""), Scope::Global);
    }

    #[test]
    fn scope_serializes_tagged() {
        let json = serde_json::to_value(Scope::channel("pokimane")).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({"kind": "channel", "channel": "pokimane"}))
        );
    }
}
