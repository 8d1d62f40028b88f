//! Shared type definitions for the Emoteguess game.
//!
//! Every crate in the workspace speaks these types. Types flow downstream to
//! `TypeScript` via `ts-rs` for the game page.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for sessions and rounds
//! - [`enums`] -- Guess sources, rejection reasons, leaderboard scopes
//! - [`structs`] -- Emotes, guess attempts, chat messages, leaderboard entries
//! - [`events`] -- Status events published to the presentation layer

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

pub use enums::{GuessSource, RejectionReason, Scope};
pub use events::GameEvent;
pub use ids::{RoundId, SessionId};
pub use structs::{ChatMessage, Emote, GuessAttempt, LeaderboardEntry};

#[cfg(test)]
mod tests {
    //! Binding generation for the game page.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::SessionId::export_all();
        let _ = crate::ids::RoundId::export_all();
        let _ = crate::enums::GuessSource::export_all();
        let _ = crate::enums::RejectionReason::export_all();
        let _ = crate::enums::Scope::export_all();
        let _ = crate::structs::Emote::export_all();
        let _ = crate::structs::GuessAttempt::export_all();
        let _ = crate::structs::ChatMessage::export_all();
        let _ = crate::structs::LeaderboardEntry::export_all();
        let _ = crate::events::GameEvent::export_all();
    }
}
