//! Error types for the game core.
//!
//! Only input problems are errors here. Rejected guesses are ordinary
//! outcomes and live in [`crate::arbiter::Verdict`].

/// Errors raised while building a session from user or provider input.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No usable emotes remained after validation.
    #[error("no valid emotes found")]
    EmptyInput,

    /// The operation needs a loaded session and there is none.
    #[error("no session loaded")]
    NoSession,

    /// A manually pasted payload could not be interpreted.
    #[error("invalid emote payload: {0}")]
    InvalidPayload(String),
}
