//! Round lifecycle and guess arbitration for the Emoteguess game.
//!
//! Everything here is synchronous and free of I/O. The server owns a single
//! [`GameController`] and feeds it local and chat guesses one at a time.
//!
//! # Modules
//!
//! - [`normalize`] -- Canonical comparison form of emote names and guesses.
//! - [`round`] -- A single [`Round`] and its one-way lock.
//! - [`sequencer`] -- Shuffled [`Session`] and round progression.
//! - [`arbiter`] -- First-correct-wins [`Verdict`]s.
//! - [`manual`] -- Parsing of pasted emote JSON.
//! - [`controller`] -- The [`GameController`] tying it all together.
//! - [`config`] -- YAML configuration with env overrides.
//! - [`error`] -- [`CoreError`].

pub mod arbiter;
pub mod config;
pub mod controller;
pub mod error;
pub mod manual;
pub mod normalize;
pub mod round;
pub mod sequencer;

pub use arbiter::Verdict;
pub use config::{ConfigError, GameConfig, ScopeMode};
pub use controller::{ControllerSettings, EventSink, GameController, GameSnapshot, RoundView};
pub use error::CoreError;
pub use manual::{emotes_from_value, parse_manual_payload};
pub use normalize::{names_match, normalize};
pub use round::{Round, RoundState};
pub use sequencer::{Advance, Session, shuffle};
