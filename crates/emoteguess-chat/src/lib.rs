//! Twitch chat for the Emoteguess game.
//!
//! Reads a channel's chat anonymously and turns lines into
//! [`GuessAttempt`](emoteguess_types::GuessAttempt)s, and optionally posts
//! winners back under a bot identity.
//!
//! # Modules
//!
//! - [`adapter`] -- The [`ChatAdapter`] feed task and [`ChatHandler`] hook.
//! - [`guess`] -- Command-prefix extraction.
//! - [`irc`] -- IRC line parsing and formatting.
//! - [`announcer`] -- The optional announce-bot.
//! - [`error`] -- [`ChatError`].

pub mod adapter;
pub mod announcer;
pub mod error;
pub mod guess;
pub mod irc;

pub use adapter::{ChatAdapter, ChatEvent, ChatHandler};
pub use announcer::Announcer;
pub use error::ChatError;
pub use guess::{attempt_from_message, extract_guess};
pub use irc::IrcMessage;
