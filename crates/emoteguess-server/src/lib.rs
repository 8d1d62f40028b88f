//! Game server for Emoteguess.
//!
//! Serves the game page, a REST API for player actions, and a `WebSocket`
//! stream of [`GameEvent`]s. A single actor task owns the game; handlers,
//! the chat feed, loader tasks, and reveal timers all reach it through one
//! command queue.
//!
//! # Modules
//!
//! - [`actor`] -- The game actor and its [`Command`]s.
//! - [`loader`] -- Background channel loads.
//! - [`state`] -- [`AppState`] shared with handlers.
//! - [`handlers`] / [`ws`] / [`router`] -- HTTP surface.
//! - [`server`] -- Listener lifecycle.
//! - [`startup`] -- Config, store, and wiring for the binary.
//!
//! [`GameEvent`]: emoteguess_types::GameEvent

pub mod actor;
pub mod error;
pub mod handlers;
pub mod loader;
mod page;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use actor::{Command, LeaderboardView, spawn_game};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use startup::{AppError, run};
pub use state::AppState;
