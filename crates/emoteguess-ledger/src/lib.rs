//! Leaderboard ledger and persistence for the Emoteguess game.
//!
//! # Modules
//!
//! - [`ledger`] -- The [`Leaderboard`]: scoped, monotonic win tallies.
//! - [`store`] -- The [`KvStore`] trait with in-memory and JSON-file backends.
//! - [`credentials`] -- Optional announce-bot identity kept in the store.
//! - [`error`] -- [`StoreError`].
//!
//! # Usage
//!
//! ```
//! use emoteguess_ledger::{Leaderboard, MemoryStore};
//! use emoteguess_types::Scope;
//!
//! let mut board = Leaderboard::new(Box::new(MemoryStore::new()));
//! board.record_win("bob", &Scope::channel("forsen"));
//! let top = board.top_n(&Scope::channel("forsen"), 10);
//! assert_eq!(top.len(), 1);
//! assert_eq!(top.first().map(|e| e.wins), Some(1));
//! ```

pub mod credentials;
pub mod error;
pub mod ledger;
pub mod store;

pub use credentials::{AnnouncerCredentials, clear_announcer, load_announcer, save_announcer};
pub use error::StoreError;
pub use ledger::{DEFAULT_TOP_N, Leaderboard, rank, scope_key};
pub use store::{JsonFileStore, KvStore, MemoryStore, get_json, set_json};
