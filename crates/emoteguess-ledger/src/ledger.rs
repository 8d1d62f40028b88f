//! The leaderboard ledger: a durable tally of first-correct guesses.
//!
//! Entries are partitioned by [`Scope`]. Each scope is persisted as one
//! JSON blob under `leaderboard:{scope}` and loaded lazily the first time
//! that scope is touched.
//!
//! # Design
//!
//! - **Monotonic**: `wins` only ever increases; entries are removed only by
//!   an explicit [`Leaderboard::clear`].
//! - **Non-blocking persistence**: a failed write is logged and swallowed.
//!   The in-memory tally stays authoritative so the active round is never
//!   interrupted by a storage problem.
//! - **No blind overwrites**: a scope whose blob could not be read keeps its
//!   new wins in memory and is never written back. The next access retries
//!   the read and merges the pending wins into what was stored.
//! - **Ranking**: wins descending, ties broken by `guesser_id` ascending.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use emoteguess_types::{LeaderboardEntry, Scope};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::store::{KvStore, get_json, set_json};

/// Default number of entries shown on a leaderboard.
pub const DEFAULT_TOP_N: usize = 10;

/// Storage key for a scope's blob.
pub fn scope_key(scope: &Scope) -> String {
    format!("leaderboard:{}", scope.key())
}

/// Scoped leaderboard backed by a [`KvStore`].
pub struct Leaderboard {
    store: Box<dyn KvStore>,
    boards: BTreeMap<Scope, BTreeMap<String, LeaderboardEntry>>,
    /// Scopes whose stored blob has not been read successfully yet.
    unsynced: BTreeSet<Scope>,
}

impl Leaderboard {
    /// Create a ledger over the given store.
    pub fn new(store: Box<dyn KvStore>) -> Self {
        Self {
            store,
            boards: BTreeMap::new(),
            unsynced: BTreeSet::new(),
        }
    }

    /// Record a first-correct guess for `guesser_id` in `scope`.
    ///
    /// Creates the entry if absent. Returns the updated entry.
    pub fn record_win(&mut self, guesser_id: &str, scope: &Scope) -> LeaderboardEntry {
        self.record_win_at(guesser_id, scope, Utc::now())
    }

    /// Like [`Leaderboard::record_win`] with an explicit timestamp.
    pub fn record_win_at(
        &mut self,
        guesser_id: &str,
        scope: &Scope,
        at: DateTime<Utc>,
    ) -> LeaderboardEntry {
        let board = self.board_mut(scope);
        let entry = board
            .entry(guesser_id.to_owned())
            .or_insert_with(|| LeaderboardEntry::new(guesser_id));
        entry.wins = entry.wins.saturating_add(1);
        entry.last_win_at = Some(at);
        let updated = entry.clone();

        debug!(
            scope = %scope,
            guesser_id = guesser_id,
            wins = updated.wins,
            "win recorded"
        );
        self.persist(scope);
        updated
    }

    /// The best `n` entries for `scope`, ranked.
    pub fn top_n(&mut self, scope: &Scope, n: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self.board_mut(scope).values().cloned().collect();
        rank(&mut entries);
        entries.truncate(n);
        entries
    }

    /// Wins for one guesser in one scope (0 when absent).
    pub fn wins(&mut self, guesser_id: &str, scope: &Scope) -> u64 {
        self.board_mut(scope)
            .get(guesser_id)
            .map_or(0, |entry| entry.wins)
    }

    /// Remove every entry for `scope`. Other scopes are untouched.
    pub fn clear(&mut self, scope: &Scope) {
        self.boards.insert(scope.clone(), BTreeMap::new());
        self.unsynced.remove(scope);
        if let Err(e) = self.store.remove(&scope_key(scope)) {
            warn!(scope = %scope, error = %e, "failed to clear persisted leaderboard");
        }
    }

    /// Borrow the underlying store (announcer credentials share it).
    pub fn store_mut(&mut self) -> &mut dyn KvStore {
        self.store.as_mut()
    }

    /// Read-only access to the underlying store.
    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    fn board_mut(&mut self, scope: &Scope) -> &mut BTreeMap<String, LeaderboardEntry> {
        if !self.boards.contains_key(scope) || self.unsynced.contains(scope) {
            self.sync(scope);
        }
        self.boards.entry(scope.clone()).or_default()
    }

    /// Read `scope` from the store, folding in wins recorded while it was
    /// unreadable. On failure the in-memory board is kept and marked unsynced.
    fn sync(&mut self, scope: &Scope) {
        match self.load(scope) {
            Ok(mut loaded) => {
                if let Some(pending) = self.boards.remove(scope) {
                    if !pending.is_empty() {
                        info!(
                            scope = %scope,
                            pending = pending.len(),
                            "merging wins held during a failed read"
                        );
                    }
                    merge_into(&mut loaded, pending);
                }
                self.unsynced.remove(scope);
                self.boards.insert(scope.clone(), loaded);
            }
            Err(e) => {
                warn!(
                    scope = %scope,
                    error = %e,
                    "failed to load leaderboard, holding wins in memory"
                );
                self.unsynced.insert(scope.clone());
                self.boards.entry(scope.clone()).or_default();
            }
        }
    }

    fn load(&self, scope: &Scope) -> Result<BTreeMap<String, LeaderboardEntry>, StoreError> {
        let entries: Vec<LeaderboardEntry> =
            get_json(self.store.as_ref(), &scope_key(scope))?.unwrap_or_default();
        Ok(entries
            .into_iter()
            .map(|entry| (entry.guesser_id.clone(), entry))
            .collect())
    }

    fn persist(&mut self, scope: &Scope) {
        if self.unsynced.contains(scope) {
            debug!(scope = %scope, "stored board unread, not overwriting it");
            return;
        }
        let entries: Vec<LeaderboardEntry> = self
            .boards
            .get(scope)
            .map(|board| board.values().cloned().collect())
            .unwrap_or_default();
        if let Err(e) = set_json(self.store.as_mut(), &scope_key(scope), &entries) {
            warn!(scope = %scope, error = %e, "failed to persist leaderboard");
        }
    }
}

impl core::fmt::Debug for Leaderboard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Leaderboard")
            .field("loaded_scopes", &self.boards.len())
            .field("unsynced_scopes", &self.unsynced.len())
            .finish_non_exhaustive()
    }
}

fn merge_into(
    board: &mut BTreeMap<String, LeaderboardEntry>,
    pending: BTreeMap<String, LeaderboardEntry>,
) {
    for (guesser_id, entry) in pending {
        match board.entry(guesser_id) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(mut slot) => {
                let stored = slot.get_mut();
                stored.wins = stored.wins.saturating_add(entry.wins);
                stored.last_win_at = stored.last_win_at.max(entry.last_win_at);
            }
        }
    }
}

/// Sort entries best first: wins descending, then `guesser_id` ascending.
pub fn rank(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| a.guesser_id.cmp(&b.guesser_id))
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::store::{JsonFileStore, MemoryStore};

    /// A store whose writes always fail.
    struct BrokenStore;

    impl KvStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<serde_json::Value>, StoreError> {
            Err(StoreError::Unavailable(String::from("disk on fire")))
        }

        fn set(&mut self, _key: &str, _value: serde_json::Value) -> Result<(), StoreError> {
            Err(StoreError::Unavailable(String::from("disk on fire")))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable(String::from("disk on fire")))
        }
    }

    /// A memory store whose first read fails.
    struct FirstReadFails {
        inner: MemoryStore,
        failed: AtomicBool,
    }

    impl KvStore for FirstReadFails {
        fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
            if self.failed.swap(true, Ordering::SeqCst) {
                self.inner.get(key)
            } else {
                Err(StoreError::Unavailable(String::from("transient")))
            }
        }

        fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn ledger() -> Leaderboard {
        Leaderboard::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn first_win_creates_entry() {
        let mut lb = ledger();
        let entry = lb.record_win("bob", &Scope::Global);
        assert_eq!(entry.wins, 1);
        assert!(entry.last_win_at.is_some());
    }

    #[test]
    fn wins_accumulate() {
        let mut lb = ledger();
        lb.record_win("bob", &Scope::Global);
        let entry = lb.record_win("bob", &Scope::Global);
        assert_eq!(entry.wins, 2);
        assert_eq!(lb.wins("bob", &Scope::Global), 2);
    }

    #[test]
    fn scopes_are_isolated() {
        let mut lb = ledger();
        let forsen = Scope::channel("forsen");
        lb.record_win("bob", &forsen);
        lb.record_win("bob", &forsen);
        lb.record_win("alice", &Scope::Global);

        assert_eq!(lb.wins("bob", &Scope::Global), 0);
        let global = lb.top_n(&Scope::Global, 10);
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].guesser_id, "alice");
    }

    #[test]
    fn ranking_breaks_ties_by_name_ascending() {
        let mut lb = ledger();
        let scope = Scope::Global;
        lb.record_win("zed", &scope);
        lb.record_win("amy", &scope);
        lb.record_win("mia", &scope);
        lb.record_win("mia", &scope);

        let top = lb.top_n(&scope, 10);
        let names: Vec<&str> = top.iter().map(|e| e.guesser_id.as_str()).collect();
        assert_eq!(names, vec!["mia", "amy", "zed"]);
    }

    #[test]
    fn top_n_truncates() {
        let mut lb = ledger();
        for i in 0..15 {
            lb.record_win(&format!("user{i:02}"), &Scope::Global);
        }
        let top = lb.top_n(&Scope::Global, DEFAULT_TOP_N);
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].wins >= w[1].wins));
    }

    #[test]
    fn clear_only_touches_one_scope() {
        let mut lb = ledger();
        let chan = Scope::channel("xqc");
        lb.record_win("bob", &chan);
        lb.record_win("bob", &Scope::Global);
        lb.clear(&chan);
        assert!(lb.top_n(&chan, 10).is_empty());
        assert_eq!(lb.wins("bob", &Scope::Global), 1);
    }

    #[test]
    fn entries_survive_a_new_ledger_over_the_same_directory() {
        let dir = std::env::temp_dir().join(format!("emoteguess-ledger-{}", uuid::Uuid::now_v7()));
        {
            let store = JsonFileStore::open(&dir).unwrap();
            let mut lb = Leaderboard::new(Box::new(store));
            lb.record_win("bob", &Scope::channel("forsen"));
        }
        let store = JsonFileStore::open(&dir).unwrap();
        let mut lb = Leaderboard::new(Box::new(store));
        assert_eq!(lb.wins("bob", &Scope::channel("forsen")), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn broken_store_does_not_lose_in_memory_wins() {
        let mut lb = Leaderboard::new(Box::new(BrokenStore));
        lb.record_win("bob", &Scope::Global);
        let entry = lb.record_win("bob", &Scope::Global);
        assert_eq!(entry.wins, 2);
        lb.clear(&Scope::Global);
        assert!(lb.top_n(&Scope::Global, 10).is_empty());
    }

    #[test]
    fn failed_read_never_overwrites_stored_wins() {
        let mut inner = MemoryStore::new();
        let stored = vec![
            LeaderboardEntry {
                wins: 50,
                ..LeaderboardEntry::new("alice")
            },
            LeaderboardEntry {
                wins: 30,
                ..LeaderboardEntry::new("bob")
            },
        ];
        set_json(&mut inner, &scope_key(&Scope::Global), &stored).unwrap();
        let mut lb = Leaderboard::new(Box::new(FirstReadFails {
            inner,
            failed: AtomicBool::new(false),
        }));

        let carol = lb.record_win("carol", &Scope::Global);
        assert_eq!(carol.wins, 1);
        let on_disk: Vec<LeaderboardEntry> =
            get_json(lb.store(), &scope_key(&Scope::Global)).unwrap().unwrap();
        let names: Vec<(&str, u64)> = on_disk
            .iter()
            .map(|e| (e.guesser_id.as_str(), e.wins))
            .collect();
        assert_eq!(names, vec![("alice", 50), ("bob", 30)]);

        lb.record_win("carol", &Scope::Global);
        lb.record_win("bob", &Scope::Global);
        let top = lb.top_n(&Scope::Global, 10);
        let ranked: Vec<(&str, u64)> = top
            .iter()
            .map(|e| (e.guesser_id.as_str(), e.wins))
            .collect();
        assert_eq!(ranked, vec![("alice", 50), ("bob", 31), ("carol", 2)]);

        let on_disk: Vec<LeaderboardEntry> =
            get_json(lb.store(), &scope_key(&Scope::Global)).unwrap().unwrap();
        assert_eq!(on_disk.len(), 3);
    }
}
