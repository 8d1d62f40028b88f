//! Optional announce-bot identity.
//!
//! When configured, winners are announced in the channel by a bot account.
//! Credentials live in the same store as the leaderboards under
//! `announcer`.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::{KvStore, get_json, set_json};

/// Storage key for the announcer credentials.
pub const ANNOUNCER_KEY: &str = "announcer";

/// Login and OAuth token of the announce-bot account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncerCredentials {
    /// Bot account login name.
    pub login: String,
    /// OAuth token, with or without the `oauth:` prefix.
    pub oauth_token: String,
}

impl AnnouncerCredentials {
    /// Build credentials, returning `None` if either part is blank.
    pub fn new(login: &str, oauth_token: &str) -> Option<Self> {
        let login = login.trim().to_lowercase();
        let token = oauth_token.trim();
        if login.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self {
            login,
            oauth_token: token.to_owned(),
        })
    }

    /// The token in the `oauth:xxxx` form the IRC `PASS` command expects.
    pub fn irc_pass(&self) -> String {
        if self.oauth_token.starts_with("oauth:") {
            self.oauth_token.clone()
        } else {
            format!("oauth:{}", self.oauth_token)
        }
    }
}

impl core::fmt::Debug for AnnouncerCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnnouncerCredentials")
            .field("login", &self.login)
            .field("oauth_token", &"<redacted>")
            .finish()
    }
}

/// Load stored credentials, if any.
///
/// # Errors
///
/// Returns [`StoreError`] if the store cannot be read.
pub fn load_announcer(store: &dyn KvStore) -> Result<Option<AnnouncerCredentials>, StoreError> {
    get_json(store, ANNOUNCER_KEY)
}

/// Persist credentials.
///
/// # Errors
///
/// Returns [`StoreError`] if the write fails.
pub fn save_announcer(
    store: &mut dyn KvStore,
    credentials: &AnnouncerCredentials,
) -> Result<(), StoreError> {
    set_json(store, ANNOUNCER_KEY, credentials)
}

/// Forget stored credentials.
///
/// # Errors
///
/// Returns [`StoreError`] if the delete fails.
pub fn clear_announcer(store: &mut dyn KvStore) -> Result<(), StoreError> {
    store.remove(ANNOUNCER_KEY)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn irc_pass_adds_prefix_once() {
        let bare = AnnouncerCredentials::new("Bot", "abc").unwrap();
        assert_eq!(bare.irc_pass(), "oauth:abc");
        assert_eq!(bare.login, "bot");
        let prefixed = AnnouncerCredentials::new("bot", "oauth:abc").unwrap();
        assert_eq!(prefixed.irc_pass(), "oauth:abc");
    }

    #[test]
    fn blank_credentials_are_rejected() {
        assert!(AnnouncerCredentials::new("", "abc").is_none());
        assert!(AnnouncerCredentials::new("bot", " ").is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let creds = AnnouncerCredentials::new("bot", "secret").unwrap();
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn save_load_clear() {
        let mut store = MemoryStore::new();
        let creds = AnnouncerCredentials::new("bot", "tok").unwrap();
        save_announcer(&mut store, &creds).unwrap();
        assert_eq!(load_announcer(&store).unwrap(), Some(creds));
        clear_announcer(&mut store).unwrap();
        assert_eq!(load_announcer(&store).unwrap(), None);
    }
}
