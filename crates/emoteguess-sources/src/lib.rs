//! Channel emote sources for the Emoteguess game.
//!
//! Turning a typed channel name into a playable emote set takes two network
//! hops: resolve the login to a numeric Twitch id ([`IdentityResolver`]),
//! then fetch that id's 7TV emotes ([`EmoteSource`]). Each hop walks an
//! ordered provider chain and stops at the first usable answer.
//!
//! # Modules
//!
//! - [`channel`] -- Input sanitising.
//! - [`resolver`] -- Login to Twitch id.
//! - [`emotes`] -- Twitch id to emote list.
//! - [`http`] -- Shared client construction.
//! - [`error`] -- [`SourceError`].

pub mod channel;
pub mod emotes;
pub mod error;
pub mod http;
pub mod resolver;

use std::time::Duration;

use emoteguess_types::Emote;

pub use channel::sanitize_channel;
pub use emotes::{EmoteProvider, EmoteSource};
pub use error::SourceError;
pub use http::build_client;
pub use resolver::{IdentityProvider, IdentityResolver};

/// A resolved channel and its emotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEmotes {
    /// Sanitised login.
    pub login: String,
    /// Numeric Twitch id.
    pub twitch_id: String,
    /// Fetched emotes, unshuffled.
    pub emotes: Vec<Emote>,
}

/// Resolver and emote source sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct ChannelSources {
    resolver: IdentityResolver,
    emotes: EmoteSource,
}

impl ChannelSources {
    /// Build the default provider chains over a client with `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Client`] if the client cannot be built.
    pub fn new(timeout: Duration, helix_client_id: Option<String>) -> Result<Self, SourceError> {
        let client = build_client(timeout)?;
        Ok(Self::from_parts(
            IdentityResolver::new(client.clone(), helix_client_id),
            EmoteSource::new(client),
        ))
    }

    /// Assemble from explicit chains.
    pub const fn from_parts(resolver: IdentityResolver, emotes: EmoteSource) -> Self {
        Self { resolver, emotes }
    }

    /// Sanitise, resolve, and fetch in one go.
    ///
    /// `on_resolved` is called with the Twitch id between the two hops.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidChannel`] for unusable input, otherwise
    /// whatever the resolver or emote chain fails with.
    pub async fn load(
        &self,
        raw_channel: &str,
        on_resolved: impl FnOnce(&str) + Send,
    ) -> Result<ChannelEmotes, SourceError> {
        let login = sanitize_channel(raw_channel)
            .ok_or_else(|| SourceError::InvalidChannel(raw_channel.to_owned()))?;
        let twitch_id = self.resolver.resolve(&login).await?;
        on_resolved(&twitch_id);
        let emotes = self.emotes.fetch(&twitch_id).await?;
        Ok(ChannelEmotes {
            login,
            twitch_id,
            emotes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_rejects_blank_channel_before_any_request() {
        let client = reqwest::Client::new();
        let sources = ChannelSources::from_parts(
            IdentityResolver::with_providers(client.clone(), Vec::new()),
            EmoteSource::with_providers(client, Vec::new()),
        );
        let mut resolved = false;
        assert!(matches!(
            sources.load("  #  ", |_| resolved = true).await,
            Err(SourceError::InvalidChannel(_))
        ));
        assert!(matches!(
            sources.load("forsen", |_| resolved = true).await,
            Err(SourceError::Resolution(login)) if login == "forsen"
        ));
        assert!(!resolved);
    }
}
