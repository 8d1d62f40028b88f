//! Error types for channel resolution and emote fetching.

/// Errors raised while turning a channel name into a playable emote set.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The channel input was empty or not a valid login.
    #[error("invalid channel name: {0:?}")]
    InvalidChannel(String),

    /// Every identity provider failed for this login.
    #[error("could not resolve Twitch id for {0}")]
    Resolution(String),

    /// A single HTTP call failed or returned an unusable body.
    #[error("network error: {0}")]
    Network(String),

    /// Every emote provider came back empty for this Twitch id.
    #[error("no 7TV emotes found for Twitch id {0}")]
    NotFound(String),

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(String),
}
