//! 7TV emote set fetching.
//!
//! Three providers are tried in order for a Twitch id; the first non-empty
//! set wins. Provider payloads vary a lot between API generations, so the
//! per-item extraction is lenient: every item that yields a name and an
//! image URL becomes an [`Emote`], the rest are dropped.

use emoteguess_types::Emote;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::SourceError;
use crate::http::fetch_json;

const SEVENTV_V3_URL: &str = "https://7tv.io/v3";
const SEVENTV_V2_URL: &str = "https://api.7tv.app/v2";
const ADAMCY_URL: &str = "https://emotes.adamcy.pl/7tv/channel";
const SEVENTV_CDN_URL: &str = "https://cdn.7tv.app/emote";

/// One source of a channel's 7TV emotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmoteProvider {
    /// `7tv.io/v3`: user record, then its emote set if not inlined.
    SevenTvV3,
    /// Legacy `api.7tv.app/v2` user emotes.
    SevenTvV2,
    /// Community proxy at `emotes.adamcy.pl`.
    AdamcyProxy,
}

impl EmoteProvider {
    /// Human-readable name for logging.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SevenTvV3 => "7tv-v3",
            Self::SevenTvV2 => "7tv-v2",
            Self::AdamcyProxy => "adamcy-proxy",
        }
    }

    async fn fetch(
        self,
        client: &reqwest::Client,
        twitch_id: &str,
    ) -> Result<Vec<Emote>, SourceError> {
        match self {
            Self::SevenTvV3 => {
                let url = format!("{SEVENTV_V3_URL}/users/twitch/{twitch_id}");
                let user = fetch_json(client.get(url)).await?;
                match extract_v3_user(&user) {
                    V3User::Inline(emotes) => Ok(emotes),
                    V3User::SetId(set_id) => {
                        debug!(twitch_id, set_id, "following 7tv emote set");
                        let url = format!("{SEVENTV_V3_URL}/emote-sets/{set_id}");
                        let set = fetch_json(client.get(url)).await?;
                        Ok(extract_emote_set(&set))
                    }
                    V3User::Empty => Ok(Vec::new()),
                }
            }
            Self::SevenTvV2 => {
                let url = format!("{SEVENTV_V2_URL}/users/{twitch_id}/emotes");
                let body = fetch_json(client.get(url)).await?;
                Ok(extract_emote_array(&body))
            }
            Self::AdamcyProxy => {
                let body = fetch_json(client.get(format!("{ADAMCY_URL}/{twitch_id}"))).await?;
                Ok(extract_emote_array(&body))
            }
        }
    }
}

/// Ordered chain of [`EmoteProvider`]s.
#[derive(Debug, Clone)]
pub struct EmoteSource {
    client: reqwest::Client,
    providers: Vec<EmoteProvider>,
}

impl EmoteSource {
    /// The default chain: 7TV v3, 7TV v2, then the proxy.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_providers(
            client,
            vec![
                EmoteProvider::SevenTvV3,
                EmoteProvider::SevenTvV2,
                EmoteProvider::AdamcyProxy,
            ],
        )
    }

    /// A custom chain.
    pub const fn with_providers(client: reqwest::Client, providers: Vec<EmoteProvider>) -> Self {
        Self { client, providers }
    }

    /// Providers in the order they are tried.
    pub fn providers(&self) -> &[EmoteProvider] {
        &self.providers
    }

    /// Fetch the emote set for `twitch_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NotFound`] when no provider produced a
    /// non-empty set.
    pub async fn fetch(&self, twitch_id: &str) -> Result<Vec<Emote>, SourceError> {
        for &provider in &self.providers {
            match provider.fetch(&self.client, twitch_id).await {
                Ok(emotes) if !emotes.is_empty() => {
                    info!(
                        twitch_id,
                        provider = provider.name(),
                        count = emotes.len(),
                        "fetched emotes"
                    );
                    return Ok(emotes);
                }
                Ok(_) => debug!(twitch_id, provider = provider.name(), "provider was empty"),
                Err(e) => {
                    debug!(twitch_id, provider = provider.name(), error = %e, "provider failed");
                }
            }
        }
        Err(SourceError::NotFound(twitch_id.to_owned()))
    }
}

/// What a 7TV v3 user record tells us about its emotes.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum V3User {
    /// The active set was embedded in the record.
    Inline(Vec<Emote>),
    /// Only the set id is known; fetch it separately.
    SetId(String),
    /// No set at all.
    Empty,
}

pub(crate) fn extract_v3_user(user: &Value) -> V3User {
    let set = user.get("emote_set");
    let inline = set
        .and_then(|s| s.get("emotes"))
        .or_else(|| user.get("emotes"))
        .map(extract_emote_array)
        .unwrap_or_default();
    if !inline.is_empty() {
        return V3User::Inline(inline);
    }

    let set_id = set
        .and_then(|s| s.get("id"))
        .or_else(|| user.get("emote_set_id"))
        .or(set)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty());
    set_id.map_or(V3User::Empty, |id| V3User::SetId(id.to_owned()))
}

/// Emotes from an emote-set body: its `emotes` field, or the body itself.
pub(crate) fn extract_emote_set(set: &Value) -> Vec<Emote> {
    extract_emote_array(set.get("emotes").unwrap_or(set))
}

/// Emotes from a JSON array of provider items.
pub(crate) fn extract_emote_array(items: &Value) -> Vec<Emote> {
    items
        .as_array()
        .map(|items| items.iter().filter_map(extract_emote).collect())
        .unwrap_or_default()
}

/// One provider item to an [`Emote`], or `None` if it has no usable image.
pub(crate) fn extract_emote(item: &Value) -> Option<Emote> {
    let url = emote_url(item)?;
    Emote::new(&emote_name(item), &url)
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn emote_name(item: &Value) -> String {
    ["name", "code", "alias"]
        .iter()
        .find_map(|key| non_empty_str(item, key))
        .unwrap_or("emote")
        .to_owned()
}

/// Image URL in order of preference: the largest `urls` entry, a plain
/// `url`, a CDN `host.url` (top level or under `data`), then the id.
fn emote_url(item: &Value) -> Option<String> {
    if let Some(url) = item
        .get("urls")
        .and_then(Value::as_array)
        .and_then(|urls| urls.last())
        .and_then(|entry| entry.get(1).or(Some(entry)))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
    {
        return Some(url.trim().to_owned());
    }

    if let Some(url) = non_empty_str(item, "url") {
        return Some(url.to_owned());
    }

    let host = item
        .get("host")
        .or_else(|| item.get("data").and_then(|d| d.get("host")));
    if let Some(base) = host.and_then(|h| non_empty_str(h, "url")) {
        let base = base.trim_end_matches('/');
        let base = if base.starts_with("//") {
            format!("https:{base}")
        } else {
            base.to_owned()
        };
        return Some(format!("{base}/3x.webp"));
    }

    non_empty_str(item, "id").map(|id| format!("{SEVENTV_CDN_URL}/{id}/4x"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn v3_inline_set_with_host_url() {
        let user = json!({
            "id": "01F",
            "emote_set": {
                "id": "set1",
                "emotes": [
                    {"id": "a1", "name": "Clap", "data": {"host": {"url": "//cdn.7tv.app/emote/a1"}}},
                    {"id": "b2", "name": "peepoHappy", "data": {"host": {"url": "https://cdn.7tv.app/emote/b2/"}}}
                ]
            }
        });
        let V3User::Inline(emotes) = extract_v3_user(&user) else {
            panic!("expected inline emotes");
        };
        assert_eq!(emotes.len(), 2);
        assert_eq!(emotes[0].name, "Clap");
        assert_eq!(emotes[0].url, "https://cdn.7tv.app/emote/a1/3x.webp");
        assert_eq!(emotes[1].url, "https://cdn.7tv.app/emote/b2/3x.webp");
    }

    #[test]
    fn v3_set_id_when_not_inlined() {
        assert_eq!(
            extract_v3_user(&json!({"emote_set": {"id": "set42"}})),
            V3User::SetId("set42".to_owned())
        );
        assert_eq!(
            extract_v3_user(&json!({"emote_set_id": "set43"})),
            V3User::SetId("set43".to_owned())
        );
        assert_eq!(
            extract_v3_user(&json!({"emote_set": "set44"})),
            V3User::SetId("set44".to_owned())
        );
        assert_eq!(extract_v3_user(&json!({"id": "u"})), V3User::Empty);
    }

    #[test]
    fn emote_set_body_or_bare_array() {
        let set = json!({"id": "s", "emotes": [{"name": "A", "url": "https://x/a"}]});
        assert_eq!(extract_emote_set(&set).len(), 1);

        let bare = json!([{"name": "B", "url": "https://x/b"}]);
        assert_eq!(extract_emote_set(&bare).len(), 1);
    }

    #[test]
    fn v2_urls_uses_largest() {
        let items = json!([{
            "id": "60ae",
            "name": "monkaS",
            "urls": [["1", "https://cdn/1x"], ["2", "https://cdn/2x"], ["4", "https://cdn/4x"]]
        }]);
        let emotes = extract_emote_array(&items);
        assert_eq!(emotes[0].url, "https://cdn/4x");
    }

    #[test]
    fn id_only_falls_back_to_cdn() {
        let emote = extract_emote(&json!({"id": "abc", "code": "OMEGALUL"})).unwrap();
        assert_eq!(emote.name, "OMEGALUL");
        assert_eq!(emote.url, "https://cdn.7tv.app/emote/abc/4x");
    }

    #[test]
    fn name_fallback_chain() {
        let alias = extract_emote(&json!({"alias": "pog2", "url": "u"})).unwrap();
        assert_eq!(alias.name, "pog2");
        let unnamed = extract_emote(&json!({"url": "u"})).unwrap();
        assert_eq!(unnamed.name, "emote");
    }

    #[test]
    fn items_without_image_are_dropped() {
        let items = json!([{"name": "nothing"}, {"name": "ok", "url": "https://x"}, 7]);
        let emotes = extract_emote_array(&items);
        assert_eq!(emotes.len(), 1);
        assert_eq!(emotes[0].name, "ok");
        assert!(extract_emote_array(&json!({"not": "an array"})).is_empty());
    }

    #[tokio::test]
    async fn empty_chain_is_not_found() {
        let source = EmoteSource::with_providers(reqwest::Client::new(), Vec::new());
        assert!(matches!(
            source.fetch("123").await,
            Err(SourceError::NotFound(id)) if id == "123"
        ));
    }

    #[test]
    fn default_chain_order() {
        let source = EmoteSource::new(reqwest::Client::new());
        assert_eq!(
            source.providers(),
            &[
                EmoteProvider::SevenTvV3,
                EmoteProvider::SevenTvV2,
                EmoteProvider::AdamcyProxy
            ]
        );
    }
}
