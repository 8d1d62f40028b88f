//! Twitch login to numeric id resolution.
//!
//! Several public lookup services are tried in a fixed order; the first one
//! that yields a numeric id wins. Providers use enum dispatch so the chain
//! is a plain `Vec` without boxing async trait objects.

use tracing::{debug, info};

use crate::error::SourceError;
use crate::http::{fetch_json, fetch_text};

const DECAPI_URL: &str = "https://decapi.me/twitch/id";
const IVR_URL: &str = "https://api.ivr.fi/v2/twitch/user";
const HELIX_URL: &str = "https://api.twitch.tv/helix/users";

/// One way of turning a login into a Twitch id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityProvider {
    /// `decapi.me`, plain-text body.
    DecApi,
    /// `api.ivr.fi` v2, JSON array or object.
    Ivr,
    /// Twitch Helix `users` endpoint, with an optional `Client-Id`.
    Helix {
        /// Value for the `Client-Id` header.
        client_id: Option<String>,
    },
}

impl IdentityProvider {
    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::DecApi => "decapi",
            Self::Ivr => "ivr",
            Self::Helix { .. } => "helix",
        }
    }

    async fn resolve(
        &self,
        client: &reqwest::Client,
        login: &str,
    ) -> Result<String, SourceError> {
        let found = match self {
            Self::DecApi => {
                let body = fetch_text(client.get(format!("{DECAPI_URL}/{login}"))).await?;
                extract_decapi_id(&body)
            }
            Self::Ivr => {
                let json = fetch_json(client.get(IVR_URL).query(&[("login", login)])).await?;
                extract_ivr_id(&json)
            }
            Self::Helix { client_id } => {
                let mut request = client.get(HELIX_URL).query(&[("login", login)]);
                if let Some(id) = client_id {
                    request = request.header("Client-Id", id);
                }
                extract_helix_id(&fetch_json(request).await?)
            }
        };
        found.ok_or_else(|| {
            SourceError::Network(format!("{} response had no usable id", self.name()))
        })
    }
}

/// Ordered chain of [`IdentityProvider`]s.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    client: reqwest::Client,
    providers: Vec<IdentityProvider>,
}

impl IdentityResolver {
    /// The default chain: decapi, ivr, then Helix.
    pub fn new(client: reqwest::Client, helix_client_id: Option<String>) -> Self {
        Self::with_providers(
            client,
            vec![
                IdentityProvider::DecApi,
                IdentityProvider::Ivr,
                IdentityProvider::Helix {
                    client_id: helix_client_id,
                },
            ],
        )
    }

    /// A custom chain.
    pub const fn with_providers(client: reqwest::Client, providers: Vec<IdentityProvider>) -> Self {
        Self { client, providers }
    }

    /// Providers in the order they are tried.
    pub fn providers(&self) -> &[IdentityProvider] {
        &self.providers
    }

    /// Resolve `login` to its numeric Twitch id.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Resolution`] when every provider fails.
    pub async fn resolve(&self, login: &str) -> Result<String, SourceError> {
        for provider in &self.providers {
            match provider.resolve(&self.client, login).await {
                Ok(id) => {
                    info!(
                        login,
                        twitch_id = id,
                        provider = provider.name(),
                        "resolved channel"
                    );
                    return Ok(id);
                }
                Err(e) => {
                    debug!(login, provider = provider.name(), error = %e, "resolver failed");
                }
            }
        }
        Err(SourceError::Resolution(login.to_owned()))
    }
}

fn is_numeric_id(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// A decapi body is the bare id; anything else is an error message.
pub(crate) fn extract_decapi_id(body: &str) -> Option<String> {
    let text = body.trim();
    is_numeric_id(text).then(|| text.to_owned())
}

/// Id from an ivr user record: `id`, `id_str`, or `user_id`, as a string
/// or a number. Array responses use their first element.
pub(crate) fn extract_ivr_id(json: &serde_json::Value) -> Option<String> {
    let user = match json {
        serde_json::Value::Array(items) => items.first()?,
        other => other,
    };
    ["id", "id_str", "user_id"]
        .iter()
        .find_map(|key| id_field(user.get(key)?))
}

/// Id from a Helix `data[0].id`.
pub(crate) fn extract_helix_id(json: &serde_json::Value) -> Option<String> {
    json.get("data")
        .and_then(|d| d.get(0))
        .and_then(|u| u.get("id"))
        .and_then(id_field)
}

fn id_field(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_owned(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    is_numeric_id(&text).then_some(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decapi_accepts_only_digits() {
        assert_eq!(extract_decapi_id("22484632\n"), Some("22484632".to_owned()));
        assert_eq!(extract_decapi_id("User not found: nobody"), None);
        assert_eq!(extract_decapi_id(""), None);
    }

    #[test]
    fn ivr_array_and_object_shapes() {
        let array = json!([{"id": "71092938", "login": "xqc"}]);
        assert_eq!(extract_ivr_id(&array), Some("71092938".to_owned()));

        let object = json!({"id_str": "22484632"});
        assert_eq!(extract_ivr_id(&object), Some("22484632".to_owned()));

        let numeric = json!({"user_id": 12345});
        assert_eq!(extract_ivr_id(&numeric), Some("12345".to_owned()));
    }

    #[test]
    fn ivr_missing_or_empty() {
        assert_eq!(extract_ivr_id(&json!([])), None);
        assert_eq!(extract_ivr_id(&json!({"login": "nobody"})), None);
        assert_eq!(extract_ivr_id(&json!({"id": ""})), None);
    }

    #[test]
    fn helix_first_user() {
        let body = json!({"data": [{"id": "141981764", "login": "twitchdev"}]});
        assert_eq!(extract_helix_id(&body), Some("141981764".to_owned()));
        assert_eq!(extract_helix_id(&json!({"data": []})), None);
        assert_eq!(extract_helix_id(&json!({"error": "Unauthorized"})), None);
    }

    #[test]
    fn default_chain_order() {
        let resolver = IdentityResolver::new(reqwest::Client::new(), None);
        let names: Vec<&str> = resolver.providers().iter().map(IdentityProvider::name).collect();
        assert_eq!(names, vec!["decapi", "ivr", "helix"]);
    }

    #[tokio::test]
    async fn empty_chain_is_resolution_error() {
        let resolver = IdentityResolver::with_providers(reqwest::Client::new(), Vec::new());
        let result = resolver.resolve("forsen").await;
        assert!(matches!(result, Err(SourceError::Resolution(login)) if login == "forsen"));
    }
}
