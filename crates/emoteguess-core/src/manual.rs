//! Manual emote payloads pasted by the user.
//!
//! Accepts a JSON array whose items are either bare strings (used as both
//! name and url) or objects. Object names come from `name` or `code`
//! (falling back to `"unknown"`); urls come from `url`, `src`, or `image`.
//! Items with no usable url are dropped.

use emoteguess_types::Emote;
use serde_json::Value;

use crate::error::CoreError;

/// Parse a pasted payload into emotes.
///
/// # Errors
///
/// Returns [`CoreError::InvalidPayload`] for malformed JSON or a non-array
/// document, and [`CoreError::EmptyInput`] when no item survives.
pub fn parse_manual_payload(raw: &str) -> Result<Vec<Emote>, CoreError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| CoreError::InvalidPayload(format!("invalid JSON: {e}")))?;
    emotes_from_value(&value)
}

/// Interpret an already-decoded payload.
///
/// # Errors
///
/// Same as [`parse_manual_payload`], minus JSON syntax errors.
pub fn emotes_from_value(value: &Value) -> Result<Vec<Emote>, CoreError> {
    let items = value
        .as_array()
        .ok_or_else(|| CoreError::InvalidPayload(String::from("not an array")))?;

    let emotes: Vec<Emote> = items.iter().filter_map(emote_from_item).collect();
    if emotes.is_empty() {
        return Err(CoreError::EmptyInput);
    }
    Ok(emotes)
}

fn emote_from_item(item: &Value) -> Option<Emote> {
    if let Some(s) = item.as_str() {
        return Emote::new(s, s);
    }
    let name = first_str(item, &["name", "code"]).unwrap_or("unknown");
    let url = first_str(item, &["url", "src", "image"])?;
    Emote::new(name, url)
}

fn first_str<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_name_and_url() {
        let emotes = parse_manual_payload(r#"["https://cdn/pog.png"]"#).unwrap();
        assert_eq!(emotes[0].name, "https://cdn/pog.png");
        assert_eq!(emotes[0].url, "https://cdn/pog.png");
    }

    #[test]
    fn objects_use_fallback_fields() {
        let emotes = parse_manual_payload(
            r#"[
                {"name": "pog", "url": "a"},
                {"code": "kappa", "src": "b"},
                {"image": "c"}
            ]"#,
        )
        .unwrap();
        let pairs: Vec<(&str, &str)> = emotes
            .iter()
            .map(|e| (e.name.as_str(), e.url.as_str()))
            .collect();
        assert_eq!(pairs, vec![("pog", "a"), ("kappa", "b"), ("unknown", "c")]);
    }

    #[test]
    fn items_without_any_url_field_are_dropped() {
        let emotes =
            parse_manual_payload(r#"[{"name": "pog"}, {"name": "kappa", "url": "b"}]"#).unwrap();
        assert_eq!(emotes.len(), 1);
        assert_eq!(emotes[0].name, "kappa");
    }

    #[test]
    fn payload_with_no_urls_is_input_error() {
        let result = parse_manual_payload(r#"[{"name": "pog"}, {"code": "kappa"}]"#);
        assert!(matches!(result, Err(CoreError::EmptyInput)));
    }

    #[test]
    fn non_array_and_garbage_are_rejected() {
        assert!(matches!(
            parse_manual_payload(r#"{"name": "pog"}"#),
            Err(CoreError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_manual_payload("[not json"),
            Err(CoreError::InvalidPayload(_))
        ));
    }
}
