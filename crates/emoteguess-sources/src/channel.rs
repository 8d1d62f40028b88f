//! Channel input sanitising.

/// Clean up a user-typed channel name.
///
/// Trims whitespace, strips a leading `#`, and lower-cases. Returns `None`
/// when nothing is left or the result contains characters a Twitch login
/// cannot have.
pub fn sanitize_channel(raw: &str) -> Option<String> {
    let login = raw.trim().trim_start_matches('#').trim().to_lowercase();
    if login.is_empty() {
        return None;
    }
    login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        .then_some(login)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_hash_and_case() {
        assert_eq!(sanitize_channel("  #Forsen "), Some("forsen".to_owned()));
        assert_eq!(sanitize_channel("xQc_123"), Some("xqc_123".to_owned()));
    }

    #[test]
    fn rejects_empty_and_junk() {
        assert_eq!(sanitize_channel(""), None);
        assert_eq!(sanitize_channel("  # "), None);
        assert_eq!(sanitize_channel("two words"), None);
        assert_eq!(sanitize_channel("a/b"), None);
    }
}
