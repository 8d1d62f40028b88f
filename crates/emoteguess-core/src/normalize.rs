//! Canonical form for guesses and emote names.
//!
//! A guess names the target iff `normalize(guess) == normalize(target)`.
//! The same function is applied on both sides; there is no fuzzy matching.

/// Trim surrounding whitespace and lower-case.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether `guess` names `target` under canonical equality.
pub fn names_match(guess: &str, target: &str) -> bool {
    let guess = normalize(guess);
    !guess.is_empty() && guess == normalize(target)
}
