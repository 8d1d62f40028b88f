//! Turning a chat line into a guess.
//!
//! A line counts as a guess either verbatim or, when it starts with the
//! command prefix (e.g. `!guess`), as whatever follows the prefix. Both
//! forms are normalized identically downstream.

use emoteguess_types::{ChatMessage, GuessAttempt};

/// The guess text carried by `text`, or `None` if nothing is left.
///
/// The prefix only matches as a whole word, case-insensitively, so with
/// prefix `!guess` the line `!guessing` is taken verbatim.
pub fn extract_guess<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let text = text.trim();
    let guess = strip_command(text, prefix.trim()).map_or(text, str::trim);
    (!guess.is_empty()).then_some(guess)
}

fn strip_command<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let head = text.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = text.get(prefix.len()..)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

/// Build a chat [`GuessAttempt`] from `message`.
///
/// The guesser is the sender's display name.
pub fn attempt_from_message(message: &ChatMessage, prefix: &str) -> Option<GuessAttempt> {
    let guess = extract_guess(&message.text, prefix)?;
    let guesser = if message.sender_display_name.trim().is_empty() {
        &message.sender_id
    } else {
        &message.sender_display_name
    };
    Some(GuessAttempt::chat(guesser, guess))
}
