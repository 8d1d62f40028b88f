//! Minimal IRCv3 line parsing and formatting for Twitch chat.
//!
//! Only what the game needs: tags, prefix, command, params. Lines look like
//! `@tag=v;tag2=v2 :nick!user@host PRIVMSG #chan :the text`.

use std::collections::BTreeMap;

use emoteguess_types::ChatMessage;

/// One parsed IRC line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrcMessage {
    /// IRCv3 message tags, unescaped.
    pub tags: BTreeMap<String, String>,
    /// Source prefix without the leading `:`.
    pub prefix: Option<String>,
    /// Command or numeric, upper-cased.
    pub command: String,
    /// Middle params followed by the trailing param, if any.
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Parse a single line. Trailing `\r\n` is ignored.
    ///
    /// Returns `None` for blank lines or lines with no command.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']).trim_start();
        let mut msg = Self::default();

        if let Some(tagged) = rest.strip_prefix('@') {
            let (raw_tags, tail) = tagged.split_once(' ')?;
            msg.tags = parse_tags(raw_tags);
            rest = tail.trim_start();
        }

        if let Some(prefixed) = rest.strip_prefix(':') {
            let (prefix, tail) = prefixed.split_once(' ')?;
            msg.prefix = Some(prefix.to_owned());
            rest = tail.trim_start();
        }

        let (head, trailing) = match rest.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing)),
            None => (rest, None),
        };
        let mut words = head.split_whitespace();
        msg.command = words.next()?.to_ascii_uppercase();
        msg.params = words.map(ToOwned::to_owned).collect();
        if let Some(trailing) = trailing {
            msg.params.push(trailing.to_owned());
        }
        Some(msg)
    }

    /// Nick part of the prefix (`nick!user@host`).
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        let nick = prefix.split(['!', '@']).next()?;
        (!nick.is_empty()).then_some(nick)
    }

    /// A tag value, if present and non-empty.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The last param.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// Convert a `PRIVMSG` into a [`ChatMessage`].
    ///
    /// The sender id is the login; the display name comes from the
    /// `display-name` tag when Twitch sent one.
    pub fn to_chat_message(&self) -> Option<ChatMessage> {
        if self.command != "PRIVMSG" {
            return None;
        }
        let channel = self.params.first()?.trim_start_matches('#').to_lowercase();
        let text = self.params.get(1)?.clone();
        let login = self.nick()?.to_lowercase();
        let display = self.tag("display-name").unwrap_or(login.as_str()).to_owned();
        let sender_id = self.tag("user-id").map_or(login, ToOwned::to_owned);
        Some(ChatMessage {
            channel,
            sender_id,
            sender_display_name: display,
            text,
        })
    }
}

fn parse_tags(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_owned(), unescape_tag(v)),
            None => (pair.to_owned(), String::new()),
        })
        .collect()
}

fn unescape_tag(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Strip characters that would split or inject IRC lines.
pub fn sanitize_line(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// `JOIN #channel`.
pub fn join(channel: &str) -> String {
    format!("JOIN #{}\r\n", sanitize_line(channel))
}

/// `PRIVMSG #channel :text`.
pub fn privmsg(channel: &str, text: &str) -> String {
    format!(
        "PRIVMSG #{} :{}\r\n",
        sanitize_line(channel),
        sanitize_line(text)
    )
}

/// `PONG` echoing a `PING` payload.
pub fn pong(payload: &str) -> String {
    format!("PONG :{}\r\n", sanitize_line(payload))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_privmsg() {
        let line = "@badge-info=;display-name=Alice\\sB;user-id=123 :alice!alice@alice.tmi.twitch.tv PRIVMSG #Forsen :!guess KEKW\r\n";
        let msg = IrcMessage::parse(line).unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.tag("display-name"), Some("Alice B"));
        assert_eq!(msg.tag("badge-info"), None);
        assert_eq!(msg.nick(), Some("alice"));
        assert_eq!(msg.params, vec!["#Forsen", "!guess KEKW"]);

        let chat = msg.to_chat_message().unwrap();
        assert_eq!(chat.channel, "forsen");
        assert_eq!(chat.sender_id, "123");
        assert_eq!(chat.sender_display_name, "Alice B");
        assert_eq!(chat.text, "!guess KEKW");
    }

    #[test]
    fn sender_id_falls_back_to_login_without_user_id_tag() {
        let msg = IrcMessage::parse("@display-name=Carol;user-id= :carol!carol@carol.tmi.twitch.tv PRIVMSG #chan :pog").unwrap();
        let chat = msg.to_chat_message().unwrap();
        assert_eq!(chat.sender_id, "carol");
        assert_eq!(chat.sender_display_name, "Carol");
    }

    #[test]
    fn display_name_falls_back_to_login() {
        let msg = IrcMessage::parse(":Bob!bob@bob.tmi.twitch.tv PRIVMSG #chan :hi there").unwrap();
        let chat = msg.to_chat_message().unwrap();
        assert_eq!(chat.sender_id, "bob");
        assert_eq!(chat.sender_display_name, "bob");
        assert_eq!(chat.text, "hi there");
    }

    #[test]
    fn parses_ping_and_numerics() {
        let ping = IrcMessage::parse("PING :tmi.twitch.tv").unwrap();
        assert_eq!(ping.command, "PING");
        assert_eq!(ping.trailing(), Some("tmi.twitch.tv"));
        assert!(ping.to_chat_message().is_none());

        let welcome = IrcMessage::parse(":tmi.twitch.tv 001 justinfan123 :Welcome, GLHF!").unwrap();
        assert_eq!(welcome.command, "001");
        assert_eq!(welcome.params[0], "justinfan123");
    }

    #[test]
    fn rejects_blank_and_truncated() {
        assert!(IrcMessage::parse("").is_none());
        assert!(IrcMessage::parse("\r\n").is_none());
        assert!(IrcMessage::parse("@only-tags").is_none());
        assert!(IrcMessage::parse(":only-prefix").is_none());
    }

    #[test]
    fn formatting_strips_newlines() {
        assert_eq!(privmsg("chan", "hi\r\nQUIT"), "PRIVMSG #chan :hiQUIT\r\n");
        assert_eq!(join("chan"), "JOIN #chan\r\n");
        assert_eq!(pong("tmi.twitch.tv"), "PONG :tmi.twitch.tv\r\n");
    }
}
