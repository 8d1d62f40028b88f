//! Optional announce-bot: posts round winners into the channel.
//!
//! Each announcement opens a short-lived authenticated connection, waits
//! for the welcome numeric, sends one `PRIVMSG`, and quits. Failures are
//! returned to the caller, which logs them and moves on.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::ChatError;
use crate::irc::{self, IrcMessage};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Authenticated sender of chat messages.
#[derive(Clone)]
pub struct Announcer {
    host: String,
    port: u16,
    login: String,
    pass: String,
}

impl Announcer {
    /// `pass` is the full IRC password, `oauth:` prefix included.
    pub fn new(host: &str, port: u16, login: &str, pass: &str) -> Self {
        Self {
            host: host.to_owned(),
            port,
            login: login.trim().to_lowercase(),
            pass: pass.trim().to_owned(),
        }
    }

    /// Post `text` to `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Connect`] if the server is unreachable or
    /// rejects the login, [`ChatError::Io`] on socket failures.
    pub async fn announce(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| ChatError::Connect(format!("{}:{}: {e}", self.host, self.port)))?;
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer
            .write_all(format!("PASS {}\r\n", irc::sanitize_line(&self.pass)).as_bytes())
            .await?;
        writer
            .write_all(format!("NICK {}\r\n", irc::sanitize_line(&self.login)).as_bytes())
            .await?;

        let welcome = async {
            while let Some(line) = lines.next_line().await? {
                let Some(message) = IrcMessage::parse(&line) else {
                    continue;
                };
                match message.command.as_str() {
                    "001" => return Ok(()),
                    "NOTICE" => {
                        let notice = message.trailing().unwrap_or_default();
                        return Err(ChatError::Connect(format!("login rejected: {notice}")));
                    }
                    _ => debug!(command = message.command, "waiting for welcome"),
                }
            }
            Err::<(), ChatError>(ChatError::Closed)
        };
        tokio::time::timeout(LOGIN_TIMEOUT, welcome)
            .await
            .map_err(|e| ChatError::Connect(format!("waiting for login: {e}")))??;

        writer.write_all(irc::join(channel).as_bytes()).await?;
        writer.write_all(irc::privmsg(channel, text).as_bytes()).await?;
        writer.write_all(b"QUIT\r\n").await?;
        writer.shutdown().await?;
        info!(channel, login = self.login, "announcement sent");
        Ok(())
    }
}

impl std::fmt::Debug for Announcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Announcer")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("pass", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn logs_in_and_posts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();
            let mut seen = vec![
                lines.next_line().await.unwrap().unwrap(),
                lines.next_line().await.unwrap().unwrap(),
            ];
            write
                .write_all(b":tmi.twitch.tv 001 emotebot :Welcome, GLHF!\r\n")
                .await
                .unwrap();
            while let Some(line) = lines.next_line().await.unwrap() {
                seen.push(line);
            }
            seen
        });

        let announcer = Announcer::new("127.0.0.1", port, "EmoteBot", "oauth:abc");
        announcer.announce("forsen", "alice got KEKW first").await.unwrap();

        let seen = server.await.unwrap();
        assert_eq!(
            seen,
            vec![
                "PASS oauth:abc",
                "NICK emotebot",
                "JOIN #forsen",
                "PRIVMSG #forsen :alice got KEKW first",
                "QUIT",
            ]
        );
    }

    #[tokio::test]
    async fn rejected_login_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut lines = BufReader::new(read).lines();
            let _pass = lines.next_line().await.unwrap();
            let _nick = lines.next_line().await.unwrap();
            write
                .write_all(b":tmi.twitch.tv NOTICE * :Login authentication failed\r\n")
                .await
                .unwrap();
        });

        let announcer = Announcer::new("127.0.0.1", port, "bot", "oauth:bad");
        let result = announcer.announce("chan", "hi").await;
        assert!(matches!(result, Err(ChatError::Connect(msg)) if msg.contains("authentication")));
    }

    #[test]
    fn debug_hides_password() {
        let announcer = Announcer::new("h", 1, "bot", "oauth:secret");
        assert!(!format!("{announcer:?}").contains("secret"));
    }
}
