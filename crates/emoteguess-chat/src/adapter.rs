//! Live chat feed over Twitch IRC.
//!
//! [`ChatAdapter`] owns at most one background connection. Connecting to a
//! new channel aborts the previous task first, so two feeds never deliver
//! guesses at the same time. Every chat line is handed to a
//! [`ChatHandler`]; the adapter itself knows nothing about the game.

use std::sync::Arc;

use emoteguess_types::ChatMessage;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ChatError;
use crate::irc::{self, IrcMessage};

/// Something that happened on the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Logged in and joined `channel`.
    Connected {
        /// Channel joined.
        channel: String,
    },
    /// A chat line arrived.
    Message(ChatMessage),
    /// The feed ended and will not deliver more messages.
    Dropped {
        /// Channel that was being read.
        channel: String,
        /// What went wrong.
        reason: String,
    },
}

/// Receiver for [`ChatEvent`]s, called from the feed task.
pub trait ChatHandler: Send + Sync + 'static {
    /// Called once per event, in arrival order.
    fn on_event(&self, event: ChatEvent);
}

impl ChatHandler for mpsc::UnboundedSender<ChatEvent> {
    fn on_event(&self, event: ChatEvent) {
        if self.send(event).is_err() {
            debug!("chat event receiver gone");
        }
    }
}

/// Owner of the single live chat connection.
pub struct ChatAdapter {
    host: String,
    port: u16,
    handler: Arc<dyn ChatHandler>,
    active: Option<(String, JoinHandle<()>)>,
}

impl ChatAdapter {
    /// Create an adapter that will connect to `host:port`.
    pub fn new(host: &str, port: u16, handler: Arc<dyn ChatHandler>) -> Self {
        Self {
            host: host.to_owned(),
            port,
            handler,
            active: None,
        }
    }

    /// Open a feed for `channel`, closing any existing one first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&mut self, channel: &str) {
        self.disconnect();
        let channel = channel.trim().trim_start_matches('#').to_lowercase();
        info!(channel, host = self.host, port = self.port, "connecting chat feed");

        let host = self.host.clone();
        let port = self.port;
        let handler = Arc::clone(&self.handler);
        let feed_channel = channel.clone();
        let handle = tokio::spawn(async move {
            let reason = match read_feed(&host, port, &feed_channel, handler.as_ref()).await {
                Ok(()) => "closed".to_owned(),
                Err(e) => e.to_string(),
            };
            warn!(channel = feed_channel, reason, "chat feed dropped");
            handler.on_event(ChatEvent::Dropped {
                channel: feed_channel,
                reason,
            });
        });
        self.active = Some((channel, handle));
    }

    /// Close the current feed. Returns `false` if none was open.
    pub fn disconnect(&mut self) -> bool {
        let Some((channel, handle)) = self.active.take() else {
            return false;
        };
        handle.abort();
        info!(channel, "chat feed closed");
        true
    }

    /// Channel of the open feed, if any.
    pub fn channel(&self) -> Option<&str> {
        self.active.as_ref().map(|(channel, _)| channel.as_str())
    }
}

impl Drop for ChatAdapter {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.active.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ChatAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatAdapter")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("channel", &self.channel())
            .finish_non_exhaustive()
    }
}

/// Read-only anonymous login name.
fn anonymous_nick() -> String {
    format!("justinfan{}", rand::rng().random_range(10_000..100_000_u32))
}

async fn read_feed(
    host: &str,
    port: u16,
    channel: &str,
    handler: &dyn ChatHandler,
) -> Result<(), ChatError> {
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|e| ChatError::Connect(format!("{host}:{port}: {e}")))?;
    let (reader, mut writer) = stream.into_split();

    let nick = anonymous_nick();
    writer.write_all(b"CAP REQ :twitch.tv/tags\r\n").await?;
    writer.write_all(format!("NICK {nick}\r\n").as_bytes()).await?;
    writer.write_all(irc::join(channel).as_bytes()).await?;
    handler.on_event(ChatEvent::Connected {
        channel: channel.to_owned(),
    });

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(message) = IrcMessage::parse(&line) else {
            continue;
        };
        match message.command.as_str() {
            "PING" => {
                let payload = message.trailing().unwrap_or("tmi.twitch.tv");
                writer.write_all(irc::pong(payload).as_bytes()).await?;
            }
            "PRIVMSG" => {
                if let Some(chat) = message.to_chat_message() {
                    handler.on_event(ChatEvent::Message(chat));
                }
            }
            "RECONNECT" => return Err(ChatError::Closed),
            _ => {}
        }
    }
    Ok(())
}
