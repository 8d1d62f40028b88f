//! Error types for the chat connection.

/// Errors raised by the chat feed or the announcer.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Could not reach or log in to the chat server.
    #[error("chat connect failed: {0}")]
    Connect(String),

    /// Socket read or write failed.
    #[error("chat I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the connection or asked us to reconnect.
    #[error("chat connection closed")]
    Closed,
}
