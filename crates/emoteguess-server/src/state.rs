//! Shared application state for the game server.
//!
//! Handlers never touch the game directly. They send a [`Command`] to the
//! game actor and, when they need an answer, wait on a oneshot reply.
//! Events flow the other way over a broadcast channel to every
//! `WebSocket` client, and the actor keeps a [`GameSnapshot`] current for
//! cheap reads.

use std::sync::Arc;

use emoteguess_core::GameSnapshot;
use emoteguess_types::GameEvent;
use tokio::sync::{RwLock, broadcast, mpsc, oneshot};

use crate::actor::Command;
use crate::error::ApiError;

/// Capacity of the broadcast channel for game events.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
const BROADCAST_CAPACITY: usize = 256;

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for game events.
    pub tx: broadcast::Sender<GameEvent>,
    /// Latest game snapshot, written by the actor after every command.
    pub snapshot: Arc<RwLock<GameSnapshot>>,
    commands: mpsc::UnboundedSender<Command>,
}

impl AppState {
    /// Create state wired to the actor's command queue.
    pub fn new(commands: mpsc::UnboundedSender<Command>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(GameSnapshot::default())),
            commands,
        }
    }

    /// Subscribe to game events.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all connected clients.
    ///
    /// Returns the number of receivers; 0 when nobody is listening.
    pub fn broadcast(&self, event: &GameEvent) -> usize {
        self.tx.send(event.clone()).unwrap_or(0)
    }

    /// Queue a command without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unavailable`] if the actor has stopped.
    pub fn send(&self, command: Command) -> Result<(), ApiError> {
        self.commands
            .send(command)
            .map_err(|e| ApiError::Unavailable(format!("game loop stopped: {e}")))
    }

    /// Queue a command built around a reply channel and wait for the answer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unavailable`] if the actor has stopped or dropped
    /// the reply.
    pub async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ApiError> {
        let (reply, rx) = oneshot::channel();
        self.send(build(reply))?;
        rx.await
            .map_err(|e| ApiError::Unavailable(format!("game loop dropped the request: {e}")))
    }
}
