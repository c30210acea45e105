//! Handle for communicating with the tiling actor.
//!
//! The `TilingActorHandle` provides a safe, cloneable interface for sending
//! messages to the tiling actor and querying its state.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::messages::{QueryResult, TilingMessage, TilingQuery};
use crate::tiling::constants::actor::QUERY_TIMEOUT_MS;
use crate::tiling::manager::ManagerState;

/// Error types for actor communication.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorError {
    /// Failed to send message to actor.
    #[error("Failed to send message to actor: channel closed")]
    SendFailed,

    /// Failed to receive response from actor.
    #[error("Failed to receive response from actor: channel closed")]
    ReceiveFailed,

    /// Query timed out.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
}

/// Handle for communicating with the tiling actor.
///
/// This handle is cheap to clone and can be shared across threads.
#[derive(Debug, Clone)]
pub struct TilingActorHandle {
    sender: mpsc::Sender<TilingMessage>,
}

impl TilingActorHandle {
    /// Create a new handle with the given sender.
    pub(crate) const fn new(sender: mpsc::Sender<TilingMessage>) -> Self { Self { sender } }

    // ========================================================================
    // Fire-and-forget sending
    // ========================================================================

    /// Send a message to the actor without waiting for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed or full.
    pub fn send(&self, msg: TilingMessage) -> Result<(), ActorError> {
        self.sender.try_send(msg).map_err(|_| ActorError::SendFailed)
    }

    /// Send a message to the actor and wait for delivery.
    ///
    /// This is async and will wait if the channel buffer is full.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed.
    pub async fn send_async(&self, msg: TilingMessage) -> Result<(), ActorError> {
        self.sender.send(msg).await.map_err(|_| ActorError::SendFailed)
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Execute a query and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the channel is closed, or
    /// [`ActorError::ReceiveFailed`] if the response channel is closed.
    pub async fn query(&self, query: TilingQuery) -> Result<QueryResult, ActorError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(TilingMessage::Query { query, respond_to: tx })
            .await
            .map_err(|_| ActorError::SendFailed)?;

        rx.await.map_err(|_| ActorError::ReceiveFailed)
    }

    /// Execute a query with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Timeout`] if the query doesn't complete in time,
    /// or any error from [`Self::query`].
    pub async fn query_timeout(&self, query: TilingQuery, timeout: Duration) -> Result<QueryResult, ActorError> {
        tokio::time::timeout(timeout, self.query(query))
            .await
            .map_err(|_| ActorError::Timeout(timeout))?
    }

    // ========================================================================
    // Convenience methods
    // ========================================================================

    /// Get a full state snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the actor fails.
    pub async fn state(&self) -> Result<ManagerState, ActorError> {
        let timeout = Duration::from_millis(QUERY_TIMEOUT_MS);
        match self.query_timeout(TilingQuery::State, timeout).await? {
            QueryResult::State(state) => Ok(*state),
            _ => Err(ActorError::ReceiveFailed),
        }
    }

    /// Ask the actor to stop after the messages already queued.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::SendFailed`] if the actor already stopped.
    pub async fn shutdown(&self) -> Result<(), ActorError> { self.send_async(TilingMessage::Shutdown).await }
}
