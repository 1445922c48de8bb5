//! Error types for the session layer.

use arena_protocol::SessionId;

/// Errors that can occur while admitting or retiring a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The [`Authenticator`](crate::Authenticator) rejected the client.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// No open session has this id.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// A session with this id is already open.
    #[error("session {0} is already open")]
    AlreadyConnected(SessionId),
}
