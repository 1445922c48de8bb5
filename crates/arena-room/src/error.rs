//! Error types for the room layer.
//!
//! Only the actor boundary can fail. The room state itself (allocator,
//! registry, controller) is total and reports anomalies through return
//! values such as [`DamageOutcome::NotFound`](crate::DamageOutcome).

use arena_protocol::{RoomId, SessionId};

/// Errors that can occur while talking to a room.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room already holds `max_clients` clients.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The room has been locked against new joins.
    #[error("room {0} is locked")]
    Locked(RoomId),

    /// The session is already in this room.
    #[error("session {0} already in room {1}")]
    AlreadyInRoom(SessionId, RoomId),

    /// The session is not in this room.
    #[error("session {0} not in room {1}")]
    NotInRoom(SessionId, RoomId),

    /// The operation doesn't fit the session's current placement,
    /// e.g. joining a second room.
    #[error("invalid state for this operation: {0}")]
    InvalidState(String),

    /// The room's actor has stopped (disposed or shut down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
