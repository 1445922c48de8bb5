//! Unified error type for the arena server.

use arena_protocol::ProtocolError;
use arena_room::RoomError;
use arena_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The client was rejected or its session is unknown.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The room refused the request or has stopped.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The connection has already left its room.
    #[error("connection {0} has already left")]
    Disconnected(arena_protocol::SessionId),
}

#[cfg(test)]
mod tests {
    use arena_protocol::{RoomId, SessionId};

    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let arena_err: ArenaError = err.into();
        assert!(matches!(arena_err, ArenaError::Protocol(_)));
        assert!(arena_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::AuthFailed("nope".into());
        let arena_err: ArenaError = err.into();
        assert!(matches!(arena_err, ArenaError::Session(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::Locked(RoomId(1));
        let arena_err: ArenaError = err.into();
        assert!(matches!(arena_err, ArenaError::Room(_)));
        assert_eq!(arena_err.to_string(), "room R-1 is locked");
    }

    #[test]
    fn test_disconnected_names_session() {
        let err = ArenaError::Disconnected(SessionId::new("abc"));
        assert_eq!(err.to_string(), "connection abc has already left");
    }
}
