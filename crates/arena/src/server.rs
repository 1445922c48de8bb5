//! `Arena` builder and front door.
//!
//! This is the entry point for hosting arena rooms in-process. It ties the
//! layers together: codec → session → room. Whatever carries the frames
//! (a WebSocket server, a test, the skirmish demo) calls
//! [`Arena::connect`] once per client and pumps frames through the
//! returned [`ClientConnection`].

use std::sync::Arc;

use arena_protocol::{Codec, JoinOptions, RoomId};
#[cfg(feature = "json")]
use arena_protocol::JsonCodec;
use arena_room::{RoomConfig, RoomError, RoomInfo, RoomManager, RoomSnapshot, collect_info};
#[cfg(feature = "json")]
use arena_session::AcceptAll;
use arena_session::{Authenticator, SessionConfig, SessionManager};
use tokio::sync::{Mutex, mpsc};

use crate::ArenaError;
use crate::connection::ClientConnection;

/// State shared by the arena and every connection it hands out.
///
/// The `rooms` lock only guards the manager's maps. Room handles are
/// cloned out of it and awaited after the guard is dropped.
pub(crate) struct ArenaState<A: Authenticator, C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) auth: A,
    pub(crate) codec: C,
}

/// Builder for an [`Arena`].
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), arena::ArenaError> {
/// use arena::prelude::*;
///
/// let arena = Arena::builder().build(AcceptAll);
/// let room = arena.create_room(RoomConfig::default()).await;
/// let mut client = arena.connect(room, None, JoinOptions::new(10, 5.0)).await?;
/// let hello = client.next_frame().await?;
/// # Ok(())
/// # }
/// ```
pub struct ArenaBuilder {
    session_config: SessionConfig,
}

impl ArenaBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Builds an arena that speaks JSON.
    #[cfg(feature = "json")]
    pub fn build<A: Authenticator>(self, auth: A) -> Arena<A, JsonCodec> {
        self.build_with_codec(auth, JsonCodec)
    }

    /// Builds an arena with a custom frame codec.
    pub fn build_with_codec<A: Authenticator, C: Codec>(self, auth: A, codec: C) -> Arena<A, C> {
        Arena {
            state: Arc::new(ArenaState {
                sessions: Mutex::new(SessionManager::new(self.session_config)),
                rooms: Mutex::new(RoomManager::new()),
                auth,
                codec,
            }),
        }
    }
}

impl Default for ArenaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A set of running rooms and the sessions connected to them.
///
/// Cheap to clone; clones share the same rooms and sessions.
pub struct Arena<A: Authenticator, C: Codec> {
    state: Arc<ArenaState<A, C>>,
}

impl<A: Authenticator, C: Codec> Clone for Arena<A, C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

#[cfg(feature = "json")]
impl Arena<AcceptAll, JsonCodec> {
    /// Creates a new builder. The builder picks the authenticator and
    /// codec, so `Arena::builder().build(MyAuth)` works for any policy.
    pub fn builder() -> ArenaBuilder {
        ArenaBuilder::new()
    }
}

impl<A: Authenticator, C: Codec> Arena<A, C> {
    /// Starts a room and returns its ID.
    pub async fn create_room(&self, config: RoomConfig) -> RoomId {
        self.state.rooms.lock().await.create_room(config)
    }

    /// Authenticates a client, opens a session for it and joins it to a
    /// room.
    ///
    /// On success the connection already holds the greeting and the room
    /// state, in that order.
    ///
    /// # Errors
    /// - [`SessionError::AuthFailed`](arena_session::SessionError) if the
    ///   authenticator rejects `token`
    /// - [`RoomError`](arena_room::RoomError) if the room is missing,
    ///   full, locked or stopped. The session is closed again.
    pub async fn connect(
        &self,
        room_id: RoomId,
        token: Option<&str>,
        options: JoinOptions,
    ) -> Result<ClientConnection<A, C>, ArenaError> {
        if let Err(e) = self.state.auth.authenticate(token).await {
            tracing::debug!(%room_id, error = %e, "authentication rejected");
            return Err(e.into());
        }

        let session_id = self.state.sessions.lock().await.issue();
        let (tx, rx) = mpsc::unbounded_channel();

        let target = self.state.rooms.lock().await.join_handle(&session_id, room_id);
        let joined = match target {
            Ok(handle) => handle.join(session_id.clone(), options, tx).await,
            Err(e) => Err(e),
        };
        if joined.is_ok() {
            self.state
                .rooms
                .lock()
                .await
                .bind_session(session_id.clone(), room_id);
        }

        if let Err(e) = joined {
            tracing::debug!(%room_id, %session_id, error = %e, "join refused");
            let _ = self.state.sessions.lock().await.close(&session_id);
            return Err(e.into());
        }

        tracing::info!(%room_id, %session_id, "client connected");
        Ok(ClientConnection::new(
            session_id,
            room_id,
            rx,
            Arc::clone(&self.state),
        ))
    }

    /// Returns metadata for a room.
    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, ArenaError> {
        let handle = self.room_handle(room_id).await?;
        Ok(handle.info().await?)
    }

    /// Returns a copy of a room's player state.
    pub async fn snapshot(&self, room_id: RoomId) -> Result<RoomSnapshot, ArenaError> {
        let handle = self.room_handle(room_id).await?;
        Ok(handle.snapshot().await?)
    }

    /// Lists every running room.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let handles = self.state.rooms.lock().await.room_handles();
        collect_info(&handles).await
    }

    /// Locks a room against new joins until [`unlock_room`](Self::unlock_room).
    pub async fn lock_room(&self, room_id: RoomId) -> Result<(), ArenaError> {
        let handle = self.room_handle(room_id).await?;
        Ok(handle.lock().await?)
    }

    /// Lets a locked room accept joins again.
    pub async fn unlock_room(&self, room_id: RoomId) -> Result<(), ArenaError> {
        let handle = self.room_handle(room_id).await?;
        Ok(handle.unlock().await?)
    }

    /// Shuts a room down. Its clients see their outbound stream end.
    pub async fn destroy_room(&self, room_id: RoomId) -> Result<(), ArenaError> {
        let handle = self.state.rooms.lock().await.remove_room(room_id)?;
        let _ = handle.shutdown().await;
        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Forgets rooms that disposed themselves after their last client left.
    pub async fn prune_disposed(&self) -> Vec<RoomId> {
        self.state.rooms.lock().await.prune_disposed()
    }

    /// Number of open sessions.
    pub async fn session_count(&self) -> usize {
        self.state.sessions.lock().await.len()
    }

    async fn room_handle(&self, room_id: RoomId) -> Result<arena_room::RoomHandle, RoomError> {
        self.state
            .rooms
            .lock()
            .await
            .handle(room_id)
            .ok_or(RoomError::NotFound(room_id))
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builder_infers_authenticator_from_build() {
        struct Deny;
        impl Authenticator for Deny {
            async fn authenticate(
                &self,
                _token: Option<&str>,
            ) -> Result<(), arena_session::SessionError> {
                Err(arena_session::SessionError::AuthFailed("closed".into()))
            }
        }

        let open = Arena::builder().build(AcceptAll);
        let closed = Arena::builder().build(Deny);
        let room = open.create_room(RoomConfig::default()).await;
        let other = closed.create_room(RoomConfig::default()).await;

        assert!(open.connect(room, None, JoinOptions::new(10, 5.0)).await.is_ok());
        assert!(closed.connect(other, None, JoinOptions::new(10, 5.0)).await.is_err());
    }
}
