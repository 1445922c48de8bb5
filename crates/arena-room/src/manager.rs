//! Room manager: creates, tracks, and routes sessions to rooms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use arena_protocol::{ClientMessage, JoinOptions, RoomId, SessionId};

use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages all active rooms and tracks which session is in which room.
///
/// A session is in at most one room at a time.
pub struct RoomManager {
    rooms: HashMap<RoomId, RoomHandle>,
    session_rooms: HashMap<SessionId, RoomId>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            session_rooms: HashMap::new(),
        }
    }

    /// Starts a new room actor and returns its ID.
    pub fn create_room(&mut self, config: RoomConfig) -> RoomId {
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_room(room_id, config, DEFAULT_CHANNEL_SIZE);
        self.rooms.insert(room_id, handle);
        tracing::info!(%room_id, "room created");
        room_id
    }

    /// Returns a handle to a room, if it is tracked.
    pub fn handle(&self, room_id: RoomId) -> Option<RoomHandle> {
        self.rooms.get(&room_id).cloned()
    }

    /// Returns a handle to every tracked room.
    ///
    /// Callers sharing the manager behind a lock should take the handles,
    /// release the lock, then talk to the rooms.
    pub fn room_handles(&self) -> Vec<RoomHandle> {
        self.rooms.values().cloned().collect()
    }

    /// Returns a handle to the room a session is in.
    pub fn session_handle(&self, session_id: &SessionId) -> Result<RoomHandle, RoomError> {
        let room_id = self
            .session_rooms
            .get(session_id)
            .ok_or_else(|| not_in_any_room(session_id))?;
        self.handle(*room_id).ok_or(RoomError::NotFound(*room_id))
    }

    /// Checks that `session_id` may join `room_id` and returns the room's
    /// handle. Nothing is recorded until [`bind_session`](Self::bind_session).
    pub fn join_handle(
        &self,
        session_id: &SessionId,
        room_id: RoomId,
    ) -> Result<RoomHandle, RoomError> {
        if let Some(current) = self.session_rooms.get(session_id) {
            if *current == room_id {
                return Err(RoomError::AlreadyInRoom(session_id.clone(), room_id));
            }
            return Err(RoomError::InvalidState(format!(
                "session {session_id} is already in room {current}"
            )));
        }
        self.handle(room_id).ok_or(RoomError::NotFound(room_id))
    }

    /// Records that a session joined a room.
    ///
    /// Returns `false` and records nothing if the room is no longer
    /// tracked (it was destroyed while the join was in flight).
    pub fn bind_session(&mut self, session_id: SessionId, room_id: RoomId) -> bool {
        if !self.rooms.contains_key(&room_id) {
            tracing::debug!(%room_id, %session_id, "room gone before join was recorded");
            return false;
        }
        self.session_rooms.insert(session_id, room_id);
        true
    }

    /// Forgets which room a session is in and returns that room's handle,
    /// if the room is still tracked.
    pub fn unbind_session(
        &mut self,
        session_id: &SessionId,
    ) -> Result<Option<RoomHandle>, RoomError> {
        let room_id = self
            .session_rooms
            .remove(session_id)
            .ok_or_else(|| not_in_any_room(session_id))?;
        Ok(self.handle(room_id))
    }

    /// Stops tracking a room and drops its sessions from the index. The
    /// returned handle can still be used to shut the actor down.
    pub fn remove_room(&mut self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        let handle = self
            .rooms
            .remove(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;
        self.session_rooms.retain(|_, rid| *rid != room_id);
        Ok(handle)
    }

    /// Adds a session to a room.
    pub async fn join_room(
        &mut self,
        session_id: SessionId,
        room_id: RoomId,
        options: JoinOptions,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let handle = self.join_handle(&session_id, room_id)?;
        handle.join(session_id.clone(), options, sender).await?;
        self.bind_session(session_id, room_id);
        Ok(())
    }

    /// Removes a session from its current room.
    ///
    /// The session is forgotten even if the room has already stopped.
    pub async fn leave_room(&mut self, session_id: &SessionId) -> Result<(), RoomError> {
        match self.unbind_session(session_id)? {
            Some(handle) => handle.leave_if_running(session_id.clone()).await,
            None => Ok(()),
        }
    }

    /// Routes a client message to the sender's current room.
    pub async fn route_message(
        &self,
        session_id: &SessionId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.session_handle(session_id)?
            .send_message(session_id.clone(), msg)
            .await
    }

    /// Returns info about a specific room.
    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self.handle(room_id).ok_or(RoomError::NotFound(room_id))?;
        handle.info().await
    }

    /// Shuts down a room and drops all its sessions from the index.
    pub async fn destroy_room(&mut self, room_id: RoomId) -> Result<(), RoomError> {
        let handle = self.remove_room(room_id)?;
        let _ = handle.shutdown().await;
        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Forgets rooms whose actor has stopped on its own. Returns their IDs.
    pub fn prune_disposed(&mut self) -> Vec<RoomId> {
        let stopped: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, handle)| handle.is_closed())
            .map(|(id, _)| *id)
            .collect();

        for room_id in &stopped {
            self.rooms.remove(room_id);
            self.session_rooms.retain(|_, rid| rid != room_id);
            tracing::debug!(%room_id, "pruned disposed room");
        }
        stopped
    }

    /// Returns the room a session is currently in, if any.
    pub fn session_room(&self, session_id: &SessionId) -> Option<RoomId> {
        self.session_rooms.get(session_id).copied()
    }

    /// Queries every room for its info. Rooms that fail to answer are
    /// skipped.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        collect_info(&self.room_handles()).await
    }

    /// Returns the number of tracked rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all tracked room IDs.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Queries each room for its info, sorted by room ID. Rooms that fail to
/// answer are skipped.
pub async fn collect_info(handles: &[RoomHandle]) -> Vec<RoomInfo> {
    let mut infos = Vec::with_capacity(handles.len());
    for handle in handles {
        if let Ok(info) = handle.info().await {
            infos.push(info);
        }
    }
    infos.sort_by_key(|info| info.room_id.0);
    infos
}

fn not_in_any_room(session_id: &SessionId) -> RoomError {
    RoomError::InvalidState(format!("session {session_id} is not in any room"))
}
