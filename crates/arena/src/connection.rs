//! One client's link to the room it joined.
//!
//! Inbound traffic goes in through [`ClientConnection::deliver`] (encoded
//! frames) or [`ClientConnection::send`] (typed messages). Outbound traffic
//! comes out of [`ClientConnection::next_frame`] or
//! [`ClientConnection::recv`]. [`ClientConnection::leave`] takes the client
//! out of the room and closes its session.

use std::sync::Arc;

use arena_protocol::{ClientMessage, Codec, RoomId, SessionId};
use arena_room::{RoomOutbound, RoomSnapshot};
use arena_session::Authenticator;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::ArenaError;
use crate::server::ArenaState;

/// Wire shape of the join-time state push: `{"type":"state","data":{...}}`.
#[derive(Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
enum StateFrame<'a> {
    State(&'a RoomSnapshot),
}

/// A connected client. Created by [`Arena::connect`](crate::Arena::connect).
///
/// Dropping a connection without calling [`leave`](Self::leave) still
/// removes the client from its room, in a background task.
pub struct ClientConnection<A: Authenticator, C: Codec> {
    session_id: SessionId,
    room_id: RoomId,
    outbound: mpsc::UnboundedReceiver<RoomOutbound>,
    state: Arc<ArenaState<A, C>>,
    left: bool,
}

impl<A: Authenticator, C: Codec> ClientConnection<A, C> {
    pub(crate) fn new(
        session_id: SessionId,
        room_id: RoomId,
        outbound: mpsc::UnboundedReceiver<RoomOutbound>,
        state: Arc<ArenaState<A, C>>,
    ) -> Self {
        Self {
            session_id,
            room_id,
            outbound,
            state,
            left: false,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Decodes an inbound frame and forwards it to the room.
    ///
    /// # Errors
    /// [`ProtocolError::Decode`](arena_protocol::ProtocolError) for a
    /// malformed frame; the connection stays usable.
    pub async fn deliver(&self, frame: &[u8]) -> Result<(), ArenaError> {
        let msg: ClientMessage = match self.state.codec.decode(frame) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    session_id = %self.session_id,
                    error = %e,
                    "failed to decode client frame"
                );
                return Err(e.into());
            }
        };
        self.send(msg).await
    }

    /// Forwards a typed message to the room.
    pub async fn send(&self, msg: ClientMessage) -> Result<(), ArenaError> {
        if self.left {
            return Err(ArenaError::Disconnected(self.session_id.clone()));
        }
        let handle = self.state.rooms.lock().await.session_handle(&self.session_id)?;
        handle.send_message(self.session_id.clone(), msg).await?;
        Ok(())
    }

    /// Waits for the next outbound event. `None` once the room has stopped.
    pub async fn recv(&mut self) -> Option<RoomOutbound> {
        self.outbound.recv().await
    }

    /// Returns an outbound event if one is already queued.
    pub fn try_recv(&mut self) -> Option<RoomOutbound> {
        self.outbound.try_recv().ok()
    }

    /// Waits for the next outbound event and encodes it.
    ///
    /// Returns `Ok(None)` once the room has stopped.
    pub async fn next_frame(&mut self) -> Result<Option<Vec<u8>>, ArenaError> {
        let Some(event) = self.outbound.recv().await else {
            return Ok(None);
        };
        let frame = match &event {
            RoomOutbound::State(snapshot) => {
                self.state.codec.encode(&StateFrame::State(snapshot))?
            }
            RoomOutbound::Message(msg) => self.state.codec.encode(msg)?,
        };
        Ok(Some(frame))
    }

    /// Leaves the room and closes the session.
    ///
    /// A room that has already stopped is not an error.
    pub async fn leave(mut self) -> Result<(), ArenaError> {
        self.left = true;
        disconnect(&self.state, &self.session_id).await?;
        tracing::info!(
            room_id = %self.room_id,
            session_id = %self.session_id,
            "client disconnected"
        );
        Ok(())
    }
}

impl<A: Authenticator, C: Codec> Drop for ClientConnection<A, C> {
    fn drop(&mut self) {
        if self.left {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(session_id = %self.session_id, "connection dropped outside a runtime");
            return;
        };
        let state = Arc::clone(&self.state);
        let session_id = self.session_id.clone();
        runtime.spawn(async move {
            if let Err(e) = disconnect(&state, &session_id).await {
                tracing::debug!(%session_id, error = %e, "cleanup after drop failed");
            }
        });
    }
}

/// Removes a session from its room, then closes it. The session is closed
/// even if the room refuses the leave.
async fn disconnect<A: Authenticator, C: Codec>(
    state: &ArenaState<A, C>,
    session_id: &SessionId,
) -> Result<(), ArenaError> {
    let room = state.rooms.lock().await.unbind_session(session_id);
    let left = match room {
        Ok(Some(handle)) => handle.leave_if_running(session_id.clone()).await,
        Ok(None) => Ok(()),
        Err(e) => Err(e),
    };
    let closed = state.sessions.lock().await.close(session_id);
    left?;
    closed?;
    Ok(())
}
