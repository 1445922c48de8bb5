//! Room actor: an isolated Tokio task that owns one arena room.
//!
//! Each room runs in its own task and talks to the outside world through
//! an mpsc channel. The actor is the only thing that touches its
//! [`RoomController`], so joins, leaves and messages for one room are
//! handled strictly one at a time.

use std::collections::HashMap;

use arena_protocol::{ClientMessage, JoinOptions, Recipient, RoomId, ServerMessage, SessionId};
use tokio::sync::{mpsc, oneshot};

use crate::controller::{Outbound, RoomController, RoomSnapshot};
use crate::{RoomConfig, RoomError};

/// An outbound message from the room actor to a client's connection.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomOutbound {
    /// Full room state, sent once right after the greeting.
    State(RoomSnapshot),
    /// A message produced by the controller.
    Message(ServerMessage),
}

/// Channel sender for delivering outbound messages to a client.
pub type PlayerSender = mpsc::UnboundedSender<RoomOutbound>;

/// Commands sent to a room actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply on it.
pub(crate) enum RoomCommand {
    /// Add a client to the room.
    Join {
        session_id: SessionId,
        options: JoinOptions,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Remove a client from the room.
    Leave {
        session_id: SessionId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Deliver a client message.
    Message {
        sender: SessionId,
        msg: ClientMessage,
    },

    /// Request room metadata.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Lock or unlock the room against new joins.
    SetLocked { locked: bool },

    /// Request a copy of the room state.
    GetSnapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },

    /// Shut down the room.
    Shutdown,
}

/// Room metadata (not the player state itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    /// Number of clients currently in the room.
    pub client_count: usize,
    pub max_clients: usize,
    /// Whether the room is refusing joins.
    pub locked: bool,
    /// Number of bound spawn slots.
    pub occupied_spawns: usize,
}

/// Handle to a running room actor.
///
/// Cheap to clone: it wraps an `mpsc::Sender`. Every call fails with
/// [`RoomError::Unavailable`] once the actor has stopped.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Sends a join request to the room.
    ///
    /// On success the client has already been sent its greeting and the
    /// room state on `sender`.
    pub async fn join(
        &self,
        session_id: SessionId,
        options: JoinOptions,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            session_id,
            options,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Sends a leave request to the room.
    pub async fn leave(&self, session_id: SessionId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            session_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Like [`leave`](Self::leave), but a room that has already stopped
    /// counts as success.
    pub async fn leave_if_running(&self, session_id: SessionId) -> Result<(), RoomError> {
        match self.leave(session_id.clone()).await {
            Err(RoomError::Unavailable(room_id)) => {
                tracing::debug!(%room_id, %session_id, "room already stopped on leave");
                Ok(())
            }
            other => other,
        }
    }

    /// Sends a client message to the room (fire-and-forget).
    pub async fn send_message(
        &self,
        sender: SessionId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Message { sender, msg }).await
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Requests a copy of the room state.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetSnapshot { reply: reply_tx })
            .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Stops the room from accepting joins. Clients already inside are
    /// unaffected.
    pub async fn lock(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::SetLocked { locked: true }).await
    }

    /// Lets the room accept joins again.
    pub async fn unlock(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::SetLocked { locked: false }).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    controller: RoomController,
    /// Per-client outbound channels.
    senders: HashMap<SessionId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until shutdown or disposal.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    session_id,
                    options,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(session_id, &options, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { session_id, reply } => {
                    let result = self.handle_leave(&session_id);
                    let left = result.is_ok();
                    let _ = reply.send(result);
                    if left && self.should_dispose() {
                        tracing::info!(room_id = %self.room_id, "last client left, disposing room");
                        break;
                    }
                }
                RoomCommand::Message { sender, msg } => {
                    self.handle_message(&sender, msg);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::SetLocked { locked } => {
                    if locked {
                        self.controller.lock();
                    } else {
                        self.controller.unlock();
                    }
                    tracing::info!(room_id = %self.room_id, locked, "room lock changed");
                }
                RoomCommand::GetSnapshot { reply } => {
                    let _ = reply.send(self.controller.snapshot());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        session_id: SessionId,
        options: &JoinOptions,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if self.senders.contains_key(&session_id) {
            return Err(RoomError::AlreadyInRoom(session_id, self.room_id));
        }
        if self.controller.is_locked() {
            tracing::warn!(room_id = %self.room_id, %session_id, "join refused, room locked");
            return Err(RoomError::Locked(self.room_id));
        }
        if self.controller.client_count() >= self.controller.config().max_clients {
            return Err(RoomError::RoomFull(self.room_id));
        }

        self.senders.insert(session_id.clone(), sender);
        let msgs = self.controller.on_join(session_id.clone(), options);
        self.dispatch(msgs);
        self.send_to(&session_id, RoomOutbound::State(self.controller.snapshot()));
        Ok(())
    }

    fn handle_leave(&mut self, session_id: &SessionId) -> Result<(), RoomError> {
        if self.senders.remove(session_id).is_none() {
            return Err(RoomError::NotInRoom(session_id.clone(), self.room_id));
        }
        let msgs = self.controller.on_leave(session_id);
        self.dispatch(msgs);
        Ok(())
    }

    fn handle_message(&mut self, sender: &SessionId, msg: ClientMessage) {
        if !self.senders.contains_key(sender) {
            tracing::warn!(
                room_id = %self.room_id,
                %sender,
                "message from non-member, ignoring"
            );
            return;
        }
        let msgs = self.controller.handle_message(sender, msg);
        self.dispatch(msgs);
    }

    fn should_dispose(&self) -> bool {
        self.controller.config().auto_dispose && self.senders.is_empty()
    }

    /// Dispatches outbound messages to the correct recipients.
    fn dispatch(&self, msgs: Outbound) {
        for (recipient, msg) in msgs {
            let outbound = RoomOutbound::Message(msg);
            match recipient {
                Recipient::All => {
                    for sid in self.senders.keys() {
                        self.send_to(sid, outbound.clone());
                    }
                }
                Recipient::Session(sid) => {
                    self.send_to(&sid, outbound);
                }
                Recipient::AllExcept(excluded) => {
                    for sid in self.senders.keys().filter(|sid| **sid != excluded) {
                        self.send_to(sid, outbound.clone());
                    }
                }
            }
        }
    }

    /// Sends to a single client. Silently drops if its receiver is gone.
    fn send_to(&self, session_id: &SessionId, msg: RoomOutbound) {
        if let Some(sender) = self.senders.get(session_id) {
            let _ = sender.send(msg);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            client_count: self.controller.client_count(),
            max_clients: self.controller.config().max_clients,
            locked: self.controller.is_locked(),
            occupied_spawns: self.controller.spawns().occupied_count(),
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room(room_id: RoomId, config: RoomConfig, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id,
        controller: RoomController::new(config),
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
