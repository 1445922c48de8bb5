//! The room controller: turns joins, leaves and client messages into
//! state changes and outbound messages.
//!
//! Everything here is synchronous. The controller owns the room's
//! [`PlayerRegistry`], [`SpawnAllocator`] and [`SkinPool`], and is driven
//! by exactly one task (the room actor), so none of them need locks.
//! Handlers return the messages to send as `(Recipient, ServerMessage)`
//! pairs; delivering them is the caller's job.

use std::collections::BTreeMap;

use arena_protocol::{
    ClientMessage, DamageReport, JoinOptions, Recipient, RespawnPoint, ServerMessage,
    SessionId, ShotPayload, Transform,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::player::{DamageOutcome, Player};
use crate::registry::PlayerRegistry;
use crate::skins::SkinPool;
use crate::spawn::SpawnAllocator;
use crate::RoomConfig;

/// Messages produced by a controller handler.
pub type Outbound = Vec<(Recipient, ServerMessage)>;

/// The synchronized room state: every player keyed by session id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub players: BTreeMap<SessionId, Player>,
}

/// Per-room orchestrator. See the module docs.
#[derive(Debug)]
pub struct RoomController {
    config: RoomConfig,
    registry: PlayerRegistry,
    spawns: SpawnAllocator,
    skins: SkinPool,
    /// Set by [`lock`](Self::lock); only [`unlock`](Self::unlock) clears it.
    locked: bool,
    /// Set while the client count exceeds `max_clients`.
    over_capacity: bool,
}

impl RoomController {
    /// Creates a controller, shuffling the skin pool with the thread RNG.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_rng(config, &mut rand::rng())
    }

    /// Creates a controller, shuffling the skin pool with `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: RoomConfig, rng: &mut R) -> Self {
        let config = config.validated();
        Self {
            registry: PlayerRegistry::new(),
            spawns: SpawnAllocator::new(config.spawn_points.clone()),
            skins: SkinPool::shuffled(config.skin_count, rng),
            locked: false,
            over_capacity: false,
            config,
        }
    }

    // -- Lifecycle --------------------------------------------------------

    /// Admits a new client: greets it and creates its player.
    ///
    /// Locks the room if the client count now exceeds `max_clients`.
    pub fn on_join(&mut self, session_id: SessionId, options: &JoinOptions) -> Outbound {
        let greeting = (
            Recipient::Session(session_id.clone()),
            ServerMessage::Hello(self.config.greeting.clone()),
        );

        let skin = self.skins.take();
        let spawn_index = self
            .registry
            .create_player(&mut self.spawns, session_id.clone(), options, skin)
            .spawn_index();
        tracing::info!(
            %session_id,
            ?spawn_index,
            ?skin,
            clients = self.registry.len(),
            "player joined"
        );

        if self.registry.len() > self.config.max_clients && !self.over_capacity {
            self.over_capacity = true;
            tracing::info!(
                clients = self.registry.len(),
                max_clients = self.config.max_clients,
                "room over capacity, locked"
            );
        }

        vec![greeting]
    }

    /// Removes a departing client's player, freeing its spawn slot and skin.
    ///
    /// Lifts the over-capacity lock once the client count is back within
    /// capacity. An explicit [`lock`](Self::lock) stays in place.
    pub fn on_leave(&mut self, session_id: &SessionId) -> Outbound {
        let Some(player) = self.registry.remove_player(&mut self.spawns, session_id) else {
            tracing::debug!(%session_id, "leave for unknown session ignored");
            return Vec::new();
        };
        if let Some(skin) = player.skin {
            self.skins.give_back(skin);
        }
        tracing::info!(
            %session_id,
            spawn_index = ?player.spawn_index(),
            clients = self.registry.len(),
            "player left"
        );

        if self.over_capacity && self.registry.len() <= self.config.max_clients {
            self.over_capacity = false;
            tracing::info!(
                clients = self.registry.len(),
                still_locked = self.locked,
                "room back within capacity"
            );
        }

        Vec::new()
    }

    // -- Messages ---------------------------------------------------------

    /// Routes a client message to its handler.
    pub fn handle_message(&mut self, sender: &SessionId, msg: ClientMessage) -> Outbound {
        match msg {
            ClientMessage::Move(transform) => self.handle_move(sender, &transform),
            ClientMessage::Shoot(data) => self.handle_shoot(sender, data),
            ClientMessage::Damage(report) => self.handle_damage(report),
        }
    }

    fn handle_move(&mut self, sender: &SessionId, transform: &Transform) -> Outbound {
        if self.registry.move_player(sender, transform) {
            tracing::trace!(session_id = %sender, "player moved");
        } else {
            tracing::debug!(session_id = %sender, "move for unknown session ignored");
        }
        Vec::new()
    }

    fn handle_shoot(&mut self, sender: &SessionId, data: ShotPayload) -> Outbound {
        tracing::debug!(session_id = %sender, "shot relayed");
        vec![(
            Recipient::AllExcept(sender.clone()),
            ServerMessage::Shoot(data),
        )]
    }

    fn handle_damage(&mut self, report: DamageReport) -> Outbound {
        let DamageReport { target, amount } = report;
        match self.registry.apply_damage(&target, amount) {
            DamageOutcome::NotFound => {
                tracing::debug!(session_id = %target, "damage for unknown session ignored");
                Vec::new()
            }
            DamageOutcome::Survived => {
                tracing::debug!(session_id = %target, amount, "damage taken");
                Vec::new()
            }
            DamageOutcome::Died => match self.respawn(&target) {
                Some(point) => vec![(Recipient::Session(target), ServerMessage::Restart(point))],
                None => Vec::new(),
            },
        }
    }

    /// Moves a dead player to the next free spawn slot.
    ///
    /// The new slot is bound before the old one is freed, and the old one
    /// is kept when both are the same slot.
    fn respawn(&mut self, session_id: &SessionId) -> Option<RespawnPoint> {
        let player = self.registry.get_mut(session_id)?;
        let prev = player.spawn_index();

        let slot = self.spawns.next_free(prev);
        player.place_at(slot.index, slot.point);

        if let Some(prev) = prev.filter(|&prev| prev != slot.index) {
            self.spawns.release(prev);
        }

        tracing::info!(
            %session_id,
            from = ?prev,
            to = slot.index,
            losses = player.loss_count,
            "player respawned"
        );
        Some(RespawnPoint {
            x: slot.point.x,
            z: slot.point.z,
        })
    }

    // -- Transport hooks --------------------------------------------------

    /// Stops the room from accepting joins.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Lets the room accept joins again. Clears the over-capacity lock too.
    pub fn unlock(&mut self) {
        self.locked = false;
        self.over_capacity = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked || self.over_capacity
    }

    // -- Queries ----------------------------------------------------------

    /// Number of connected clients (one player each).
    pub fn client_count(&self) -> usize {
        self.registry.len()
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn spawns(&self) -> &SpawnAllocator {
        &self.spawns
    }

    pub fn player(&self, session_id: &SessionId) -> Option<&Player> {
        self.registry.get(session_id)
    }

    /// Copies the current room state.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            players: self
                .registry
                .iter()
                .map(|(id, player)| (id.clone(), player.clone()))
                .collect(),
        }
    }
}
