//! The player registry: session id → [`Player`].
//!
//! This map *is* the room state that gets synchronized to clients. The
//! registry mutates players in place and delegates spawn-slot bookkeeping
//! to the [`SpawnAllocator`] passed into each call; it never decides where
//! a dead player respawns.

use std::collections::HashMap;

use arena_protocol::{JoinOptions, SessionId, Transform};

use crate::player::{DamageOutcome, Player};
use crate::spawn::SpawnAllocator;

/// Owns every [`Player`] in a room, keyed by session id.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<SessionId, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a player on the first free spawn slot.
    ///
    /// Session ids are unique per connection, so `session_id` is expected
    /// to be new. If it isn't, the old entry is removed first (slot
    /// released) so the occupancy set stays consistent.
    pub fn create_player(
        &mut self,
        spawns: &mut SpawnAllocator,
        session_id: SessionId,
        options: &JoinOptions,
        skin: Option<usize>,
    ) -> &Player {
        if self.players.contains_key(&session_id) {
            tracing::warn!(%session_id, "player already exists, replacing it");
            self.remove_player(spawns, &session_id);
        }

        let slot = spawns.acquire_first_free();
        let player = Player::spawned(options, slot.index, slot.point, skin);

        tracing::debug!(
            %session_id,
            spawn_index = slot.index,
            x = slot.point.x,
            z = slot.point.z,
            hp = options.hp,
            "player created"
        );
        self.players.entry(session_id).or_insert(player)
    }

    /// Removes a player and frees its spawn slot. Returns the removed
    /// player, or `None` if there was none.
    pub fn remove_player(
        &mut self,
        spawns: &mut SpawnAllocator,
        session_id: &SessionId,
    ) -> Option<Player> {
        let player = self.players.get(session_id)?;
        if let Some(index) = player.spawn_index {
            spawns.release(index);
        }
        self.players.remove(session_id)
    }

    /// Overwrites a player's transform. Returns `false` (and changes
    /// nothing) if the session has no player, e.g. a late message after
    /// a disconnect.
    pub fn move_player(&mut self, session_id: &SessionId, transform: &Transform) -> bool {
        match self.players.get_mut(session_id) {
            Some(player) => {
                player.apply_transform(transform);
                true
            }
            None => false,
        }
    }

    /// Subtracts `amount` from a player's health.
    ///
    /// At or below zero the player dies: `loss_count` goes up by one and
    /// health is restored to `max_hp`. A negative `amount` heals, but never
    /// past `max_hp`.
    pub fn apply_damage(&mut self, session_id: &SessionId, amount: i32) -> DamageOutcome {
        let Some(player) = self.players.get_mut(session_id) else {
            return DamageOutcome::NotFound;
        };

        let new_hp = i64::from(player.current_hp) - i64::from(amount);
        if new_hp > 0 {
            player.current_hp = new_hp.min(i64::from(player.max_hp)) as u32;
            return DamageOutcome::Survived;
        }

        player.loss_count = player.loss_count.saturating_add(1);
        player.current_hp = player.max_hp;
        DamageOutcome::Died
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&Player> {
        self.players.get(session_id)
    }

    pub(crate) fn get_mut(&mut self, session_id: &SessionId) -> Option<&mut Player> {
        self.players.get_mut(session_id)
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.players.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SessionId, &Player)> {
        self.players.iter()
    }

    /// Number of players currently holding a spawn slot.
    pub fn bound_count(&self) -> usize {
        self.players
            .values()
            .filter(|p| p.spawn_index.is_some())
            .count()
    }
}
