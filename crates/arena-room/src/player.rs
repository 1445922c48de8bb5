//! The per-session player entity.

use arena_protocol::{JoinOptions, Rotation, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::SpawnPoint;

/// One connected player's synchronized state.
///
/// Kinematic fields are client-reported and stored verbatim. Vitals obey
/// `current_hp <= max_hp`. The spawn binding is server-only and is not part
/// of the serialized room state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub max_hp: u32,
    pub current_hp: u32,
    /// Number of deaths. Never decreases.
    pub loss_count: u32,
    pub speed: f32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Rotation,
    /// Cosmetic skin, if the room hands them out.
    pub skin: Option<usize>,
    #[serde(skip)]
    pub(crate) spawn_index: Option<usize>,
}

impl Player {
    /// A player at full health standing on `spawn`.
    pub(crate) fn spawned(
        options: &JoinOptions,
        spawn_index: usize,
        spawn: SpawnPoint,
        skin: Option<usize>,
    ) -> Self {
        let initial = options.transform.unwrap_or_default();
        Self {
            max_hp: options.hp,
            current_hp: options.hp,
            loss_count: 0,
            speed: options.speed,
            position: ground(spawn),
            velocity: initial.velocity,
            rotation: initial.rotation,
            skin,
            spawn_index: Some(spawn_index),
        }
    }

    /// The spawn slot this player holds, `None` while unbound.
    pub fn spawn_index(&self) -> Option<usize> {
        self.spawn_index
    }

    /// Returns `true` while `current_hp > 0`.
    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Overwrites position, velocity and rotation.
    pub(crate) fn apply_transform(&mut self, transform: &Transform) {
        self.position = transform.position;
        self.velocity = transform.velocity;
        self.rotation = transform.rotation;
    }

    /// Binds the player to a new slot and moves it there.
    pub(crate) fn place_at(&mut self, spawn_index: usize, spawn: SpawnPoint) {
        self.spawn_index = Some(spawn_index);
        self.position = ground(spawn);
    }
}

fn ground(spawn: SpawnPoint) -> Vec3 {
    Vec3::new(spawn.x, 0.0, spawn.z)
}

/// Result of applying damage to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Health dropped but stayed above zero.
    Survived,
    /// Health reached zero. The player has already been restored to full
    /// health and its loss count bumped; it still needs a new spawn slot.
    Died,
    /// No player with that session id.
    NotFound,
}
