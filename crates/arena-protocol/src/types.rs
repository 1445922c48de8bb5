//! Core protocol types exchanged between clients and a room.
//!
//! Everything here is plain data: identifiers, the client-reported
//! transform, the join payload, and the inbound/outbound message enums.
//! Field names on the wire follow the Rust field names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shot data as the client sent it. The room never looks inside.
pub type ShotPayload = serde_json::Value;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier of one client connection inside a room.
///
/// Issued by the session layer, unique among open sessions, and used as
/// the key of the room-state mapping. Serialized as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an already-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A unique identifier for a room instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who an outbound [`ServerMessage`] is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every client in the room.
    All,

    /// One specific client (e.g. the player being respawned).
    Session(SessionId),

    /// Every client except the given one (e.g. relaying a shot).
    AllExcept(SessionId),
}

// ---------------------------------------------------------------------------
// Kinematics
// ---------------------------------------------------------------------------

/// A position or velocity in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Pitch (`x`) and yaw (`y`) of a player's view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
}

/// The client-reported transform carried by a `move` message.
///
/// The server trusts these values and republishes them verbatim; there is
/// no plausibility check.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Rotation,
}

// ---------------------------------------------------------------------------
// Inbound payloads
// ---------------------------------------------------------------------------

/// The payload a client sends when joining a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinOptions {
    /// Initial and maximum health.
    pub hp: u32,

    /// Movement speed, fixed for the life of the player.
    pub speed: f32,

    /// Optional initial transform. Velocity and rotation are adopted;
    /// the position is always taken from the assigned spawn point.
    #[serde(default)]
    pub transform: Option<Transform>,
}

impl JoinOptions {
    /// Join options with the given vitals and no initial transform.
    pub fn new(hp: u32, speed: f32) -> Self {
        Self {
            hp,
            speed,
            transform: None,
        }
    }
}

/// A report that some player took damage.
///
/// Any client may report damage against any target; the amount is not
/// validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    #[serde(alias = "id")]
    pub target: SessionId,
    #[serde(alias = "value")]
    pub amount: i32,
}

/// Messages a client sends to its room.
///
/// Adjacently tagged: `{ "type": "move", "data": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Overwrite the sender's transform.
    Move(Transform),

    /// Opaque shot data, relayed to every other client untouched.
    Shoot(ShotPayload),

    /// Apply damage to a (possibly different) player.
    Damage(DamageReport),
}

// ---------------------------------------------------------------------------
// Outbound payloads
// ---------------------------------------------------------------------------

/// Where a dead player reappears.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespawnPoint {
    pub x: f32,
    pub z: f32,
}

/// Messages a room sends to its clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// One-time greeting sent to a client right after it joins.
    #[serde(rename = "hello")]
    Hello(String),

    /// A shot relayed verbatim from another client.
    Shoot(ShotPayload),

    /// Sent only to the player who just died: its new spawn coordinates.
    Restart(RespawnPoint),
}
