//! Room state and lifecycle for arena games.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns a
//! [`RoomController`]. The controller in turn owns the room's players,
//! spawn slots and skins, and turns client messages into state changes
//! and outbound messages.
//!
//! # Key types
//!
//! - [`SpawnAllocator`]: which spawn slots are bound, and who gets which
//! - [`PlayerRegistry`]: session id → [`Player`], the synchronized state
//! - [`RoomController`]: join/leave/message handling, damage and respawn
//! - [`RoomManager`]: creates/destroys rooms, routes sessions
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomConfig`]: capacity, spawn layout, skins, greeting

mod config;
mod controller;
mod error;
mod manager;
mod player;
mod registry;
mod room;
mod skins;
mod spawn;

pub use config::{DEFAULT_SPAWN_POINTS, RoomConfig, SpawnPoint};
pub use controller::{Outbound, RoomController, RoomSnapshot};
pub use error::RoomError;
pub use manager::{RoomManager, collect_info};
pub use player::{DamageOutcome, Player};
pub use registry::PlayerRegistry;
pub use room::{PlayerSender, RoomHandle, RoomInfo, RoomOutbound};
pub use skins::SkinPool;
pub use spawn::{SpawnAllocator, SpawnSlot};
