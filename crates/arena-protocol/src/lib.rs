//! Wire protocol for arena rooms.
//!
//! This crate defines what clients and rooms say to each other:
//!
//! - **Types** ([`SessionId`], [`ClientMessage`], [`ServerMessage`],
//!   [`Transform`], [`JoinOptions`], …): the payloads exchanged with a room.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those payloads are
//!   turned into frames and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! The protocol layer knows nothing about rooms, spawn points or sessions
//! beyond their identifiers. It sits between whatever transport carries the
//! frames and the room actor that interprets them:
//!
//! ```text
//! Transport (frames) → Protocol (ClientMessage) → Room (state changes)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, DamageReport, JoinOptions, Recipient, RespawnPoint,
    RoomId, Rotation, ServerMessage, SessionId, ShotPayload, Transform, Vec3,
};
