//! # Arena
//!
//! Room server for small multiplayer arena shooters.
//!
//! Clients join a room, get bound to one of the room's spawn points and
//! report their own movement, shots and hits. The room keeps the
//! authoritative player state (health, deaths, transform), relays shots,
//! and moves dead players to a fresh spawn point.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arena::prelude::*;
//!
//! # async fn demo() -> Result<(), ArenaError> {
//! arena::init_logging();
//!
//! let arena = Arena::builder().build(AcceptAll);
//! let room = arena.create_room(RoomConfig::default()).await;
//!
//! let mut alice = arena.connect(room, None, JoinOptions::new(10, 5.0)).await?;
//! // {"type":"hello","data":"world"}, then {"type":"state","data":{...}}
//! let hello = alice.next_frame().await?;
//! let state = alice.next_frame().await?;
//!
//! alice.deliver(br#"{"type":"shoot","data":{"x":1.5,"dir":"n"}}"#).await?;
//! alice.leave().await?;
//! # Ok(())
//! # }
//! ```

mod connection;
mod error;
mod logging;
mod server;

pub use connection::ClientConnection;
pub use error::ArenaError;
pub use logging::init_logging;
pub use server::{Arena, ArenaBuilder};

/// Re-exports of the types most callers need.
pub mod prelude {
    pub use crate::{Arena, ArenaBuilder, ArenaError, ClientConnection};

    #[cfg(feature = "json")]
    pub use arena_protocol::JsonCodec;
    pub use arena_protocol::{
        ClientMessage, Codec, DamageReport, JoinOptions, ProtocolError, Recipient,
        RespawnPoint, RoomId, Rotation, ServerMessage, SessionId, ShotPayload, Transform, Vec3,
    };
    pub use arena_room::{
        DamageOutcome, Player, RoomConfig, RoomError, RoomInfo, RoomOutbound, RoomSnapshot,
        SpawnPoint,
    };
    pub use arena_session::{AcceptAll, Authenticator, SessionConfig, SessionError};
}
