//! Session identity for arena rooms.
//!
//! This crate answers two questions for the layer that accepts clients:
//!
//! 1. **May this client enter?** The [`Authenticator`] hook. The default,
//!    [`AcceptAll`], admits everyone.
//! 2. **What is this client called?** [`SessionManager`] issues the
//!    opaque, unique [`SessionId`](arena_protocol::SessionId) that rooms
//!    use as the key of their player mapping.
//!
//! ```text
//! Room Layer (above)     ← keys players by SessionId
//!     ↕
//! Session Layer (here)   ← authenticates, issues and retires ids
//!     ↕
//! Protocol Layer (below) ← defines SessionId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod manager;
mod session;

pub use auth::{AcceptAll, Authenticator};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionConfig};
