//! Session records and their configuration.

use std::time::Instant;

use arena_protocol::SessionId;

/// Configuration for session id issuance.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Number of alphanumeric characters in an issued session id.
    ///
    /// Default: 9.
    pub id_length: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { id_length: 9 }
    }
}

/// One open client session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The id rooms know this client by.
    pub id: SessionId,

    /// When the session was opened.
    pub opened_at: Instant,
}
