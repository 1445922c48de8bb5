//! The session manager: issues and retires session ids.
//!
//! `SessionManager` is a plain `HashMap` owner with no interior locking.
//! It is meant to sit behind a single mutex (or inside a single task) in
//! the layer that accepts connections.

use std::collections::HashMap;
use std::time::Instant;

use arena_protocol::SessionId;
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::{Session, SessionConfig, SessionError};

/// Registry of open sessions.
///
/// ```text
/// issue() / register() ──→ [open] ──→ close()
/// ```
///
/// Every id handed out is unique among the sessions currently open, which
/// is the only uniqueness rooms rely on.
pub struct SessionManager {
    sessions: HashMap<SessionId, Session>,
    config: SessionConfig,
}

impl SessionManager {
    /// Creates an empty manager.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
        }
    }

    /// Opens a session under a freshly generated id.
    pub fn issue(&mut self) -> SessionId {
        let id = loop {
            let candidate = SessionId::new(generate_id(self.config.id_length));
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        self.insert(id.clone());
        id
    }

    /// Opens a session under an id supplied by the transport.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if the id is in use.
    pub fn register(&mut self, id: SessionId) -> Result<(), SessionError> {
        if self.sessions.contains_key(&id) {
            return Err(SessionError::AlreadyConnected(id));
        }
        self.insert(id);
        Ok(())
    }

    /// Closes an open session, freeing its id for reuse.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no such session is open.
    pub fn close(&mut self, id: &SessionId) -> Result<Session, SessionError> {
        let session = self
            .sessions
            .remove(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        tracing::info!(session_id = %id, "session closed");
        Ok(session)
    }

    /// Looks up an open session.
    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Returns `true` if the session is open.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no session is open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn insert(&mut self, id: SessionId) {
        tracing::info!(session_id = %id, "session opened");
        let session = Session {
            id: id.clone(),
            opened_at: Instant::now(),
        };
        self.sessions.insert(id, session);
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Random alphanumeric id of the given length.
fn generate_id(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len.max(1))
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(id: &str) -> SessionId {
        SessionId::new(id)
    }

    #[test]
    fn test_issue_returns_configured_length_alphanumeric_id() {
        let mut mgr = SessionManager::new(SessionConfig { id_length: 12 });

        let id = mgr.issue();

        assert_eq!(id.as_str().len(), 12);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(mgr.contains(&id));
    }

    #[test]
    fn test_issue_many_ids_are_unique() {
        let mut mgr = SessionManager::default();

        for _ in 0..200 {
            mgr.issue();
        }

        assert_eq!(mgr.len(), 200);
    }

    #[test]
    fn test_issue_zero_length_config_still_yields_id() {
        let mut mgr = SessionManager::new(SessionConfig { id_length: 0 });
        let id = mgr.issue();
        assert_eq!(id.as_str().len(), 1);
    }

    #[test]
    fn test_register_duplicate_returns_already_connected() {
        let mut mgr = SessionManager::default();
        mgr.register(sid("abc")).unwrap();

        let result = mgr.register(sid("abc"));

        assert!(
            matches!(result, Err(SessionError::AlreadyConnected(ref id)) if id == &sid("abc"))
        );
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_close_open_session_removes_it() {
        let mut mgr = SessionManager::default();
        let id = mgr.issue();

        let closed = mgr.close(&id).unwrap();

        assert_eq!(closed.id, id);
        assert!(mgr.get(&id).is_none());
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_close_unknown_session_returns_not_found() {
        let mut mgr = SessionManager::default();
        let result = mgr.close(&sid("ghost"));
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[test]
    fn test_register_after_close_reuses_id() {
        let mut mgr = SessionManager::default();
        mgr.register(sid("abc")).unwrap();
        mgr.close(&sid("abc")).unwrap();

        assert!(mgr.register(sid("abc")).is_ok());
    }
}
