//! Authentication hook consulted before a client is given a session.
//!
//! Rooms don't authenticate anyone themselves. Whoever accepts
//! connections calls [`Authenticator::authenticate`] with the token the
//! client presented and only opens a session on `Ok`. Swap in a JWT check,
//! an API-key lookup, or a test double without touching room code.

use crate::SessionError;

/// Decides whether a client may open a session.
///
/// `Send + Sync + 'static` because a single authenticator is shared by all
/// connection tasks for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use arena_session::{Authenticator, SessionError};
///
/// /// Admits only clients presenting the shared secret.
/// struct SharedSecret(String);
///
/// impl Authenticator for SharedSecret {
///     async fn authenticate(&self, token: Option<&str>) -> Result<(), SessionError> {
///         match token {
///             Some(t) if t == self.0 => Ok(()),
///             _ => Err(SessionError::AuthFailed("bad secret".into())),
///         }
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Validates the optional token a client presented on join.
    ///
    /// # Returns
    /// - `Ok(())`: admit the client
    /// - `Err(SessionError::AuthFailed)`: reject it
    fn authenticate(
        &self,
        token: Option<&str>,
    ) -> impl std::future::Future<Output = Result<(), SessionError>> + Send;
}

/// Admits every client unconditionally. The default policy for rooms.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Authenticator for AcceptAll {
    async fn authenticate(&self, _token: Option<&str>) -> Result<(), SessionError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accept_all_admits_missing_token() {
        assert!(AcceptAll.authenticate(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_accept_all_admits_any_token() {
        assert!(AcceptAll.authenticate(Some("garbage")).await.is_ok());
    }
}
