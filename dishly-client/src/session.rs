//! Bearer-token access for authenticated feeds.
//!
//! Favorites, collections and the "only following" search filter require a
//! signed-in user. The client never stores credentials itself; it asks a
//! [`SessionProvider`] for the current token before every request.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Supplies the bearer token attached to outgoing requests.
pub trait SessionProvider: Send + Sync {
    /// Current token, or `None` when signed out.
    fn token(&self) -> Option<String>;
}

/// No session: requests go out unauthenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl SessionProvider for Anonymous {
    fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

impl SessionProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// A token that changes while the application runs.
///
/// Clones share the same slot.
///
/// ```
/// use dishly_client::{SessionProvider, SharedSession};
///
/// let session = SharedSession::default();
/// assert_eq!(session.token(), None);
///
/// session.sign_in("abc");
/// assert_eq!(session.token().as_deref(), Some("abc"));
///
/// session.sign_out();
/// assert_eq!(session.token(), None);
/// ```
#[derive(Clone, Default)]
pub struct SharedSession {
    token: Arc<RwLock<Option<String>>>,
}

impl SharedSession {
    /// Store `token` as the current session.
    pub fn sign_in(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Forget the current session.
    pub fn sign_out(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a token is stored.
    pub fn is_signed_in(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for SharedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSession")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

impl SessionProvider for SharedSession {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<P: SessionProvider + ?Sized> SessionProvider for Arc<P> {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token_is_redacted() {
        let token = StaticToken::new("secret");
        assert_eq!(token.token().as_deref(), Some("secret"));
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[test]
    fn test_shared_session_clones_share_state() {
        let session = SharedSession::default();
        let handle = session.clone();
        handle.sign_in("t1");
        assert!(session.is_signed_in());
        assert_eq!(session.token().as_deref(), Some("t1"));
    }

    #[test]
    fn test_arc_provider() {
        let provider: Arc<dyn SessionProvider> = Arc::new(StaticToken::new("t"));
        assert_eq!(provider.token().as_deref(), Some("t"));
    }
}
