//! Authentication session boundary
//!
//! The login, refresh and logout flows live outside this workspace. Clients
//! only need the current bearer token and device fingerprint, which they read
//! through [`TokenProvider`].

use std::sync::{Arc, RwLock};

use tracing::info;

/// Source of credentials attached to every API request
pub trait TokenProvider: Send + Sync {
    /// Current bearer token, if any
    fn bearer_token(&self) -> Option<String>;

    /// Fingerprint of the device the session was issued for
    fn device_fingerprint(&self) -> Option<String> {
        None
    }

    fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }
}

#[derive(Debug, Default)]
struct SessionData {
    token: Option<String>,
    fingerprint: Option<String>,
}

/// In-memory session shared between clients
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionData>>,
}

impl SessionHandle {
    /// Create an empty, unauthenticated session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that already holds a token
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(token, None);
        session
    }

    /// Store the credentials issued by a successful login
    pub fn login(&self, token: impl Into<String>, fingerprint: Option<String>) {
        let token = token.into();
        let mut data = self.inner.write().unwrap_or_else(|e| e.into_inner());
        data.token = (!token.trim().is_empty()).then_some(token);
        data.fingerprint = fingerprint;
        info!("Session established");
    }

    /// Replace the bearer token after a refresh, keeping the fingerprint
    pub fn refresh(&self, token: impl Into<String>) {
        let token = token.into();
        let mut data = self.inner.write().unwrap_or_else(|e| e.into_inner());
        data.token = (!token.trim().is_empty()).then_some(token);
    }

    /// Drop all credentials
    pub fn logout(&self) {
        let mut data = self.inner.write().unwrap_or_else(|e| e.into_inner());
        data.token = None;
        data.fingerprint = None;
        info!("Session cleared");
    }
}

impl TokenProvider for SessionHandle {
    fn bearer_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .token
            .clone()
    }

    fn device_fingerprint(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .fingerprint
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_refresh_logout() {
        let session = SessionHandle::new();
        assert!(!session.is_authenticated());

        session.login("abc", Some("device-1".to_string()));
        assert_eq!(session.bearer_token().as_deref(), Some("abc"));
        assert_eq!(session.device_fingerprint().as_deref(), Some("device-1"));

        let shared = session.clone();
        shared.refresh("def");
        assert_eq!(session.bearer_token().as_deref(), Some("def"));
        assert_eq!(session.device_fingerprint().as_deref(), Some("device-1"));

        session.logout();
        assert!(!shared.is_authenticated());
        assert_eq!(shared.device_fingerprint(), None);
    }

    #[test]
    fn test_blank_token_is_not_authenticated() {
        let session = SessionHandle::with_token("  ");
        assert!(!session.is_authenticated());
    }
}
