//! Session lookup seam
//!
//! Authentication itself lives in an external identity provider. The
//! content layer only asks "is there a current session?" before a write.

use async_trait::async_trait;
use sitecontent_core_types::Sensitive;

use crate::errors::Result;

/// An authenticated session as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: Sensitive<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            access_token: Sensitive::new(access_token.into()),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Source of the current session
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session, or `None` when nobody is signed in
    ///
    /// # Errors
    ///
    /// Returns an error when the provider itself cannot be reached.
    async fn current_session(&self) -> Result<Option<Session>>;
}

/// Provider with nobody signed in
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSession;

#[async_trait]
impl SessionProvider for AnonymousSession {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(None)
    }
}

/// Provider that always returns one fixed session
#[derive(Debug, Clone)]
pub struct StaticSession(Session);

impl StaticSession {
    pub fn new(session: Session) -> Self {
        Self(session)
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(Some(self.0.clone()))
    }
}
