//! Per-request session slot, written by the guard and read by handlers.

use std::sync::{Arc, OnceLock};

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;

use super::{AuthSession, User};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("session context already populated for this request")]
    AlreadySet,
}

/// Write-once session slot carried in request extensions.
///
/// Clones share the same slot. Accessors never perform I/O; they return
/// whatever the guard resolved.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    slot: Arc<OnceLock<Arc<AuthSession>>>,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the slot. Only the first call succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::AlreadySet`] if a session was already written.
    pub fn set(&self, session: Arc<AuthSession>) -> Result<(), ContextError> {
        self.slot.set(session).map_err(|_| ContextError::AlreadySet)
    }

    /// The resolved session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Arc<AuthSession>> {
        self.slot.get().cloned()
    }

    /// The user embedded in the resolved session, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.slot.get().map(|s| &s.user)
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Current session. Rejects with 401 when the slot is empty.
pub struct CurrentSession(pub Arc<AuthSession>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .and_then(SessionContext::session)
            .map(Self)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Current user. Rejects with 401 when the slot is empty.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .and_then(SessionContext::user)
            .cloned()
            .map(Self)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
