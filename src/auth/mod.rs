//! Authorization gate: provider boundary, route access table, guard, and
//! per-request session context.
//!
//! DESIGN
//! ======
//! The guard only ever talks to an [`AuthProvider`] trait object. It never
//! sees tokens or tables; it hands the provider a normalized header
//! map and gets back a resolved [`AuthSession`] or nothing. Whatever the
//! guard resolves is written once into the request's [`context::SessionContext`]
//! and handlers read it from there without further I/O.
//!
//! ERROR HANDLING
//! ==============
//! "No session" and "provider could not answer" are different outcomes:
//! the first is `Ok(None)` and becomes a 401, the second is
//! [`AuthError::Backend`] and becomes a 503. A database outage must never
//! look like a logged-out user.

pub mod access;
pub mod context;
pub mod guard;

use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

// =============================================================================
// DATA MODEL
// =============================================================================

/// A user record as owned by the auth provider. Read-only to the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One login instance. `token` is the bearer value the client presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A validated session together with the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub session: Session,
    pub user: User,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider could not reach its store.
    #[error("auth backend unavailable: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be between {min} and {max} characters")]
    WeakPassword { min: usize, max: usize },
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

/// Map an auth error to the HTTP status the caller sees.
#[must_use]
pub fn auth_error_to_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Backend(_) => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::MalformedBody(_) | AuthError::InvalidEmail | AuthError::WeakPassword { .. } => {
            StatusCode::BAD_REQUEST
        }
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = auth_error_to_status(&self);
        let message = match &self {
            AuthError::Backend(e) => {
                tracing::error!(error = %e, "auth backend unavailable");
                "auth backend unavailable".to_owned()
            }
            AuthError::PasswordHash(e) => {
                tracing::error!(error = %e, "password hashing failed");
                "internal error".to_owned()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// =============================================================================
// PROVIDER BOUNDARY
// =============================================================================

/// External subsystem that owns users and their sessions.
///
/// Implementations must be safe to share across concurrent requests; the
/// guard holds a single `Arc<dyn AuthProvider>` for the whole process.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the session carried by `headers`.
    ///
    /// Returns `Ok(None)` when no live session matches the presented token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Backend`] when the session store is unreachable.
    async fn resolve_session(&self, headers: &HeaderMap) -> Result<Option<AuthSession>, AuthError>;

    /// Serve a provider-owned route (sign-up, sign-in, sign-out, ...).
    /// The request arrives untouched, full URI included.
    async fn handle_auth_request(&self, request: Request) -> Response;

    /// Path prefix under which provider-owned routes are mounted.
    fn base_path(&self) -> &str;
}
