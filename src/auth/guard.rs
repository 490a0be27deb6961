//! Authorization guard and the Axum middleware that runs it.
//!
//! The middleware is installed with `route_layer`, so it only sees requests
//! that matched an application route and `MatchedPath` is always available.
//! The guard finishes (including the provider round-trip) before
//! `next.run` is called; handler and guard never overlap.

use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};

use super::access::{Access, RouteTable};
use super::context::{ContextError, SessionContext};
use super::{AuthError, AuthProvider, AuthSession};

/// Outcome of a guard check.
#[derive(Debug, Clone)]
pub enum Decision {
    Allow(Option<Arc<AuthSession>>),
    Reject,
}

/// Stateless gate in front of every application handler.
#[derive(Clone)]
pub struct AuthGuard {
    provider: Arc<dyn AuthProvider>,
}

impl AuthGuard {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Decide whether a request may reach its handler.
    ///
    /// Public routes are allowed without consulting the provider.
    ///
    /// # Errors
    ///
    /// Propagates provider failures unchanged; they are never folded into
    /// [`Decision::Reject`].
    pub async fn authorize(&self, access: Access, headers: &HeaderMap) -> Result<Decision, AuthError> {
        if access.is_public() {
            return Ok(Decision::Allow(None));
        }

        let headers = normalize_headers(headers);
        match self.provider.resolve_session(&headers).await? {
            Some(session) => Ok(Decision::Allow(Some(Arc::new(session)))),
            None => Ok(Decision::Reject),
        }
    }
}

/// Copy of `headers` without entries whose value is empty or blank.
#[must_use]
pub fn normalize_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(_, value)| !value.as_bytes().trim_ascii().is_empty())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

/// State for [`require_session`]: the guard plus the route access table.
#[derive(Clone)]
pub struct GuardState {
    pub guard: AuthGuard,
    pub routes: Arc<RouteTable>,
}

impl GuardState {
    #[must_use]
    pub fn new(guard: AuthGuard, routes: RouteTable) -> Self {
        Self { guard, routes: Arc::new(routes) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GuardRejection {
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => {
                (StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "error": "unauthorized" }))).into_response()
            }
            Self::Auth(e) => e.into_response(),
            Self::Context(e) => {
                tracing::error!(error = %e, "session context written twice");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": "internal error" })))
                    .into_response()
            }
        }
    }
}

/// Run the guard for the matched route, then the handler.
///
/// # Errors
///
/// Rejects with 401 when a protected route has no valid session and with
/// 503 when the provider cannot be reached.
pub async fn require_session(
    State(gate): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    let pattern = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_owned(), |m| m.as_str().to_owned());
    let access = gate.routes.access(request.method(), &pattern);

    let context = SessionContext::new();
    match gate.guard.authorize(access, request.headers()).await? {
        Decision::Allow(Some(session)) => {
            tracing::debug!(route = %pattern, user_id = %session.user.id, "session resolved");
            context.set(session)?;
        }
        Decision::Allow(None) => {}
        Decision::Reject => {
            tracing::debug!(route = %pattern, "rejected request without valid session");
            return Err(GuardRejection::Unauthorized);
        }
    }

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
