//! Postgres-backed auth provider.
//!
//! DESIGN
//! ======
//! `PgAuthProvider` implements [`AuthProvider`] over the `users`,
//! `accounts`, and `sessions` tables. Its own routes (sign-up, sign-in,
//! sign-out, get-session) live on a private Axum router; the application
//! forwards whole requests to it through `handle_auth_request`, so the
//! application never needs to know which endpoints the provider exposes.

pub mod cookie;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::HeaderMap;
use axum::response::Response;
use sqlx::PgPool;
use tower::ServiceExt;

use crate::auth::{AuthError, AuthProvider, AuthSession};
use crate::config::Config;
use crate::services::session::{self, SessionPolicy};

/// Provider settings derived from [`Config`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Mount point for provider-owned routes, without trailing slash.
    pub base_path: String,
    pub policy: SessionPolicy,
    pub cookie_secure: bool,
}

impl ProviderConfig {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_path: config.auth_base_path.clone(),
            policy: SessionPolicy { ttl: config.session_ttl, update_age: config.session_update_age },
            cookie_secure: config.cookie_secure,
        }
    }
}

/// State shared by the provider's route handlers.
#[derive(Clone)]
pub(crate) struct ProviderCtx {
    pub(crate) pool: PgPool,
    pub(crate) config: Arc<ProviderConfig>,
}

impl ProviderCtx {
    pub(crate) async fn resolve(&self, headers: &HeaderMap) -> Result<Option<AuthSession>, AuthError> {
        let Some(token) = cookie::session_token(headers) else {
            return Ok(None);
        };
        Ok(session::validate_session(&self.pool, &token, self.config.policy).await?)
    }
}

pub struct PgAuthProvider {
    ctx: ProviderCtx,
    router: Router,
}

impl PgAuthProvider {
    #[must_use]
    pub fn new(pool: PgPool, config: ProviderConfig) -> Self {
        let ctx = ProviderCtx { pool, config: Arc::new(config) };
        let router = handlers::router(ctx.clone());
        Self { ctx, router }
    }
}

#[async_trait::async_trait]
impl AuthProvider for PgAuthProvider {
    async fn resolve_session(&self, headers: &HeaderMap) -> Result<Option<AuthSession>, AuthError> {
        self.ctx.resolve(headers).await
    }

    async fn handle_auth_request(&self, request: Request) -> Response {
        match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    fn base_path(&self) -> &str {
        &self.ctx.config.base_path
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
