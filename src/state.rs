//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` carries what the router needs: the auth provider, held as a
//! trait object so tests can swap in a mock without a database, and the
//! browser origins allowed to send credentialed requests.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::auth::AuthProvider;

/// Shared application state, handed to `routes::app` at startup.
/// Clone is cheap: every field is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    /// Empty means any origin, without credentials.
    pub cors_allowed_origins: Arc<[HeaderValue]>,
}

impl AppState {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth, cors_allowed_origins: Arc::from([]) }
    }

    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<HeaderValue>) -> Self {
        self.cors_allowed_origins = origins.into();
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
