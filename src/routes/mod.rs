//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Application routes sit behind the session guard (`route_layer`), and
//! their public/protected flags are registered in the same place so the two
//! cannot drift. Everything under the auth provider's base path is handed to
//! the provider untouched and never passes through the guard.
//!
//! CORS
//! ====
//! With no configured origins the service answers any origin but never
//! allows credentials, so cross-origin browsers cannot use the session
//! cookie. Listing origins switches to an exact allow-list with credentials.

pub mod root;

use std::convert::Infallible;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware;
use axum::routing::get;
use tower::service_fn;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::access::{Access, RouteTable};
use crate::auth::guard::{AuthGuard, GuardState, require_session};
use crate::state::AppState;

/// Public/protected flags for every application route.
pub(crate) fn route_table() -> RouteTable {
    RouteTable::builder()
        .group("/", Access::Protected)
        .route(Method::GET, "/", Access::Public)
        .route(Method::GET, "/healthz", Access::Public)
        .build()
}

fn cors_layer(allowed_origins: &[HeaderValue]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins.iter().cloned()))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_allowed_origins);
    let gate = GuardState::new(AuthGuard::new(state.auth.clone()), route_table());

    let provider = state.auth.clone();
    let forward = service_fn(move |request: Request| {
        let provider = provider.clone();
        async move { Ok::<_, Infallible>(provider.handle_auth_request(request).await) }
    });
    let base_path = state.auth.base_path().to_owned();
    let provider_routes = format!("{base_path}/{{*rest}}");

    Router::new()
        .route("/", get(root::hello))
        .route("/protected", get(root::protected))
        .route("/healthz", get(healthz))
        .route_layer(middleware::from_fn_with_state(gate, require_session))
        .route_service(&base_path, forward.clone())
        .route_service(&provider_routes, forward)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
