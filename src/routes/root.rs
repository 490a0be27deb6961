//! Application handlers: a public greeting and a session-protected echo.

use axum::response::Json;
use serde::Serialize;

use crate::auth::context::{CurrentSession, CurrentUser};
use crate::auth::{Session, User};

pub const GREETING: &str = "Hello World!";

/// `GET /`: public.
pub async fn hello() -> &'static str {
    GREETING
}

#[derive(Serialize)]
pub struct ProtectedBody {
    pub session: Session,
    pub user: User,
}

/// `GET /protected`: the caller's session and user.
pub async fn protected(CurrentSession(current): CurrentSession, CurrentUser(user): CurrentUser) -> Json<ProtectedBody> {
    Json(ProtectedBody { session: current.session.clone(), user })
}
