//! Provider-owned routes: email sign-up/sign-in, sign-out, session lookup.

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::{ProviderCtx, cookie};
use crate::auth::{AuthError, User};
use crate::services::account::{self, NewAccount};
use crate::services::password::{self, normalize_email};
use crate::services::session::{self, ClientMeta};

pub(crate) fn router(ctx: ProviderCtx) -> Router {
    let base = ctx.config.base_path.clone();
    Router::new()
        .route(&format!("{base}/sign-up/email"), post(sign_up_email))
        .route(&format!("{base}/sign-in/email"), post(sign_in_email))
        .route(&format!("{base}/sign-out"), post(sign_out))
        .route(&format!("{base}/get-session"), get(get_session))
        .route(&format!("{base}/ok"), get(ok))
        .fallback(not_found)
        .with_state(ctx)
}

#[derive(Deserialize)]
struct SignUpBody {
    email: String,
    password: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Deserialize)]
struct SignInBody {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
    user: User,
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn client_meta(headers: &HeaderMap) -> ClientMeta {
    let ip_address = header_str(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_owned()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"));
    ClientMeta { ip_address, user_agent: header_str(headers, "user-agent") }
}

fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("user")
        .to_owned()
}

fn session_response(ctx: &ProviderCtx, token: String, user: User) -> Response {
    let max_age = time::Duration::seconds(ctx.config.policy.ttl.num_seconds());
    let jar = CookieJar::new().add(cookie::session_cookie(token.clone(), max_age, ctx.config.cookie_secure));
    (jar, Json(TokenResponse { token, user })).into_response()
}

/// `POST {base}/sign-up/email`: create an account and log it in.
async fn sign_up_email(
    State(ctx): State<ProviderCtx>,
    headers: HeaderMap,
    WithRejection(Json(body), _): WithRejection<Json<SignUpBody>, AuthError>,
) -> Result<Response, AuthError> {
    let email = normalize_email(&body.email).ok_or(AuthError::InvalidEmail)?;
    password::validate_password(&body.password)?;

    let name = match body.name.trim() {
        "" => name_from_email(&email),
        trimmed => trimmed.to_owned(),
    };
    let password_hash = password::hash_password(body.password).await?;

    let new_account = NewAccount {
        email: &email,
        name: &name,
        image: body.image.as_deref(),
        password_hash: &password_hash,
    };
    let user = account::create_account(&ctx.pool, &new_account)
        .await?
        .ok_or(AuthError::EmailTaken)?;
    tracing::info!(user_id = %user.id, "account created");

    let session = session::create_session(&ctx.pool, user.id, ctx.config.policy, &client_meta(&headers)).await?;
    Ok(session_response(&ctx, session.token, user))
}

/// `POST {base}/sign-in/email`: verify credentials and issue a session.
async fn sign_in_email(
    State(ctx): State<ProviderCtx>,
    headers: HeaderMap,
    WithRejection(Json(body), _): WithRejection<Json<SignInBody>, AuthError>,
) -> Result<Response, AuthError> {
    let email = normalize_email(&body.email).ok_or(AuthError::InvalidEmail)?;

    let Some((user, password_hash)) = account::find_credentials(&ctx.pool, &email).await? else {
        // Same argon2 cost as a real account, so response time does not reveal
        // whether the email is registered.
        password::verify_against_placeholder(body.password).await;
        tracing::warn!("sign-in for unknown email");
        return Err(AuthError::InvalidCredentials);
    };
    if !password::verify_password(password_hash, body.password).await {
        tracing::warn!(user_id = %user.id, "sign-in with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let session = session::create_session(&ctx.pool, user.id, ctx.config.policy, &client_meta(&headers)).await?;
    tracing::info!(user_id = %user.id, session_id = %session.id, "signed in");
    Ok(session_response(&ctx, session.token, user))
}

/// `POST {base}/sign-out`: delete the presented session, clear the cookie.
async fn sign_out(State(ctx): State<ProviderCtx>, headers: HeaderMap) -> Result<Response, AuthError> {
    if let Some(token) = cookie::session_token(&headers) {
        session::delete_session(&ctx.pool, &token).await?;
    }
    let jar = CookieJar::new().add(cookie::clear_session_cookie(ctx.config.cookie_secure));
    Ok((jar, Json(serde_json::json!({ "success": true }))).into_response())
}

/// `GET {base}/get-session`: `{ session, user }` or `null`.
async fn get_session(State(ctx): State<ProviderCtx>, headers: HeaderMap) -> Result<Response, AuthError> {
    let resolved = ctx.resolve(&headers).await?;
    Ok(Json(resolved).into_response())
}

async fn ok() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" })))
}

#[cfg(test)]
#[path = "handlers_test.rs"]
mod tests;
