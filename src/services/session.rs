//! Session storage: token issuance, lookup and sliding refresh, plus the expiry sweep.
//!
//! ARCHITECTURE
//! ============
//! Clients hold a random 32-byte hex token. The database only stores its
//! SHA-256 digest, so a leaked `sessions` table cannot be replayed.
//!
//! TRADE-OFFS
//! ==========
//! Expiry slides forward at most once per `update_age` window. Refreshing on
//! every request would turn each authenticated read into a write.

use std::fmt::Write;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::auth::{AuthSession, Session, User};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// SHA-256 hex digest of a session token, as stored in `sessions.token_hash`.
#[must_use]
pub fn hash_token(token: &str) -> String {
    bytes_to_hex(&Sha256::digest(token.as_bytes()))
}

/// Lifetime policy for sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Lifetime granted at creation and on refresh.
    pub ttl: TimeDelta,
    /// Minimum age of the last refresh before expiry is extended again.
    pub update_age: TimeDelta,
}

impl SessionPolicy {
    /// Whether a session expiring at `expires_at` is due for an extension.
    #[must_use]
    pub fn needs_refresh(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        expires_at - now < self.ttl - self.update_age
    }
}

/// Client metadata recorded alongside a new session.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

fn session_from_row(row: &PgRow, token: &str) -> Session {
    Session {
        id: row.get("session_id"),
        user_id: row.get("user_id"),
        token: token.to_owned(),
        expires_at: row.get("expires_at"),
        created_at: row.get("session_created_at"),
        updated_at: row.get("session_updated_at"),
        ip_address: row.get("ip_address"),
        user_agent: row.get("user_agent"),
    }
}

/// Create a session for `user_id`, returning it with its plaintext token.
pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    policy: SessionPolicy,
    meta: &ClientMeta,
) -> Result<Session, sqlx::Error> {
    let token = generate_token();
    let expires_at = Utc::now() + policy.ttl;
    let row = sqlx::query(
        r"INSERT INTO sessions (token_hash, user_id, expires_at, ip_address, user_agent)
          VALUES ($1, $2, $3, $4, $5)
          RETURNING id AS session_id, user_id, expires_at,
                    created_at AS session_created_at, updated_at AS session_updated_at,
                    ip_address, user_agent",
    )
    .bind(hash_token(&token))
    .bind(user_id)
    .bind(expires_at)
    .bind(&meta.ip_address)
    .bind(&meta.user_agent)
    .fetch_one(pool)
    .await?;

    Ok(session_from_row(&row, &token))
}

/// Validate a token and return the session with its user.
///
/// Expired or unknown tokens yield `Ok(None)`. Sessions past their refresh
/// point get a new expiry before being returned.
pub async fn validate_session(
    pool: &PgPool,
    token: &str,
    policy: SessionPolicy,
) -> Result<Option<AuthSession>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT
              s.id AS session_id,
              s.user_id,
              s.expires_at,
              s.created_at AS session_created_at,
              s.updated_at AS session_updated_at,
              s.ip_address,
              s.user_agent,
              u.email,
              u.name,
              u.email_verified,
              u.image,
              u.created_at AS user_created_at,
              u.updated_at AS user_updated_at
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          WHERE s.token_hash = $1 AND s.expires_at > now()",
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut session = session_from_row(&row, token);
    let user = User {
        id: row.get("user_id"),
        email: row.get("email"),
        name: row.get("name"),
        email_verified: row.get("email_verified"),
        image: row.get("image"),
        created_at: row.get("user_created_at"),
        updated_at: row.get("user_updated_at"),
    };

    let now = Utc::now();
    if policy.needs_refresh(session.expires_at, now) {
        let expires_at = now + policy.ttl;
        sqlx::query("UPDATE sessions SET expires_at = $2, updated_at = $3 WHERE id = $1")
            .bind(session.id)
            .bind(expires_at)
            .bind(now)
            .execute(pool)
            .await?;
        tracing::debug!(session_id = %session.id, "session expiry extended");
        session.expires_at = expires_at;
        session.updated_at = now;
    }

    Ok(Some(AuthSession { session, user }))
}

/// Delete a session by token.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(hash_token(token))
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete every expired session. Returns the number of rows removed.
pub async fn delete_expired_sessions(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Spawn the background task that sweeps expired sessions.
pub fn spawn_session_sweeper(pool: PgPool, every: Duration) -> JoinHandle<()> {
    tracing::info!(interval_secs = every.as_secs(), "expired session sweep configured");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match delete_expired_sessions(&pool).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "expired sessions deleted"),
                Err(e) => tracing::warn!(error = %e, "expired session sweep failed"),
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
