//! Email normalization and argon2 password hashing.
//!
//! Hashing and verification are CPU-bound; the async wrappers push them onto
//! the blocking pool so a burst of sign-ins cannot stall request handling.

use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::auth::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

/// Reject passwords outside the accepted length range.
///
/// # Errors
///
/// Returns [`AuthError::WeakPassword`] when the length is out of range.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let len = password.chars().count();
    if (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        Ok(())
    } else {
        Err(AuthError::WeakPassword { min: MIN_PASSWORD_LEN, max: MAX_PASSWORD_LEN })
    }
}

pub(crate) fn hash_password_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

pub(crate) fn verify_password_blocking(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// PHC string hashed with the same parameters as real credentials. It backs
/// no account.
pub(crate) fn placeholder_hash() -> Option<&'static str> {
    static VALUE: OnceLock<Option<String>> = OnceLock::new();
    VALUE
        .get_or_init(|| hash_password_blocking("no account matches this email").ok())
        .as_deref()
}

/// Hash a password into an argon2 PHC string.
///
/// # Errors
///
/// Returns [`AuthError::PasswordHash`] if hashing fails or the worker panics.
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

/// Check a password against a stored PHC string. Malformed hashes never match.
pub async fn verify_password(hash: String, password: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password_blocking(&hash, &password))
        .await
        .unwrap_or(false)
}

/// Run a full argon2 verification against [`placeholder_hash`] and discard
/// the result. Used on the sign-in path when no account matches the email.
pub async fn verify_against_placeholder(password: String) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(hash) = placeholder_hash() {
            verify_password_blocking(hash, &password);
        }
    })
    .await;
}

#[cfg(test)]
#[path = "password_test.rs"]
mod tests;
