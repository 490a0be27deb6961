//! Service configuration parsed from environment variables.
//!
//! Required:
//! - `DATABASE_URL`
//!
//! Optional:
//! - `HOST` (default `0.0.0.0`), `PORT` (default 8787)
//! - `DB_MAX_CONNECTIONS` (default 5)
//! - `AUTH_BASE_PATH` (default `/api/auth`)
//! - `SESSION_TTL_SECS` (default 7 days), `SESSION_UPDATE_AGE_SECS` (default 1 day)
//! - `SESSION_SWEEP_INTERVAL_SECS` (default 3600)
//! - `COOKIE_SECURE` (default false)
//! - `CORS_ALLOWED_ORIGINS` (comma-separated; unset means any origin without
//!   credentials)
//!
//! A value that is present but unparsable is an error, never a silent default.

use std::str::FromStr;

use axum::http::HeaderValue;
use chrono::TimeDelta;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_AUTH_BASE_PATH: &str = "/api/auth";
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_SESSION_UPDATE_AGE_SECS: i64 = 24 * 60 * 60;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid { var: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth_base_path: String,
    pub session_ttl: TimeDelta,
    pub session_update_age: TimeDelta,
    pub session_sweep_interval_secs: u64,
    pub cookie_secure: bool,
    /// Browser origins allowed to make credentialed requests.
    pub cors_allowed_origins: Vec<HeaderValue>,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is unset or any value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is unset or any value is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing { var: "DATABASE_URL" })?;

        let host = lookup("HOST")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let db_max_connections = parse_var(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(invalid("DB_MAX_CONNECTIONS", "0", "must be at least 1"));
        }

        let auth_base_path = parse_base_path(lookup("AUTH_BASE_PATH"))?;

        let session_ttl = parse_seconds(&lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        let session_update_age = parse_seconds(&lookup, "SESSION_UPDATE_AGE_SECS", DEFAULT_SESSION_UPDATE_AGE_SECS)?;
        let session_sweep_interval_secs =
            parse_var(&lookup, "SESSION_SWEEP_INTERVAL_SECS", DEFAULT_SESSION_SWEEP_INTERVAL_SECS)?;
        if session_sweep_interval_secs == 0 {
            return Err(invalid("SESSION_SWEEP_INTERVAL_SECS", "0", "must be positive"));
        }

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid("COOKIE_SECURE", &raw, "expected a boolean"))?,
            None => false,
        };

        let cors_allowed_origins = parse_origins(lookup("CORS_ALLOWED_ORIGINS"))?;

        Ok(Self {
            host,
            port,
            database_url,
            db_max_connections,
            auth_base_path,
            session_ttl,
            session_update_age,
            session_sweep_interval_secs,
            cookie_secure,
            cors_allowed_origins,
        })
    }

    /// `host:port` for the TCP listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { var, value: value.to_owned(), reason: reason.to_owned() }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| invalid(var, &raw, &e.to_string())),
        None => Ok(default),
    }
}

fn parse_seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: i64,
) -> Result<TimeDelta, ConfigError> {
    let secs = parse_var(lookup, var, default)?;
    if secs <= 0 {
        return Err(invalid(var, &secs.to_string(), "must be positive"));
    }
    TimeDelta::try_seconds(secs).ok_or_else(|| invalid(var, &secs.to_string(), "out of range"))
}

fn parse_base_path(raw: Option<String>) -> Result<String, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_AUTH_BASE_PATH.to_owned());
    };
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') {
        return Err(invalid("AUTH_BASE_PATH", &raw, "must start with '/' and not be the root"));
    }
    if trimmed.contains(['{', '}', '*']) {
        return Err(invalid("AUTH_BASE_PATH", &raw, "must not contain route parameters"));
    }
    Ok(trimmed.to_owned())
}

fn parse_origins(raw: Option<String>) -> Result<Vec<HeaderValue>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin == "*" {
                return Err(invalid("CORS_ALLOWED_ORIGINS", &raw, "wildcard cannot carry credentials"));
            }
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(invalid("CORS_ALLOWED_ORIGINS", &raw, "origins must be http(s) URLs"));
            }
            HeaderValue::from_str(origin).map_err(|e| invalid("CORS_ALLOWED_ORIGINS", &raw, &e.to_string()))
        })
        .collect()
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
