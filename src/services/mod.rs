//! Persistence services used by the Postgres auth provider.
//!
//! ARCHITECTURE
//! ============
//! Service modules own SQL and crypto so the provider's route handlers stay
//! focused on request parsing and status mapping.

pub mod account;
pub mod password;
pub mod session;
