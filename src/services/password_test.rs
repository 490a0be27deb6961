use super::*;

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  Alice@Example.COM "), Some("alice@example.com".into()));
}

#[test]
fn normalize_email_rejects_missing_at() {
    assert_eq!(normalize_email("alice.example.com"), None);
}

#[test]
fn normalize_email_rejects_empty_parts() {
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("alice@"), None);
    assert_eq!(normalize_email("   "), None);
}

#[test]
fn normalize_email_rejects_multiple_at() {
    assert_eq!(normalize_email("a@b@c.com"), None);
}

// =============================================================================
// validate_password
// =============================================================================

#[test]
fn validate_password_accepts_bounds() {
    assert!(validate_password(&"x".repeat(MIN_PASSWORD_LEN)).is_ok());
    assert!(validate_password(&"x".repeat(MAX_PASSWORD_LEN)).is_ok());
}

#[test]
fn validate_password_rejects_short() {
    let err = validate_password("short").unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword { min: 8, max: 128 }));
}

#[test]
fn validate_password_rejects_long() {
    assert!(validate_password(&"x".repeat(MAX_PASSWORD_LEN + 1)).is_err());
}

#[test]
fn validate_password_counts_chars_not_bytes() {
    // Eight two-byte characters.
    assert!(validate_password("éééééééé").is_ok());
}

// =============================================================================
// hashing
// =============================================================================

#[test]
fn hash_then_verify_round_trip() {
    let hash = hash_password_blocking("correct horse").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password_blocking(&hash, "correct horse"));
    assert!(!verify_password_blocking(&hash, "wrong horse"));
}

#[test]
fn hashes_are_salted() {
    let a = hash_password_blocking("same password").unwrap();
    let b = hash_password_blocking("same password").unwrap();
    assert_ne!(a, b);
}

#[test]
fn malformed_hash_never_verifies() {
    assert!(!verify_password_blocking("not-a-phc-string", "anything"));
}

#[tokio::test]
async fn async_wrappers_match_blocking_versions() {
    let hash = hash_password("async password".into()).await.unwrap();
    assert!(verify_password(hash.clone(), "async password".into()).await);
    assert!(!verify_password(hash, "other".into()).await);
}

// =============================================================================
// placeholder hash
// =============================================================================

#[test]
fn placeholder_hash_uses_credential_parameters() {
    let placeholder = PasswordHash::new(placeholder_hash().unwrap()).unwrap();
    let real_hash = hash_password_blocking("some password").unwrap();
    let real = PasswordHash::new(&real_hash).unwrap();
    assert_eq!(placeholder.algorithm, real.algorithm);
    assert_eq!(placeholder.version, real.version);
    assert_eq!(placeholder.params, real.params);
}

#[test]
fn placeholder_hash_is_computed_once() {
    let first = placeholder_hash().unwrap();
    let second = placeholder_hash().unwrap();
    assert!(std::ptr::eq(first, second));
}

#[test]
fn placeholder_hash_rejects_ordinary_passwords() {
    assert!(!verify_password_blocking(placeholder_hash().unwrap(), "hunter2hunter2"));
}

#[tokio::test]
async fn verify_against_placeholder_completes() {
    verify_against_placeholder("any password".into()).await;
}
