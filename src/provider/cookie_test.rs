use super::*;
use axum::http::HeaderValue;

fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.append(*name, HeaderValue::from_static(*value));
    }
    map
}

// =============================================================================
// session_token
// =============================================================================

#[test]
fn no_headers_means_no_token() {
    assert_eq!(session_token(&HeaderMap::new()), None);
}

#[test]
fn token_from_cookie() {
    let h = headers(&[("cookie", "theme=dark; session_token=abc123")]);
    assert_eq!(session_token(&h), Some("abc123".into()));
}

#[test]
fn empty_cookie_value_is_ignored() {
    let h = headers(&[("cookie", "session_token=")]);
    assert_eq!(session_token(&h), None);
}

#[test]
fn token_from_bearer_header() {
    let h = headers(&[("authorization", "Bearer xyz789")]);
    assert_eq!(session_token(&h), Some("xyz789".into()));
}

#[test]
fn cookie_wins_over_bearer() {
    let h = headers(&[("cookie", "session_token=from-cookie"), ("authorization", "Bearer from-header")]);
    assert_eq!(session_token(&h), Some("from-cookie".into()));
}

#[test]
fn non_bearer_authorization_is_ignored() {
    let h = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
    assert_eq!(session_token(&h), None);
}

#[test]
fn blank_bearer_is_ignored() {
    let h = headers(&[("authorization", "Bearer   ")]);
    assert_eq!(session_token(&h), None);
}

// =============================================================================
// cookies
// =============================================================================

#[test]
fn session_cookie_attributes() {
    let cookie = session_cookie("tok".into(), Duration::days(7), true);
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "tok");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.max_age(), Some(Duration::days(7)));
}

#[test]
fn clear_cookie_expires_immediately() {
    let cookie = clear_session_cookie(false);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    assert_eq!(cookie.secure(), Some(false));
}
