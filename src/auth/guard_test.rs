use super::*;
use crate::state::test_helpers::{MockProvider, TEST_TOKEN, sample_auth_session};
use axum::http::HeaderValue;

fn cookie_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("cookie", HeaderValue::from_str(&format!("session_token={token}")).unwrap());
    headers
}

fn guard_for(provider: &Arc<MockProvider>) -> AuthGuard {
    AuthGuard::new(provider.clone())
}

// =============================================================================
// normalize_headers
// =============================================================================

#[test]
fn normalize_drops_empty_values() {
    let mut headers = HeaderMap::new();
    headers.insert("x-empty", HeaderValue::from_static(""));
    headers.insert("x-blank", HeaderValue::from_static("   "));
    headers.insert("x-kept", HeaderValue::from_static("value"));

    let normalized = normalize_headers(&headers);
    assert!(normalized.get("x-empty").is_none());
    assert!(normalized.get("x-blank").is_none());
    assert_eq!(normalized.get("x-kept").unwrap(), "value");
}

#[test]
fn normalize_keeps_repeated_values() {
    let mut headers = HeaderMap::new();
    headers.append("accept", HeaderValue::from_static("text/html"));
    headers.append("accept", HeaderValue::from_static("application/json"));
    headers.append("accept", HeaderValue::from_static(""));

    let normalized = normalize_headers(&headers);
    let values: Vec<_> = normalized.get_all("accept").iter().collect();
    assert_eq!(values, vec!["text/html", "application/json"]);
}

#[test]
fn normalize_empty_map() {
    assert!(normalize_headers(&HeaderMap::new()).is_empty());
}

// =============================================================================
// authorize
// =============================================================================

#[tokio::test]
async fn public_route_allows_without_provider_call() {
    let provider = Arc::new(MockProvider::with_session(TEST_TOKEN, sample_auth_session()));
    let guard = guard_for(&provider);

    let decision = guard.authorize(Access::Public, &cookie_headers(TEST_TOKEN)).await.unwrap();
    assert!(matches!(decision, Decision::Allow(None)));
    assert_eq!(provider.resolve_calls(), 0);
}

#[tokio::test]
async fn public_route_allows_even_when_backend_is_down() {
    let provider = Arc::new(MockProvider::failing());
    let guard = guard_for(&provider);

    let decision = guard.authorize(Access::Public, &HeaderMap::new()).await.unwrap();
    assert!(matches!(decision, Decision::Allow(None)));
    assert_eq!(provider.resolve_calls(), 0);
}

#[tokio::test]
async fn protected_route_without_session_rejects() {
    let provider = Arc::new(MockProvider::default());
    let guard = guard_for(&provider);

    let decision = guard.authorize(Access::Protected, &HeaderMap::new()).await.unwrap();
    assert!(matches!(decision, Decision::Reject));
    assert_eq!(provider.resolve_calls(), 1);
}

#[tokio::test]
async fn protected_route_with_unknown_token_rejects() {
    let provider = Arc::new(MockProvider::with_session(TEST_TOKEN, sample_auth_session()));
    let guard = guard_for(&provider);

    let decision = guard.authorize(Access::Protected, &cookie_headers("nope")).await.unwrap();
    assert!(matches!(decision, Decision::Reject));
}

#[tokio::test]
async fn protected_route_with_valid_session_allows() {
    let provider = Arc::new(MockProvider::with_session(TEST_TOKEN, sample_auth_session()));
    let guard = guard_for(&provider);

    let decision = guard.authorize(Access::Protected, &cookie_headers(TEST_TOKEN)).await.unwrap();
    let Decision::Allow(Some(session)) = decision else {
        panic!("expected an allowed decision with a session");
    };
    assert_eq!(session.session.id, sample_auth_session().session.id);
    assert_eq!(session.user.email, "a@b.com");
}

#[tokio::test]
async fn backend_failure_propagates_instead_of_rejecting() {
    let provider = Arc::new(MockProvider::failing());
    let guard = guard_for(&provider);

    let result = guard.authorize(Access::Protected, &cookie_headers(TEST_TOKEN)).await;
    assert!(matches!(result, Err(AuthError::Backend(_))));
}

#[tokio::test]
async fn provider_receives_normalized_headers() {
    let provider = Arc::new(MockProvider::default());
    let guard = guard_for(&provider);

    let mut headers = cookie_headers(TEST_TOKEN);
    headers.insert("x-empty", HeaderValue::from_static(""));
    guard.authorize(Access::Protected, &headers).await.unwrap();

    let seen = provider.last_headers.lock().unwrap().clone().unwrap();
    assert!(seen.get("x-empty").is_none());
    assert!(seen.get("cookie").is_some());
}

// =============================================================================
// GuardRejection
// =============================================================================

#[test]
fn rejection_statuses() {
    assert_eq!(GuardRejection::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        GuardRejection::Auth(AuthError::Backend(sqlx::Error::PoolTimedOut))
            .into_response()
            .status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        GuardRejection::Context(ContextError::AlreadySet).into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
