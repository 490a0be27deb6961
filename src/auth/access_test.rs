use super::*;

#[test]
fn unregistered_route_defaults_to_protected() {
    let table = RouteTable::builder().build();
    assert_eq!(table.access(&Method::GET, "/anything"), Access::Protected);
}

#[test]
fn exact_route_registration_applies() {
    let table = RouteTable::builder()
        .route(Method::GET, "/", Access::Public)
        .build();
    assert_eq!(table.access(&Method::GET, "/"), Access::Public);
    assert_eq!(table.access(&Method::GET, "/protected"), Access::Protected);
}

#[test]
fn route_is_method_specific() {
    let table = RouteTable::builder()
        .route(Method::GET, "/items", Access::Public)
        .build();
    assert_eq!(table.access(&Method::POST, "/items"), Access::Protected);
}

#[test]
fn head_falls_back_to_get_registration() {
    let table = RouteTable::builder()
        .route(Method::GET, "/", Access::Public)
        .build();
    assert_eq!(table.access(&Method::HEAD, "/"), Access::Public);
}

#[test]
fn head_registration_wins_over_get() {
    let table = RouteTable::builder()
        .route(Method::GET, "/", Access::Public)
        .route(Method::HEAD, "/", Access::Protected)
        .build();
    assert_eq!(table.access(&Method::HEAD, "/"), Access::Protected);
}

#[test]
fn group_default_applies_to_children() {
    let table = RouteTable::builder()
        .group("/docs", Access::Public)
        .build();
    assert_eq!(table.access(&Method::GET, "/docs"), Access::Public);
    assert_eq!(table.access(&Method::GET, "/docs/intro"), Access::Public);
}

#[test]
fn group_prefix_matches_whole_segments_only() {
    let table = RouteTable::builder()
        .group("/docs", Access::Public)
        .build();
    assert_eq!(table.access(&Method::GET, "/docsearch"), Access::Protected);
}

#[test]
fn route_overrides_group_default() {
    let table = RouteTable::builder()
        .group("/", Access::Public)
        .route(Method::GET, "/protected", Access::Protected)
        .build();
    assert_eq!(table.access(&Method::GET, "/"), Access::Public);
    assert_eq!(table.access(&Method::GET, "/protected"), Access::Protected);
}

#[test]
fn longest_group_prefix_wins() {
    let table = RouteTable::builder()
        .group("/", Access::Public)
        .group("/admin", Access::Protected)
        .group("/admin/status", Access::Public)
        .build();
    assert_eq!(table.access(&Method::GET, "/about"), Access::Public);
    assert_eq!(table.access(&Method::GET, "/admin/users"), Access::Protected);
    assert_eq!(table.access(&Method::GET, "/admin/status/db"), Access::Public);
}

#[test]
fn group_trailing_slash_is_ignored() {
    let table = RouteTable::builder()
        .group("/docs/", Access::Public)
        .build();
    assert_eq!(table.access(&Method::GET, "/docs/intro"), Access::Public);
}

#[test]
fn re_registering_group_replaces_previous_default() {
    let table = RouteTable::builder()
        .group("/docs", Access::Public)
        .group("/docs", Access::Protected)
        .build();
    assert_eq!(table.access(&Method::GET, "/docs/a"), Access::Protected);
}

#[test]
fn access_is_public_helper() {
    assert!(Access::Public.is_public());
    assert!(!Access::Protected.is_public());
    assert_eq!(Access::default(), Access::Protected);
}
