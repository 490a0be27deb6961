//! Route access metadata: which routes are public.
//!
//! Entries are registered explicitly when the router is assembled and never
//! change afterwards. Lookup is pure and happens before any I/O, so public
//! routes cost zero provider calls.
//!
//! Resolution is most-specific-wins:
//! 1. exact `(method, pattern)` registration
//! 2. longest group prefix (matched on whole path segments)
//! 3. [`Access::Protected`]

use std::collections::HashMap;

use axum::http::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    Public,
    #[default]
    Protected,
}

impl Access {
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Side-table of route pattern -> access, with group-level defaults.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, HashMap<Method, Access>>,
    groups: Vec<(String, Access)>,
}

impl RouteTable {
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder { table: Self::default() }
    }

    /// Resolve access for a matched route pattern (e.g. `/boards/{id}`).
    #[must_use]
    pub fn access(&self, method: &Method, pattern: &str) -> Access {
        if let Some(access) = self.route_access(method, pattern) {
            return access;
        }
        self.group_access(pattern).unwrap_or_default()
    }

    fn route_access(&self, method: &Method, pattern: &str) -> Option<Access> {
        let by_method = self.routes.get(pattern)?;
        by_method.get(method).copied().or_else(|| {
            // Axum serves HEAD through GET handlers.
            (*method == Method::HEAD)
                .then(|| by_method.get(&Method::GET).copied())
                .flatten()
        })
    }

    fn group_access(&self, pattern: &str) -> Option<Access> {
        self.groups
            .iter()
            .filter(|(prefix, _)| prefix_matches(prefix, pattern))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, access)| *access)
    }
}

fn prefix_matches(prefix: &str, pattern: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match pattern.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn trim_trailing_slash(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/".to_owned() } else { trimmed.to_owned() }
}

pub struct RouteTableBuilder {
    table: RouteTable,
}

impl RouteTableBuilder {
    /// Default access for every route under `prefix`.
    #[must_use]
    pub fn group(mut self, prefix: &str, access: Access) -> Self {
        let prefix = trim_trailing_slash(prefix);
        self.table.groups.retain(|(p, _)| *p != prefix);
        self.table.groups.push((prefix, access));
        self
    }

    /// Access for one handler. Overrides any group default.
    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, access: Access) -> Self {
        self.table
            .routes
            .entry(pattern.to_owned())
            .or_default()
            .insert(method, access);
        self
    }

    #[must_use]
    pub fn build(self) -> RouteTable {
        self.table
    }
}

#[cfg(test)]
#[path = "access_test.rs"]
mod tests;
