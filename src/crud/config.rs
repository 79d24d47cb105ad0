//! Per-entity protection configuration: which HTTP methods require a valid
//! bearer token.

use axum::http::Method;
use std::collections::HashSet;

/// Methods the CRUD surface registers for every entity.
pub const CRUD_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Per-entity mapping from HTTP method to "requires authentication".
///
/// Default: nothing protected. Built once at registration through the
/// chained `protect*` options; immutable afterwards.
///
/// # Example
///
/// ```rust
/// use axum::http::Method;
/// use crudkit::crud::config::ProtectionConfig;
///
/// let config = ProtectionConfig::new().protect([Method::POST, Method::DELETE]);
/// assert!(config.is_protected(&Method::POST));
/// assert!(!config.is_protected(&Method::GET));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProtectionConfig {
    protected: HashSet<Method>,
}

impl ProtectionConfig {
    /// No method protected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the given methods as protected.
    pub fn protect(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.protected.extend(methods);
        self
    }

    /// Mark every CRUD method as protected.
    pub fn protect_all(self) -> Self {
        self.protect(CRUD_METHODS)
    }

    /// Whether the given method requires authentication.
    pub fn is_protected(&self, method: &Method) -> bool {
        self.protected.contains(method)
    }

    /// Whether any method is protected.
    pub fn any_protected(&self) -> bool {
        !self.protected.is_empty()
    }
}
