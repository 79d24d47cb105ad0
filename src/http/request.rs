//! Transport-neutral request representation.
//!
//! Engine bindings translate their native request type into this structure
//! before invoking a handler. The per-request context is the only mutable
//! state the engine carries for a request; middlewares use it to pass values
//! (such as the authenticated subject) to downstream handlers.

use axum::http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::net::IpAddr;

/// A single inbound request as seen by handlers and middlewares.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    params: HashMap<String, String>,
    query: Vec<(String, String)>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    remote_ip: Option<IpAddr>,
    context: HashMap<String, Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: HashMap::new(),
            query: Vec::new(),
            headers: HashMap::new(),
            body: Vec::new(),
            remote_ip: None,
            context: HashMap::new(),
        }
    }

    // === Builders (used by engine bindings and tests) ===

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Header names are stored lower-cased; lookup is case-insensitive.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Serialize a value as the JSON request body.
    pub fn with_json<T: serde::Serialize>(self, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        self.with_body(body)
    }

    pub fn with_remote_ip(mut self, ip: IpAddr) -> Self {
        self.remote_ip = Some(ip);
        self
    }

    // === Accessors ===

    /// Path parameter captured by the route pattern (e.g. `:id`).
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Query parameters in request order, duplicates preserved.
    pub fn query_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decode the request body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn remote_ip(&self) -> Option<IpAddr> {
        self.remote_ip
    }

    // === Per-request context ===

    /// Attach a value under a well-known key for downstream handlers.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.context.insert(key.into(), value);
    }

    /// Read a value attached earlier in the middleware chain.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}
