//! Shared test harness: an in-process engine that dispatches requests
//! without a socket, plus the entities the integration suites register.

// Not every suite uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use crudkit::http::engine::{Handler, HttpEngine, Middleware, Route, compose};
use crudkit::http::request::Request;
use crudkit::http::response::Response;
use crudkit::prelude::*;
use serde::{Deserialize, Serialize};

/// In-process engine: routes are matched against the contract's `:param`
/// path syntax and handlers run directly, with the global middleware chain
/// applied the way a real binding would.
#[derive(Default)]
pub struct TestEngine {
    routes: Vec<(Route, Handler)>,
    middlewares: Vec<Middleware>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn dispatch(&self, mut req: Request) -> Response {
        for (route, route_handler) in &self.routes {
            if route.method != req.method {
                continue;
            }
            let Some(params) = match_path(&route.path, &req.path) else {
                continue;
            };
            for (key, value) in params {
                req = req.with_param(key, value);
            }
            let composed = compose(&self.middlewares, route_handler.clone());
            return composed(req).await;
        }
        Response::error(StatusCode::NOT_FOUND, "no route")
    }
}

#[async_trait]
impl HttpEngine for TestEngine {
    fn register_route(&mut self, route: Route, handler: Handler) {
        self.routes.push((route, handler));
    }

    fn use_middleware(&mut self, middleware: Middleware) {
        self.middlewares.push(middleware);
    }

    fn routes(&self) -> Vec<Route> {
        self.routes.iter().map(|(route, _)| route.clone()).collect()
    }

    async fn start(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Match a concrete path against a `:param` pattern, returning captures.
fn match_path(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }
    let mut params = Vec::new();
    for (pattern_segment, path_segment) in pattern_segments.iter().zip(&path_segments) {
        if let Some(name) = pattern_segment.strip_prefix(':') {
            params.push((name.to_string(), path_segment.to_string()));
        } else if pattern_segment != path_segment {
            return None;
        }
    }
    Some(params)
}

/// Register one entity's CRUD routes on a fresh engine backed by a fresh
/// in-memory store. The store is returned alongside so tests can assert on
/// persisted state directly.
pub fn crud_fixture<E: Entity + Hooks>(
    protection: ProtectionConfig,
    auth: Option<&dyn AuthProvider>,
) -> (TestEngine, std::sync::Arc<dyn StorageAdapter>) {
    let mut engine = TestEngine::new();
    let store: std::sync::Arc<dyn StorageAdapter> = std::sync::Arc::new(InMemoryStorage::new());
    let shape = crudkit::core::descriptor::EntityDescriptor::describe::<E>();
    crudkit::crud::register_crud_routes::<E>(&mut engine, store.clone(), shape, &protection, auth)
        .expect("registration");
    (engine, store)
}

pub fn get(path: &str) -> Request {
    Request::new(Method::GET, path)
}

pub fn post<T: Serialize>(path: &str, body: &T) -> Request {
    Request::new(Method::POST, path).with_json(body)
}

pub fn put<T: Serialize>(path: &str, body: &T) -> Request {
    Request::new(Method::PUT, path).with_json(body)
}

pub fn patch<T: Serialize>(path: &str, body: &T) -> Request {
    Request::new(Method::PATCH, path).with_json(body)
}

pub fn delete(path: &str) -> Request {
    Request::new(Method::DELETE, path)
}

// === Entities shared by the suites ===

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Person {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub age: i64,
}

impl Entity for Person {
    const TYPE_NAME: &'static str = "person";
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }

    fn set_id(&mut self, id: Self::Id) {
        self.id = id;
    }
}

impl Hooks for Person {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: u64,
    pub name: String,
}

impl Entity for Company {
    const TYPE_NAME: &'static str = "company";
    type Id = u64;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn set_id(&mut self, id: Self::Id) {
        self.id = id;
    }
}

impl Hooks for Company {}

/// Entity whose hooks veto or fail on magic names, for the hook-ordering
/// suites.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Guarded {
    pub id: u64,
    pub name: String,
}

impl Entity for Guarded {
    const TYPE_NAME: &'static str = "guarded";
    type Id = u64;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn set_id(&mut self, id: Self::Id) {
        self.id = id;
    }
}

impl Hooks for Guarded {
    fn capabilities() -> HookSet {
        HookSet::NONE
            .with(Hook::BeforeCreate)
            .with(Hook::AfterCreate)
            .with(Hook::BeforeUpdate)
    }

    fn before_create(&mut self) -> HookResult {
        if self.name == "forbidden" {
            return Err(HookError::new("name is forbidden"));
        }
        Ok(())
    }

    fn after_create(&mut self) -> HookResult {
        if self.name == "haunted" {
            return Err(HookError::new("notification failed"));
        }
        Ok(())
    }

    fn before_update(&mut self) -> HookResult {
        self.name = self.name.to_uppercase();
        Ok(())
    }
}
