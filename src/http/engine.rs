//! HTTP engine contract: abstract route registration and onion-style
//! middleware composition.
//!
//! Handlers and middlewares are plain composable functions. A middleware
//! wraps the next handler and may short-circuit (the authorization
//! middleware answering 401 before the CRUD handler runs, for example).
//! [`compose`] folds an ordered middleware list into a single handler with
//! the first middleware outermost.

use crate::http::request::Request;
use crate::http::response::Response;
use async_trait::async_trait;
use axum::http::Method;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A request handler: one logical task per inbound request.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A middleware wraps the next handler, producing a new handler.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Lift an async function into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// Compose an ordered middleware list around a handler.
///
/// The first middleware in the list ends up outermost: it runs first on the
/// way in and last on the way out.
pub fn compose(middlewares: &[Middleware], inner: Handler) -> Handler {
    middlewares
        .iter()
        .rev()
        .fold(inner, |next, middleware| middleware(next))
}

/// A registered route, introspectable after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    /// Contract path; parameter segments use `:name` (e.g. "/users/:id").
    pub path: String,
    /// Collection name of the entity this route targets.
    pub entity: String,
    /// Whether the handler was wrapped with the authorization middleware.
    pub protected: bool,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Abstract transport: any HTTP server binding satisfies this contract.
///
/// Connection-level concerns (timeouts, TLS) belong to the engine; the core
/// treats every handler invocation as running to completion.
#[async_trait]
pub trait HttpEngine: Send {
    /// Register a handler for a route. The handler arrives already wrapped
    /// with its per-route middleware chain.
    fn register_route(&mut self, route: Route, handler: Handler);

    /// Add a global middleware, applied to every route in registration
    /// order (first registered runs outermost).
    fn use_middleware(&mut self, middleware: Middleware);

    /// The routes registered so far.
    fn routes(&self) -> Vec<Route>;

    /// Bind and serve until shutdown.
    async fn start(&mut self) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    fn tracing_middleware(log: Arc<Mutex<Vec<String>>>, name: &'static str) -> Middleware {
        Arc::new(move |next: Handler| {
            let log = log.clone();
            Arc::new(move |req: Request| {
                let log = log.clone();
                let next = next.clone();
                Box::pin(async move {
                    log.lock().unwrap().push(format!("{}:in", name));
                    let resp = next(req).await;
                    log.lock().unwrap().push(format!("{}:out", name));
                    resp
                })
            })
        })
    }

    #[tokio::test]
    async fn test_compose_is_onion_ordered() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner = {
            let log = log.clone();
            handler(move |_req| {
                let log = log.clone();
                async move {
                    log.lock().unwrap().push("handler".to_string());
                    Response::no_content()
                }
            })
        };

        let composed = compose(
            &[
                tracing_middleware(log.clone(), "outer"),
                tracing_middleware(log.clone(), "inner"),
            ],
            inner,
        );

        composed(Request::new(Method::GET, "/x")).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer:in", "inner:in", "handler", "inner:out", "outer:out"]
        );
    }

    #[tokio::test]
    async fn test_middleware_short_circuits() {
        let reject: Middleware = Arc::new(|_next: Handler| {
            handler(|_req| async { Response::error(StatusCode::UNAUTHORIZED, "no") })
        });

        let inner = handler(|_req| async {
            panic!("inner handler must not run");
        });

        let composed = compose(&[reject], inner);
        let resp = composed(Request::new(Method::GET, "/x")).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_compose_empty_is_identity() {
        let inner = handler(|_req| async { Response::no_content() });
        let composed = compose(&[], inner.clone());
        assert!(Arc::ptr_eq(&composed, &inner));
    }
}
