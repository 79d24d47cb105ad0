//! Axum binding of the HTTP engine contract.
//!
//! Translates contract routes and the transport-neutral request/response
//! types onto an axum 0.8 router. Peer addresses come from `ConnectInfo`
//! when the server is started through [`AxumEngine::start`]; transports that
//! do not provide one (tests) simply leave the request without a remote IP.

use crate::http::engine::{Handler, HttpEngine, Middleware, Route, compose};
use crate::http::request::Request;
use crate::http::response::Response;
use async_trait::async_trait;
use axum::Router;
use axum::extract::{ConnectInfo, Query, RawPathParams};
use axum::http::{Method, StatusCode};
use axum::routing::{MethodFilter, on};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body, in bytes.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// HTTP engine backed by axum + tokio.
pub struct AxumEngine {
    addr: SocketAddr,
    routes: Vec<(Route, Handler)>,
    middlewares: Vec<Middleware>,
    permissive_cors: bool,
}

impl AxumEngine {
    /// Engine listening on `0.0.0.0:port`.
    pub fn new(port: u16) -> Self {
        Self::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))
    }

    /// Engine listening on an explicit address.
    pub fn bind(addr: SocketAddr) -> Self {
        Self {
            addr,
            routes: Vec::new(),
            middlewares: Vec::new(),
            permissive_cors: false,
        }
    }

    /// Allow cross-origin requests from any origin.
    pub fn with_permissive_cors(mut self) -> Self {
        self.permissive_cors = true;
        self
    }

    /// Build the axum router for the registered routes.
    ///
    /// Public so the router can be served by other means (tests, embedding
    /// into a larger axum application).
    pub fn router(&self) -> Router {
        let mut router = Router::new();

        for (route, route_handler) in &self.routes {
            let composed = compose(&self.middlewares, route_handler.clone());
            let path = axum_path(&route.path);
            let filter = method_filter(&route.method);

            let adapter = move |params: RawPathParams,
                                Query(query): Query<Vec<(String, String)>>,
                                axum_req: axum::extract::Request| {
                let composed = composed.clone();
                async move {
                    let (parts, body) = axum_req.into_parts();

                    let remote_ip = parts
                        .extensions
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|info| info.0.ip());

                    let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            return Response::error(
                                StatusCode::BAD_REQUEST,
                                format!("failed to read request body: {}", err),
                            );
                        }
                    };

                    let mut request =
                        Request::new(parts.method.clone(), parts.uri.path().to_string())
                            .with_body(bytes.to_vec());
                    for (key, value) in params.iter() {
                        request = request.with_param(key, value);
                    }
                    for (key, value) in &query {
                        request = request.with_query(key, value);
                    }
                    for (name, value) in &parts.headers {
                        if let Ok(text) = value.to_str() {
                            request = request.with_header(name.as_str(), text);
                        }
                    }
                    if let Some(ip) = remote_ip {
                        request = request.with_remote_ip(ip);
                    }

                    composed(request).await
                }
            };

            router = router.route(&path, on(filter, adapter));
        }

        if self.permissive_cors {
            router = router.layer(CorsLayer::permissive());
        }
        router.layer(TraceLayer::new_for_http())
    }
}

#[async_trait]
impl HttpEngine for AxumEngine {
    fn register_route(&mut self, route: Route, handler: Handler) {
        tracing::debug!(route = %route, protected = route.protected, "registering route");
        self.routes.push((route, handler));
    }

    fn use_middleware(&mut self, middleware: Middleware) {
        self.middlewares.push(middleware);
    }

    fn routes(&self) -> Vec<Route> {
        self.routes.iter().map(|(route, _)| route.clone()).collect()
    }

    async fn start(&mut self) -> anyhow::Result<()> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, routes = self.routes.len(), "http engine listening");
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }
}

/// Translate a contract path ("/users/:id") into axum 0.8 syntax
/// ("/users/{id}").
fn axum_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{}}}", name)
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn method_filter(method: &Method) -> MethodFilter {
    match *method {
        Method::GET => MethodFilter::GET,
        Method::POST => MethodFilter::POST,
        Method::PUT => MethodFilter::PUT,
        Method::PATCH => MethodFilter::PATCH,
        Method::DELETE => MethodFilter::DELETE,
        Method::HEAD => MethodFilter::HEAD,
        Method::OPTIONS => MethodFilter::OPTIONS,
        _ => MethodFilter::GET,
    }
}
