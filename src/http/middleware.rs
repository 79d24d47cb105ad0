//! Built-in middlewares: request logging and per-IP rate limiting.

use crate::http::engine::{Handler, Middleware};
use crate::http::request::Request;
use axum::http::StatusCode;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Log every request through `tracing`: method, path, status and latency.
pub fn request_logger() -> Middleware {
    Arc::new(|next: Handler| {
        Arc::new(move |req: Request| {
            let next = next.clone();
            Box::pin(async move {
                let method = req.method.clone();
                let path = req.path.clone();
                let started = Instant::now();

                let response = next(req).await;

                tracing::info!(
                    method = %method,
                    path = %path,
                    status = response.status.as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request"
                );
                response
            })
        })
    })
}

/// Fixed-interval per-IP rate limiter.
///
/// Tracks the last-seen instant per client address in a table owned by the
/// middleware itself; every read-modify-write holds the mutex. A request
/// arriving within `min_interval` of the previous one from the same address
/// is answered with 429 before the wrapped handler runs.
///
/// Known limitation: entries are never evicted, so the table grows by one
/// slot per distinct client address for the lifetime of the middleware.
///
/// Requests without a peer address (some test transports) are not limited.
pub fn rate_limit(min_interval: Duration) -> Middleware {
    let visitors: Arc<Mutex<HashMap<IpAddr, Instant>>> = Arc::new(Mutex::new(HashMap::new()));

    Arc::new(move |next: Handler| {
        let visitors = visitors.clone();
        Arc::new(move |req: Request| {
            let next = next.clone();
            let visitors = visitors.clone();
            Box::pin(async move {
                if let Some(ip) = req.remote_ip() {
                    let now = Instant::now();
                    let mut table = visitors.lock().unwrap_or_else(|e| e.into_inner());
                    if let Some(last_seen) = table.get(&ip) {
                        if now.duration_since(*last_seen) < min_interval {
                            return crate::http::response::Response::error(
                                StatusCode::TOO_MANY_REQUESTS,
                                "rate limit exceeded",
                            );
                        }
                    }
                    table.insert(ip, now);
                }
                next(req).await
            })
        })
    })
}
