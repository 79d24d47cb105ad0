//! HTTP transport: the engine contract, the transport-neutral request and
//! response types, built-in middlewares, and the shipped axum binding.

pub mod axum_engine;
pub mod engine;
pub mod middleware;
pub mod request;
pub mod response;

pub use axum_engine::AxumEngine;
pub use engine::{Handler, HttpEngine, Middleware, Route, compose, handler};
pub use request::Request;
pub use response::{ErrorBody, Response};
