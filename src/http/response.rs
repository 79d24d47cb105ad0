//! Transport-neutral response representation.
//!
//! Error responses are always a JSON object with a single `error` field, as
//! the public API contract requires.

use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON body of every error response: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A response produced by a handler or middleware.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    body: Option<Vec<u8>>,
}

impl Response {
    /// A JSON response with the given status.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(err) => Self::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode response: {}", err),
            ),
        }
    }

    /// An error response: `{"error": message}` with the given status.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            error: message.into(),
        };
        // ErrorBody serialization cannot fail
        Self {
            status,
            body: Some(serde_json::to_vec(&body).unwrap_or_default()),
        }
    }

    /// 204 with no body.
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Decode the body as JSON, if present and well-formed.
    pub fn body_json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }

    /// The `error` field of an error body, if this is one.
    pub fn error_message(&self) -> Option<String> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice::<ErrorBody>(b).ok())
            .map(|e| e.error)
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        match self.body {
            Some(body) => (
                self.status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            None => self.status.into_response(),
        }
    }
}
