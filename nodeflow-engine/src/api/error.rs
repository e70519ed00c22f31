//! API error type and NodeflowError → HTTP status mapping.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use nodeflow_core::NodeflowError;

/// API error with HTTP status code and error code.
#[derive(Debug)]
pub struct ApiError {
    /// Error code (e.g., "E101").
    pub code: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code.
    pub status: StatusCode,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: &'static str, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code,
            message: message.into(),
            status,
        }
    }

    /// Create a 400 Bad Request error.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusCode::BAD_REQUEST)
    }

    /// Create a 404 Not Found error.
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusCode::NOT_FOUND)
    }

    /// Create a 413 Payload Too Large error.
    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(
            "E803",
            format!("Request body exceeds maximum allowed size ({limit} bytes)"),
            StatusCode::PAYLOAD_TOO_LARGE,
        )
    }

    /// Create a 500 Internal Server Error.
    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Whether the error is the client's fault.
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    fn error_body(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
            "status": self.status.as_u16()
        })
    }

    /// Convert to HTTP response.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let body = serde_json::json!({ "error": self.error_body() });
        build(self.status, body)
    }

    /// Convert to a response for a refused workflow submission.
    ///
    /// Same as [`into_response`](Self::into_response) with an additional
    /// top-level `"status": "rejected"`.
    pub fn into_rejection(self) -> Response<Full<Bytes>> {
        let body = serde_json::json!({
            "status": "rejected",
            "error": self.error_body(),
        });
        build(self.status, body)
    }
}

fn build(status: StatusCode, body: serde_json::Value) -> Response<Full<Bytes>> {
    super::response::json_response(status, &body)
}

impl From<NodeflowError> for ApiError {
    fn from(err: NodeflowError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            code: err.code(),
            message: err.to_string(),
            status,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
