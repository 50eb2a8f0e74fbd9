//! HTTP error responses.
//!
//! `ApiError` is the single place where failures become status codes.
//! Body shape:
//!
//! ```json
//! {"error": "upstream_error", "message": "chat temporarily unavailable", "status": 502, "reference": "…"}
//! ```

use std::fmt;
use std::time::Duration;

use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::utilities::errors::ChatError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub reference: Option<String>,
    pub retry_after: Option<Duration>,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            reference: None,
            retry_after: None,
        }
    }

    /// 400 with kind `invalid_input`.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }

    /// 404 with kind `not_found`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let status = match &err {
            ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ChatError::NotFound { .. } => StatusCode::NOT_FOUND,
            ChatError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ChatError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ChatError::UpstreamError { .. } | ChatError::MalformedResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
        };
        let retry_after = match &err {
            ChatError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
            reference: err.reference().map(str::to_string),
            retry_after,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.kind,
            "message": self.message,
            "status": self.status.as_u16(),
        });
        if let Some(reference) = &self.reference {
            body["reference"] = json!(reference);
        }

        let mut response = (self.status, Json(body)).into_response();
        if let Some(retry_after) = self.retry_after {
            // Round up so clients never retry early.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
