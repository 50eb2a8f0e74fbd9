//! The chat gateway seam.
//!
//! `ChatGateway` is the only interface through which the service talks to a
//! language-model provider. The HTTP implementation lives in
//! [`crate::llms::providers::http`]; tests substitute a scripted double.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Normalized provider failure.
///
/// Messages never include upstream bodies or credentials; `reference` is an
/// opaque id that ties the failure to the server logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No response within the deadline. The in-flight request was dropped.
    #[error("provider did not respond within {elapsed:?} (ref {reference})")]
    Timeout {
        elapsed: Duration,
        reference: String,
    },

    /// The provider signalled throttling.
    #[error("provider rate limited the request (ref {reference})")]
    RateLimited {
        retry_after: Option<Duration>,
        reference: String,
    },

    /// Non-success status, or the provider could not be reached at all
    /// (`status` is `None`).
    #[error("provider request failed{} (ref {reference})", status_suffix(.status))]
    Upstream {
        status: Option<u16>,
        reference: String,
    },

    /// Success status but no usable response text.
    #[error("provider returned an unreadable response (ref {reference})")]
    MalformedResponse { reference: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {}", code),
        None => String::new(),
    }
}

impl GatewayError {
    /// The opaque reference id.
    pub fn reference(&self) -> &str {
        match self {
            GatewayError::Timeout { reference, .. }
            | GatewayError::RateLimited { reference, .. }
            | GatewayError::Upstream { reference, .. }
            | GatewayError::MalformedResponse { reference } => reference,
        }
    }
}

/// Public description of the configured provider, safe to expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayInfo {
    pub kind: String,
    pub model: String,
}

/// Sends one prompt to a language model and returns its raw text.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send `prompt` and return the model output.
    async fn send_chat(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Provider kind and model, for status reporting.
    fn info(&self) -> GatewayInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_no_body_and_keeps_reference() {
        let err = GatewayError::Upstream {
            status: Some(502),
            reference: "abc".into(),
        };
        assert_eq!(
            err.to_string(),
            "provider request failed with status 502 (ref abc)"
        );

        let err = GatewayError::Upstream {
            status: None,
            reference: "def".into(),
        };
        assert_eq!(err.to_string(), "provider request failed (ref def)");
        assert_eq!(err.reference(), "def");
    }
}
