//! Error types shared across the catalog and chat pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::llms::gateway::GatewayError;
use crate::persona::prompt_builder::PromptError;

/// Errors raised while loading the character catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON catalog did not parse.
    #[error("Invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML catalog did not parse.
    #[error("Invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Unknown file extension.
    #[error("Unsupported catalog format '{extension}' (expected json, yaml or yml)")]
    UnsupportedFormat { extension: String },

    /// Two records share a name.
    #[error("Duplicate character name in catalog: {name}")]
    DuplicateName { name: String },

    /// A record has a blank name.
    #[error("Character at position {position} has no name")]
    MissingName { position: usize },
}

/// Request-scoped failure of a chat call.
///
/// The first two kinds are the caller's fault. The rest belong to the
/// gateway's fault domain and carry an opaque reference that also appears in
/// the server logs; they never carry upstream text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Malformed, missing or oversized request fields.
    #[error("{0}")]
    InvalidInput(String),

    /// The requested character is not in the catalog.
    #[error("Character '{name}' not found")]
    NotFound { name: String },

    /// The provider did not answer within the deadline.
    #[error("chat temporarily unavailable")]
    Timeout { reference: String },

    /// The provider is throttling requests.
    #[error("chat temporarily unavailable")]
    RateLimited {
        retry_after: Option<Duration>,
        reference: String,
    },

    /// The provider answered with a failure status or could not be reached.
    #[error("chat temporarily unavailable")]
    UpstreamError { reference: String },

    /// The provider answered but the body held no usable text.
    #[error("chat temporarily unavailable")]
    MalformedResponse { reference: String },
}

impl ChatError {
    /// Stable, machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::InvalidInput(_) => "invalid_input",
            ChatError::NotFound { .. } => "not_found",
            ChatError::Timeout { .. } => "timeout",
            ChatError::RateLimited { .. } => "rate_limited",
            ChatError::UpstreamError { .. } => "upstream_error",
            ChatError::MalformedResponse { .. } => "malformed_response",
        }
    }

    /// Opaque reference for gateway-domain failures.
    pub fn reference(&self) -> Option<&str> {
        match self {
            ChatError::Timeout { reference }
            | ChatError::RateLimited { reference, .. }
            | ChatError::UpstreamError { reference }
            | ChatError::MalformedResponse { reference } => Some(reference),
            ChatError::InvalidInput(_) | ChatError::NotFound { .. } => None,
        }
    }
}

impl From<PromptError> for ChatError {
    fn from(err: PromptError) -> Self {
        ChatError::InvalidInput(err.to_string())
    }
}

impl From<GatewayError> for ChatError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout { reference, .. } => ChatError::Timeout { reference },
            GatewayError::RateLimited {
                retry_after,
                reference,
            } => ChatError::RateLimited {
                retry_after,
                reference,
            },
            GatewayError::Upstream { reference, .. } => ChatError::UpstreamError { reference },
            GatewayError::MalformedResponse { reference } => {
                ChatError::MalformedResponse { reference }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_errors_keep_reference() {
        let err: ChatError = GatewayError::Upstream {
            status: Some(500),
            reference: "ref-1".into(),
        }
        .into();
        assert_eq!(err.kind(), "upstream_error");
        assert_eq!(err.reference(), Some("ref-1"));
        assert_eq!(err.to_string(), "chat temporarily unavailable");
    }

    #[test]
    fn test_rate_limit_keeps_hint() {
        let err: ChatError = GatewayError::RateLimited {
            retry_after: Some(Duration::from_secs(7)),
            reference: "ref-2".into(),
        }
        .into();
        assert_eq!(
            err,
            ChatError::RateLimited {
                retry_after: Some(Duration::from_secs(7)),
                reference: "ref-2".into()
            }
        );
    }

    #[test]
    fn test_prompt_error_is_invalid_input() {
        let err: ChatError = PromptError::EmptyMessage.into();
        assert_eq!(err.kind(), "invalid_input");
        assert!(err.reference().is_none());
    }
}
