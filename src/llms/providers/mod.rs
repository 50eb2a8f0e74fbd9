//! Language-model provider implementations.
//!
//! # Wire formats
//!
//! | Kind | Endpoint | Request | Response |
//! |------|----------|---------|----------|
//! | [`ProviderKind::OpenAi`] | `{base_url}/chat/completions` | chat completions | `choices[0].message.content` |
//! | [`ProviderKind::Simple`] | `{base_url}` | `{"prompt", "model", ...}` | `{"text"}` |
//!
//! Either response shape is accepted from either kind.

pub mod http;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::llms::retry::RetryPolicy;
use crate::utilities::redact::redact_secret;

pub use http::HttpChatGateway;

/// Default OpenAI-compatible base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default per-call deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Which request/response format the provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Simple,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Simple => "simple",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "openai-compatible" => Ok(ProviderKind::OpenAi),
            "simple" => Ok(ProviderKind::Simple),
            other => Err(format!(
                "unknown provider '{}' (expected 'openai' or 'simple')",
                other
            )),
        }
    }
}

/// Connection and sampling settings for the provider.
#[derive(Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub base_url: String,
    /// Bearer token. Never logged in clear.
    pub api_key: Option<String>,
    pub model: String,
    /// Hard deadline for one `send_chat`, retry included.
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
    pub retry: RetryPolicy,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_tokens: 512,
            temperature: 0.8,
            retry: RetryPolicy::default(),
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(redact_secret))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ProviderSettings {
    /// Full endpoint URL for this provider kind.
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.kind {
            ProviderKind::OpenAi => format!("{}/chat/completions", base),
            ProviderKind::Simple => base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = ProviderSettings {
            api_key: Some("sk-proj-very-secret-key-123456".into()),
            ..Default::default()
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("sk-p…(redacted)"));
    }

    #[test]
    fn test_endpoint_per_kind() {
        let mut settings = ProviderSettings {
            base_url: "http://localhost:9000/v1/".into(),
            ..Default::default()
        };
        assert_eq!(settings.endpoint(), "http://localhost:9000/v1/chat/completions");
        settings.kind = ProviderKind::Simple;
        assert_eq!(settings.endpoint(), "http://localhost:9000/v1");
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!("simple".parse::<ProviderKind>(), Ok(ProviderKind::Simple));
        assert!("bedrock".parse::<ProviderKind>().is_err());
    }
}
