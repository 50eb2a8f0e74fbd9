//! HTTP chat gateway over `reqwest`.
//!
//! One shared client per gateway. Each `send_chat` runs under a single
//! deadline covering every attempt and the retry delay; when it expires the
//! in-flight request future is dropped, which aborts the HTTP exchange.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ProviderKind, ProviderSettings};
use crate::llms::gateway::{ChatGateway, GatewayError, GatewayInfo};
use crate::llms::retry::{parse_retry_after, RetryCause};
use crate::utilities::redact::scrub;

/// Upper bound on TCP connect time, further capped by the call deadline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How much of an upstream error body goes into debug logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Bytes read from an error body to build the log preview.
const BODY_PREVIEW_BYTES: usize = 4 * BODY_PREVIEW_CHARS;

/// Largest success body accepted from a provider.
const MAX_BODY_BYTES: usize = 1 << 20;

/// Outcome of one failed attempt, before it is normalized.
#[derive(Debug)]
enum AttemptFailure {
    Transport(String),
    Status {
        status: StatusCode,
        retry_after: Option<Duration>,
        preview: String,
    },
    Malformed(String),
}

impl AttemptFailure {
    fn cause(&self) -> RetryCause {
        match self {
            AttemptFailure::Transport(_) => RetryCause::Transport,
            AttemptFailure::Status {
                status,
                retry_after,
                ..
            } if *status == StatusCode::TOO_MANY_REQUESTS => RetryCause::RateLimited(*retry_after),
            AttemptFailure::Status { .. } | AttemptFailure::Malformed(_) => RetryCause::Fatal,
        }
    }

    fn log(&self, reference: &str) {
        match self {
            AttemptFailure::Transport(detail) => {
                warn!(reference = %reference, detail = %detail, "Provider unreachable");
            }
            AttemptFailure::Status {
                status,
                retry_after,
                preview,
            } => {
                warn!(
                    reference = %reference,
                    status = status.as_u16(),
                    retry_after = ?retry_after,
                    "Provider returned failure status"
                );
                debug!(reference = %reference, body = %preview, "Provider error body");
            }
            AttemptFailure::Malformed(detail) => {
                warn!(reference = %reference, detail = %detail, "Provider response unreadable");
            }
        }
    }

    fn into_error(self, reference: String) -> GatewayError {
        match self {
            AttemptFailure::Transport(_) => GatewayError::Upstream {
                status: None,
                reference,
            },
            AttemptFailure::Status {
                status,
                retry_after,
                ..
            } if status == StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited {
                retry_after,
                reference,
            },
            AttemptFailure::Status { status, .. } => GatewayError::Upstream {
                status: Some(status.as_u16()),
                reference,
            },
            AttemptFailure::Malformed(_) => GatewayError::MalformedResponse { reference },
        }
    }
}

/// Pull the response text out of a provider JSON body.
///
/// Accepts, in order: `text`, `response`, `choices[0].message.content`,
/// `choices[0].text`. Blank strings do not count.
pub fn extract_text(json: &Value) -> Option<String> {
    [
        json.get("text"),
        json.get("response"),
        json.pointer("/choices/0/message/content"),
        json.pointer("/choices/0/text"),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .map(str::trim)
    .find(|text| !text.is_empty())
    .map(str::to_string)
}

fn preview(text: &str) -> String {
    text.chars().take(BODY_PREVIEW_CHARS).collect()
}

/// Read the whole body as text, or `None` once it grows past `cap` bytes.
async fn read_capped(
    mut response: reqwest::Response,
    cap: usize,
) -> Result<Option<String>, reqwest::Error> {
    if response.content_length().is_some_and(|len| len > cap as u64) {
        return Ok(None);
    }
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > cap {
            return Ok(None);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(Some(String::from_utf8_lossy(&body).into_owned()))
}

/// Best-effort read of the first `cap` bytes. Read errors end the prefix.
async fn read_prefix(mut response: reqwest::Response, cap: usize) -> String {
    let mut body = Vec::new();
    while body.len() < cap {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }
    body.truncate(cap);
    String::from_utf8_lossy(&body).into_owned()
}

/// [`ChatGateway`] backed by an HTTP language-model provider.
#[derive(Debug, Clone)]
pub struct HttpChatGateway {
    client: reqwest::Client,
    settings: ProviderSettings,
    endpoint: String,
}

impl HttpChatGateway {
    pub fn new(settings: ProviderSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(settings.timeout))
            .build()?;
        let endpoint = settings.endpoint();
        Ok(Self {
            client,
            settings,
            endpoint,
        })
    }

    /// Request body for the configured wire format.
    pub fn build_request_body(&self, prompt: &str) -> Value {
        match self.settings.kind {
            ProviderKind::OpenAi => serde_json::json!({
                "model": self.settings.model,
                "messages": [
                    { "role": "user", "content": prompt }
                ],
                "max_tokens": self.settings.max_tokens,
                "temperature": self.settings.temperature,
            }),
            ProviderKind::Simple => serde_json::json!({
                "prompt": prompt,
                "model": self.settings.model,
                "max_tokens": self.settings.max_tokens,
                "temperature": self.settings.temperature,
            }),
        }
    }

    fn api_key(&self) -> Option<&str> {
        self.settings.api_key.as_deref().filter(|k| !k.is_empty())
    }

    async fn attempt(&self, body: &Value) -> Result<String, AttemptFailure> {
        let mut request = self.client.post(&self.endpoint).json(body);
        if let Some(key) = self.api_key() {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AttemptFailure::Transport(scrub(&e.to_string(), self.api_key())))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        if !status.is_success() {
            let body = read_prefix(response, BODY_PREVIEW_BYTES).await;
            return Err(AttemptFailure::Status {
                status,
                retry_after,
                preview: scrub(&preview(&body), self.api_key()),
            });
        }

        let text = read_capped(response, MAX_BODY_BYTES)
            .await
            .map_err(|e| AttemptFailure::Transport(scrub(&e.to_string(), self.api_key())))?
            .ok_or_else(|| {
                AttemptFailure::Malformed(format!("body exceeds {} bytes", MAX_BODY_BYTES))
            })?;

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| AttemptFailure::Malformed(format!("invalid JSON: {}", e)))?;

        extract_text(&json)
            .ok_or_else(|| AttemptFailure::Malformed("no response text in body".to_string()))
    }

    async fn send_with_retry(&self, prompt: &str, reference: &str) -> Result<String, GatewayError> {
        let body = self.build_request_body(prompt);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.attempt(&body).await {
                Ok(text) => {
                    debug!(
                        reference = %reference,
                        attempts,
                        chars = text.chars().count(),
                        "Provider call succeeded"
                    );
                    return Ok(text);
                }
                Err(failure) => {
                    if let Some(delay) = self.settings.retry.next_delay(attempts, failure.cause()) {
                        warn!(
                            reference = %reference,
                            attempt = attempts,
                            delay = ?delay,
                            cause = ?failure.cause(),
                            "Retrying provider call"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    failure.log(reference);
                    return Err(failure.into_error(reference.to_string()));
                }
            }
        }
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send_chat(&self, prompt: &str) -> Result<String, GatewayError> {
        let reference = Uuid::new_v4().simple().to_string();
        let started = Instant::now();

        debug!(
            reference = %reference,
            provider = %self.settings.kind,
            model = %self.settings.model,
            prompt_chars = prompt.chars().count(),
            "Dispatching prompt to provider"
        );

        match tokio::time::timeout(self.settings.timeout, self.send_with_retry(prompt, &reference))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                let elapsed = started.elapsed();
                warn!(reference = %reference, elapsed = ?elapsed, "Provider call timed out");
                Err(GatewayError::Timeout { elapsed, reference })
            }
        }
    }

    fn info(&self) -> GatewayInfo {
        GatewayInfo {
            kind: self.settings.kind.to_string(),
            model: self.settings.model.clone(),
        }
    }
}
