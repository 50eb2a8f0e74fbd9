//! Scripted [`ChatGateway`] for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::gateway::{ChatGateway, GatewayError, GatewayInfo};

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail(GatewayError),
    /// Answer with the first line of the prompt.
    EchoFirstLine,
}

/// Deterministic gateway that counts its calls.
#[derive(Debug, Clone)]
pub struct ScriptedGateway {
    script: Script,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGateway {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_script(Script::Reply(text.into()))
    }

    pub fn failing(error: GatewayError) -> Self {
        Self::with_script(Script::Fail(error))
    }

    pub fn echo_first_line() -> Self {
        Self::with_script(Script::EchoFirstLine)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `send_chat` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn send_chat(&self, prompt: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(error) => Err(error.clone()),
            Script::EchoFirstLine => Ok(prompt.lines().next().unwrap_or_default().to_string()),
        }
    }

    fn info(&self) -> GatewayInfo {
        GatewayInfo {
            kind: "scripted".to_string(),
            model: "none".to_string(),
        }
    }
}
