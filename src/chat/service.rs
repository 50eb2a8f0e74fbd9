//! Chat orchestration: validate, resolve the persona, build the prompt,
//! dispatch to the gateway.
//!
//! Every call is stateless. The service holds only shared read-only parts,
//! so any number of chats can run concurrently on one instance.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::characters::CharacterRepository;
use crate::llms::ChatGateway;
use crate::persona::PromptBuilder;
use crate::utilities::errors::ChatError;

/// One chat turn as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub character: String,
}

impl ChatRequest {
    pub fn new(character: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            character: character.into(),
        }
    }
}

/// The persona's answer. `character` always echoes the resolved request
/// character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    pub character: String,
    pub response: String,
}

/// Lifecycle of a chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Received,
    Validated,
    Dispatched,
    Completed,
    Failed,
}

impl fmt::Display for ChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChatState::Received => "received",
            ChatState::Validated => "validated",
            ChatState::Dispatched => "dispatched",
            ChatState::Completed => "completed",
            ChatState::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Clone)]
pub struct ChatService {
    repository: Arc<dyn CharacterRepository>,
    prompts: PromptBuilder,
    gateway: Arc<dyn ChatGateway>,
}

impl ChatService {
    pub fn new(
        repository: Arc<dyn CharacterRepository>,
        prompts: PromptBuilder,
        gateway: Arc<dyn ChatGateway>,
    ) -> Self {
        Self {
            repository,
            prompts,
            gateway,
        }
    }

    pub fn gateway(&self) -> &Arc<dyn ChatGateway> {
        &self.gateway
    }

    /// Run one chat turn.
    ///
    /// Input and persona problems are reported before the gateway is
    /// touched.
    #[instrument(skip_all, fields(character = %request.character))]
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResult, ChatError> {
        debug!(state = %ChatState::Received, "Chat request");

        let result = self.run(request).await;
        match &result {
            Ok(reply) => info!(
                state = %ChatState::Completed,
                response_chars = reply.response.chars().count(),
                "Chat completed"
            ),
            Err(err) => warn!(
                state = %ChatState::Failed,
                kind = err.kind(),
                reference = err.reference().unwrap_or("-"),
                "Chat failed"
            ),
        }
        result
    }

    async fn run(&self, request: &ChatRequest) -> Result<ChatResult, ChatError> {
        let message = self.prompts.validate(&request.message)?;
        if request.character.trim().is_empty() {
            return Err(ChatError::InvalidInput(
                "character must not be empty".to_string(),
            ));
        }
        debug!(state = %ChatState::Validated, "Chat input accepted");

        let character =
            self.repository
                .get(&request.character)
                .ok_or_else(|| ChatError::NotFound {
                    name: request.character.clone(),
                })?;

        let prompt = self.prompts.build_prompt(&character, message)?;

        debug!(
            state = %ChatState::Dispatched,
            prompt_chars = prompt.chars().count(),
            "Sending persona prompt"
        );
        let response = self.gateway.send_chat(&prompt).await?;

        Ok(ChatResult {
            character: character.name,
            response: response.trim().to_string(),
        })
    }
}
