//! `POST /chat` handler.
//!
//! Body: `{"message": "...", "character": "..."}`.
//! Malformed JSON and missing fields are reported as `invalid_input`
//! instead of axum's default rejection.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::service::{ChatRequest, ChatResult};
use crate::server::error::{ApiError, ApiResult};
use crate::server::AppState;

/// Wire shape of the request; fields are optional so absence can be
/// reported precisely.
#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    pub message: Option<String>,
    pub character: Option<String>,
}

impl ChatPayload {
    fn into_request(self) -> ApiResult<ChatRequest> {
        let message = self
            .message
            .ok_or_else(|| ApiError::invalid_input("Missing 'message' field"))?;
        let character = self
            .character
            .ok_or_else(|| ApiError::invalid_input("Missing 'character' field"))?;
        Ok(ChatRequest { message, character })
    }
}

pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> ApiResult<Json<ChatResult>> {
    let Json(payload) = payload.map_err(|rejection| {
        ApiError::invalid_input(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let request = payload.into_request()?;

    let result = state.chat.chat(&request).await?;
    Ok(Json(result))
}
