//! Axum routes for the wiki-lore HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`                 : Liveness probe
//! - `GET  {prefix}`                : Service index
//! - `GET  {prefix}/status`         : Catalog size and provider info
//! - `GET  {prefix}/characters`     : Full catalog, in catalog order
//! - `GET  {prefix}/characters/{name}`: One character (404 if unknown)
//! - `GET  {prefix}/search?q=&limit=&offset=`: Paged name/description search
//! - `POST {prefix}/chat`           : In-character chat
//!
//! `{prefix}` defaults to `/api`.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::{ApiError, ApiResult};
use crate::characters::{Character, CharacterRepository};
use crate::chat::{chat_handler, ChatService};
use crate::config::ApiSettings;
use crate::llms::ChatGateway;
use crate::persona::PromptBuilder;

/// Service name reported by `/health` and the index.
pub const SERVICE_NAME: &str = "wiki-lore";

/// Shared application state. Everything inside is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn CharacterRepository>,
    pub chat: ChatService,
    pub api: ApiSettings,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn CharacterRepository>,
        gateway: Arc<dyn ChatGateway>,
        prompts: PromptBuilder,
        api: ApiSettings,
    ) -> Self {
        Self {
            chat: ChatService::new(repository.clone(), prompts, gateway),
            repository,
            api,
            started_at: Utc::now(),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(index_handler))
        .route("/status", get(status_handler))
        .route("/characters", get(list_characters_handler))
        .route("/characters/{name}", get(get_character_handler))
        .route("/search", get(search_handler))
        .route("/chat", post(chat_handler));

    let router = Router::new().route("/health", get(health_handler));
    let router = if state.api.prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(&state.api.prefix, api)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.api.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

/// GET /health: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": SERVICE_NAME,
    }))
}

/// GET {prefix}: endpoint index.
async fn index_handler(State(state): State<AppState>) -> Json<Value> {
    let prefix = &state.api.prefix;
    Json(serde_json::json!({
        "name": SERVICE_NAME,
        "version": crate::VERSION,
        "endpoints": [
            format!("GET {}/characters", prefix),
            format!("GET {}/characters/{{name}}", prefix),
            format!("GET {}/search?q=&limit=&offset=", prefix),
            format!("GET {}/status", prefix),
            format!("POST {}/chat", prefix),
        ],
    }))
}

/// GET {prefix}/status: catalog size and provider identity. Never exposes
/// the provider URL or key.
async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    let uptime = Utc::now().signed_duration_since(state.started_at);
    Json(serde_json::json!({
        "status": "operational",
        "version": crate::VERSION,
        "characters": state.repository.len(),
        "provider": state.chat.gateway().info(),
        "started_at": state.started_at.to_rfc3339(),
        "uptime_seconds": uptime.num_seconds().max(0),
    }))
}

/// GET {prefix}/characters: the whole catalog.
async fn list_characters_handler(State(state): State<AppState>) -> Json<Vec<Character>> {
    Json(state.repository.list())
}

/// GET {prefix}/characters/{name}: one character, exact match.
async fn get_character_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Character>> {
    state
        .repository
        .get(&name)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Character '{}' not found", name)))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    total: usize,
    offset: usize,
    limit: usize,
    results: Vec<Character>,
}

/// GET {prefix}/search?q=&limit=&offset=: case-insensitive catalog search.
///
/// `total` counts every match, before `offset` and `limit` are applied.
async fn search_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Query(params) =
        params.map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
    let limits = state.api.search;

    let query = params.q.unwrap_or_default().trim().to_string();
    if query.chars().count() < limits.min_query_length {
        return Err(ApiError::invalid_input(format!(
            "Query must be at least {} characters",
            limits.min_query_length
        )));
    }

    let limit = params
        .limit
        .unwrap_or(limits.max_results)
        .clamp(1, limits.max_results);
    let offset = params.offset.unwrap_or(0);

    let matches = state.repository.search(&query);
    let total = matches.len();
    let results = matches.into_iter().skip(offset).take(limit).collect();

    Ok(Json(SearchResponse {
        query,
        total,
        offset,
        limit,
        results,
    }))
}
