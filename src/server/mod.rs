//! HTTP server for the character catalog and persona chat.
//!
//! # Endpoints
//!
//! - `GET  /health`              : Liveness probe
//! - `GET  /api/characters`      : Catalog
//! - `GET  /api/characters/{name}`: One character
//! - `POST /api/chat`            : In-character chat

pub mod error;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use routes::{app_router, AppState};
