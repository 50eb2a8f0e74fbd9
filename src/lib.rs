//! # wiki-lore
//!
//! Backend for a game-lore wiki: a read-only character catalog and a
//! single-character chat endpoint that answers in the voice of a catalog
//! persona through an external language-model provider.
//!
//! Data flow for a chat:
//!
//! ```text
//! server → chat::ChatService → characters (lookup)
//!                            → persona (prompt)
//!                            → llms::ChatGateway → provider
//! ```

pub mod characters;
pub mod chat;
pub mod config;
pub mod llms;
pub mod persona;
pub mod server;
pub mod utilities;

pub use characters::{CatalogSource, Character, CharacterRepository, InMemoryCharacterRepository};
pub use chat::{ChatRequest, ChatResult, ChatService};
pub use config::Settings;
pub use llms::{ChatGateway, GatewayError, HttpChatGateway};
pub use persona::PromptBuilder;
pub use utilities::errors::ChatError;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
