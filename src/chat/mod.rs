//! Chat module: in-character conversation with a catalog persona.
//!
//! ```text
//! POST /chat {message, character}
//!   → validate message and character
//!   → resolve the character in the catalog
//!   → build the persona prompt
//!   → send through the ChatGateway
//!   → {character, response}
//! ```

pub mod handler;
pub mod service;

pub use handler::chat_handler;
pub use service::{ChatRequest, ChatResult, ChatService, ChatState};
