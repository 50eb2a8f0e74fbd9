//! Persona prompts: binds a user message to a character's voice.

pub mod prompt_builder;

pub use prompt_builder::{validate_message, PromptBuilder, PromptError};
