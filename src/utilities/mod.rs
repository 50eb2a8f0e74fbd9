//! Shared utilities: error types and secret redaction.

pub mod errors;
pub mod redact;

pub use errors::{CatalogError, ChatError};
pub use redact::{redact_secret, scrub};
