//! Language-model access.
//!
//! - [`gateway`] - the `ChatGateway` trait and its normalized errors
//! - [`providers`] - the HTTP implementation and provider settings
//! - [`retry`] - the one-extra-attempt retry budget

pub mod gateway;
pub mod providers;
pub mod retry;

#[cfg(test)]
pub mod testing;

pub use gateway::{ChatGateway, GatewayError, GatewayInfo};
pub use providers::{HttpChatGateway, ProviderKind, ProviderSettings};
pub use retry::RetryPolicy;
