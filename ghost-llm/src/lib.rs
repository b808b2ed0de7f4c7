mod client;
pub mod config;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;

pub use client::{LlmDispatcher, NO_RESPONSE, REQUEST_TIMEOUT};
pub use config::{LlmConfig, ProviderEndpoints};
pub use provider::ProviderKind;
