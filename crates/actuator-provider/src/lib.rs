//! Language-model backends for Actuator.
//!
//! Every client implements [`actuator_core::provider::ProviderClient`] and
//! returns the model's text untouched; deciding what that text means is the
//! engine's job.

pub mod client;
pub mod error;
pub mod gemini;
mod http;
pub mod mock;
pub mod models;
pub mod openai;
pub mod retry;

pub use client::ProviderClientFactory;
pub use error::{ProviderError, Result};
pub use gemini::{GeminiClient, GeminiConfig};
pub use mock::MockProviderClient;
pub use openai::{OpenAIClient, OpenAIConfig};
pub use retry::RetryPolicy;
