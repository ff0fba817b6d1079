//! Upstream AI provider integration
//!
//! Text answers come from Gemini's `generateContent`; images come from
//! Leonardo's asynchronous generation API. Each provider sits behind a trait
//! so routing logic never sees a provider wire format.

pub mod gemini;
pub mod leonardo;
pub mod mock;

pub use gemini::GeminiChatClient;
pub use leonardo::LeonardoImageClient;
pub use mock::{MockChatClient, MockImageJobClient};

use crate::models::JobStatus;
use crate::Result;
use async_trait::async_trait;

/// Synchronous text generation.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn converse(&self, prompt: &str) -> Result<String>;
}

/// Asynchronous image generation tracked by provider-side job ids.
#[async_trait]
pub trait ImageJobService: Send + Sync {
    /// Submit a generation and return the provider's job id.
    async fn start_generation(&self, prompt: &str) -> Result<String>;

    /// Look up the current state of a job. Must not change provider state.
    async fn generation_status(&self, generation_id: &str) -> Result<JobStatus>;
}
