//! Text generation for nudge messages.
//!
//! [`MessageGenerator`] is the seam the scheduler calls; [`HttpMessageGenerator`]
//! talks to an OpenAI-compatible chat-completions endpoint.

mod http;

pub use http::HttpMessageGenerator;

use async_trait::async_trait;

use crate::error::GenerationError;

/// Turns a prompt into a message. One request per call, no retries.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
        model_id: &str,
    ) -> Result<String, GenerationError>;
}
