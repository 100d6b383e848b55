//! The uniform LLM provider contract: a single prompt in, a single completion string out.

use super::errors::LLMError;
use async_trait::async_trait;

/// An external generative-model collaborator. The pipeline only ever calls `invoke`; model
/// choice, retries, and credential handling are the adapter's concern, not the orchestrator's.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Provider name, used in error messages and logs (e.g. "openai-compatible").
    fn name(&self) -> &str;

    /// Model identifier in use (e.g. "gpt-4o-mini").
    fn model(&self) -> &str;

    /// Send a single prompt and return the raw completion text.
    async fn invoke(&self, prompt: &str, temperature: f32) -> Result<String, LLMError>;
}
