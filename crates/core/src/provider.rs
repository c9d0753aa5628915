//! GenerationProvider trait — the abstraction over the text-generation service.
//!
//! A provider knows how to turn a prompt plus system instruction into
//! generated text. The orchestration layer calls `generate()` without knowing
//! which backend is being used.
//!
//! Implementations: Anthropic Messages API (in `librarian-providers`),
//! scripted mocks in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// One generation request: prompt, system instruction, output ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model to use (e.g., "claude-haiku-4-5")
    pub model: String,

    /// The user-facing prompt
    pub prompt: String,

    /// The system instruction framing the request
    pub system: String,

    /// Maximum tokens to generate
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        system: impl Into<String>,
        max_output_tokens: u32,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: system.into(),
            max_output_tokens,
        }
    }
}

/// The generation capability.
///
/// A call either returns the generated text, or fails with one of the three
/// provider error classes. No cancellation mid-call is supported; callers
/// wrap the future in their own deadline if they need one.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send a request and get the generated text.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<String, ProviderError>;
}
