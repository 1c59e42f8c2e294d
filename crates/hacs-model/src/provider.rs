//! Trait definition for LLM backends
//!
//! The extraction core requires exactly one capability from a language
//! model: an async call taking a prompt and returning text. Provider
//! implementations live in `hacs-llm`; this crate only owns the seam.

use async_trait::async_trait;

/// Raw output of one LLM invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    /// The model's raw text output
    pub content: String,
}

impl LlmResponse {
    /// Wrap raw model output.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Trait for LLM provider operations
///
/// Implementations must be safe for concurrent invocation: the extraction
/// runner shares one provider across many in-flight calls and never
/// serializes access to it.
#[async_trait]
pub trait LlmProvider {
    /// Error type for provider operations
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Invoke the model with a rendered prompt.
    async fn invoke(&self, prompt: &str) -> Result<LlmResponse, Self::Error>;
}
