//! HACS LLM Provider Layer
//!
//! Pluggable implementations of the `LlmProvider` trait from `hacs-model`.
//!
//! # Providers
//!
//! - `MockProvider`: deterministic mock for testing, with latency and
//!   failure injection plus concurrency instrumentation
//! - `OllamaProvider`: local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use hacs_llm::MockProvider;
//! use hacs_model::LlmProvider;
//!
//! # async fn example() {
//! let provider = MockProvider::new("[]");
//! let response = provider.invoke("test prompt").await.unwrap();
//! assert_eq!(response.content, "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod ollama;

use async_trait::async_trait;
use hacs_model::{LlmProvider, LlmResponse};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// One scripted mock reply.
#[derive(Debug, Clone)]
enum MockReply {
    Respond(String),
    Fail(String),
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without any network calls. Replies can
/// be scripted in order; once the script is exhausted the provider falls
/// back to its default response. A configurable per-call delay makes
/// timeout and concurrency behavior observable, and the provider records
/// its concurrent-call high-water mark so tests can verify admission
/// control.
///
/// # Examples
///
/// ```
/// use hacs_llm::MockProvider;
/// use hacs_model::LlmProvider;
///
/// # async fn example() {
/// let provider = MockProvider::new("default");
/// provider.push_reply("first");
/// assert_eq!(provider.invoke("p").await.unwrap().content, "first");
/// assert_eq!(provider.invoke("p").await.unwrap().content, "default");
/// assert_eq!(provider.call_count(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    delay: Duration,
    call_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            call_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set a per-call delay, simulating provider latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a response returned by the next unscripted call.
    pub fn push_reply(&self, response: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(MockReply::Respond(response.into()));
    }

    /// Queue a provider-side failure for the next unscripted call.
    pub fn push_failure(&self, reason: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(MockReply::Fail(reason.into()));
    }

    /// Number of times `invoke` was called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were ever in flight simultaneously.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Reset call counters and the high-water mark.
    pub fn reset_counters(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        self.max_in_flight.store(0, Ordering::SeqCst);
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn invoke(&self, _prompt: &str) -> Result<LlmResponse, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let reply = self.script.lock().unwrap().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            Some(MockReply::Respond(content)) => Ok(LlmResponse::new(content)),
            Some(MockReply::Fail(reason)) => Err(LlmError::Other(reason)),
            None => Ok(LlmResponse::new(self.default_response.clone())),
        }
    }
}
