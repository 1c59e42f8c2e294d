//! Ollama provider
//!
//! Thin async client for Ollama's local generate API. Each `invoke` issues
//! exactly one HTTP request: retry and timeout policy belong to the caller
//! (the extraction runner applies its own per-call timeout and retry
//! budget), so layering another retry loop here would make those budgets
//! meaningless.

use crate::LlmError;
use async_trait::async_trait;
use hacs_model::{LlmProvider, LlmResponse};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default HTTP client timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Ollama API provider for local LLM inference
///
/// The client timeout is a transport-level backstop against a hung
/// connection; callers enforcing tighter deadlines wrap `invoke` in their
/// own timeout.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a provider with the default client timeout.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Communication` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, DEFAULT_TIMEOUT)
    }

    /// Create a provider with an explicit client timeout.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Communication` if the HTTP client cannot be built.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("client build failed: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client,
        })
    }

    /// Create a provider against `http://localhost:11434`.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Communication` if the HTTP client cannot be built.
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Issue one generate call and return the raw completion text.
    ///
    /// # Errors
    ///
    /// Returns `ModelNotAvailable` on HTTP 404, `RateLimitExceeded` on
    /// HTTP 429, `InvalidResponse` when the body does not parse, and
    /// `Communication` for transport failures and other statuses.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("request failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => {
                let parsed: GenerateResponse = response
                    .json()
                    .await
                    .map_err(|e| LlmError::InvalidResponse(format!("bad response body: {}", e)))?;
                Ok(parsed.response)
            }
            reqwest::StatusCode::NOT_FOUND => Err(LlmError::ModelNotAvailable(self.model.clone())),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimitExceeded),
            status => {
                let detail = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unreadable body".to_string());
                Err(LlmError::Communication(format!("HTTP {}: {}", status, detail)))
            }
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    async fn invoke(&self, prompt: &str) -> Result<LlmResponse, Self::Error> {
        self.generate(prompt).await.map(LlmResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434", "llama2").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model, "llama2");
    }

    #[test]
    fn test_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_provider_with_timeout() {
        let provider =
            OllamaProvider::with_timeout("http://localhost:11434", "llama2", Duration::from_secs(5));
        assert!(provider.is_ok());
    }

    // Integration test (requires running Ollama)
    #[tokio::test]
    #[ignore]
    async fn test_generate_integration() {
        let provider = OllamaProvider::default_endpoint("llama2").unwrap();
        let result = provider.generate("Say 'hello' and nothing else").await;

        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }

    #[tokio::test]
    async fn test_closed_port_fails_with_single_attempt() {
        // A closed port is a transport error; no provider-side retries, so
        // this returns quickly instead of burning a backoff schedule
        let provider = OllamaProvider::new("http://localhost:59999", "llama2").unwrap();

        let started = std::time::Instant::now();
        let result = provider.generate("test").await;

        assert!(matches!(result, Err(LlmError::Communication(_))));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
