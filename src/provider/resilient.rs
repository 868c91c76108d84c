//! Bounded, never-failing access to a generation provider
//!
//! Every call gets a timeout and a fixed number of retries. When all attempts
//! fail the caller still receives content: the deterministic stub summary,
//! prefixed with the error so the fallback is visible in the persona itself.

use crate::error::ProviderError;
use crate::provider::clients::StubProvider;
use crate::provider::{GenerationProvider, GenerationRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const FALLBACK_MODEL: &str = "fallback";

/// Result of a resilient generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub content: String,
    pub model: String,
    /// Last provider error when the fallback was used
    pub fallback_error: Option<String>,
}

impl GenerationOutcome {
    pub fn is_fallback(&self) -> bool {
        self.fallback_error.is_some()
    }
}

/// Timeout, retry and fallback wrapper around any provider
pub struct ResilientProvider {
    inner: Arc<dyn GenerationProvider>,
    timeout: Duration,
    retries: u32,
}

impl ResilientProvider {
    pub fn new(inner: Arc<dyn GenerationProvider>, timeout: Duration, retries: u32) -> Self {
        Self {
            inner,
            timeout,
            retries,
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn embedding_model(&self) -> Option<String> {
        self.inner.embedding_model().map(str::to_string)
    }

    /// Generate content, falling back to the stub after `retries + 1` failed attempts
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let attempts = self.retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, self.inner.generate(request)).await {
                Ok(Ok(response)) => {
                    debug!(provider = %self.inner.name(), attempt, "Generation succeeded");
                    return GenerationOutcome {
                        content: response.content,
                        model: response.model,
                        fallback_error: None,
                    };
                }
                Ok(Err(e)) => {
                    warn!(provider = %self.inner.name(), attempt, error = %e, "Generation failed");
                    last_error = Some(e);
                }
                Err(_) => {
                    let e = ProviderError::Timeout(self.timeout);
                    warn!(provider = %self.inner.name(), attempt, error = %e, "Generation timed out");
                    last_error = Some(e);
                }
            }
        }

        let error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        GenerationOutcome {
            content: format!(
                "[fallback used due to error: {}] {}",
                error,
                StubProvider::summarize(&request.user_prompt)
            ),
            model: FALLBACK_MODEL.to_string(),
            fallback_error: Some(error),
        }
    }

    /// Embed text when supported; failures are logged and yield `None`
    pub async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        self.inner.embedding_model()?;
        match tokio::time::timeout(self.timeout, self.inner.embed(text)).await {
            Ok(Ok(embedding)) => embedding,
            Ok(Err(e)) => {
                warn!(provider = %self.inner.name(), error = %e, "Embedding failed");
                None
            }
            Err(_) => {
                warn!(provider = %self.inner.name(), "Embedding timed out");
                None
            }
        }
    }
}
