//! Generation Providers
//!
//! Language-model access behind a single trait. Concrete clients talk to Ollama
//! or any OpenAI-compatible endpoint; the stub is deterministic and offline.
//! The builder only ever calls providers through [`ResilientProvider`], which
//! bounds every call and never lets a provider failure escape.

pub mod clients;
pub mod profile;
pub mod resilient;

pub use clients::{create_provider_client, OllamaClient, OpenAiCompatibleClient, StubProvider};
pub use profile::{ProviderConfig, ProviderType};
pub use resilient::{GenerationOutcome, ResilientProvider};

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling options forwarded to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.2),
            max_tokens: None,
        }
    }
}

/// Target structure the model is asked to produce
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// One generation call: system role, user prompt and optional schema hint
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub schema: Option<ResponseSchema>,
}

impl GenerationRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Raw model output
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub content: String,
    pub model: String,
}

/// A language model that can answer prompts and optionally embed text
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResponse, ProviderError>;

    /// Embedding model name when this provider can embed text
    fn embedding_model(&self) -> Option<&str> {
        None
    }

    /// Embed `text`; `Ok(None)` when the provider has no embedding capability
    async fn embed(&self, _text: &str) -> Result<Option<Vec<f32>>, ProviderError> {
        Ok(None)
    }
}
