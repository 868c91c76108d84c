use crate::error::ProviderError;
use crate::provider::{
    CompletionOptions, GenerationProvider, GenerationRequest, GenerationResponse,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Client for a local or remote Ollama server
pub struct OllamaClient {
    http: reqwest::Client,
    host: String,
    model: String,
    embedding_model: Option<String>,
    options: CompletionOptions,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

impl OllamaClient {
    pub fn new(
        host: impl Into<String>,
        model: impl Into<String>,
        embedding_model: Option<String>,
        options: CompletionOptions,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;
        Ok(Self {
            http,
            host: host.into(),
            model: model.into(),
            embedding_model,
            options,
        })
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerationProvider for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
            "stream": false,
        });
        if let Some(temperature) = self.options.temperature {
            body["options"] = json!({ "temperature": temperature });
        }
        if let Some(schema) = &request.schema {
            body["format"] = schema.schema.clone();
        }

        let url = format!("{}/api/chat", self.host);
        debug!(host = %self.host, model = %self.model, "Sending Ollama chat");
        let parsed: OllamaChatResponse = self
            .post_json(&url, &body)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let content = parsed.message.map(|m| m.content).unwrap_or_default();
        Ok(GenerationResponse {
            content,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
        })
    }

    fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }

    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>, ProviderError> {
        let Some(model) = &self.embedding_model else {
            return Ok(None);
        };
        let url = format!("{}/api/embeddings", self.host);
        let parsed: OllamaEmbeddingResponse = self
            .post_json(&url, &json!({ "model": model, "prompt": text }))
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        if parsed.embedding.is_empty() {
            return Ok(None);
        }
        Ok(Some(parsed.embedding))
    }
}
