use crate::error::ApiError;
use crate::provider::CompletionOptions;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Provider configuration owned by the provider domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type.
    #[serde(default)]
    pub provider_type: ProviderType,

    /// Model identifier; each provider type has a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// API key, normally left unset and read from the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key, overriding the type default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Base URL or host, provider specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Embedding model; embeddings are skipped when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after a failed call before falling back to the stub.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Default completion options for this provider.
    #[serde(default)]
    pub default_options: CompletionOptions,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    1
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::Stub,
            model: None,
            api_key: None,
            api_key_env: None,
            endpoint: None,
            embedding_model: None,
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            default_options: CompletionOptions::default(),
        }
    }
}

/// Provider type enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Deterministic offline stub.
    #[default]
    Stub,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "openai")]
    OpenAI,
    /// Fireworks.ai through its OpenAI-compatible API.
    #[serde(rename = "fireworks")]
    Fireworks,
}

impl ProviderType {
    pub fn slug(&self) -> &'static str {
        match self {
            ProviderType::Stub => "stub",
            ProviderType::Ollama => "ollama",
            ProviderType::OpenAI => "openai",
            ProviderType::Fireworks => "fireworks",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::Stub => "stub",
            ProviderType::Ollama => "llama3",
            ProviderType::OpenAI => "gpt-4o-mini",
            ProviderType::Fireworks => "accounts/fireworks/models/llama4-maverick-instruct-basic",
        }
    }

    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            ProviderType::Stub => None,
            ProviderType::Ollama => Some("http://localhost:11434"),
            ProviderType::OpenAI => Some("https://api.openai.com/v1"),
            ProviderType::Fireworks => Some("https://api.fireworks.ai/inference/v1"),
        }
    }

    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Fireworks => Some("FIREWORKS_API_KEY"),
            ProviderType::Stub | ProviderType::Ollama => None,
        }
    }
}

impl FromStr for ProviderType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stub" => Ok(ProviderType::Stub),
            "ollama" => Ok(ProviderType::Ollama),
            "openai" => Ok(ProviderType::OpenAI),
            "fireworks" => Ok(ProviderType::Fireworks),
            _ => Err(ApiError::ConfigError(format!(
                "Invalid provider type: {}. Must be stub, ollama, openai, or fireworks",
                s
            ))),
        }
    }
}

impl ProviderConfig {
    fn endpoint_has_scheme(endpoint: &str) -> bool {
        endpoint.starts_with("http://") || endpoint.starts_with("https://")
    }

    pub fn resolved_model(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.provider_type.default_model().to_string())
    }

    /// Endpoint with trailing slashes removed; Ollama also honours `OLLAMA_HOST`.
    pub fn resolved_endpoint(&self) -> Option<String> {
        let endpoint = self.endpoint.clone().or_else(|| match self.provider_type {
            ProviderType::Ollama => std::env::var("OLLAMA_HOST").ok(),
            _ => None,
        });
        endpoint
            .or_else(|| self.provider_type.default_endpoint().map(str::to_string))
            .map(|e| e.trim().trim_end_matches('/').to_string())
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.clone().filter(|k| !k.is_empty()) {
            return Some(key);
        }
        let var = self
            .api_key_env
            .as_deref()
            .or_else(|| self.provider_type.api_key_env_var())?;
        std::env::var(var).ok().filter(|k| !k.is_empty())
    }

    pub fn endpoint_url_is_valid(endpoint: &str) -> bool {
        let endpoint = endpoint.trim();
        if !Self::endpoint_has_scheme(endpoint) {
            return false;
        }

        let Some(rest) = endpoint.split_once("://").map(|(_, rest)| rest) else {
            return false;
        };

        if rest.is_empty() || rest.chars().any(char::is_whitespace) {
            return false;
        }

        let authority = rest.split('/').next().unwrap_or_default();
        let host_port = authority.rsplit('@').next().unwrap_or(authority);

        let host = if host_port.starts_with('[') {
            let Some(end_bracket) = host_port.find(']') else {
                return false;
            };
            &host_port[1..end_bracket]
        } else {
            host_port.split(':').next().unwrap_or_default()
        };

        if host.is_empty() {
            return false;
        }

        host == "localhost" || host.contains('.') || host.parse::<std::net::IpAddr>().is_ok()
    }

    /// Validate provider configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err("Model name cannot be empty".to_string());
            }
        }

        if let Some(endpoint) = &self.endpoint {
            if !Self::endpoint_url_is_valid(endpoint) {
                return Err(format!("Invalid endpoint URL: {}", endpoint));
            }
        }

        if let Some(temp) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(format!(
                    "Temperature must be between 0.0 and 2.0, got {}",
                    temp
                ));
            }
        }

        if self.timeout_secs == 0 {
            return Err("Provider timeout must be at least one second".to_string());
        }

        Ok(())
    }
}
