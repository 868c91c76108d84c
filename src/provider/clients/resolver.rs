use crate::error::ApiError;
use crate::provider::clients::{OllamaClient, OpenAiCompatibleClient, StubProvider};
use crate::provider::profile::{ProviderConfig, ProviderType};
use crate::provider::GenerationProvider;
use std::sync::Arc;
use std::time::Duration;

/// Build the concrete client described by `config`
///
/// Fails when the configuration is invalid or a hosted provider has no API key.
pub fn create_provider_client(
    config: &ProviderConfig,
) -> Result<Arc<dyn GenerationProvider>, ApiError> {
    config.validate().map_err(ApiError::ConfigError)?;
    let timeout = Duration::from_secs(config.timeout_secs);
    let model = config.resolved_model();

    match config.provider_type {
        ProviderType::Stub => Ok(Arc::new(StubProvider::new())),
        ProviderType::Ollama => {
            let host = config.resolved_endpoint().ok_or_else(|| {
                ApiError::ConfigError("Ollama provider requires an endpoint".to_string())
            })?;
            Ok(Arc::new(OllamaClient::new(
                host,
                model,
                config.embedding_model.clone(),
                config.default_options.clone(),
                timeout,
            )?))
        }
        ProviderType::OpenAI | ProviderType::Fireworks => {
            let api_key = config.resolved_api_key().ok_or_else(|| {
                let var = config
                    .api_key_env
                    .as_deref()
                    .or_else(|| config.provider_type.api_key_env_var())
                    .unwrap_or("api_key");
                ApiError::ConfigError(format!(
                    "{} API key required (set in config or {} env var)",
                    config.provider_type.slug(),
                    var
                ))
            })?;
            let base_url = config.resolved_endpoint().ok_or_else(|| {
                ApiError::ConfigError("OpenAI-compatible provider requires an endpoint".into())
            })?;
            Ok(Arc::new(OpenAiCompatibleClient::new(
                config.provider_type.slug(),
                base_url,
                api_key,
                model,
                config.embedding_model.clone(),
                config.default_options.clone(),
                timeout,
            )?))
        }
    }
}
