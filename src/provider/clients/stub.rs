use crate::error::ProviderError;
use crate::provider::{GenerationProvider, GenerationRequest, GenerationResponse};
use async_trait::async_trait;

/// Characters of prompt text echoed back by the stub
pub const STUB_SUMMARY_CHARS: usize = 600;

/// Deterministic offline provider
///
/// Echoes the non-blank lines of the user prompt, joined and truncated. When a
/// response schema is requested the echo is wrapped as `{"description": ...}`.
/// Also serves as the fallback when a real provider keeps failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubProvider;

impl StubProvider {
    pub const MODEL: &'static str = "stub";

    pub fn new() -> Self {
        Self
    }

    pub fn summarize(user_prompt: &str) -> String {
        let summary = user_prompt
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        summary.chars().take(STUB_SUMMARY_CHARS).collect()
    }
}

#[async_trait]
impl GenerationProvider for StubProvider {
    fn name(&self) -> &str {
        Self::MODEL
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let summary = Self::summarize(&request.user_prompt);
        let content = if request.schema.is_some() {
            serde_json::json!({ "description": summary }).to_string()
        } else {
            summary
        };
        Ok(GenerationResponse {
            content,
            model: Self::MODEL.to_string(),
        })
    }
}
