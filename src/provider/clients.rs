mod ollama;
mod openai;
mod resolver;
mod stub;

pub use ollama::OllamaClient;
pub use openai::OpenAiCompatibleClient;
pub use resolver::create_provider_client;
pub use stub::StubProvider;
