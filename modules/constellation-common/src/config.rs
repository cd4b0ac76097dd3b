use std::env;

use tracing::info;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Embedding backend (any OpenAI-compatible /v1/embeddings endpoint)
    pub embedding_api_key: String,
    pub embedding_base_url: String,
    pub embedding_model: String,

    // Generation backend (OpenAI-compatible /v1/chat/completions)
    pub generation_api_key: String,
    pub generation_base_url: Option<String>,
    pub generation_model: String,

    // Optional remote memory store
    pub memory_api_url: Option<String>,
    pub memory_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            embedding_api_key: required_env("EMBEDDING_API_KEY"),
            embedding_base_url: env::var("EMBEDDING_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/v1".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "all-MiniLM-L6-v2".to_string()),
            generation_api_key: required_env("GENERATION_API_KEY"),
            generation_base_url: env::var("GENERATION_BASE_URL").ok(),
            generation_model: env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            memory_api_url: env::var("MEMORY_API_URL").ok(),
            memory_api_key: env::var("MEMORY_API_KEY").ok(),
        }
    }

    /// Log the non-secret parts of the config at startup.
    pub fn log_redacted(&self) {
        info!(
            embedding_base_url = self.embedding_base_url.as_str(),
            embedding_model = self.embedding_model.as_str(),
            generation_model = self.generation_model.as_str(),
            memory_store = self.memory_api_url.is_some(),
            "Config loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
