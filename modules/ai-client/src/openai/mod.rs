mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::{ChatAgent, EmbedAgent, Message, MessageRole};
use client::OpenAiClient;

// =============================================================================
// OpenAi Agent
// =============================================================================

/// Client for any OpenAI-compatible API: chat completions and embeddings.
/// The base URL is configurable so the same client can front hosted embedding
/// servers (e.g. text-embeddings-inference) and chat providers.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Simple chat completion (convenience method).
    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        self.chat(vec![Message::system(system), Message::user(user)])
            .await
    }

    fn wire_message(message: &Message) -> types::WireMessage {
        match message.role {
            MessageRole::System => types::WireMessage::system(&message.content),
            MessageRole::User => types::WireMessage::user(&message.content),
            MessageRole::Assistant => types::WireMessage::assistant(&message.content),
        }
    }
}

#[async_trait]
impl ChatAgent for OpenAi {
    async fn chat(&self, messages: Vec<Message>) -> Result<String> {
        let request = types::ChatRequest::new(&self.model)
            .messages(messages.iter().map(Self::wire_message).collect())
            .max_tokens(4096)
            .temperature(0.0);

        let response = self.client().chat(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("No response from chat model"))
    }
}

#[async_trait]
impl EmbedAgent for OpenAi {
    async fn embed(&self, text: String) -> Result<Vec<f32>> {
        self.client().embed(&self.embedding_model, &text).await
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.client()
            .embed_batch(&self.embedding_model, &texts)
            .await
    }
}
