use ai_client::openai::OpenAi;
use ai_client::traits::EmbedAgent;
use anyhow::Result;

use constellation_common::TextEmbedder;

/// Production embedder: any OpenAI-compatible embeddings endpoint, via the
/// shared `ai-client`. Query vectors and article vectors must come from the
/// same instance so they share one embedding space.
pub struct Embedder {
    client: OpenAi,
}

impl Embedder {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Self {
        let client = OpenAi::new(api_key, model)
            .with_base_url(base_url)
            .with_embedding_model(model);
        Self { client }
    }
}

#[async_trait::async_trait]
impl TextEmbedder for Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text.to_string()).await
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.client.embed_batch(texts).await
    }
}
