use anyhow::Result;
use async_trait::async_trait;

/// Text embedding boundary. Constructed once by the caller and passed by
/// reference into every pipeline stage so tests can substitute a stub.
///
/// Implementations must be deterministic for a deterministic backend: same
/// text + model version produces the same vector. A batch either succeeds for
/// every input or fails as a whole — downstream similarity requires a full,
/// consistent vector set.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}
