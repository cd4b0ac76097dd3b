//! Optional long-term memory behind a fixed capability interface.
//!
//! The analyst works entirely from the session constellation; memory is an
//! additive capability for recalling articles across sessions. The trait is
//! the contract — callers never see which backend sits behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use anyhow::{anyhow, Result};

use constellation_common::EmbeddedArticle;

/// Metadata stored alongside a memory document and echoed back on hits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// One document to persist. `id` is stable per (namespace, article position)
/// so re-upserting a session overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub id: String,
    pub text: String,
    pub metadata: MemoryMetadata,
}

/// One search hit. `score` is backend-defined and optional; ordering of the
/// returned list is the backend's ranking.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryHit {
    pub text: String,
    pub score: Option<f64>,
    #[serde(default)]
    pub metadata: MemoryMetadata,
}

/// Capability interface for long-term article memory. Namespaces isolate
/// sessions (or users) from each other.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Insert or overwrite documents in a namespace.
    async fn upsert(&self, namespace: &str, documents: Vec<MemoryDocument>) -> Result<()>;

    /// Semantic search within a namespace. An empty result is a valid answer.
    async fn search(&self, namespace: &str, query: &str, top_k: usize) -> Result<Vec<MemoryHit>>;
}

/// Build memory documents for a session's articles. Uses the same text shape
/// as embedding so recall operates over what the vectors were built from.
pub fn documents_from_articles(namespace: &str, articles: &[EmbeddedArticle]) -> Vec<MemoryDocument> {
    articles
        .iter()
        .enumerate()
        .map(|(i, embedded)| MemoryDocument {
            id: format!("{namespace}-{i}"),
            text: embedded.article.embed_text(),
            metadata: MemoryMetadata {
                title: embedded.article.title.clone(),
                url: embedded.article.url.clone(),
                topic: None,
            },
        })
        .collect()
}

/// HTTP-backed store for any service exposing `/upsert` and `/search`.
pub struct RemoteMemoryStore {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    namespace: &'a str,
    documents: &'a [MemoryDocument],
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    namespace: &'a str,
    query: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Vec<MemoryHit>,
}

impl RemoteMemoryStore {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http: reqwest::Client::new(),
        }
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.post(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }
        builder
    }
}

#[async_trait]
impl MemoryStore for RemoteMemoryStore {
    async fn upsert(&self, namespace: &str, documents: Vec<MemoryDocument>) -> Result<()> {
        debug!(namespace, count = documents.len(), "Upserting memory documents");
        let response = self
            .request("/upsert")
            .json(&UpsertRequest {
                namespace,
                documents: &documents,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Memory upsert failed ({status}): {body}"));
        }
        Ok(())
    }

    async fn search(&self, namespace: &str, query: &str, top_k: usize) -> Result<Vec<MemoryHit>> {
        let response = self
            .request("/search")
            .json(&SearchRequest {
                namespace,
                query,
                top_k,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Memory search failed ({status}): {body}"));
        }

        let parsed: SearchResponse = response.json().await?;
        debug!(namespace, hits = parsed.hits.len(), "Memory search complete");
        Ok(parsed.hits)
    }
}
