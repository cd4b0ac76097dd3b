// Test mocks for the chat pipeline.
//
// Three mocks matching the three trait boundaries:
// - FixedEmbedder (TextEmbedder) — deterministic hash-based vectors
// - CannedChatAgent (ChatAgent) — fixed reply, records received messages
// - MockMemoryStore (MemoryStore) — stateful in-memory namespace map

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use ai_client::traits::{ChatAgent, Message};
use constellation_common::TextEmbedder;

use crate::memory::{MemoryDocument, MemoryHit, MemoryStore};

/// Deterministic embedder for testing. Registered texts get exact vectors;
/// unmatched texts get a unique hash-based vector (low similarity to everything).
pub struct FixedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl FixedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            dimension,
        }
    }

    /// Register a text→vector mapping for controlled similarity.
    pub fn on_text(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Generate a deterministic hash-based vector for unmatched text.
    fn hash_vector(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut vec = vec![0.0f32; self.dimension];
        let mut state = seed;
        for v in vec.iter_mut() {
            // Simple LCG PRNG
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            *v = ((state >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0;
        }
        // Normalize to unit vector
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vec.iter_mut() {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl TextEmbedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.hash_vector(text)))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t.as_str())
                    .cloned()
                    .unwrap_or_else(|| self.hash_vector(t))
            })
            .collect())
    }
}

/// Chat backend mock: returns a fixed reply (or a forced error) and records
/// every message list it receives for assertions.
pub struct CannedChatAgent {
    reply: Result<String, String>,
    received: Mutex<Vec<Vec<Message>>>,
}

impl CannedChatAgent {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Make every `chat` call fail with this message.
    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    /// Messages from the most recent `chat` call. Panics if never called.
    pub fn last_messages(&self) -> Vec<Message> {
        self.received
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("CannedChatAgent: chat was never called")
    }
}

#[async_trait]
impl ChatAgent for CannedChatAgent {
    async fn chat(&self, messages: Vec<Message>) -> Result<String> {
        self.received.lock().unwrap().push(messages);
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(error) => bail!("{error}"),
        }
    }
}

/// Stateful in-memory memory store. Thread-safe via interior Mutex.
/// `upsert` overwrites by document id; `search` returns substring matches.
pub struct MockMemoryStore {
    namespaces: Mutex<HashMap<String, HashMap<String, MemoryDocument>>>,
}

impl MockMemoryStore {
    pub fn new() -> Self {
        Self {
            namespaces: Mutex::new(HashMap::new()),
        }
    }

    pub fn document_count(&self, namespace: &str) -> usize {
        self.namespaces
            .lock()
            .unwrap()
            .get(namespace)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }
}

impl Default for MockMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for MockMemoryStore {
    async fn upsert(&self, namespace: &str, documents: Vec<MemoryDocument>) -> Result<()> {
        let mut namespaces = self.namespaces.lock().unwrap();
        let entry = namespaces.entry(namespace.to_string()).or_default();
        for doc in documents {
            entry.insert(doc.id.clone(), doc);
        }
        Ok(())
    }

    async fn search(&self, namespace: &str, query: &str, top_k: usize) -> Result<Vec<MemoryHit>> {
        let namespaces = self.namespaces.lock().unwrap();
        let Some(docs) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let needle = query.to_lowercase();
        let mut ids: Vec<&String> = docs
            .values()
            .filter(|d| d.text.to_lowercase().contains(&needle))
            .map(|d| &d.id)
            .collect();
        ids.sort();

        Ok(ids
            .into_iter()
            .take(top_k)
            .map(|id| {
                let doc = &docs[id];
                MemoryHit {
                    text: doc.text.clone(),
                    score: None,
                    metadata: doc.metadata.clone(),
                }
            })
            .collect())
    }
}
