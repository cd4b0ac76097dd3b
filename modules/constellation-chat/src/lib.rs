//! Retrieval-augmented chat over an article constellation.
//!
//! The analyst answers questions from retrieved articles only: it embeds the
//! query in the same vector space as the articles, ranks articles by cosine
//! similarity, serializes the winners into a grounding context block and hands
//! that to a generation backend. Zero hits above the threshold is a sentinel
//! outcome ("no relevant context found"), never an error.

pub mod chat;
pub mod context;
pub mod embedder;
pub mod memory;
pub mod retriever;
pub mod testing;

pub use chat::{Analyst, ChatOutcome, ChatTurn, TurnRole};
pub use embedder::Embedder;
pub use memory::{MemoryDocument, MemoryHit, MemoryMetadata, MemoryStore, RemoteMemoryStore};
pub use retriever::{retrieve, RankedArticle, RetrievalSettings};
