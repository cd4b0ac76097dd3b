use thiserror::Error;

/// Failure taxonomy for the constellation core. Every variant names the stage
/// that failed so callers can decide whether to retry that stage alone.
///
/// Empty inputs and empty retrieval results are NOT errors — those surface as
/// explicit empty-result sentinels so callers can render a "no data" state.
#[derive(Error, Debug)]
pub enum ConstellationError {
    #[error("Embedding backend error: {0}")]
    Embedding(String),

    #[error("Generation backend error: {0}")]
    Generation(String),

    #[error("Memory store error: {0}")]
    MemoryStore(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
