use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Embedding dimension of the session model. All vectors in a session must
/// come from the same model/version or similarity comparisons are meaningless.
pub const EMBEDDING_DIM: usize = 384;

/// Characters of body text included in the embed text after the title.
/// Keeps vectors representative of the lead and bounds embedding cost.
pub const EMBED_TEXT_BODY_CHARS: usize = 500;

// --- Articles ---

/// A news article supplied by the ingestion collaborator. Immutable once
/// fetched; its positional index in the session article list is its node id,
/// assigned once after all fetches complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub text: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Text sent to the embedding backend: title plus the leading body text.
    pub fn embed_text(&self) -> String {
        format!(
            "{}: {}",
            self.title,
            truncate_chars(&self.text, EMBED_TEXT_BODY_CHARS)
        )
    }
}

/// An article with its embedding vector attached (1:1, post-embedding).
#[derive(Debug, Clone)]
pub struct EmbeddedArticle {
    pub article: Article,
    pub vector: Vec<f32>,
}

// --- Presentation enums ---

/// Which node attribute drives display color. A presentation concern only;
/// never affects edges or clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Cluster,
    Sentiment,
    Politics,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cluster" => Ok(ColorMode::Cluster),
            "sentiment" => Ok(ColorMode::Sentiment),
            "politics" => Ok(ColorMode::Politics),
            other => Err(format!(
                "unknown color mode '{other}' (expected cluster, sentiment or politics)"
            )),
        }
    }
}

/// Edge classification in the article graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Similarity above the strong threshold — the cluster core.
    Strong,
    /// Low-weight connectivity edge added by the sparsification pass.
    Bridge,
    /// Link from a synthetic cluster-label node to a member article.
    LabelLink,
}

// --- Presentation view ---

/// A node as consumed by the presentation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub label: String,
    pub tooltip: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<usize>,
}

/// An edge as consumed by the presentation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeView {
    pub from: String,
    pub to: String,
    pub weight: f64,
    pub color: String,
    pub kind: EdgeKind,
}

/// Serializable layout handed to the presentation collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

/// Truncate a string to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
