//! Session pipeline — embed, compare, build.
//!
//! A `Constellation` is the request-scoped working set for one article batch:
//! articles with vectors, their similarity matrix and the constructed graph.
//! It is owned by the caller and rebuilt wholesale on any structural change
//! (new articles, new threshold); the core holds no state between calls.

use tracing::info;

use constellation_common::{Article, ConstellationError, EmbeddedArticle, TextEmbedder};

use crate::builder::{ArticleGraph, GraphBuilder, GraphSettings};
use crate::similarity::SimilarityMatrix;

/// The working set for one session: articles + vectors, matrix, graph.
#[derive(Debug, Default)]
pub struct Constellation {
    pub articles: Vec<EmbeddedArticle>,
    pub matrix: SimilarityMatrix,
    pub graph: ArticleGraph,
}

impl Constellation {
    /// Embed the articles, compute the pairwise matrix and build the graph.
    ///
    /// An empty article set yields an empty constellation — the explicit
    /// "no data" sentinel, not an error. An embedding backend failure aborts
    /// the whole build: downstream similarity needs a full vector set.
    pub async fn build(
        embedder: &dyn TextEmbedder,
        articles: Vec<Article>,
        settings: &GraphSettings,
    ) -> Result<Self, ConstellationError> {
        if articles.is_empty() {
            return Ok(Self::default());
        }

        let texts: Vec<String> = articles.iter().map(Article::embed_text).collect();
        info!(count = texts.len(), "Embedding article batch");

        let vectors = embedder
            .embed_batch(texts)
            .await
            .map_err(|e| ConstellationError::Embedding(e.to_string()))?;

        // One vector per article, in input order — anything else is an
        // embedding-backend bug, not a recoverable state.
        assert_eq!(
            vectors.len(),
            articles.len(),
            "embedding backend returned {} vectors for {} articles",
            vectors.len(),
            articles.len()
        );

        // All vectors must share one embedding space; a mixed-dimension batch
        // means the backend swapped models mid-session.
        if let Some(first) = vectors.first() {
            if let Some(odd) = vectors.iter().find(|v| v.len() != first.len()) {
                return Err(ConstellationError::Embedding(format!(
                    "embedding dimensions disagree: {} vs {}",
                    first.len(),
                    odd.len()
                )));
            }
        }

        let matrix = SimilarityMatrix::pairwise(&vectors);
        let graph = GraphBuilder::new(settings.clone()).build(&articles, &matrix);

        let articles = articles
            .into_iter()
            .zip(vectors)
            .map(|(article, vector)| EmbeddedArticle { article, vector })
            .collect();

        Ok(Self {
            articles,
            matrix,
            graph,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }
}
