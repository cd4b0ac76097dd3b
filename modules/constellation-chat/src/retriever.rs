//! Ranks articles against a query vector for use as generation context.

use serde::Serialize;
use tracing::debug;

use constellation_common::EmbeddedArticle;
use constellation_graph::cosine_similarity;

/// Default number of articles handed to the generator.
pub const DEFAULT_TOP_K: usize = 5;

/// Default minimum query-article similarity for a retrieval hit.
pub const DEFAULT_MIN_SCORE: f64 = 0.3;

/// Tuning knobs for retrieval.
#[derive(Debug, Clone)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub min_score: f64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// One retrieval hit: article index into the session set plus its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedArticle {
    pub index: usize,
    pub score: f64,
}

/// Score every article against the query vector, drop scores below the
/// threshold, sort descending and truncate to `top_k`.
///
/// An empty result means "no relevant context found" — a sentinel the caller
/// renders, not an error. Purely a function of its inputs: identical calls
/// return identical ordered output. Equal scores resolve to the lower index.
pub fn retrieve(
    query_vector: &[f32],
    articles: &[EmbeddedArticle],
    settings: &RetrievalSettings,
) -> Vec<RankedArticle> {
    let mut ranked: Vec<RankedArticle> = articles
        .iter()
        .enumerate()
        .map(|(index, a)| RankedArticle {
            index,
            score: cosine_similarity(query_vector, &a.vector),
        })
        .filter(|r| r.score >= settings.min_score)
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .expect("similarity scores are finite")
            .then(a.index.cmp(&b.index))
    });
    ranked.truncate(settings.top_k);

    debug!(
        hits = ranked.len(),
        min_score = settings.min_score,
        "Retrieval complete"
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use constellation_common::Article;

    fn embedded(title: &str, vector: Vec<f32>) -> EmbeddedArticle {
        EmbeddedArticle {
            article: Article {
                title: title.to_string(),
                text: format!("{title} body"),
                url: format!("https://example.com/{}", title.replace(' ', "-")),
                image_url: None,
                published_at: None,
            },
            vector,
        }
    }

    fn gpu_set() -> Vec<EmbeddedArticle> {
        vec![
            embedded("GPU demand spikes", vec![1.0, 0.1, 0.0]),
            embedded("AI hardware race", vec![0.9, 0.3, 0.05]),
            embedded("Perfect pizza dough", vec![0.0, 0.05, 1.0]),
        ]
    }

    #[test]
    fn empty_article_set_returns_empty_list() {
        let hits = retrieve(&[1.0, 0.0], &[], &RetrievalSettings::default());
        assert!(hits.is_empty());
    }

    #[test]
    fn results_are_filtered_sorted_and_truncated() {
        // Query near the AI articles.
        let query = vec![1.0, 0.2, 0.0];
        let hits = retrieve(&query, &gpu_set(), &RetrievalSettings::default());

        assert_eq!(hits.len(), 2); // pizza filtered out
        assert_eq!(hits[0].index, 0);
        assert_eq!(hits[1].index, 1);
        assert!(hits[0].score >= hits[1].score);
        for hit in &hits {
            assert!(hit.score >= DEFAULT_MIN_SCORE);
        }
    }

    #[test]
    fn top_k_truncates() {
        let query = vec![1.0, 0.2, 0.0];
        let settings = RetrievalSettings {
            top_k: 1,
            ..RetrievalSettings::default()
        };
        let hits = retrieve(&query, &gpu_set(), &settings);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn threshold_excludes_weak_matches() {
        let query = vec![1.0, 0.2, 0.0];
        let settings = RetrievalSettings {
            min_score: 0.999,
            ..RetrievalSettings::default()
        };
        let hits = retrieve(&query, &gpu_set(), &settings);
        assert!(hits.is_empty());
    }

    #[test]
    fn retrieval_is_idempotent() {
        let query = vec![0.7, 0.4, 0.1];
        let articles = gpu_set();
        let settings = RetrievalSettings::default();

        let first = retrieve(&query, &articles, &settings);
        let second = retrieve(&query, &articles, &settings);
        assert_eq!(first, second);
    }

    #[test]
    fn equal_scores_rank_by_index() {
        let articles = vec![
            embedded("a", vec![1.0, 0.0]),
            embedded("b", vec![1.0, 0.0]),
        ];
        let hits = retrieve(&[1.0, 0.0], &articles, &RetrievalSettings::default());
        assert_eq!(hits[0].index, 0);
        assert_eq!(hits[1].index, 1);
    }
}
