//! Pluggable node decorators — pure, per-article presentation heuristics.
//!
//! Decorators run after graph construction and never affect edges or
//! clustering. Each is an independent `Article → value` function so it can be
//! tested and swapped on its own. None of these claim real NLU: sentiment is
//! a word-list polarity, political lean is a domain lookup, clickbait is a
//! headline surface-feature score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use constellation_common::Article;

use crate::similarity::SimilarityMatrix;

/// Shared read-only inputs for a decoration pass.
pub struct DecorateContext<'a> {
    pub articles: &'a [Article],
    pub matrix: &'a SimilarityMatrix,
}

/// Output of a single decorator for a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationValue {
    /// Scalar feature score.
    Score(f64),
    /// Source political lean bucket.
    Lean(SourceLean),
    /// Reference to another article by index (e.g. counterpoint).
    ArticleRef(Option<usize>),
}

/// Per-node decoration map, keyed by decorator name.
pub type NodeDecorations = BTreeMap<&'static str, DecorationValue>;

/// A pure per-node decoration function.
pub trait NodeDecorator: Send + Sync {
    fn key(&self) -> &'static str;
    fn decorate(&self, index: usize, ctx: &DecorateContext<'_>) -> DecorationValue;
}

/// The standard decorator set, in application order.
pub fn default_decorators() -> Vec<Box<dyn NodeDecorator>> {
    vec![
        Box::new(SentimentDecorator),
        Box::new(SourceLeanDecorator),
        Box::new(ClickbaitDecorator),
        Box::new(CounterpointDecorator),
    ]
}

/// Apply every decorator to every node.
pub fn decorate_all(
    decorators: &[Box<dyn NodeDecorator>],
    ctx: &DecorateContext<'_>,
) -> Vec<NodeDecorations> {
    (0..ctx.articles.len())
        .map(|i| {
            decorators
                .iter()
                .map(|d| (d.key(), d.decorate(i, ctx)))
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

const POSITIVE_WORDS: &[&str] = &[
    "growth", "success", "breakthrough", "win", "record", "boost", "hope",
    "recovery", "progress", "surge", "gain", "improve", "strong", "celebrate",
    "innovation", "opportunity",
];

const NEGATIVE_WORDS: &[&str] = &[
    "crisis", "crash", "collapse", "fear", "loss", "decline", "threat",
    "failure", "war", "death", "scandal", "layoff", "shortage", "warning",
    "lawsuit", "fraud",
];

/// Word-list polarity over title + lead text, in [-1, 1].
pub struct SentimentDecorator;

impl SentimentDecorator {
    pub fn score(article: &Article) -> f64 {
        let text = format!("{} {}", article.title, article.text).to_lowercase();
        let mut positive = 0i32;
        let mut negative = 0i32;
        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if POSITIVE_WORDS.contains(&token) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&token) {
                negative += 1;
            }
        }
        let total = positive + negative;
        if total == 0 {
            return 0.0;
        }
        f64::from(positive - negative) / f64::from(total)
    }
}

impl NodeDecorator for SentimentDecorator {
    fn key(&self) -> &'static str {
        "sentiment"
    }

    fn decorate(&self, index: usize, ctx: &DecorateContext<'_>) -> DecorationValue {
        DecorationValue::Score(Self::score(&ctx.articles[index]))
    }
}

// ---------------------------------------------------------------------------
// Source political lean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLean {
    Left,
    Center,
    Right,
    Unknown,
}

/// Coarse outlet-level lean table, keyed by registrable domain.
const DOMAIN_LEANS: &[(&str, SourceLean)] = &[
    ("cnn.com", SourceLean::Left),
    ("msnbc.com", SourceLean::Left),
    ("theguardian.com", SourceLean::Left),
    ("huffpost.com", SourceLean::Left),
    ("nytimes.com", SourceLean::Left),
    ("bbc.com", SourceLean::Center),
    ("bbc.co.uk", SourceLean::Center),
    ("reuters.com", SourceLean::Center),
    ("apnews.com", SourceLean::Center),
    ("npr.org", SourceLean::Center),
    ("aljazeera.com", SourceLean::Center),
    ("foxnews.com", SourceLean::Right),
    ("nypost.com", SourceLean::Right),
    ("dailywire.com", SourceLean::Right),
    ("breitbart.com", SourceLean::Right),
    ("wsj.com", SourceLean::Right),
];

/// Domain-lookup political lean heuristic. Unknown domains map to `Unknown`.
pub struct SourceLeanDecorator;

impl SourceLeanDecorator {
    pub fn lean(article: &Article) -> SourceLean {
        let Some(domain) = extract_domain(&article.url) else {
            return SourceLean::Unknown;
        };
        DOMAIN_LEANS
            .iter()
            .find(|(d, _)| domain == *d || domain.ends_with(&format!(".{d}")))
            .map(|(_, lean)| *lean)
            .unwrap_or(SourceLean::Unknown)
    }
}

impl NodeDecorator for SourceLeanDecorator {
    fn key(&self) -> &'static str {
        "lean"
    }

    fn decorate(&self, index: usize, ctx: &DecorateContext<'_>) -> DecorationValue {
        DecorationValue::Lean(Self::lean(&ctx.articles[index]))
    }
}

/// Hostname without a leading `www.`, lowercased.
fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

// ---------------------------------------------------------------------------
// Clickbait
// ---------------------------------------------------------------------------

const CLICKBAIT_PHRASES: &[&str] = &[
    "you won't believe",
    "what happened next",
    "this one trick",
    "will shock you",
    "the reason why",
    "goes viral",
    "you need to know",
    "jaw-dropping",
];

/// Headline surface-feature score in [0, 1]. Counts sensational phrases,
/// listicle openings, punctuation pile-ups and shouting caps.
pub struct ClickbaitDecorator;

impl ClickbaitDecorator {
    pub fn score(article: &Article) -> f64 {
        let title = article.title.trim();
        let lower = title.to_lowercase();
        let mut score = 0.0;

        if CLICKBAIT_PHRASES.iter().any(|p| lower.contains(p)) {
            score += 0.4;
        }
        if title.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            score += 0.2;
        }
        if title.contains('!') {
            score += 0.15;
        }
        if title.contains('?') {
            score += 0.1;
        }

        let words: Vec<&str> = title.split_whitespace().collect();
        let shouting = words
            .iter()
            .filter(|w| w.len() > 2 && w.chars().all(|c| !c.is_lowercase()))
            .count();
        if !words.is_empty() {
            score += 0.3 * (shouting as f64 / words.len() as f64);
        }

        score.min(1.0)
    }
}

impl NodeDecorator for ClickbaitDecorator {
    fn key(&self) -> &'static str {
        "clickbait"
    }

    fn decorate(&self, index: usize, ctx: &DecorateContext<'_>) -> DecorationValue {
        DecorationValue::Score(Self::score(&ctx.articles[index]))
    }
}

// ---------------------------------------------------------------------------
// Counterpoint
// ---------------------------------------------------------------------------

/// The least-similar other article — a "read the opposite" pointer.
/// `None` when the session has fewer than two articles. Ties resolve to the
/// lowest index.
pub struct CounterpointDecorator;

impl CounterpointDecorator {
    pub fn counterpoint(index: usize, matrix: &SimilarityMatrix) -> Option<usize> {
        (0..matrix.len())
            .filter(|&j| j != index)
            .min_by(|&a, &b| {
                matrix
                    .get(index, a)
                    .partial_cmp(&matrix.get(index, b))
                    .expect("similarity values are finite")
                    .then(a.cmp(&b))
            })
    }
}

impl NodeDecorator for CounterpointDecorator {
    fn key(&self) -> &'static str {
        "counterpoint"
    }

    fn decorate(&self, index: usize, ctx: &DecorateContext<'_>) -> DecorationValue {
        DecorationValue::ArticleRef(Self::counterpoint(index, ctx.matrix))
    }
}
