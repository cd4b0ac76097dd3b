//! Serializes retrieval hits into the grounding block sent to the generator.

use constellation_common::truncate_chars;
use constellation_graph::Constellation;

use crate::retriever::RankedArticle;

/// Per-article excerpt cap. Long enough to quote from, short enough that five
/// articles plus instructions fit comfortably in a generation window.
pub const ARTICLE_EXCERPT_CHARS: usize = 1500;

/// Rendered when retrieval produced no hits. The generator never sees this;
/// the analyst short-circuits with a canned reply instead.
pub const NO_CONTEXT: &str = "No relevant articles found for this question.";

/// Format ranked articles into the context block: one delimited section per
/// article with title, URL, similarity, cluster membership and a capped
/// excerpt, followed by grounding instructions for the generator.
pub fn format_context(ranked: &[RankedArticle], constellation: &Constellation) -> String {
    if ranked.is_empty() {
        return NO_CONTEXT.to_string();
    }

    let mut out = String::new();
    out.push_str("You are answering from the following news articles.\n\n");

    for (position, hit) in ranked.iter().enumerate() {
        let embedded = &constellation.articles[hit.index];
        let article = &embedded.article;

        out.push_str(&format!(
            "=== ARTICLE {}: \"{}\" ===\n",
            position + 1,
            article.title
        ));
        out.push_str(&format!("URL: {}\n", article.url));
        out.push_str(&format!("Relevance: {:.0}%\n", hit.score * 100.0));
        if let Some(community) = constellation.graph.community_of(hit.index) {
            out.push_str(&format!("Story cluster: {community}\n"));
        }
        out.push('\n');

        let excerpt = truncate_chars(&article.text, ARTICLE_EXCERPT_CHARS);
        out.push_str(excerpt);
        if excerpt.len() < article.text.len() {
            out.push_str("\n[... article continues ...]");
        }
        out.push_str("\n\n");
    }

    out.push_str(
        "Answer using only the articles above. Quote or cite an article by its \
         number when you rely on it. If the articles do not cover the question, \
         say so rather than guessing.",
    );
    out
}
