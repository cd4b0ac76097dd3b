//! Keyword-derived labels for detected communities.
//!
//! Labels are pure functions of member headlines — no model call. A label
//! node is synthetic: it exists for layout/legibility and links to members
//! with `LabelLink` edges only.

use std::collections::BTreeMap;

use constellation_common::Article;

/// Communities smaller than this get no label node.
const MIN_LABELED_SIZE: usize = 2;

/// Words per label.
const LABEL_WORDS: usize = 2;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "that", "this", "after", "over",
    "into", "amid", "says", "said", "will", "have", "has", "are", "was",
    "were", "been", "their", "they", "them", "its", "new", "how", "why",
    "what", "when", "more", "than", "about", "could", "would", "should",
];

/// A synthetic cluster-label node.
#[derive(Debug, Clone)]
pub struct ClusterLabel {
    pub community: usize,
    pub text: String,
    pub members: Vec<usize>,
}

/// Derive one label per community of size >= 2 from the most frequent
/// non-stopword headline terms. Frequency ties resolve alphabetically so the
/// output is deterministic.
pub fn cluster_labels(articles: &[Article], communities: &[usize]) -> Vec<ClusterLabel> {
    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, &community) in communities.iter().enumerate() {
        members.entry(community).or_default().push(index);
    }

    members
        .into_iter()
        .filter(|(_, m)| m.len() >= MIN_LABELED_SIZE)
        .map(|(community, members)| {
            let text = keyword_label(members.iter().map(|&i| articles[i].title.as_str()));
            ClusterLabel {
                community,
                text,
                members,
            }
        })
        .collect()
}

fn keyword_label<'a>(titles: impl Iterator<Item = &'a str>) -> String {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for title in titles {
        for token in title.split(|c: char| !c.is_alphanumeric()) {
            let token = token.to_lowercase();
            if token.len() < 4 || STOPWORDS.contains(&token.as_str()) {
                continue;
            }
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    // BTreeMap iteration is alphabetical; stable sort keeps that order on ties.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let words: Vec<String> = ranked
        .into_iter()
        .take(LABEL_WORDS)
        .map(|(word, _)| word)
        .collect();

    if words.is_empty() {
        "related articles".to_string()
    } else {
        words.join(" / ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            text: String::new(),
            url: "https://example.com".to_string(),
            image_url: None,
            published_at: None,
        }
    }

    #[test]
    fn labels_use_most_frequent_headline_terms() {
        let articles = vec![
            article("Nvidia GPU demand soars"),
            article("GPU makers race to meet demand"),
            article("Pizza festival opens downtown"),
        ];
        let communities = vec![0, 0, 1];

        let labels = cluster_labels(&articles, &communities);

        assert_eq!(labels.len(), 1); // singleton pizza community unlabeled
        assert_eq!(labels[0].community, 0);
        assert_eq!(labels[0].members, vec![0, 1]);
        assert!(labels[0].text.contains("demand"));
    }

    #[test]
    fn stopword_only_titles_fall_back() {
        let articles = vec![article("The And For"), article("This That With")];
        let labels = cluster_labels(&articles, &[0, 0]);
        assert_eq!(labels[0].text, "related articles");
    }

    #[test]
    fn no_communities_no_labels() {
        assert!(cluster_labels(&[], &[]).is_empty());
    }
}
