//! Two-pass graph construction over the similarity matrix.
//!
//! Pass 1 (strong) captures tightly related articles: every pair above the
//! strong threshold gets an edge. Pass 2 (weak bridges) is a sparsification
//! policy for layout, not a similarity feature: under-connected nodes gain a
//! few low-similarity edges so the rendered constellation stays connected
//! without flooding weak links. Community detection then runs over the full
//! edge set.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::{debug, info};

use constellation_common::{Article, EdgeKind};

use crate::community::louvain;
use crate::decorate::{decorate_all, default_decorators, DecorateContext, NodeDecorations};
use crate::labels::{cluster_labels, ClusterLabel};
use crate::similarity::SimilarityMatrix;

/// Default similarity above which a pair is strongly connected.
pub const DEFAULT_STRONG_THRESHOLD: f64 = 0.4;

/// Similarity floor for weak bridge edges. Below this, a link is noise even
/// for layout purposes.
pub const DEFAULT_BRIDGE_FLOOR: f64 = 0.05;

/// Connection cap consulted by the bridge pass. Existing strong edges count
/// toward it, so a well-connected node gains no bridges. Tuned visually, like
/// the other two defaults — hence configurable rather than hard-coded.
pub const DEFAULT_BRIDGE_CAP: usize = 2;

/// Tuning knobs for graph construction.
#[derive(Debug, Clone)]
pub struct GraphSettings {
    pub strong_threshold: f64,
    pub bridge_floor: f64,
    pub bridge_cap: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            strong_threshold: DEFAULT_STRONG_THRESHOLD,
            bridge_floor: DEFAULT_BRIDGE_FLOOR,
            bridge_cap: DEFAULT_BRIDGE_CAP,
        }
    }
}

/// Weight and classification of one graph edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub weight: f64,
    pub kind: EdgeKind,
}

/// The constructed article graph: petgraph topology plus per-node community
/// assignment, decorations, and synthetic cluster labels.
///
/// Node i of the underlying graph is article i — indices are stable for the
/// lifetime of the session.
#[derive(Debug, Clone, Default)]
pub struct ArticleGraph {
    graph: UnGraph<usize, GraphEdge>,
    /// Community id per article. `None` when the graph had no edges —
    /// "no connections found" is a valid terminal state, not an error.
    pub communities: Option<Vec<usize>>,
    pub decorations: Vec<NodeDecorations>,
    pub labels: Vec<ClusterLabel>,
}

impl ArticleGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate edges as (lower index, higher index, attributes).
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &GraphEdge)> {
        self.graph.edge_references().map(|e| {
            let a = e.source().index();
            let b = e.target().index();
            (a.min(b), a.max(b), e.weight())
        })
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .is_some()
    }

    pub fn degree(&self, i: usize) -> usize {
        self.graph.edges(NodeIndex::new(i)).count()
    }

    pub fn community_of(&self, i: usize) -> Option<usize> {
        self.communities.as_ref().map(|c| c[i])
    }
}

/// Builds an `ArticleGraph` from a similarity matrix.
pub struct GraphBuilder {
    settings: GraphSettings,
}

impl GraphBuilder {
    pub fn new(settings: GraphSettings) -> Self {
        Self { settings }
    }

    /// Construct the graph. The matrix must be the pairwise matrix of exactly
    /// these articles; a size mismatch is a caller bug and panics.
    pub fn build(&self, articles: &[Article], matrix: &SimilarityMatrix) -> ArticleGraph {
        assert_eq!(
            articles.len(),
            matrix.len(),
            "article count must match similarity matrix size"
        );

        let n = articles.len();
        let mut graph = UnGraph::new_undirected();
        for i in 0..n {
            graph.add_node(i);
        }

        let strong_edges = self.strong_pass(&mut graph, matrix);
        let bridge_edges = self.bridge_pass(&mut graph, matrix);

        let communities = if graph.edge_count() > 0 {
            let edges: Vec<(usize, usize, f64)> = graph
                .edge_references()
                .map(|e| (e.source().index(), e.target().index(), e.weight().weight))
                .collect();
            Some(louvain(n, &edges))
        } else {
            debug!("No connections found, skipping community detection");
            None
        };

        let decorations = decorate_all(
            &default_decorators(),
            &DecorateContext { articles, matrix },
        );

        let labels = match &communities {
            Some(assignment) => cluster_labels(articles, assignment),
            None => Vec::new(),
        };

        info!(
            nodes = n,
            strong_edges,
            bridge_edges,
            communities = communities.as_ref().map(|c| distinct(c)).unwrap_or(0),
            "Article graph built"
        );

        ArticleGraph {
            graph,
            communities,
            decorations,
            labels,
        }
    }

    /// Edge for every unordered pair above the strong threshold.
    fn strong_pass(&self, graph: &mut UnGraph<usize, GraphEdge>, matrix: &SimilarityMatrix) -> usize {
        let n = matrix.len();
        let mut added = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                let sim = matrix.get(i, j);
                if sim > self.settings.strong_threshold {
                    graph.add_edge(
                        NodeIndex::new(i),
                        NodeIndex::new(j),
                        GraphEdge {
                            weight: sim,
                            kind: EdgeKind::Strong,
                        },
                    );
                    added += 1;
                }
            }
        }
        added
    }

    /// Walk each node's similarity row in descending order and add bridge
    /// edges above the floor until the node's total degree reaches the cap.
    /// A bridge attaches to both endpoints, so both must be under the cap —
    /// no node ever gains more than `bridge_cap` connections from this pass.
    /// Equal similarities resolve to the lowest candidate index.
    fn bridge_pass(&self, graph: &mut UnGraph<usize, GraphEdge>, matrix: &SimilarityMatrix) -> usize {
        let n = matrix.len();
        let mut added = 0;

        for i in 0..n {
            let node = NodeIndex::new(i);
            let mut degree = graph.edges(node).count();
            if degree >= self.settings.bridge_cap {
                continue;
            }

            let mut candidates: Vec<usize> = (0..n).filter(|&j| j != i).collect();
            candidates.sort_by(|&a, &b| {
                matrix
                    .get(i, b)
                    .partial_cmp(&matrix.get(i, a))
                    .expect("similarity values are finite")
                    .then(a.cmp(&b))
            });

            for j in candidates {
                if degree >= self.settings.bridge_cap {
                    break;
                }
                // Sorted descending: once below the floor, the rest are too.
                if matrix.get(i, j) <= self.settings.bridge_floor {
                    break;
                }
                let partner = NodeIndex::new(j);
                if graph.find_edge(node, partner).is_some() {
                    continue;
                }
                // A saturated partner skips this candidate, not the node.
                if graph.edges(partner).count() >= self.settings.bridge_cap {
                    continue;
                }
                graph.add_edge(
                    node,
                    partner,
                    GraphEdge {
                        weight: matrix.get(i, j),
                        kind: EdgeKind::Bridge,
                    },
                );
                degree += 1;
                added += 1;
            }
        }

        added
    }
}

fn distinct(communities: &[usize]) -> usize {
    let mut seen: Vec<usize> = communities.to_vec();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use constellation_common::EdgeKind;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            text: format!("{title} body"),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            image_url: None,
            published_at: None,
        }
    }

    fn articles(n: usize) -> Vec<Article> {
        (0..n).map(|i| article(&format!("article {i}"))).collect()
    }

    fn settings(threshold: f64) -> GraphSettings {
        GraphSettings {
            strong_threshold: threshold,
            ..GraphSettings::default()
        }
    }

    /// Strong-pass-only settings: cap 0 disables the bridge pass.
    fn strong_only(threshold: f64) -> GraphSettings {
        GraphSettings {
            strong_threshold: threshold,
            bridge_cap: 0,
            ..GraphSettings::default()
        }
    }

    fn symmetric(n: usize, pairs: &[(usize, usize, f64)]) -> SimilarityMatrix {
        let mut values = vec![0.0; n * n];
        for &(i, j, v) in pairs {
            values[i * n + j] = v;
            values[j * n + i] = v;
        }
        SimilarityMatrix::from_values(n, values)
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let graph = GraphBuilder::new(GraphSettings::default())
            .build(&[], &SimilarityMatrix::pairwise(&[]));
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.communities.is_none());
        assert!(graph.labels.is_empty());
    }

    #[test]
    #[should_panic(expected = "article count must match")]
    fn mismatched_matrix_panics() {
        let matrix = SimilarityMatrix::from_values(2, vec![0.0; 4]);
        GraphBuilder::new(GraphSettings::default()).build(&articles(3), &matrix);
    }

    #[test]
    fn strong_pass_connects_pairs_above_threshold_only() {
        let matrix = symmetric(3, &[(0, 1, 0.8), (0, 2, 0.3), (1, 2, 0.41)]);
        let graph =
            GraphBuilder::new(strong_only(0.4)).build(&articles(3), &matrix);

        let strong: Vec<_> = graph
            .edges()
            .filter(|(_, _, e)| e.kind == EdgeKind::Strong)
            .map(|(a, b, _)| (a, b))
            .collect();
        assert_eq!(strong, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn raising_threshold_never_adds_strong_edges() {
        let matrix = symmetric(
            4,
            &[
                (0, 1, 0.9),
                (0, 2, 0.5),
                (0, 3, 0.45),
                (1, 2, 0.6),
                (1, 3, 0.2),
                (2, 3, 0.85),
            ],
        );
        let arts = articles(4);

        let low = GraphBuilder::new(strong_only(0.4)).build(&arts, &matrix);
        let high = GraphBuilder::new(strong_only(0.8)).build(&arts, &matrix);

        let low_edges: Vec<_> = low.edges().map(|(a, b, _)| (a, b)).collect();
        let high_edges: Vec<_> = high.edges().map(|(a, b, _)| (a, b)).collect();

        assert!(high_edges.len() <= low_edges.len());
        for edge in &high_edges {
            assert!(low_edges.contains(edge), "{edge:?} present only at 0.8");
        }
    }

    #[test]
    fn bridge_pass_caps_connections_per_node() {
        // Node 0 weakly similar to everyone; nobody clears the strong threshold.
        let matrix = symmetric(
            6,
            &[
                (0, 1, 0.3),
                (0, 2, 0.25),
                (0, 3, 0.2),
                (0, 4, 0.15),
                (0, 5, 0.1),
            ],
        );
        let graph =
            GraphBuilder::new(settings(0.4)).build(&articles(6), &matrix);

        // Only the two best candidates win; node 0 saturates at the cap and
        // later nodes cannot attach to it.
        for i in 0..6 {
            assert!(graph.degree(i) <= DEFAULT_BRIDGE_CAP, "node {i} over cap");
        }
        assert!(graph.has_edge(0, 1));
        assert!(graph.has_edge(0, 2));
        assert_eq!(graph.edge_count(), 2);
        for (_, _, edge) in graph.edges() {
            assert_eq!(edge.kind, EdgeKind::Bridge);
        }
    }

    #[test]
    fn saturated_nodes_gain_no_bridges() {
        // 0-1 and 0-2 are strong; 0 also weakly resembles 3.
        let matrix = symmetric(4, &[(0, 1, 0.9), (0, 2, 0.8), (0, 3, 0.3)]);
        let graph =
            GraphBuilder::new(settings(0.4)).build(&articles(4), &matrix);

        // Node 0 enters the bridge pass already at the cap: no bridge from
        // its side, and node 3 cannot attach to it either.
        assert!(!graph.has_edge(0, 3));
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(3), 0);
    }

    #[test]
    fn bridges_ignore_similarities_at_or_below_floor() {
        let matrix = symmetric(3, &[(0, 1, 0.05), (0, 2, 0.04)]);
        let graph =
            GraphBuilder::new(settings(0.4)).build(&articles(3), &matrix);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.communities.is_none());
    }

    #[test]
    fn ai_pizza_scenario() {
        // Two AI-hardware articles plus one pizza recipe.
        let matrix = symmetric(3, &[(0, 1, 0.72), (0, 2, 0.08), (1, 2, 0.11)]);
        let graph =
            GraphBuilder::new(settings(0.3)).build(&articles(3), &matrix);

        // AI articles are strong-connected.
        let (_, _, ai_edge) = graph.edges().find(|(a, b, _)| (*a, *b) == (0, 1)).unwrap();
        assert_eq!(ai_edge.kind, EdgeKind::Strong);

        // Pizza gets bridges only — never a strong edge.
        for (a, b, edge) in graph.edges() {
            if a == 2 || b == 2 {
                assert_eq!(edge.kind, EdgeKind::Bridge);
            }
        }
        // Its best match (node 1, 0.11) clears the floor, so it is connected.
        assert!(graph.has_edge(1, 2));
    }

    #[test]
    fn build_is_deterministic() {
        let matrix = symmetric(
            4,
            &[(0, 1, 0.5), (0, 2, 0.5), (1, 3, 0.3), (2, 3, 0.3)],
        );
        let arts = articles(4);
        let builder = GraphBuilder::new(settings(0.4));

        let first = builder.build(&arts, &matrix);
        let second = builder.build(&arts, &matrix);

        let edges_a: Vec<_> = first.edges().map(|(a, b, e)| (a, b, e.clone())).collect();
        let edges_b: Vec<_> = second.edges().map(|(a, b, e)| (a, b, e.clone())).collect();
        assert_eq!(edges_a, edges_b);
        assert_eq!(first.communities, second.communities);
    }

    #[test]
    fn communities_assigned_when_edges_exist() {
        // Two tight pairs, no cross similarity above the floor.
        let matrix = symmetric(4, &[(0, 1, 0.9), (2, 3, 0.9)]);
        let graph =
            GraphBuilder::new(settings(0.4)).build(&articles(4), &matrix);

        let communities = graph.communities.as_ref().expect("edges exist");
        assert_eq!(communities[0], communities[1]);
        assert_eq!(communities[2], communities[3]);
        assert_ne!(communities[0], communities[2]);
        assert_eq!(graph.labels.len(), 2);
    }

    #[test]
    fn decorations_cover_all_nodes() {
        let matrix = symmetric(2, &[(0, 1, 0.5)]);
        let graph =
            GraphBuilder::new(settings(0.4)).build(&articles(2), &matrix);
        assert_eq!(graph.decorations.len(), 2);
    }
}
