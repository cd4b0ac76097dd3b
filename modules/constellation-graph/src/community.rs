//! Louvain modularity-maximizing community detection.
//!
//! Deterministic by construction: nodes are visited in index order, candidate
//! communities in ascending id order, and a move requires a strict modularity
//! gain. The same edge set always yields the same partition.

use std::collections::BTreeMap;

use tracing::debug;

/// Minimum modularity gain for a node move. Guards against float-noise
/// oscillation between equivalent partitions.
const MIN_GAIN: f64 = 1e-12;

/// Assign a community id to every node of an undirected weighted graph.
///
/// `edges` are unordered pairs with positive weights; both strong and bridge
/// edges participate. Returns one community id per node, renumbered to a
/// dense 0..k range ordered by first member index. Nodes with no edges keep
/// singleton communities.
///
/// Callers should skip detection entirely for a zero-edge graph — that is a
/// valid degenerate state, not an error.
pub fn louvain(node_count: usize, edges: &[(usize, usize, f64)]) -> Vec<usize> {
    let mut assignment: Vec<usize> = (0..node_count).collect();
    let mut level = LevelGraph::from_edges(node_count, edges);

    loop {
        let (partition, improved) = level.one_level();
        if !improved {
            break;
        }

        let (renumbered, count) = renumber(&partition);
        for a in assignment.iter_mut() {
            *a = renumbered[*a];
        }

        if count == level.node_count() {
            break;
        }
        level = level.aggregate(&renumbered, count);
    }

    let (final_assignment, communities) = renumber(&assignment);
    debug!(nodes = node_count, communities, "Louvain partition complete");
    final_assignment
}

/// One level of the Louvain hierarchy: an undirected weighted graph where
/// nodes may carry self-loops from aggregated intra-community edges.
struct LevelGraph {
    /// Adjacency lists, both directions per edge, self-loops excluded.
    adj: Vec<Vec<(usize, f64)>>,
    /// Self-loop weight per node. Counts twice toward the node degree.
    self_loops: Vec<f64>,
    /// Sum of all node degrees (2m).
    total_weight: f64,
}

impl LevelGraph {
    fn from_edges(node_count: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut adj = vec![Vec::new(); node_count];
        let mut self_loops = vec![0.0; node_count];
        for &(a, b, w) in edges {
            if a == b {
                self_loops[a] += w;
            } else {
                adj[a].push((b, w));
                adj[b].push((a, w));
            }
        }
        let mut graph = Self {
            adj,
            self_loops,
            total_weight: 0.0,
        };
        graph.total_weight = (0..node_count).map(|i| graph.degree(i)).sum();
        graph
    }

    fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// Weighted degree k_i, with self-loops counted twice.
    fn degree(&self, i: usize) -> f64 {
        self.adj[i].iter().map(|(_, w)| w).sum::<f64>() + 2.0 * self.self_loops[i]
    }

    /// Local-move phase: greedily reassign nodes to the neighboring community
    /// with the best modularity gain until a full pass makes no move.
    fn one_level(&self) -> (Vec<usize>, bool) {
        let n = self.node_count();
        let mut community: Vec<usize> = (0..n).collect();
        let degree: Vec<f64> = (0..n).map(|i| self.degree(i)).collect();
        let mut sum_tot = degree.clone();
        let two_m = self.total_weight;

        if two_m == 0.0 {
            return (community, false);
        }

        let mut improved = false;
        loop {
            let mut moved = false;

            for i in 0..n {
                let current = community[i];

                // Edge weight from i into each neighboring community.
                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                links.insert(current, 0.0);
                for &(j, w) in &self.adj[i] {
                    *links.entry(community[j]).or_insert(0.0) += w;
                }

                // Remove i from its community before evaluating gains.
                sum_tot[current] -= degree[i];

                let mut best = current;
                let mut best_gain = links[&current] - sum_tot[current] * degree[i] / two_m;
                for (&candidate, &weight) in &links {
                    if candidate == current {
                        continue;
                    }
                    let gain = weight - sum_tot[candidate] * degree[i] / two_m;
                    if gain > best_gain + MIN_GAIN {
                        best_gain = gain;
                        best = candidate;
                    }
                }

                sum_tot[best] += degree[i];
                if best != current {
                    community[i] = best;
                    moved = true;
                    improved = true;
                }
            }

            if !moved {
                break;
            }
        }

        (community, improved)
    }

    /// Collapse communities into single nodes. Intra-community edges (and
    /// prior self-loops) become self-loops; inter-community edges merge.
    fn aggregate(&self, partition: &[usize], count: usize) -> LevelGraph {
        let n = self.node_count();
        let mut self_loops = vec![0.0; count];
        let mut merged: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];

        for i in 0..n {
            self_loops[partition[i]] += self.self_loops[i];
            for &(j, w) in &self.adj[i] {
                // Each undirected edge appears in both lists; take it once.
                if j < i {
                    continue;
                }
                let (ci, cj) = (partition[i], partition[j]);
                if ci == cj {
                    self_loops[ci] += w;
                } else {
                    *merged[ci].entry(cj).or_insert(0.0) += w;
                }
            }
        }

        let mut adj = vec![Vec::new(); count];
        for (ci, neighbors) in merged.iter().enumerate() {
            for (&cj, &w) in neighbors {
                adj[ci].push((cj, w));
                adj[cj].push((ci, w));
            }
        }

        let mut graph = LevelGraph {
            adj,
            self_loops,
            total_weight: 0.0,
        };
        graph.total_weight = (0..count).map(|i| graph.degree(i)).sum();
        graph
    }
}

/// Renumber arbitrary community ids to dense 0..k, ordered by first
/// appearance (i.e. by lowest member index).
fn renumber(partition: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: BTreeMap<usize, usize> = BTreeMap::new();
    let mut next = 0;
    let renumbered = partition
        .iter()
        .map(|&c| {
            *mapping.entry(c).or_insert_with(|| {
                let id = next;
                next += 1;
                id
            })
        })
        .collect();
    (renumbered, next)
}
