//! Serializes an `ArticleGraph` into the layout consumed by the presentation
//! collaborator. Pure projection: colors, labels and tooltips only, no graph
//! mutation.

use constellation_common::{
    truncate_chars, Article, ColorMode, EdgeView, GraphView, NodeView,
};

use crate::builder::ArticleGraph;
use crate::decorate::{DecorationValue, SourceLean};

/// Node label length cap.
const LABEL_CHARS: usize = 60;

/// Tooltip excerpt length.
const TOOLTIP_CHARS: usize = 100;

/// Cluster palette, cycled by community id.
const CLUSTER_PALETTE: &[&str] = &[
    "#4f9dde", "#e0709b", "#5fb878", "#d8a03d", "#9b7ede", "#46b5ad",
    "#d1605e", "#7a9a3b",
];

const UNCLUSTERED_COLOR: &str = "#8a8a8a";
const LABEL_NODE_COLOR: &str = "#f2d16b";

const STRONG_EDGE_COLOR: &str = "#97c2fc";
const BRIDGE_EDGE_COLOR: &str = "#4a4a4a";
const LABEL_EDGE_COLOR: &str = "#6b5d2e";

/// Nominal weight for label-link edges; they exist for layout only.
const LABEL_EDGE_WEIGHT: f64 = 0.01;

/// Render the graph for a given color mode. Article node ids are `a{index}`,
/// synthetic cluster-label node ids are `c{community}`.
pub fn render_view(graph: &ArticleGraph, articles: &[Article], mode: ColorMode) -> GraphView {
    let mut view = GraphView::default();

    for (i, article) in articles.iter().enumerate() {
        view.nodes.push(NodeView {
            id: format!("a{i}"),
            label: ellipsize(&article.title, LABEL_CHARS),
            tooltip: ellipsize(&article.text, TOOLTIP_CHARS),
            color: node_color(graph, i, mode),
            group: graph.community_of(i),
        });
    }

    for label in &graph.labels {
        view.nodes.push(NodeView {
            id: format!("c{}", label.community),
            label: label.text.clone(),
            tooltip: format!("{} related articles", label.members.len()),
            color: LABEL_NODE_COLOR.to_string(),
            group: Some(label.community),
        });
    }

    for (a, b, edge) in graph.edges() {
        let color = match edge.kind {
            constellation_common::EdgeKind::Strong => STRONG_EDGE_COLOR,
            constellation_common::EdgeKind::Bridge => BRIDGE_EDGE_COLOR,
            constellation_common::EdgeKind::LabelLink => LABEL_EDGE_COLOR,
        };
        view.edges.push(EdgeView {
            from: format!("a{a}"),
            to: format!("a{b}"),
            weight: edge.weight,
            color: color.to_string(),
            kind: edge.kind,
        });
    }

    for label in &graph.labels {
        for &member in &label.members {
            view.edges.push(EdgeView {
                from: format!("c{}", label.community),
                to: format!("a{member}"),
                weight: LABEL_EDGE_WEIGHT,
                color: LABEL_EDGE_COLOR.to_string(),
                kind: constellation_common::EdgeKind::LabelLink,
            });
        }
    }

    view
}

fn node_color(graph: &ArticleGraph, index: usize, mode: ColorMode) -> String {
    match mode {
        ColorMode::Cluster => match graph.community_of(index) {
            Some(community) => CLUSTER_PALETTE[community % CLUSTER_PALETTE.len()].to_string(),
            None => UNCLUSTERED_COLOR.to_string(),
        },
        ColorMode::Sentiment => {
            let score = match graph.decorations.get(index).and_then(|d| d.get("sentiment")) {
                Some(DecorationValue::Score(s)) => *s,
                _ => 0.0,
            };
            sentiment_color(score).to_string()
        }
        ColorMode::Politics => {
            let lean = match graph.decorations.get(index).and_then(|d| d.get("lean")) {
                Some(DecorationValue::Lean(l)) => *l,
                _ => SourceLean::Unknown,
            };
            lean_color(lean).to_string()
        }
    }
}

fn sentiment_color(score: f64) -> &'static str {
    if score > 0.2 {
        "#5fb878" // positive
    } else if score < -0.2 {
        "#d1605e" // negative
    } else {
        UNCLUSTERED_COLOR
    }
}

fn lean_color(lean: SourceLean) -> &'static str {
    match lean {
        SourceLean::Left => "#4f72de",
        SourceLean::Center => "#b08ddb",
        SourceLean::Right => "#d1605e",
        SourceLean::Unknown => UNCLUSTERED_COLOR,
    }
}

fn ellipsize(s: &str, max: usize) -> String {
    let cut = truncate_chars(s, max);
    if cut.len() < s.len() {
        format!("{cut}…")
    } else {
        cut.to_string()
    }
}
