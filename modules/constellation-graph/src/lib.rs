//! Similarity-graph construction for article constellations.
//!
//! The pipeline sequences four steps over a fixed article set:
//! 1. **Embed**: article text → fixed-dimension vectors (via `TextEmbedder`)
//! 2. **Similarity**: pairwise cosine matrix, symmetric, zero diagonal
//! 3. **Build**: two-pass edge construction (strong + weak bridges) and
//!    Louvain community detection
//! 4. **Decorate/Render**: pure per-node presentation attributes and a
//!    serializable view for the presentation collaborator
//!
//! The matrix and graph are recomputed wholesale on any structural change
//! (new articles, new threshold). N is small (tens of articles), so the
//! O(N²) passes stay cheap and cache invalidation stays trivial.

pub mod builder;
pub mod community;
pub mod decorate;
pub mod labels;
pub mod pipeline;
pub mod similarity;
pub mod view;

pub use builder::{ArticleGraph, GraphBuilder, GraphEdge, GraphSettings};
pub use pipeline::Constellation;
pub use similarity::{cosine_similarity, SimilarityMatrix};
pub use view::render_view;
