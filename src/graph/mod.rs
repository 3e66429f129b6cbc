//! Bookmark similarity graph: construction, queries, persistence and export.

pub mod builder;
pub mod candidates;
pub mod error;
pub mod export;
pub mod node;
pub mod query;
pub mod signals;
pub mod store;
pub mod weight;

pub use builder::{build_graph, BuildProgress, CancelToken, GraphBuilder};
pub use error::{GraphError, GraphResult};
pub use export::ExportFormat;
pub use node::{BookmarkIndex, BookmarkNode};
pub use query::{neighbors, Neighbor, DEFAULT_NEIGHBOR_LIMIT};
pub use signals::SimilaritySignal;
pub use store::{Graph, GraphNode, GraphStats, GraphStore};
pub use weight::{Component, EdgeKey, EdgeWeight};
