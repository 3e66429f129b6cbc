use serde::Serialize;

use crate::graph::{
    error::{GraphError, GraphResult},
    store::Graph,
    weight::EdgeWeight,
};

pub const DEFAULT_NEIGHBOR_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: u64,
    pub total: f64,
    pub weight: EdgeWeight,
}

/// Bookmarks most related to `id`, strongest first; equal weights are
/// ordered by ascending id. `min_weight` only narrows what the build kept.
pub fn neighbors(
    graph: &Graph,
    id: u64,
    limit: Option<usize>,
    min_weight: Option<f64>,
) -> GraphResult<Vec<Neighbor>> {
    if !graph.contains(id) {
        return Err(GraphError::NotFound(id));
    }

    let limit = limit.unwrap_or(DEFAULT_NEIGHBOR_LIMIT);
    let mut found: Vec<Neighbor> = graph
        .incident(id)
        .filter(|(other, _)| *other != id)
        .map(|(other, weight)| Neighbor {
            id: other,
            total: weight.total(),
            weight: *weight,
        })
        .filter(|neighbor| min_weight.map_or(true, |min| neighbor.total >= min))
        .collect();

    found.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    found.truncate(limit);

    Ok(found)
}
