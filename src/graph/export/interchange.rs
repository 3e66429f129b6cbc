use serde::{Deserialize, Serialize};

use crate::graph::{error::GraphResult, store::Graph};

/// Group name used for bookmarks without tags.
pub const UNTAGGED: &str = "untagged";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterchangeNode {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub starred: bool,
    /// Colour group for renderers
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterchangeEdge {
    pub source: u64,
    pub target: u64,
    pub weight: f64,
    pub domain: f64,
    pub tag: f64,
    pub direct_link: f64,
    pub indirect_link: f64,
}

/// Format independent view of a graph, also the JSON export document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interchange {
    pub nodes: Vec<InterchangeNode>,
    pub links: Vec<InterchangeEdge>,
}

impl Interchange {
    /// Nodes ordered by id, edges by `(source, target)`.
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| InterchangeNode {
                id: node.id,
                title: node.title.clone(),
                url: node.url.clone(),
                tags: node.tags.clone(),
                starred: node.starred,
                group: primary_tag(&node.tags),
            })
            .collect();

        let links = graph
            .edges()
            .map(|(key, weight)| InterchangeEdge {
                source: key.low(),
                target: key.high(),
                weight: weight.total(),
                domain: weight.domain,
                tag: weight.tag,
                direct_link: weight.direct_link,
                indirect_link: weight.indirect_link,
            })
            .collect();

        Self { nodes, links }
    }

    pub fn max_weight(&self) -> f64 {
        self.links.iter().map(|l| l.weight).fold(0.0, f64::max)
    }

    /// Position of every node id in `nodes`.
    pub fn positions(&self) -> std::collections::HashMap<u64, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id, idx))
            .collect()
    }

    pub fn to_json(&self) -> GraphResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// First segment of the alphabetically first tag, so `lang/rust` and
/// `lang/go` share a colour.
pub fn primary_tag(tags: &[String]) -> String {
    tags.iter()
        .filter(|tag| !tag.is_empty())
        .min()
        .and_then(|tag| tag.split(['/', ':', '.']).find(|part| !part.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| UNTAGGED.to_string())
}
