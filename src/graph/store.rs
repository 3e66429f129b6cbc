//! The built graph, its summary statistics, and the store that publishes and
//! persists it.
//!
//! On disk the graph is two tables under the graph directory, `nodes.N.csv` and
//! `edges.N.csv`, the latter keyed by the unordered id pair. `N` is the build
//! generation named by the `current` file. A build writes a fresh generation
//! and only then rewrites `current`, so a failed save leaves the previous pair
//! in place.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};

use crate::{
    graph::{
        error::{GraphError, GraphResult},
        node::BookmarkNode,
        weight::{Component, EdgeKey, EdgeWeight},
    },
    lock::GraphLock,
    parse_tags,
    storage::StorageManager,
};

const NODES_TABLE: &str = "nodes";
const EDGES_TABLE: &str = "edges";
const CURRENT_FILE: &str = "current";

fn table_file(table: &str, generation: u64) -> String {
    format!("{table}.{generation}.csv")
}

/// Display attributes kept for every bookmark in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub starred: bool,
}

impl From<&BookmarkNode> for GraphNode {
    fn from(node: &BookmarkNode) -> Self {
        Self {
            id: node.id,
            title: node.title.clone(),
            url: node.url.clone(),
            tags: node.tags.iter().cloned().collect(),
            starred: node.starred,
        }
    }
}

/// Undirected weighted graph. Immutable once constructed.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeMap<u64, GraphNode>,
    edges: BTreeMap<EdgeKey, EdgeWeight>,
    adjacency: HashMap<u64, Vec<EdgeKey>>,
}

impl Graph {
    /// Fails when an edge references a bookmark missing from `nodes`.
    pub fn new(
        nodes: impl IntoIterator<Item = GraphNode>,
        edges: impl IntoIterator<Item = (EdgeKey, EdgeWeight)>,
    ) -> GraphResult<Self> {
        let nodes: BTreeMap<u64, GraphNode> = nodes.into_iter().map(|n| (n.id, n)).collect();
        let edges: BTreeMap<EdgeKey, EdgeWeight> = edges.into_iter().collect();

        let mut adjacency: HashMap<u64, Vec<EdgeKey>> = HashMap::new();
        for key in edges.keys() {
            for id in [key.low(), key.high()] {
                if !nodes.contains_key(&id) {
                    return Err(GraphError::Corrupt(format!(
                        "edge {key} references unknown bookmark {id}"
                    )));
                }
                adjacency.entry(id).or_default().push(*key);
            }
        }

        Ok(Self {
            nodes,
            edges,
            adjacency,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn node(&self, id: u64) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &EdgeWeight)> {
        self.edges.iter()
    }

    pub fn edge(&self, a: u64, b: u64) -> Option<&EdgeWeight> {
        EdgeKey::new(a, b).and_then(|key| self.edges.get(&key))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn degree(&self, id: u64) -> usize {
        self.adjacency.get(&id).map(Vec::len).unwrap_or(0)
    }

    /// Edges touching `id`, as (neighbor id, weight).
    pub fn incident(&self, id: u64) -> impl Iterator<Item = (u64, &EdgeWeight)> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(move |key| self.edges.get(key).map(|weight| (key.other(id), weight)))
    }

    /// Copy of the graph without edges below `min_weight`. Nodes are kept.
    pub fn filtered(&self, min_weight: f64) -> Graph {
        let edges = self
            .edges
            .iter()
            .filter(|(_, weight)| weight.total() >= min_weight)
            .map(|(key, weight)| (*key, *weight));

        // every endpoint is already a node
        Graph::new(self.nodes.values().cloned(), edges).unwrap_or_default()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats::compute(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentAverages {
    pub domain: f64,
    pub tag: f64,
    pub direct_link: f64,
    pub indirect_link: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub avg_weight: f64,
    pub max_weight: f64,
    pub min_weight: f64,
    pub components: ComponentAverages,
    /// Bookmarks without a single edge
    pub isolated_nodes: usize,
    pub density: f64,
}

impl GraphStats {
    fn compute(graph: &Graph) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();
        let isolated_nodes = graph.nodes.keys().filter(|id| graph.degree(**id) == 0).count();

        let density = if node_count > 1 {
            2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
        } else {
            0.0
        };

        if edge_count == 0 {
            return Self {
                node_count,
                isolated_nodes,
                ..Default::default()
            };
        }

        let mut sums = [0.0f64; 4];
        let mut total_sum = 0.0;
        let mut max_weight = f64::MIN;
        let mut min_weight = f64::MAX;
        for weight in graph.edges.values() {
            let total = weight.total();
            total_sum += total;
            max_weight = max_weight.max(total);
            min_weight = min_weight.min(total);
            for (slot, component) in Component::ALL.iter().enumerate() {
                sums[slot] += weight.get(*component);
            }
        }

        let n = edge_count as f64;
        Self {
            node_count,
            edge_count,
            avg_weight: total_sum / n,
            max_weight,
            min_weight,
            components: ComponentAverages {
                domain: sums[0] / n,
                tag: sums[1] / n,
                direct_link: sums[2] / n,
                indirect_link: sums[3] / n,
            },
            isolated_nodes,
            density,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRow {
    id: u64,
    title: String,
    url: String,
    tags: String,
    starred: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRow {
    source: u64,
    target: u64,
    total: f64,
    domain: f64,
    tag: f64,
    direct_link: f64,
    indirect_link: f64,
}

/// Holds the published graph and its on-disk tables.
///
/// A build publishes a complete graph in one swap; readers clone the `Arc`
/// and never block the next build.
pub struct GraphStore {
    storage: Arc<dyn StorageManager>,
    current: RwLock<Option<Arc<Graph>>>,
}

impl GraphStore {
    pub fn new(storage: Arc<dyn StorageManager>) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<Arc<Graph>> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    pub fn publish(&self, graph: Graph) -> Arc<Graph> {
        let graph = Arc::new(graph);
        match self.current.write() {
            Ok(mut guard) => *guard = Some(graph.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(graph.clone()),
        }
        graph
    }

    pub fn is_persisted(&self) -> bool {
        self.storage.exists(CURRENT_FILE)
    }

    /// Generation of the tables `load` reads, `None` before the first save.
    fn generation(&self) -> GraphResult<Option<u64>> {
        if !self.is_persisted() {
            return Ok(None);
        }
        let data = self.storage.read(CURRENT_FILE)?;
        let text = String::from_utf8_lossy(&data);
        text.trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| GraphError::Corrupt(format!("bad generation marker {:?}", text.trim())))
    }

    /// Persist `graph` and publish it.
    pub fn save(&self, graph: Graph) -> GraphResult<Arc<Graph>> {
        let _lock = GraphLock::try_acquire(self.storage.base_dir())?;

        let mut nodes = csv::Writer::from_writer(vec![]);
        for node in graph.nodes() {
            nodes.serialize(NodeRow {
                id: node.id,
                title: node.title.clone(),
                url: node.url.clone(),
                tags: node.tags.join(","),
                starred: node.starred,
            })?;
        }

        let mut edges = csv::Writer::from_writer(vec![]);
        for (key, weight) in graph.edges() {
            edges.serialize(EdgeRow {
                source: key.low(),
                target: key.high(),
                total: weight.total(),
                domain: weight.domain,
                tag: weight.tag,
                direct_link: weight.direct_link,
                indirect_link: weight.indirect_link,
            })?;
        }

        let nodes = nodes.into_inner().map_err(|err| err.into_error())?;
        let edges = edges.into_inner().map_err(|err| err.into_error())?;

        let previous = self.generation()?;
        let generation = previous.map_or(1, |g| g + 1);
        self.storage.write(&table_file(NODES_TABLE, generation), &nodes)?;
        self.storage.write(&table_file(EDGES_TABLE, generation), &edges)?;
        self.storage
            .write(CURRENT_FILE, format!("{generation}\n").as_bytes())?;

        if let Some(previous) = previous {
            for table in [NODES_TABLE, EDGES_TABLE] {
                if let Err(err) = self.storage.remove(&table_file(table, previous)) {
                    log::warn!("failed to remove stale {table} table {previous}: {err}");
                }
            }
        }

        log::info!(
            "saved graph with {} nodes and {} edges to {} (generation {generation})",
            graph.node_count(),
            graph.edge_count(),
            self.storage.base_dir().display()
        );

        Ok(self.publish(graph))
    }

    /// Load the persisted tables and publish them. `None` when no graph was
    /// built yet.
    pub fn load(&self) -> GraphResult<Option<Arc<Graph>>> {
        let Some(generation) = self.generation()? else {
            return Ok(None);
        };

        let nodes_data = self.storage.read(&table_file(NODES_TABLE, generation))?;
        let mut nodes = vec![];
        for row in csv::Reader::from_reader(nodes_data.as_slice()).deserialize::<NodeRow>() {
            let row = row?;
            nodes.push(GraphNode {
                id: row.id,
                title: row.title,
                url: row.url,
                tags: parse_tags(&row.tags),
                starred: row.starred,
            });
        }

        let edges_data = self.storage.read(&table_file(EDGES_TABLE, generation))?;
        let mut edges = vec![];
        for row in csv::Reader::from_reader(edges_data.as_slice()).deserialize::<EdgeRow>() {
            let row = row?;
            let key = EdgeKey::new(row.source, row.target).ok_or_else(|| {
                GraphError::Corrupt(format!("self edge on bookmark {}", row.source))
            })?;
            edges.push((
                key,
                EdgeWeight {
                    domain: row.domain,
                    tag: row.tag,
                    direct_link: row.direct_link,
                    indirect_link: row.indirect_link,
                },
            ));
        }

        let graph = Graph::new(nodes, edges)?;
        log::debug!(
            "loaded graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Some(self.publish(graph)))
    }

    /// The published graph, loading it from disk on first use.
    pub fn get_or_load(&self) -> GraphResult<Option<Arc<Graph>>> {
        match self.current() {
            Some(graph) => Ok(Some(graph)),
            None => self.load(),
        }
    }
}
