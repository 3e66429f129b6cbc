//! Graph construction.
//!
//! Candidate pairs are split into chunks and weighed on a rayon pool. Each
//! chunk returns its accepted edges; the edge map is assembled only after
//! every chunk finished, so the result does not depend on scheduling.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};

use rayon::prelude::*;

use crate::{
    config::BuildConfig,
    graph::{
        candidates,
        error::{GraphError, GraphResult},
        node::{BookmarkIndex, BookmarkNode},
        signals::{default_signals, SimilaritySignal},
        store::{Graph, GraphNode},
        weight::{EdgeKey, EdgeWeight, WeightCalculator},
    },
};

/// Snapshot handed to the progress callback. Reports never go backwards and
/// the last one covers every pair; a worker that finds the callback busy skips
/// its report instead of waiting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildProgress {
    /// Candidate pairs weighed so far
    pub processed: usize,
    /// Candidate pairs in this build
    pub total: usize,
    /// Edges accepted so far
    pub edges: usize,
}

impl BuildProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Cooperative cancellation flag, checked between chunks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct GraphBuilder<'a> {
    config: &'a BuildConfig,
    extra_signals: Vec<Box<dyn SimilaritySignal>>,
    cancel: CancelToken,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self {
            config,
            extra_signals: vec![],
            cancel: CancelToken::default(),
        }
    }

    /// Add a signal on top of the configured domain/tag/link signals.
    pub fn with_signal(mut self, signal: Box<dyn SimilaritySignal>) -> Self {
        self.extra_signals.push(signal);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn build<F>(
        self,
        nodes: impl IntoIterator<Item = BookmarkNode>,
        progress: F,
    ) -> GraphResult<Graph>
    where
        F: Fn(BuildProgress) + Sync,
    {
        let config = self.config;
        config.validate()?;

        let started = Instant::now();
        let mut index = BookmarkIndex::new(nodes);
        if let Some(cap) = config.max_bookmarks {
            if index.len() > cap {
                log::info!(
                    "limiting graph to the {cap} most recent of {} bookmarks",
                    index.len()
                );
                index.truncate_to_recent(cap);
            }
        }

        let candidates = candidates::generate(&index, config);
        let pairs = candidates.pairs;

        let mut signals = default_signals(config, Arc::new(candidates.reach));
        signals.extend(self.extra_signals);
        let calculator = WeightCalculator::new(signals);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .map_err(|err| GraphError::config(format!("couldnt start worker pool: {err}")))?;

        log::debug!(
            "weighing {} candidate pairs on {} workers",
            pairs.len(),
            pool.current_num_threads()
        );

        let counters = Mutex::new(BuildProgress {
            total: pairs.len(),
            ..Default::default()
        });
        // last snapshot handed out; whoever holds it reports, the rest move on
        let reported: Mutex<Option<BuildProgress>> = Mutex::new(None);
        let report = |turn: &mut Option<BuildProgress>| {
            let Ok(snapshot) = counters.lock().map(|state| *state) else {
                return;
            };
            if *turn != Some(snapshot) {
                *turn = Some(snapshot);
                progress(snapshot);
            }
        };
        let cancel = &self.cancel;

        let chunks: Vec<Vec<(EdgeKey, EdgeWeight)>> = pool.install(|| {
            pairs
                .par_chunks(config.chunk_size)
                .map(|chunk| {
                    if cancel.is_cancelled() {
                        return Err(GraphError::Cancelled);
                    }

                    let accepted = weigh_chunk(chunk, &index, &calculator, config.min_edge_weight);

                    if let Ok(mut state) = counters.lock() {
                        state.processed += chunk.len();
                        state.edges += accepted.len();
                    }
                    if let Ok(mut turn) = reported.try_lock() {
                        report(&mut *turn);
                    }

                    Ok(accepted)
                })
                .collect::<GraphResult<Vec<_>>>()
        })?;

        if cancel.is_cancelled() {
            return Err(GraphError::Cancelled);
        }
        if let Ok(mut turn) = reported.lock() {
            report(&mut *turn);
        }

        let graph = Graph::new(
            index.iter().map(GraphNode::from),
            chunks.into_iter().flatten(),
        )?;

        log::info!(
            "built graph: {} nodes, {} edges from {} candidates in {}ms",
            graph.node_count(),
            graph.edge_count(),
            pairs.len(),
            started.elapsed().as_millis()
        );

        Ok(graph)
    }
}

fn weigh_chunk(
    chunk: &[EdgeKey],
    index: &BookmarkIndex,
    calculator: &WeightCalculator,
    min_edge_weight: f64,
) -> Vec<(EdgeKey, EdgeWeight)> {
    chunk
        .iter()
        .filter_map(|key| {
            let a = index.get(key.low())?;
            let b = index.get(key.high())?;
            let weight = calculator.weigh(a, b);
            let total = weight.total();
            (total > 0.0 && total >= min_edge_weight).then_some((*key, weight))
        })
        .collect()
}

/// Build a graph with the standard signals.
pub fn build_graph<F>(
    nodes: impl IntoIterator<Item = BookmarkNode>,
    config: &BuildConfig,
    progress: F,
) -> GraphResult<Graph>
where
    F: Fn(BuildProgress) + Sync,
{
    GraphBuilder::new(config).build(nodes, progress)
}
