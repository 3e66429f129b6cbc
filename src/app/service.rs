use crate::{
    app::errors::AppError,
    bookmarks::BookmarkSource,
    config::{BuildConfig, Config},
    graph::{
        self, export::ExportFormat, BookmarkNode, BuildProgress, CancelToken, Graph,
        GraphBuilder, GraphStats, GraphStore, Neighbor,
    },
};
use std::{path::Path, sync::Arc};

/// Builds, persists and serves the similarity graph for one bookmark set.
pub struct GraphService {
    config: Config,
    source: Box<dyn BookmarkSource>,
    store: GraphStore,
}

impl GraphService {
    pub fn new(config: Config, source: Box<dyn BookmarkSource>, store: GraphStore) -> Self {
        Self {
            config,
            source,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build from every bookmark, save the tables and publish the result.
    /// Nothing is published when the build fails or is cancelled.
    pub fn build<F>(
        &self,
        build_config: &BuildConfig,
        cancel: CancelToken,
        progress: F,
    ) -> Result<Arc<Graph>, AppError>
    where
        F: Fn(BuildProgress) + Sync,
    {
        let bookmarks = self.source.bookmarks()?;
        log::info!("building graph from {} bookmarks", bookmarks.len());

        let nodes = bookmarks.iter().map(BookmarkNode::from_bookmark);
        let graph = GraphBuilder::new(build_config)
            .with_cancel(cancel)
            .build(nodes, progress)?;

        Ok(self.store.save(graph)?)
    }

    /// The saved graph, loaded on first use.
    pub fn graph(&self) -> Result<Arc<Graph>, AppError> {
        self.store.get_or_load()?.ok_or(AppError::NoGraph)
    }

    pub fn neighbors(
        &self,
        id: u64,
        limit: Option<usize>,
        min_weight: Option<f64>,
    ) -> Result<Vec<Neighbor>, AppError> {
        let graph = self.graph()?;
        Ok(graph::neighbors(&graph, id, limit, min_weight)?)
    }

    pub fn stats(&self) -> Result<GraphStats, AppError> {
        Ok(self.graph()?.stats())
    }

    pub fn export(
        &self,
        path: &Path,
        format: ExportFormat,
        min_weight: Option<f64>,
    ) -> Result<(), AppError> {
        let graph = self.graph()?;
        graph::export::export(&graph, format, path, min_weight, &self.config.export)?;
        Ok(())
    }
}
