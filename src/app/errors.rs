use crate::graph::GraphError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("no graph has been built yet, run `bb-graph build` first")]
    NoGraph,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}
