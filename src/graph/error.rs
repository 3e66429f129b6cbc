#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("bookmark {0} is not part of the graph")]
    NotFound(u64),

    #[error("invalid graph configuration: {0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("stored graph is inconsistent: {0}")]
    Corrupt(String),

    #[error("graph build was cancelled")]
    Cancelled,

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
