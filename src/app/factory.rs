use crate::{
    app::service::GraphService,
    bookmarks::BackendCsv,
    config::Config,
    graph::GraphStore,
    storage,
};
use anyhow::{Context, Result};
use homedir::my_home;
use std::{path::PathBuf, sync::Arc};

/// Where the bookmark database, config and graph tables live.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub base_path: String,
    pub bookmarks_path: PathBuf,
    pub graph_path: PathBuf,
}

pub struct AppFactory;

impl AppFactory {
    /// `bookmarks` replaces the default `<base>/bookmarks.csv`.
    pub fn get_paths(bookmarks: Option<PathBuf>) -> Result<AppPaths> {
        let base_path = Self::get_base_path()?;
        Self::paths_in(&base_path, bookmarks)
    }

    pub fn paths_in(base_path: &str, bookmarks: Option<PathBuf>) -> Result<AppPaths> {
        std::fs::create_dir_all(base_path)
            .with_context(|| format!("Failed to create application base directory {base_path}"))?;

        let bookmarks_path =
            bookmarks.unwrap_or_else(|| PathBuf::from(format!("{base_path}/bookmarks.csv")));
        let graph_path = PathBuf::from(format!("{base_path}/graph"));

        Ok(AppPaths {
            base_path: base_path.to_string(),
            bookmarks_path,
            graph_path,
        })
    }

    pub fn create_service(paths: &AppPaths) -> Result<GraphService> {
        let config = Config::load_with(&paths.base_path)?;
        let source = BackendCsv::load(&paths.bookmarks_path)?;
        let storage = storage::BackendLocal::new(&paths.graph_path).with_context(|| {
            format!("Failed to open graph directory {}", paths.graph_path.display())
        })?;
        let store = GraphStore::new(Arc::new(storage));

        Ok(GraphService::new(config, Box::new(source), store))
    }

    fn get_base_path() -> Result<String> {
        if let Ok(base_path) = std::env::var("BB_BASE_PATH") {
            return Ok(base_path);
        }

        let home = my_home()
            .context("Could not determine home directory")?
            .context("Home directory path is empty")?;
        Ok(format!("{}/.local/share/bb", home.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_in_base_dir() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("bb");
        let base = base.to_str().unwrap();

        let paths = AppFactory::paths_in(base, None).unwrap();
        assert!(std::path::Path::new(base).is_dir());
        assert_eq!(paths.bookmarks_path, PathBuf::from(format!("{base}/bookmarks.csv")));
        assert_eq!(paths.graph_path, PathBuf::from(format!("{base}/graph")));

        let custom = dir.path().join("other.csv");
        let paths = AppFactory::paths_in(base, Some(custom.clone())).unwrap();
        assert_eq!(paths.bookmarks_path, custom);
    }

    #[test]
    fn test_service_on_empty_base_dir() {
        let dir = TempDir::new().unwrap();
        let paths = AppFactory::paths_in(dir.path().to_str().unwrap(), None).unwrap();

        let service = AppFactory::create_service(&paths).unwrap();
        assert!(dir.path().join("config.yaml").exists());
        assert!(paths.graph_path.is_dir());
        assert!(service.stats().is_err());
    }
}
