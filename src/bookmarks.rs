use crate::parse_tags;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, hash::Hash, io::ErrorKind, path::Path, time::Instant};

#[derive(Debug, Clone, Eq, Default, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: u64,

    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub url: String,

    #[serde(default)]
    pub starred: bool,
    /// Ids of other bookmarks mentioned by this bookmark's cached content
    #[serde(default)]
    pub links: Vec<u64>,
}

impl Hash for Bookmark {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialEq for Bookmark {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Read-only view over a bookmark collection.
pub trait BookmarkSource: Send + Sync {
    fn bookmarks(&self) -> anyhow::Result<Vec<Bookmark>>;
}

/// One row of `bookmarks.csv`. `starred` and `links` are optional columns
/// added by the link extractor; older databases simply lack them.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    id: u64,
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    starred: String,
    #[serde(default)]
    links: String,
}

impl CsvRecord {
    fn into_bookmark(self) -> Bookmark {
        let mut seen = HashSet::new();
        let mut tags = parse_tags(&self.tags);
        tags.retain(|tag| seen.insert(tag.clone()));

        let mut links = Vec::new();
        for value in self
            .links
            .split([',', ' '])
            .filter(|value| !value.is_empty())
        {
            match value.parse::<u64>() {
                Ok(target) if target != self.id && !links.contains(&target) => links.push(target),
                Ok(_) => {}
                Err(_) => log::debug!("bookmark {}: skipping malformed link {value:?}", self.id),
            }
        }

        Bookmark {
            id: self.id,
            title: self.title,
            description: self.description,
            tags,
            url: self.url,
            starred: parse_flag(&self.starred),
            links,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "*"
    )
}

#[derive(Debug, Clone, Default)]
pub struct BackendCsv {
    list: Vec<Bookmark>,
}

impl BackendCsv {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Err(err) = std::fs::metadata(path) {
            match err.kind() {
                ErrorKind::NotFound => {
                    log::warn!("no bookmarks at {}, starting with an empty set", path.display());
                    return Ok(Self::default());
                }
                _ => Err(err)?,
            }
        }

        let now = Instant::now();
        let mut csv_reader = csv::Reader::from_path(path)
            .with_context(|| format!("couldnt open {}", path.display()))?;

        let mut bmarks = vec![];
        for (line, record) in csv_reader.deserialize::<CsvRecord>().enumerate() {
            let record = record.with_context(|| format!("malformed bookmark record #{}", line + 1))?;
            bmarks.push(record.into_bookmark());
        }

        log::debug!(
            "took {}ms to read csv",
            now.elapsed().as_micros() as f64 / 1000.0
        );

        Ok(Self::from_bookmarks(bmarks))
    }

    pub fn from_bookmarks(list: Vec<Bookmark>) -> Self {
        Self { list }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }
}

impl BookmarkSource for BackendCsv {
    fn bookmarks(&self) -> anyhow::Result<Vec<Bookmark>> {
        Ok(self.list.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_plain_bb_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.csv");
        std::fs::write(
            &path,
            "id,url,title,description,tags,image_id,icon_id\n\
             0,https://rust-lang.org/learn,Rust,Learn rust,\"programming/rust,docs\",,\n\
             1,https://python.org,Python,,programming/python,img,icon\n",
        )
        .unwrap();

        let mgr = BackendCsv::load(&path).unwrap();
        let bmarks = mgr.bookmarks().unwrap();
        assert_eq!(bmarks.len(), 2);
        assert_eq!(bmarks[0].tags, vec!["programming/rust", "docs"]);
        assert!(!bmarks[0].starred);
        assert!(bmarks[0].links.is_empty());
        assert_eq!(bmarks[1].url, "https://python.org");
    }

    #[test]
    fn test_load_starred_and_links() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.csv");
        std::fs::write(
            &path,
            "id,url,title,description,tags,starred,links\n\
             3,https://a.com,A,,web,true,\"4, 5,x,3,4\"\n\
             4,https://b.com,B,,web,,\n",
        )
        .unwrap();

        let bmarks = BackendCsv::load(&path).unwrap().bookmarks().unwrap();
        assert!(bmarks[0].starred);
        // self links, duplicates and garbage are dropped
        assert_eq!(bmarks[0].links, vec![4, 5]);
        assert!(!bmarks[1].starred);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let mgr = BackendCsv::load(dir.path().join("nope.csv")).unwrap();
        assert_eq!(mgr.len(), 0);
    }

    #[test]
    fn test_malformed_id_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.csv");
        std::fs::write(&path, "id,url\nabc,https://a.com\n").unwrap();
        assert!(BackendCsv::load(&path).is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("*"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("0"));
    }
}
