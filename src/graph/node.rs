//! Per-build snapshot of the bookmark collection.
//!
//! Bookmarks are reduced to the fields the similarity signals read (host,
//! path, tags, links) and stored in an arena addressed by bookmark id.

use std::collections::{BTreeSet, HashMap};

use url::Url;

use crate::bookmarks::Bookmark;

/// Second-level labels that act as public suffixes under a country code
/// (`bbc.co.uk` is registrable, `co.uk` is not).
const SECOND_LEVEL_SUFFIXES: [&str; 8] = ["co", "com", "net", "org", "gov", "ac", "edu", "ne"];

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkNode {
    pub id: u64,
    /// Full host, lowercased, without a leading `www.`
    pub domain: String,
    pub registrable_domain: String,
    pub path_segments: Vec<String>,
    pub tags: BTreeSet<String>,
    pub starred: bool,
    pub outbound_links: BTreeSet<u64>,

    pub title: String,
    pub url: String,
}

impl BookmarkNode {
    pub fn from_bookmark(bmark: &Bookmark) -> Self {
        let (domain, path_segments) = split_url(&bmark.url);
        let registrable_domain = registrable_domain(&domain);

        Self {
            id: bmark.id,
            domain,
            registrable_domain,
            path_segments,
            tags: bmark
                .tags
                .iter()
                .map(|tag| tag.trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect(),
            starred: bmark.starred,
            outbound_links: bmark
                .links
                .iter()
                .copied()
                .filter(|target| *target != bmark.id)
                .collect(),
            title: bmark.title.clone(),
            url: bmark.url.clone(),
        }
    }

    /// True when the host carries labels in front of the registrable domain.
    pub fn has_subdomain(&self) -> bool {
        !self.registrable_domain.is_empty() && self.domain != self.registrable_domain
    }

    pub fn links_to(&self, other: u64) -> bool {
        self.outbound_links.contains(&other)
    }
}

fn split_url(raw: &str) -> (String, Vec<String>) {
    let parsed = Url::parse(raw.trim()).or_else(|_| Url::parse(&format!("https://{}", raw.trim())));
    let Ok(url) = parsed else {
        return (String::new(), vec![]);
    };

    let host = url
        .host_str()
        .map(|host| host.trim_end_matches('.').to_lowercase())
        .unwrap_or_default();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);

    let segments = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_string())
                .collect()
        })
        .unwrap_or_default();

    (host, segments)
}

pub fn registrable_domain(host: &str) -> String {
    if host.is_empty() || host.parse::<std::net::IpAddr>().is_ok() {
        return host.to_string();
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    let keep = match labels.as_slice() {
        [.., second, tld]
            if labels.len() >= 3 && tld.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(second) =>
        {
            3
        }
        _ => 2,
    };

    let start = labels.len().saturating_sub(keep);
    labels[start..].join(".")
}

/// Arena of bookmark nodes for one build, addressed by bookmark id.
#[derive(Debug, Default)]
pub struct BookmarkIndex {
    nodes: Vec<BookmarkNode>,
    slots: HashMap<u64, usize>,
}

impl BookmarkIndex {
    /// Nodes are stored in ascending id order; a repeated id keeps its first record.
    pub fn new(nodes: impl IntoIterator<Item = BookmarkNode>) -> Self {
        let mut nodes: Vec<BookmarkNode> = nodes.into_iter().collect();
        nodes.sort_by_key(|node| node.id);
        nodes.dedup_by_key(|node| node.id);

        let slots = nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id, slot))
            .collect();

        Self { nodes, slots }
    }

    pub fn from_bookmarks(bmarks: &[Bookmark]) -> Self {
        Self::new(bmarks.iter().map(BookmarkNode::from_bookmark))
    }

    pub fn get(&self, id: u64) -> Option<&BookmarkNode> {
        self.slots.get(&id).map(|slot| &self.nodes[*slot])
    }

    pub fn contains(&self, id: u64) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookmarkNode> {
        self.nodes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.nodes.iter().map(|node| node.id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Keep only the `cap` most recently added bookmarks (highest ids).
    pub fn truncate_to_recent(&mut self, cap: usize) {
        if self.nodes.len() <= cap {
            return;
        }
        let dropped = self.nodes.len() - cap;
        self.nodes.drain(..dropped);
        self.slots = self
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id, slot))
            .collect();
    }
}
