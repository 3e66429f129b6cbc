//! Similarity signals.
//!
//! Every signal scores one unordered pair for a single weight component.
//! Signals are shared across worker threads and must be pure.

use std::{collections::HashMap, sync::Arc};

use crate::{
    config::BuildConfig,
    graph::{
        node::BookmarkNode,
        weight::{Component, EdgeKey},
    },
};

const DOMAIN_BASE_SCORE: f64 = 1.0;
const SUBDOMAIN_BONUS: f64 = 0.5;
const PATH_SEGMENT_BONUS: f64 = 0.3;

pub trait SimilaritySignal: Send + Sync {
    fn component(&self) -> Component;

    /// Score for the pair, already multiplied by the signal's weight.
    fn score(&self, a: &BookmarkNode, b: &BookmarkNode) -> f64;
}

/// Same site, with bonuses for an identical subdomain and a shared path prefix.
pub struct DomainSignal {
    pub weight: f64,
    pub max_path_segments: usize,
}

impl DomainSignal {
    pub fn raw_score(&self, a: &BookmarkNode, b: &BookmarkNode) -> f64 {
        if a.registrable_domain.is_empty() || a.registrable_domain != b.registrable_domain {
            return 0.0;
        }

        let mut score = DOMAIN_BASE_SCORE;
        if a.has_subdomain() && b.has_subdomain() && a.domain == b.domain {
            score += SUBDOMAIN_BONUS;
        }

        let shared_segments = a
            .path_segments
            .iter()
            .zip(b.path_segments.iter())
            .take(self.max_path_segments)
            .take_while(|(x, y)| x == y)
            .count();

        score + PATH_SEGMENT_BONUS * shared_segments as f64
    }
}

impl SimilaritySignal for DomainSignal {
    fn component(&self) -> Component {
        Component::Domain
    }

    fn score(&self, a: &BookmarkNode, b: &BookmarkNode) -> f64 {
        self.raw_score(a, b) * self.weight
    }
}

/// Jaccard index of the two tag sets.
pub struct TagSignal {
    pub weight: f64,
}

pub fn jaccard<T: Ord>(a: &std::collections::BTreeSet<T>, b: &std::collections::BTreeSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    shared as f64 / union as f64
}

impl SimilaritySignal for TagSignal {
    fn component(&self) -> Component {
        Component::Tag
    }

    fn score(&self, a: &BookmarkNode, b: &BookmarkNode) -> f64 {
        jaccard(&a.tags, &b.tags) * self.weight
    }
}

/// Flat bonus when either bookmark mentions the other.
pub struct DirectLinkSignal {
    pub weight: f64,
}

impl SimilaritySignal for DirectLinkSignal {
    fn component(&self) -> Component {
        Component::DirectLink
    }

    fn score(&self, a: &BookmarkNode, b: &BookmarkNode) -> f64 {
        if a.links_to(b.id) || b.links_to(a.id) {
            self.weight
        } else {
            0.0
        }
    }
}

/// Shortest directed hop count (at least 2) between pairs that are reachable
/// through the link graph but not linked directly.
#[derive(Debug, Default, Clone)]
pub struct IndirectReach {
    hops: HashMap<EdgeKey, u32>,
}

impl IndirectReach {
    pub fn new(hops: HashMap<EdgeKey, u32>) -> Self {
        Self { hops }
    }

    pub fn hops(&self, a: u64, b: u64) -> Option<u32> {
        EdgeKey::new(a, b).and_then(|key| self.hops.get(&key).copied())
    }

    pub fn pairs(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.hops.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}

/// Flat bonus for pairs connected through intermediate bookmarks within
/// `max_hops`. No decay with distance.
pub struct IndirectLinkSignal {
    pub weight: f64,
    pub max_hops: u32,
    pub reach: Arc<IndirectReach>,
}

impl SimilaritySignal for IndirectLinkSignal {
    fn component(&self) -> Component {
        Component::IndirectLink
    }

    fn score(&self, a: &BookmarkNode, b: &BookmarkNode) -> f64 {
        if a.links_to(b.id) || b.links_to(a.id) {
            return 0.0;
        }
        match self.reach.hops(a.id, b.id) {
            Some(hops) if (2..=self.max_hops).contains(&hops) => self.weight,
            _ => 0.0,
        }
    }
}

/// The standard signal set for a build config. Signals with a zero weight
/// are left out of the pipeline.
pub fn default_signals(
    config: &BuildConfig,
    reach: Arc<IndirectReach>,
) -> Vec<Box<dyn SimilaritySignal>> {
    let mut signals: Vec<Box<dyn SimilaritySignal>> = vec![];

    if config.domain_weight > 0.0 {
        signals.push(Box::new(DomainSignal {
            weight: config.domain_weight,
            max_path_segments: config.max_path_segments,
        }));
    }
    if config.tag_weight > 0.0 {
        signals.push(Box::new(TagSignal {
            weight: config.tag_weight,
        }));
    }
    if config.direct_link_weight > 0.0 {
        signals.push(Box::new(DirectLinkSignal {
            weight: config.direct_link_weight,
        }));
    }
    if config.indirect_enabled() {
        signals.push(Box::new(IndirectLinkSignal {
            weight: config.indirect_link_weight,
            max_hops: config.max_hops,
            reach,
        }));
    }

    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmarks::Bookmark;

    fn node(id: u64, url: &str, tags: &[&str], links: &[u64]) -> BookmarkNode {
        BookmarkNode::from_bookmark(&Bookmark {
            id,
            url: url.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            links: links.to_vec(),
            ..Default::default()
        })
    }

    fn domain() -> DomainSignal {
        DomainSignal {
            weight: 1.0,
            max_path_segments: 5,
        }
    }

    #[test]
    fn test_domain_same_host_without_subdomain() {
        let a = node(1, "https://x.com", &[], &[]);
        let b = node(2, "https://x.com/other", &[], &[]);
        assert_eq!(domain().score(&a, &b), 1.0);
    }

    #[test]
    fn test_domain_different_sites() {
        let a = node(1, "https://x.com/a", &[], &[]);
        let b = node(2, "https://y.com/a", &[], &[]);
        assert_eq!(domain().score(&a, &b), 0.0);
    }

    #[test]
    fn test_domain_subdomain_bonus() {
        let a = node(1, "https://docs.x.com", &[], &[]);
        let b = node(2, "https://docs.x.com", &[], &[]);
        let c = node(3, "https://blog.x.com", &[], &[]);
        assert_eq!(domain().score(&a, &b), 1.5);
        assert_eq!(domain().score(&a, &c), 1.0);
    }

    #[test]
    fn test_domain_path_prefix_stops_at_mismatch() {
        let a = node(1, "https://x.com/a/b/c/d", &[], &[]);
        let b = node(2, "https://x.com/a/b/z/d", &[], &[]);
        let score = domain().score(&a, &b);
        assert!((score - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_domain_path_bonus_is_capped() {
        let a = node(1, "https://x.com/1/2/3/4/5/6/7/8", &[], &[]);
        let b = node(2, "https://x.com/1/2/3/4/5/6/7/8", &[], &[]);
        let score = domain().score(&a, &b);
        assert!((score - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_domain_weight_multiplies() {
        let signal = DomainSignal {
            weight: 2.0,
            max_path_segments: 5,
        };
        let a = node(1, "https://docs.x.com/a", &[], &[]);
        let b = node(2, "https://docs.x.com/a", &[], &[]);
        assert!((signal.score(&a, &b) - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_domain_empty_hosts_do_not_match() {
        let a = node(1, "???", &[], &[]);
        let b = node(2, "???", &[], &[]);
        assert_eq!(domain().score(&a, &b), 0.0);
    }

    #[test]
    fn test_jaccard() {
        let a = node(1, "", &["py", "web"], &[]);
        let b = node(2, "", &["py", "db"], &[]);
        let empty = node(3, "", &[], &[]);

        assert!((jaccard(&a.tags, &b.tags) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(jaccard(&a.tags, &a.tags), 1.0);
        assert_eq!(jaccard(&empty.tags, &empty.tags), 0.0);
        assert_eq!(jaccard(&a.tags, &empty.tags), 0.0);
    }

    #[test]
    fn test_tag_signal_is_symmetric() {
        let signal = TagSignal { weight: 2.0 };
        let a = node(1, "", &["py", "web", "a/b"], &[]);
        let b = node(2, "", &["py", "a/b", "c"], &[]);
        assert_eq!(signal.score(&a, &b), signal.score(&b, &a));
    }

    #[test]
    fn test_direct_link_either_direction() {
        let signal = DirectLinkSignal { weight: 5.0 };
        let a = node(1, "", &[], &[2]);
        let b = node(2, "", &[], &[]);
        let c = node(3, "", &[], &[]);
        assert_eq!(signal.score(&a, &b), 5.0);
        assert_eq!(signal.score(&b, &a), 5.0);
        assert_eq!(signal.score(&a, &c), 0.0);
    }

    #[test]
    fn test_indirect_link_respects_hops() {
        let key = EdgeKey::new(1, 3).unwrap();
        let far = EdgeKey::new(1, 4).unwrap();
        let reach = Arc::new(IndirectReach::new(HashMap::from([(key, 2), (far, 4)])));
        let signal = IndirectLinkSignal {
            weight: 3.0,
            max_hops: 3,
            reach,
        };

        let a = node(1, "", &[], &[]);
        let c = node(3, "", &[], &[]);
        let d = node(4, "", &[], &[]);
        assert_eq!(signal.score(&a, &c), 3.0);
        assert_eq!(signal.score(&c, &a), 3.0);
        assert_eq!(signal.score(&a, &d), 0.0);
    }

    #[test]
    fn test_indirect_link_skips_direct_pairs() {
        let key = EdgeKey::new(1, 2).unwrap();
        let signal = IndirectLinkSignal {
            weight: 3.0,
            max_hops: 3,
            reach: Arc::new(IndirectReach::new(HashMap::from([(key, 2)]))),
        };
        let a = node(1, "", &[], &[2]);
        let b = node(2, "", &[], &[]);
        assert_eq!(signal.score(&a, &b), 0.0);
    }

    #[test]
    fn test_default_signals_skip_zero_weights() {
        let config = BuildConfig::default();
        let signals = default_signals(&config, Arc::new(IndirectReach::default()));
        let components: Vec<_> = signals.iter().map(|s| s.component()).collect();
        assert_eq!(
            components,
            vec![Component::Domain, Component::Tag, Component::DirectLink]
        );

        let config = BuildConfig {
            indirect_link_weight: 1.0,
            tag_weight: 0.0,
            ..Default::default()
        };
        let signals = default_signals(&config, Arc::new(IndirectReach::default()));
        let components: Vec<_> = signals.iter().map(|s| s.component()).collect();
        assert_eq!(
            components,
            vec![
                Component::Domain,
                Component::DirectLink,
                Component::IndirectLink
            ]
        );
    }
}
