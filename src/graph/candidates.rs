//! Candidate pair generation.
//!
//! Only pairs that can earn a nonzero weight are proposed: members of the same
//! domain or tag bucket, direct links, and (when enabled) pairs reachable
//! through the directed link graph. A bucket shared by every bookmark still
//! degrades to all pairs of that bucket unless a bucket cap is configured.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::{
    config::BuildConfig,
    graph::{node::BookmarkIndex, signals::IndirectReach, weight::EdgeKey},
};

#[derive(Debug, Default)]
pub struct Candidates {
    /// Sorted, deduplicated
    pub pairs: Vec<EdgeKey>,
    pub reach: IndirectReach,
    pub stats: CandidateStats,
}

/// Pairs proposed by each source before deduplication.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CandidateStats {
    pub domain_pairs: usize,
    pub tag_pairs: usize,
    pub link_pairs: usize,
    pub indirect_pairs: usize,
    pub capped_buckets: usize,
    pub largest_bucket: usize,
}

pub fn generate(index: &BookmarkIndex, config: &BuildConfig) -> Candidates {
    let mut stats = CandidateStats::default();
    let mut pairs: BTreeSet<EdgeKey> = BTreeSet::new();

    let mut domains: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    let mut tags: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for node in index.iter() {
        if !node.registrable_domain.is_empty() {
            domains
                .entry(node.registrable_domain.as_str())
                .or_default()
                .push(node.id);
        }
        for tag in &node.tags {
            tags.entry(tag.as_str()).or_default().push(node.id);
        }
    }

    for (domain, ids) in &domains {
        let proposed = pair_bucket(ids, config.max_bucket_size, &mut pairs, &mut stats, domain);
        stats.domain_pairs += proposed;
    }
    for (tag, ids) in &tags {
        let proposed = pair_bucket(ids, config.max_bucket_size, &mut pairs, &mut stats, tag);
        stats.tag_pairs += proposed;
    }

    let links = LinkGraph::from_index(index);
    for key in links.direct_pairs() {
        stats.link_pairs += 1;
        pairs.insert(key);
    }

    let reach = if config.indirect_enabled() {
        let reach = links.indirect_reach(config.max_hops);
        stats.indirect_pairs = reach.len();
        pairs.extend(reach.pairs());
        reach
    } else {
        IndirectReach::default()
    };

    log::debug!(
        "candidates: {} unique ({} domain, {} tag, {} link, {} indirect)",
        pairs.len(),
        stats.domain_pairs,
        stats.tag_pairs,
        stats.link_pairs,
        stats.indirect_pairs
    );

    Candidates {
        pairs: pairs.into_iter().collect(),
        reach,
        stats,
    }
}

/// Emit pairs for one bucket and return how many were proposed.
fn pair_bucket(
    ids: &[u64],
    cap: Option<usize>,
    pairs: &mut BTreeSet<EdgeKey>,
    stats: &mut CandidateStats,
    label: &str,
) -> usize {
    stats.largest_bucket = stats.largest_bucket.max(ids.len());

    let window = match cap {
        Some(cap) if ids.len() > cap => {
            stats.capped_buckets += 1;
            log::warn!(
                "bucket {label:?} has {} bookmarks, pairing each with its next {cap} only",
                ids.len()
            );
            cap
        }
        _ => ids.len(),
    };

    let mut proposed = 0;
    for (i, a) in ids.iter().enumerate() {
        let end = (i + 1 + window).min(ids.len());
        for b in &ids[i + 1..end] {
            if let Some(key) = EdgeKey::new(*a, *b) {
                pairs.insert(key);
                proposed += 1;
            }
        }
    }
    proposed
}

/// Directed link graph restricted to bookmarks in the index.
pub struct LinkGraph {
    outbound: HashMap<u64, Vec<u64>>,
}

impl LinkGraph {
    pub fn from_index(index: &BookmarkIndex) -> Self {
        let outbound = index
            .iter()
            .filter_map(|node| {
                let targets: Vec<u64> = node
                    .outbound_links
                    .iter()
                    .copied()
                    .filter(|target| *target != node.id && index.contains(*target))
                    .collect();
                (!targets.is_empty()).then_some((node.id, targets))
            })
            .collect();

        Self { outbound }
    }

    pub fn direct_pairs(&self) -> BTreeSet<EdgeKey> {
        self.outbound
            .iter()
            .flat_map(|(source, targets)| targets.iter().filter_map(|t| EdgeKey::new(*source, *t)))
            .collect()
    }

    /// Breadth-first search from every bookmark, keeping the shortest hop
    /// count in either direction for pairs that are not linked directly.
    pub fn indirect_reach(&self, max_hops: u32) -> IndirectReach {
        let direct = self.direct_pairs();
        let mut hops: HashMap<EdgeKey, u32> = HashMap::new();

        let mut sources: Vec<u64> = self.outbound.keys().copied().collect();
        sources.sort_unstable();

        for source in sources {
            let mut seen: HashSet<u64> = HashSet::from([source]);
            let mut queue = VecDeque::from([(source, 0u32)]);

            while let Some((current, depth)) = queue.pop_front() {
                if depth == max_hops {
                    continue;
                }
                let Some(targets) = self.outbound.get(&current) else {
                    continue;
                };
                for target in targets {
                    if !seen.insert(*target) {
                        continue;
                    }
                    let distance = depth + 1;
                    queue.push_back((*target, distance));

                    if distance < 2 {
                        continue;
                    }
                    let Some(key) = EdgeKey::new(source, *target) else {
                        continue;
                    };
                    if direct.contains(&key) {
                        continue;
                    }
                    hops.entry(key)
                        .and_modify(|known| *known = (*known).min(distance))
                        .or_insert(distance);
                }
            }
        }

        IndirectReach::new(hops)
    }
}
