//! Edge weights and the calculator that combines similarity signals.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::graph::{node::BookmarkNode, signals::SimilaritySignal};

/// Unordered pair of distinct bookmark ids, stored as `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey(u64, u64);

impl EdgeKey {
    /// Returns `None` for a self pair.
    pub fn new(a: u64, b: u64) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self(a, b)),
            std::cmp::Ordering::Greater => Some(Self(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> u64 {
        self.0
    }

    pub fn high(&self) -> u64 {
        self.1
    }

    pub fn contains(&self, id: u64) -> bool {
        self.0 == id || self.1 == id
    }

    /// The endpoint that is not `id`.
    pub fn other(&self, id: u64) -> u64 {
        if self.0 == id {
            self.1
        } else {
            self.0
        }
    }
}

impl Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Domain,
    Tag,
    DirectLink,
    IndirectLink,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::Domain,
        Component::Tag,
        Component::DirectLink,
        Component::IndirectLink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Component::Domain => "domain",
            Component::Tag => "tag",
            Component::DirectLink => "direct_link",
            Component::IndirectLink => "indirect_link",
        }
    }
}

/// Per-component breakdown of one edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeight {
    pub domain: f64,
    pub tag: f64,
    pub direct_link: f64,
    pub indirect_link: f64,
}

impl EdgeWeight {
    pub fn total(&self) -> f64 {
        self.domain + self.tag + self.direct_link + self.indirect_link
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Domain => self.domain,
            Component::Tag => self.tag,
            Component::DirectLink => self.direct_link,
            Component::IndirectLink => self.indirect_link,
        }
    }

    fn add(&mut self, component: Component, value: f64) {
        // a misbehaving signal must not produce negative or NaN components
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        match component {
            Component::Domain => self.domain += value,
            Component::Tag => self.tag += value,
            Component::DirectLink => self.direct_link += value,
            Component::IndirectLink => self.indirect_link += value,
        }
    }
}

/// Fixed pipeline over the configured similarity signals.
pub struct WeightCalculator {
    signals: Vec<Box<dyn SimilaritySignal>>,
}

impl WeightCalculator {
    pub fn new(signals: Vec<Box<dyn SimilaritySignal>>) -> Self {
        Self { signals }
    }

    pub fn signals(&self) -> impl Iterator<Item = &dyn SimilaritySignal> {
        self.signals.iter().map(|signal| signal.as_ref())
    }

    pub fn weigh(&self, a: &BookmarkNode, b: &BookmarkNode) -> EdgeWeight {
        let mut weight = EdgeWeight::default();
        for signal in &self.signals {
            weight.add(signal.component(), signal.score(a, b));
        }
        weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(Component, f64);

    impl SimilaritySignal for Constant {
        fn component(&self) -> Component {
            self.0
        }

        fn score(&self, _a: &BookmarkNode, _b: &BookmarkNode) -> f64 {
            self.1
        }
    }

    fn node(id: u64) -> BookmarkNode {
        BookmarkNode::from_bookmark(&crate::bookmarks::Bookmark {
            id,
            ..Default::default()
        })
    }

    #[test]
    fn test_edge_key_is_unordered() {
        assert_eq!(EdgeKey::new(3, 1), EdgeKey::new(1, 3));
        assert!(EdgeKey::new(2, 2).is_none());

        let key = EdgeKey::new(9, 4).unwrap();
        assert_eq!((key.low(), key.high()), (4, 9));
        assert_eq!(key.other(4), 9);
        assert_eq!(key.other(9), 4);
        assert!(key.contains(9));
        assert!(!key.contains(5));
        assert_eq!(key.to_string(), "4-9");
    }

    #[test]
    fn test_total_is_sum_of_components() {
        let weight = EdgeWeight {
            domain: 1.0,
            tag: 0.5,
            direct_link: 5.0,
            indirect_link: 0.25,
        };
        assert_eq!(weight.total(), 6.75);
        assert_eq!(weight.get(Component::IndirectLink), 0.25);
    }

    #[test]
    fn test_calculator_accumulates_per_component() {
        let calc = WeightCalculator::new(vec![
            Box::new(Constant(Component::Tag, 0.5)),
            Box::new(Constant(Component::Tag, 0.25)),
            Box::new(Constant(Component::Domain, 1.0)),
        ]);
        let weight = calc.weigh(&node(1), &node(2));

        assert_eq!(weight.tag, 0.75);
        assert_eq!(weight.domain, 1.0);
        assert_eq!(weight.direct_link, 0.0);
        assert_eq!(weight.total(), 1.75);
    }

    #[test]
    fn test_calculator_clamps_bad_scores() {
        let calc = WeightCalculator::new(vec![
            Box::new(Constant(Component::Domain, -3.0)),
            Box::new(Constant(Component::Tag, f64::NAN)),
        ]);
        let weight = calc.weigh(&node(1), &node(2));
        assert_eq!(weight, EdgeWeight::default());
    }
}
