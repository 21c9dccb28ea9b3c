//! Kinematic adjacency between links.
//!
//! Links that share a joint overlap geometrically by construction, so their
//! spheres would repel each other at every configuration. The adjacency set
//! lists those pairs so self-collision checks can skip them.

use hashbrown::HashSet;

/// Symmetric relation over link-index pairs.
///
/// Pairs are stored in canonical `(min, max)` order, so lookups do not depend
/// on argument order.
///
/// # Example
///
/// ```
/// use chomp_types::AdjacencySet;
///
/// let adjacency: AdjacencySet = [(0, 1), (2, 1)].into_iter().collect();
/// assert!(adjacency.are_adjacent(1, 0));
/// assert!(adjacency.are_adjacent(1, 2));
/// assert!(!adjacency.are_adjacent(0, 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencySet {
    pairs: HashSet<(usize, usize)>,
}

impl AdjacencySet {
    /// Creates an empty adjacency set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn canonical(a: usize, b: usize) -> (usize, usize) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Registers two links as adjacent.
    ///
    /// Returns `false` if the pair was already registered.
    pub fn insert(&mut self, a: usize, b: usize) -> bool {
        self.pairs.insert(Self::canonical(a, b))
    }

    /// Returns `true` if the two links are registered as adjacent.
    #[must_use]
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.pairs.contains(&Self::canonical(a, b))
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no pairs are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(usize, usize)> for AdjacencySet {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (a, b) in iter {
            set.insert(a, b);
        }
        set
    }
}
