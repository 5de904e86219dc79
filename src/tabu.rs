//! Tabu-list bookkeeping shared by all neighborhoods.
//!
//! A tabu list is a bounded FIFO of move signatures mirrored by a set for O(1)
//! membership tests. Membership is queried on every candidate inside O(n^2)
//! enumeration loops, so the set mirror is mandatory. One list exists per move
//! type: the outer search driver owns the lists and passes them by mutable
//! reference into each `find_best_candidate` call.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// Default number of move signatures kept tabu
pub const DEFAULT_TABU_CAPACITY: usize = 100;

/// Move signature: a pair of location indices identifying the inverse of a
/// move
pub type MoveSignature = (usize, usize);

/// Identifies a move type. All instantiations of a move type (e.g. segment
/// shifts of every length) share one tabu universe, so the driver keys its
/// tabu lists by this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// TSP city swap
    Swap,
    /// TSP segment relocation
    SegmentShift,
    /// TSP segment reversal
    SegmentReverse,
    /// D2D inter-route segment exchange
    RouteSwap,
}

/// Bounded FIFO of move signatures with a set mirror for O(1) lookups.
///
/// Eviction is oldest-first and tolerant of stale entries: a signature already
/// removed from the set by an earlier eviction step is skipped silently.
#[derive(Debug, Clone)]
pub struct TabuList<T: Eq + Hash + Clone> {
    list: VecDeque<T>,
    set: HashSet<T>,
    capacity: usize,
}

impl<T: Eq + Hash + Clone> TabuList<T> {
    /// Create an empty tabu list with the default capacity (100)
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TABU_CAPACITY)
    }

    /// Create an empty tabu list with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        TabuList {
            list: VecDeque::new(),
            set: HashSet::new(),
            capacity,
        }
    }

    /// Check whether a move signature is currently forbidden
    #[inline]
    pub fn contains(&self, signature: &T) -> bool {
        self.set.contains(signature)
    }

    /// Number of currently forbidden signatures
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forbid a move signature, evicting the oldest entries once the set
    /// exceeds capacity
    pub fn add(&mut self, signature: T) {
        self.set.insert(signature.clone());
        self.list.push_back(signature);
        self.evict();
    }

    /// Change the capacity and trim immediately
    pub fn reset(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict();
    }

    fn evict(&mut self) {
        while self.set.len() > self.capacity {
            match self.list.pop_front() {
                // A signature may have been re-added and already evicted once;
                // absence in the set is not an error.
                Some(oldest) => {
                    self.set.remove(&oldest);
                }
                None => break,
            }
        }
    }
}

impl<T: Eq + Hash + Clone> Default for TabuList<T> {
    fn default() -> Self {
        Self::new()
    }
}
