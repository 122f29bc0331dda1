//! Structural statistics for the B-tree.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the structural mutations the tree performs.
///
/// All fields are atomic so they can be read and reset through a shared
/// reference, e.g. while a [`SharedBTree`](super::SharedBTree) holds only a
/// read lock.
///
/// # Memory Ordering
/// We use `Ordering::Relaxed` for all operations because:
/// - We only need atomicity (no partial updates)
/// - We don't need synchronization between different counters
/// - Statistics are "eventually consistent" - exact ordering doesn't matter
///
/// # Example
/// ```
/// use interchangedb_btree::TreeStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = TreeStats::new();
/// stats.splits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.splits.load(Ordering::Relaxed), 1);
/// ```
#[derive(Debug)]
pub struct TreeStats {
    /// Number of full nodes split during insertion.
    pub splits: AtomicU64,

    /// Number of sibling merges during deletion.
    pub merges: AtomicU64,

    /// Number of keys rotated in from a left sibling.
    pub borrows_left: AtomicU64,

    /// Number of keys rotated in from a right sibling.
    pub borrows_right: AtomicU64,

    /// Number of times the root split and the tree grew a level.
    pub root_grows: AtomicU64,

    /// Number of times the root emptied and the tree lost a level.
    pub root_shrinks: AtomicU64,
}

impl TreeStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            splits: AtomicU64::new(0),
            merges: AtomicU64::new(0),
            borrows_left: AtomicU64::new(0),
            borrows_right: AtomicU64::new(0),
            root_grows: AtomicU64::new(0),
            root_shrinks: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    ///
    /// This returns a non-atomic copy for display/logging.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            splits: self.splits.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            borrows_left: self.borrows_left.load(Ordering::Relaxed),
            borrows_right: self.borrows_right.load(Ordering::Relaxed),
            root_grows: self.root_grows.load(Ordering::Relaxed),
            root_shrinks: self.root_shrinks.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.splits.store(0, Ordering::Relaxed);
        self.merges.store(0, Ordering::Relaxed);
        self.borrows_left.store(0, Ordering::Relaxed);
        self.borrows_right.store(0, Ordering::Relaxed);
        self.root_grows.store(0, Ordering::Relaxed);
        self.root_shrinks.store(0, Ordering::Relaxed);
    }
}

impl Default for TreeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of tree statistics.
///
/// Unlike `TreeStats`, this is not atomic and can be safely
/// printed, compared, etc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub splits: u64,
    pub merges: u64,
    pub borrows_left: u64,
    pub borrows_right: u64,
    pub root_grows: u64,
    pub root_shrinks: u64,
}

impl StatsSnapshot {
    /// Borrows from either side.
    pub fn borrows(&self) -> u64 {
        self.borrows_left + self.borrows_right
    }

    /// Every underflow repair, whether it borrowed or merged.
    pub fn rebalances(&self) -> u64 {
        self.borrows() + self.merges
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ splits: {}, merges: {}, borrows: {} ({} left, {} right), root grows: {}, root shrinks: {} }}",
            self.splits,
            self.merges,
            self.borrows(),
            self.borrows_left,
            self.borrows_right,
            self.root_grows,
            self.root_shrinks
        )
    }
}
