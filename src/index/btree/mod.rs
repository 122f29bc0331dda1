//! B-tree index implementation.
//!
//! An in-memory B-tree of minimum degree `t` holding a sorted set of keys.
//! It guarantees `O(log_t n)` depth and bounded node occupancy no matter
//! the insertion order.
//!
//! # Components
//! - [`BTree`] - The tree: root ownership, root growth and collapse
//! - `Node` - Split, borrow and merge on a single node and its children
//! - [`Iter`] - Lazy in-order iteration
//! - [`SharedBTree`] - `RwLock` wrapper for multi-threaded use
//! - [`TreeStats`] - Structural mutation counters
//! - [`Violation`] - Invariant checker results

mod iter;
mod node;
mod shared;
mod stats;
mod tree;
mod validate;

pub use iter::Iter;
pub use shared::SharedBTree;
pub use stats::{StatsSnapshot, TreeStats};
pub use tree::BTree;
pub use validate::Violation;
