//! Error types for the B-tree index.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All errors a caller of the index can observe.
///
/// `EmptyTree` and `KeyNotFound` are expected outcomes, not corruption:
/// the tree is left untouched whenever one of them is returned.
///
/// Structural faults (a node that needs rebalancing but has no sibling)
/// are deliberately absent. They can only come from a bug in the tree
/// itself, so they abort with a panic instead of reaching the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A construction-time parameter was rejected (e.g. `t < 2`).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The operation needs at least one key, but the tree has no root.
    #[error("Tree is empty")]
    EmptyTree,

    /// No key matched along the search path.
    #[error("Key not found")]
    KeyNotFound,
}
