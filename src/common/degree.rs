//! Minimum degree type.

use std::fmt;

use super::error::{Error, Result};

/// The branching parameter `t` of a B-tree.
///
/// Every non-root node holds between `t-1` and `2t-1` keys, and an internal
/// node with `n` keys has `n+1` children. All of those bounds are derived
/// here so node code never repeats the arithmetic.
///
/// # Example
/// ```
/// use interchangedb_btree::MinDegree;
///
/// let t = MinDegree::new(3).unwrap();
/// assert_eq!(t.min_keys(), 2);
/// assert_eq!(t.max_keys(), 5);
/// assert_eq!(t.max_children(), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MinDegree(pub(crate) usize);

impl MinDegree {
    /// Smallest legal minimum degree (a 2-3-4 tree).
    pub const MIN: MinDegree = MinDegree(2);

    /// Create a new MinDegree.
    ///
    /// # Errors
    /// `Error::InvalidParameter` if `t < 2`.
    pub fn new(t: usize) -> Result<Self> {
        if t < Self::MIN.0 {
            return Err(Error::InvalidParameter(format!(
                "minimum degree {} is below {}",
                t,
                Self::MIN.0
            )));
        }
        Ok(MinDegree(t))
    }

    /// The raw value of `t`.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Fewest keys a non-root node may hold (`t-1`).
    #[inline]
    pub fn min_keys(self) -> usize {
        self.0 - 1
    }

    /// Most keys any node may hold (`2t-1`).
    #[inline]
    pub fn max_keys(self) -> usize {
        2 * self.0 - 1
    }

    /// Most children an internal node may hold (`2t`).
    #[inline]
    pub fn max_children(self) -> usize {
        2 * self.0
    }

    /// Index of the key promoted to the parent when a full node splits.
    #[inline]
    pub fn median(self) -> usize {
        self.0 - 1
    }
}

impl fmt::Display for MinDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
