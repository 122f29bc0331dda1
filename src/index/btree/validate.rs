//! Structural invariant checker.
//!
//! Walks the whole tree and reports the first broken B-tree invariant.
//! Nothing on the insert/delete path calls this; it exists for tests and
//! for integrators who want to verify a tree after a crash or a bug report.

use thiserror::Error;

use super::node::Node;
use crate::common::MinDegree;

/// A broken B-tree invariant.
///
/// Depths count from the root at depth 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// A non-root node has fewer than `t-1` keys.
    #[error("node at depth {depth} has {keys} keys, below the minimum {min}")]
    Underfull { depth: usize, keys: usize, min: usize },

    /// A node has more than `2t-1` keys.
    #[error("node at depth {depth} has {keys} keys, above the maximum {max}")]
    Overfull { depth: usize, keys: usize, max: usize },

    /// Leaves were found at two different depths.
    #[error("leaf at depth {found}, expected every leaf at depth {expected}")]
    UnevenLeaves { expected: usize, found: usize },

    /// Keys within a node are not strictly ascending.
    #[error("keys at depth {depth} are not strictly ascending at index {index}")]
    KeysOutOfOrder { depth: usize, index: usize },

    /// An internal node's child count is not its key count plus one.
    #[error("internal node at depth {depth} has {keys} keys but {children} children")]
    ChildCount {
        depth: usize,
        keys: usize,
        children: usize,
    },

    /// A key lies outside the range its parent's separators allow.
    #[error("key at depth {depth}, index {index} is outside its parent's separator bounds")]
    SubtreeBound { depth: usize, index: usize },

    /// The cached key count disagrees with the number of stored keys.
    #[error("tree reports {reported} keys but holds {actual}")]
    LengthMismatch { reported: usize, actual: usize },

    /// An allocated root holds no keys.
    #[error("root holds no keys")]
    EmptyRoot,
}

/// Check every invariant of the tree rooted at `root`.
pub(crate) fn check_tree<K: Ord>(
    root: Option<&Node<K>>,
    t: MinDegree,
    len: usize,
) -> Result<(), Violation> {
    let Some(root) = root else {
        return match len {
            0 => Ok(()),
            reported => Err(Violation::LengthMismatch {
                reported,
                actual: 0,
            }),
        };
    };

    if root.keys.is_empty() {
        return Err(Violation::EmptyRoot);
    }

    let mut checker = Checker {
        t,
        leaf_depth: None,
    };
    let actual = checker.check_node(root, 0, None, None)?;

    if actual != len {
        return Err(Violation::LengthMismatch {
            reported: len,
            actual,
        });
    }
    Ok(())
}

struct Checker {
    t: MinDegree,
    leaf_depth: Option<usize>,
}

impl Checker {
    /// Check `node` and its subtree; returns the number of keys in it.
    fn check_node<K: Ord>(
        &mut self,
        node: &Node<K>,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<usize, Violation> {
        let keys = node.keys.len();

        if keys > self.t.max_keys() {
            return Err(Violation::Overfull {
                depth,
                keys,
                max: self.t.max_keys(),
            });
        }
        if depth > 0 && keys < self.t.min_keys() {
            return Err(Violation::Underfull {
                depth,
                keys,
                min: self.t.min_keys(),
            });
        }

        for (index, pair) in node.keys.windows(2).enumerate() {
            if pair[0] >= pair[1] {
                return Err(Violation::KeysOutOfOrder {
                    depth,
                    index: index + 1,
                });
            }
        }

        for (index, key) in node.keys.iter().enumerate() {
            let above_lower = lower.map_or(true, |lo| key > lo);
            let below_upper = upper.map_or(true, |hi| key < hi);
            if !above_lower || !below_upper {
                return Err(Violation::SubtreeBound { depth, index });
            }
        }

        if node.is_leaf() {
            match self.leaf_depth {
                None => self.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(Violation::UnevenLeaves {
                        expected,
                        found: depth,
                    });
                }
                Some(_) => {}
            }
            return Ok(keys);
        }

        if node.children.len() != keys + 1 {
            return Err(Violation::ChildCount {
                depth,
                keys,
                children: node.children.len(),
            });
        }

        let mut total = keys;
        for (i, child) in node.children.iter().enumerate() {
            let lo = if i == 0 { lower } else { node.keys.get(i - 1) };
            let hi = node.keys.get(i).or(upper);
            total += self.check_node(child, depth + 1, lo, hi)?;
        }
        Ok(total)
    }
}
