//! SharedBTree - a thread-safe wrapper around [`BTree`].
//!
//! The tree mutates nodes in place, so a reader must never see a node
//! mid-split or mid-merge. Every public operation here holds the lock for
//! its whole duration:
//! - writers (`insert`, `delete`, `clear`) take the write lock
//! - readers take the read lock and may run concurrently with each other

use std::borrow::Borrow;

use parking_lot::RwLock;

use super::stats::StatsSnapshot;
use super::tree::BTree;
use super::validate::Violation;
use crate::common::{BTreeConfig, Result};

/// A [`BTree`] behind a `parking_lot::RwLock`.
///
/// Lookups return owned keys because no reference may outlive the lock.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use interchangedb_btree::SharedBTree;
///
/// let tree = Arc::new(SharedBTree::new(3).unwrap());
///
/// let handles: Vec<_> = (0..4)
///     .map(|i| {
///         let tree = Arc::clone(&tree);
///         thread::spawn(move || {
///             for key in (i * 100)..(i * 100 + 100) {
///                 tree.insert(key);
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(tree.len(), 400);
/// ```
pub struct SharedBTree<K> {
    inner: RwLock<BTree<K>>,
}

impl<K> SharedBTree<K> {
    /// Create an empty shared tree with minimum degree `t`.
    ///
    /// # Errors
    /// `Error::InvalidParameter` if `t < 2`.
    pub fn new(t: usize) -> Result<Self> {
        Ok(Self::from_tree(BTree::new(t)?))
    }

    /// Create an empty shared tree from a validated config.
    pub fn with_config(config: BTreeConfig) -> Self {
        Self::from_tree(BTree::with_config(config))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: BTree<K>) -> Self {
        Self {
            inner: RwLock::new(tree),
        }
    }

    /// Unwrap the tree.
    pub fn into_inner(self) -> BTree<K> {
        self.inner.into_inner()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Number of levels.
    pub fn height(&self) -> usize {
        self.inner.read().height()
    }

    /// Point-in-time copy of the structural counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.read().stats().snapshot()
    }

    /// Remove every key.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// All keys in ascending order.
    ///
    /// # Errors
    /// `Error::EmptyTree` if the tree has no keys.
    pub fn traverse(&self) -> Result<Vec<K>>
    where
        K: Clone,
    {
        self.inner.read().traverse()
    }
}

impl<K: Ord> SharedBTree<K> {
    /// Insert `key`; `false` if it was already present.
    pub fn insert(&self, key: K) -> bool {
        self.inner.write().insert(key)
    }

    /// Remove `key` and return the stored key.
    ///
    /// # Errors
    /// `Error::EmptyTree` or `Error::KeyNotFound`, as [`BTree::delete`].
    pub fn delete<Q>(&self, key: &Q) -> Result<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.write().delete(key)
    }

    /// Clone of the stored key equal to `key`.
    ///
    /// # Errors
    /// `Error::EmptyTree` or `Error::KeyNotFound`, as [`BTree::search`].
    pub fn search<Q>(&self, key: &Q) -> Result<K>
    where
        K: Borrow<Q> + Clone,
        Q: Ord + ?Sized,
    {
        self.inner.read().search(key).cloned()
    }

    /// Whether `key` is stored.
    pub fn exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.read().exists(key)
    }

    /// Check every structural invariant under the read lock.
    ///
    /// # Errors
    /// The first [`Violation`] found.
    pub fn validate(&self) -> std::result::Result<(), Violation> {
        self.inner.read().validate()
    }
}
