//! BTree - the orchestrator over [`Node`].
//!
//! The tree owns the root and the minimum degree. Every public operation
//! starts a descent from the root; the two things only the root can do
//! (grow a level on insert, lose a level on delete) happen here, after the
//! generic node recursion has done its work.

use std::borrow::Borrow;
use std::fmt;

use tracing::debug;

use super::iter::Iter;
use super::node::Node;
use super::stats::TreeStats;
use super::validate::{self, Violation};
use crate::common::{BTreeConfig, Error, MinDegree, Result};

/// An ordered set of keys backed by a B-tree of minimum degree `t`.
///
/// # Invariants
/// After every public call:
/// - every leaf is at the same depth
/// - every non-root node holds `t-1..=2t-1` keys, the root `1..=2t-1`
/// - keys ascend strictly within a node and across subtrees
/// - an internal node with `n` keys has `n+1` children
///
/// An empty tree has no root at all.
///
/// # Duplicates
/// Keys are unique. Inserting a key that is already present is a no-op
/// that returns `false`.
///
/// # Example
/// ```
/// use interchangedb_btree::{BTree, Error};
///
/// let mut tree = BTree::new(3).unwrap();
/// for key in [10, 20, 30, 40, 50] {
///     tree.insert(key);
/// }
///
/// assert!(tree.exists(&30));
/// assert!(!tree.exists(&25));
/// assert_eq!(tree.delete(&25), Err(Error::KeyNotFound));
/// assert_eq!(tree.traverse().unwrap(), vec![10, 20, 30, 40, 50]);
/// ```
pub struct BTree<K> {
    /// `None` while the tree is empty.
    root: Option<Box<Node<K>>>,

    /// Minimum degree, immutable after construction.
    degree: MinDegree,

    /// Number of keys stored.
    len: usize,

    /// Structural mutation counters.
    stats: TreeStats,
}

impl<K> BTree<K> {
    /// Create an empty tree with minimum degree `t`.
    ///
    /// # Errors
    /// `Error::InvalidParameter` if `t < 2`.
    pub fn new(t: usize) -> Result<Self> {
        Ok(Self::with_config(BTreeConfig::new(t)?))
    }

    /// Create an empty tree from a validated config.
    pub fn with_config(config: BTreeConfig) -> Self {
        debug!(degree = %config.min_degree, "created B-tree");
        Self {
            root: None,
            degree: config.min_degree,
            len: 0,
            stats: TreeStats::new(),
        }
    }

    /// The minimum degree `t`.
    #[inline]
    pub fn degree(&self) -> MinDegree {
        self.degree
    }

    /// Number of keys in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys (has no root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels; 0 for an empty tree, 1 for a lone leaf root.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            height += 1;
            node = current.children.first().map(|child| &**child);
        }
        height
    }

    /// Structural mutation counters.
    #[inline]
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Smallest key, if any.
    pub fn first(&self) -> Option<&K> {
        self.root.as_ref().and_then(|root| root.first())
    }

    /// Largest key, if any.
    pub fn last(&self) -> Option<&K> {
        self.root.as_ref().and_then(|root| root.last())
    }

    /// Lazy ascending iterator over the keys.
    ///
    /// An empty tree yields nothing; use [`traverse`](Self::traverse) to
    /// get `Error::EmptyTree` instead.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// Remove every key, returning the tree to the empty state.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
        debug!("cleared B-tree");
    }

    /// All keys in ascending order.
    ///
    /// # Errors
    /// `Error::EmptyTree` if the tree has no keys.
    pub fn traverse(&self) -> Result<Vec<K>>
    where
        K: Clone,
    {
        if self.is_empty() {
            return Err(Error::EmptyTree);
        }
        Ok(self.iter().cloned().collect())
    }
}

impl<K: Ord> BTree<K> {
    // ========================================================================
    // Public API: Lookup
    // ========================================================================

    /// Find the stored key equal to `key`.
    ///
    /// # Errors
    /// - `Error::EmptyTree` if the tree has no keys
    /// - `Error::KeyNotFound` if no stored key equals `key`
    pub fn search<Q>(&self, key: &Q) -> Result<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let root = self.root.as_ref().ok_or(Error::EmptyTree)?;
        root.search(key).ok_or(Error::KeyNotFound)
    }

    /// Whether `key` is stored in the tree.
    pub fn exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_ok()
    }

    // ========================================================================
    // Public API: Mutation
    // ========================================================================

    /// Insert `key`.
    ///
    /// Returns `false` and leaves the key set unchanged if an equal key is
    /// already present.
    pub fn insert(&mut self, key: K) -> bool {
        let t = self.degree;

        if self.root.as_ref().is_some_and(|root| root.is_full(t)) {
            self.grow_root();
        }

        let inserted = match self.root.as_mut() {
            Some(root) => root.insert_non_full(key, t, &self.stats),
            None => {
                let mut leaf = Node::leaf(t);
                leaf.keys.push(key);
                self.root = Some(Box::new(leaf));
                debug!("first key inserted; tree is non-empty");
                true
            }
        };

        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Remove `key` and return the stored key.
    ///
    /// The tree is unchanged when an error is returned.
    ///
    /// # Errors
    /// - `Error::EmptyTree` if the tree has no keys
    /// - `Error::KeyNotFound` if no stored key equals `key`
    pub fn delete<Q>(&mut self, key: &Q) -> Result<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let t = self.degree;
        let root = self.root.as_mut().ok_or(Error::EmptyTree)?;
        let removed = root.remove(key, t, &self.stats).ok_or(Error::KeyNotFound)?;

        self.len -= 1;
        self.collapse_root();
        Ok(removed)
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    /// The first [`Violation`] found.
    pub fn validate(&self) -> std::result::Result<(), Violation> {
        validate::check_tree(self.root.as_deref(), self.degree, self.len)
    }

    // ========================================================================
    // Root-only structural changes
    // ========================================================================

    /// Split a full root under a new, empty root. Height grows by one.
    fn grow_root(&mut self) {
        let Some(old_root) = self.root.take() else {
            return;
        };

        let mut root = Node::internal(self.degree);
        root.children.push(old_root);
        root.split_child(0, self.degree, &self.stats);
        self.root = Some(Box::new(root));

        TreeStats::bump(&self.stats.root_grows);
        debug!(height = self.height(), "root split; tree grew a level");
    }

    /// Fix up a root left without keys by a delete.
    ///
    /// A keyless leaf root means the last key is gone. A keyless internal
    /// root has exactly one child left (its last two children merged), and
    /// that child becomes the new root.
    fn collapse_root(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };

        if !root.keys.is_empty() {
            self.root = Some(root);
            return;
        }

        if root.is_leaf() {
            debug!("last key removed; tree is empty");
            return;
        }

        let Node { mut children, .. } = *root;
        assert!(
            children.len() == 1,
            "B-tree invariant violated: keyless root has {} children",
            children.len()
        );
        self.root = children.pop();

        TreeStats::bump(&self.stats.root_shrinks);
        debug!(height = self.height(), "root emptied; tree shrank a level");
    }
}

impl<K: Ord> Extend<K> for BTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for BTree<K> {
    /// Build a tree with the default minimum degree.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::with_config(BTreeConfig::default());
        tree.extend(iter);
        tree
    }
}

impl<'a, K> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<K: fmt::Debug> fmt::Debug for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(t: usize, keys: impl IntoIterator<Item = i32>) -> BTree<i32> {
        let mut tree = BTree::new(t).unwrap();
        tree.extend(keys);
        tree
    }

    fn root_keys(tree: &BTree<i32>) -> Vec<i32> {
        tree.root.as_ref().map(|r| r.keys.clone()).unwrap_or_default()
    }

    #[test]
    fn test_new_rejects_small_degree() {
        assert!(matches!(BTree::<i32>::new(1), Err(Error::InvalidParameter(_))));
        assert!(matches!(BTree::<i32>::new(0), Err(Error::InvalidParameter(_))));
        assert!(BTree::<i32>::new(2).is_ok());
    }

    #[test]
    fn test_empty_tree() {
        let mut tree: BTree<i32> = BTree::new(3).unwrap();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert!(!tree.exists(&10));
        assert_eq!(tree.search(&10), Err(Error::EmptyTree));
        assert_eq!(tree.delete(&10), Err(Error::EmptyTree));
        assert_eq!(tree.traverse(), Err(Error::EmptyTree));
        assert_eq!(tree.first(), None);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn test_first_insert_creates_leaf_root() {
        let tree = tree_of(3, [42]);

        assert!(!tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(root_keys(&tree), vec![42]);
    }

    #[test]
    fn test_root_split_on_overflow() {
        // 2t-1 = 5 keys fill the root; the sixth forces a split.
        let mut tree = tree_of(3, [10, 20, 30, 40, 50]);
        assert_eq!(tree.height(), 1);

        tree.insert(60);

        assert_eq!(tree.height(), 2);
        assert_eq!(root_keys(&tree), vec![30]);
        assert_eq!(tree.stats().snapshot().root_grows, 1);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn test_insert_duplicate_is_noop() {
        let mut tree = tree_of(2, 0..20);

        assert!(!tree.insert(7));
        assert_eq!(tree.len(), 20);
        assert_eq!(tree.traverse().unwrap(), (0..20).collect::<Vec<_>>());
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn test_search_returns_stored_key() {
        let mut tree: BTree<String> = BTree::new(2).unwrap();
        tree.extend(["apple", "banana", "cherry"].map(String::from));

        assert_eq!(tree.search("banana").map(String::as_str), Ok("banana"));
        assert_eq!(tree.search("durian"), Err(Error::KeyNotFound));
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let mut tree = tree_of(3, [10, 20, 30, 40, 50, 60]);
        let before = tree.traverse().unwrap();
        let stats_before = tree.stats().snapshot();

        assert_eq!(tree.delete(&35), Err(Error::KeyNotFound));

        assert_eq!(tree.traverse().unwrap(), before);
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.stats().snapshot(), stats_before);
    }

    #[test]
    fn test_delete_borrows_from_sibling() {
        let mut tree = tree_of(3, [50, 30, 10, 40, 20, 60, 70]);

        assert_eq!(tree.delete(&30), Ok(30));

        let stats = tree.stats().snapshot();
        assert_eq!(stats.borrows(), 1);
        assert_eq!(stats.merges, 0);
        assert_eq!(tree.traverse().unwrap(), vec![10, 20, 40, 50, 60, 70]);
        assert_eq!(tree.validate(), Ok(()));
    }

    #[test]
    fn test_delete_merge_collapses_root() {
        let mut tree = tree_of(3, [10, 20, 30, 40, 50, 60]);
        assert_eq!(tree.height(), 2);

        for key in [20, 40, 60] {
            assert_eq!(tree.delete(&key), Ok(key));
            assert_eq!(tree.validate(), Ok(()));
        }

        assert_eq!(tree.traverse().unwrap(), vec![10, 30, 50]);
        assert_eq!(tree.height(), 1);
        let stats = tree.stats().snapshot();
        assert_eq!(stats.merges, 1);
        assert_eq!(stats.root_shrinks, 1);
    }

    #[test]
    fn test_delete_last_key_empties_tree() {
        let mut tree = tree_of(3, [1]);

        assert_eq!(tree.delete(&1), Ok(1));

        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.traverse(), Err(Error::EmptyTree));
        assert_eq!(tree.delete(&1), Err(Error::EmptyTree));
    }

    #[test]
    fn test_first_last_clear() {
        let mut tree = tree_of(2, [5, 3, 9, 1, 7]);

        assert_eq!(tree.first(), Some(&1));
        assert_eq!(tree.last(), Some(&9));

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.last(), None);
    }

    #[test]
    fn test_from_iterator_uses_default_degree() {
        let tree: BTree<i32> = (0..10).collect();

        assert_eq!(tree.degree().get(), crate::common::config::DEFAULT_MIN_DEGREE);
        assert_eq!(tree.len(), 10);
    }

    #[test]
    fn test_debug_prints_key_set() {
        let tree = tree_of(2, [3, 1, 2]);
        assert_eq!(format!("{:?}", tree), "{1, 2, 3}");
    }
}
