//! Node - the unit of the split, borrow and merge algorithms.
//!
//! A [`Node`] owns an ordered run of keys and, when internal, one more
//! child than it has keys:
//!
//! ```text
//!              keys:      [ k0 | k1 | k2 ]
//!              children: c0   c1   c2   c3
//!
//!   c0 < k0 < c1 < k1 < c2 < k2 < c3
//! ```
//!
//! Node methods never know whether they run on the root. They report
//! structural facts (a key was removed, a child is now underfull) through
//! return values and leave the root-only fix-ups to [`BTree`](super::BTree).

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

use tracing::trace;

use super::stats::TreeStats;
use crate::common::MinDegree;

/// A B-tree node.
///
/// Capacity is fixed at creation from `t`: `2t-1` key slots and, for
/// internal nodes, `2t` child slots. Only `keys.len()` entries are ever
/// live; there are no cleared or sentinel slots.
pub(crate) struct Node<K> {
    /// Strictly ascending keys.
    pub(crate) keys: Vec<K>,

    /// Child links. Empty for leaves, `keys.len() + 1` entries otherwise.
    pub(crate) children: Vec<Box<Node<K>>>,
}

impl<K> Node<K> {
    /// Create an empty leaf.
    pub(crate) fn leaf(t: MinDegree) -> Self {
        Self {
            keys: Vec::with_capacity(t.max_keys()),
            children: Vec::new(),
        }
    }

    /// Create an empty internal node.
    pub(crate) fn internal(t: MinDegree) -> Self {
        Self {
            keys: Vec::with_capacity(t.max_keys()),
            children: Vec::with_capacity(t.max_children()),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn is_full(&self, t: MinDegree) -> bool {
        self.keys.len() == t.max_keys()
    }

    #[inline]
    pub(crate) fn is_underfull(&self, t: MinDegree) -> bool {
        self.keys.len() < t.min_keys()
    }

    /// Leftmost key of this subtree.
    pub(crate) fn first(&self) -> Option<&K> {
        let mut node = self;
        while let Some(child) = node.children.first() {
            node = child;
        }
        node.keys.first()
    }

    /// Rightmost key of this subtree.
    pub(crate) fn last(&self) -> Option<&K> {
        let mut node = self;
        while let Some(child) = node.children.last() {
            node = child;
        }
        node.keys.last()
    }
}

impl<K: Ord> Node<K> {
    /// Binary search over the live keys.
    ///
    /// `Ok(i)` means `keys[i] == key`; `Err(i)` is the child index whose
    /// subtree would hold `key`.
    #[inline]
    fn find<Q>(&self, key: &Q) -> Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys.binary_search_by(|probe| probe.borrow().cmp(key))
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Find the stored key equal to `key` in this subtree.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find(key) {
            Ok(idx) => Some(&self.keys[idx]),
            Err(_) if self.is_leaf() => None,
            Err(idx) => self.children[idx].search(key),
        }
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert `key` into the subtree rooted here.
    ///
    /// Precondition: this node is not full. Any full child on the descent
    /// path is split before we enter it, so the recursion never has to
    /// come back up to make room.
    ///
    /// Returns `false` without inserting if the key is already present.
    pub(crate) fn insert_non_full(&mut self, key: K, t: MinDegree, stats: &TreeStats) -> bool {
        debug_assert!(!self.is_full(t), "insert_non_full on a full node");

        let mut idx = match self.find(&key) {
            Ok(_) => return false,
            Err(idx) => idx,
        };

        if self.is_leaf() {
            self.keys.insert(idx, key);
            return true;
        }

        if self.children[idx].is_full(t) {
            self.split_child(idx, t, stats);

            // The promoted median now sits at keys[idx]; pick a side.
            match key.cmp(&self.keys[idx]) {
                Ordering::Equal => return false,
                Ordering::Greater => idx += 1,
                Ordering::Less => {}
            }
        }

        self.children[idx].insert_non_full(key, t, stats)
    }

    /// Split the full child at `idx` into two halves of `t-1` keys each.
    ///
    /// ```text
    /// before:   parent [ .. | p | .. ]
    ///                        |
    ///           child  [ a b M c d ]          (t = 3)
    ///
    /// after:    parent [ .. | M | p | .. ]
    ///                       /   \
    ///           child [ a b ]   [ c d ] sibling
    /// ```
    ///
    /// Precondition: this node is not full, `children[idx]` is.
    pub(crate) fn split_child(&mut self, idx: usize, t: MinDegree, stats: &TreeStats) {
        let child = &mut self.children[idx];
        debug_assert!(child.is_full(t), "split_child on a non-full child");

        let mut sibling = if child.is_leaf() {
            Node::leaf(t)
        } else {
            Node::internal(t)
        };

        sibling.keys.extend(child.keys.drain(t.get()..));
        if !child.is_leaf() {
            sibling.children.extend(child.children.drain(t.get()..));
        }
        let median = child.keys.remove(t.median());

        self.keys.insert(idx, median);
        self.children.insert(idx + 1, Box::new(sibling));

        TreeStats::bump(&stats.splits);
        trace!(child = idx, keys = t.min_keys(), "split full child");
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Remove `key` from the subtree rooted here.
    ///
    /// Returns the removed key, or `None` if it is not present, in which
    /// case nothing was modified. Every child touched on the way down is
    /// back within `[t-1, 2t-1]` keys when this returns; only this node
    /// itself may be left underfull, for the caller to repair.
    pub(crate) fn remove<Q>(&mut self, key: &Q, t: MinDegree, stats: &TreeStats) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find(key) {
            Ok(idx) if self.is_leaf() => Some(self.keys.remove(idx)),
            Ok(idx) => Some(self.remove_separator(idx, t, stats)),
            Err(_) if self.is_leaf() => None,
            Err(idx) => {
                let removed = self.children[idx].remove(key, t, stats)?;
                self.repair_child(idx, t, stats);
                Some(removed)
            }
        }
    }

    /// Remove `keys[idx]` from an internal node by pulling up its in-order
    /// predecessor, or its successor if the left subtree has no keys.
    fn remove_separator(&mut self, idx: usize, t: MinDegree, stats: &TreeStats) -> K {
        let (source, replacement) = if let Some(pred) = self.children[idx].pop_last(t, stats) {
            (idx, pred)
        } else if let Some(succ) = self.children[idx + 1].pop_first(t, stats) {
            (idx + 1, succ)
        } else {
            panic!("B-tree invariant violated: both subtrees around key {idx} are empty");
        };

        let removed = mem::replace(&mut self.keys[idx], replacement);
        self.repair_child(source, t, stats);
        removed
    }

    /// Remove and return the largest key of this subtree.
    fn pop_last(&mut self, t: MinDegree, stats: &TreeStats) -> Option<K> {
        if self.is_leaf() {
            return self.keys.pop();
        }

        let last = self.children.len() - 1;
        let key = self.children[last].pop_last(t, stats)?;
        self.repair_child(last, t, stats);
        Some(key)
    }

    /// Remove and return the smallest key of this subtree.
    fn pop_first(&mut self, t: MinDegree, stats: &TreeStats) -> Option<K> {
        if self.is_leaf() {
            if self.keys.is_empty() {
                return None;
            }
            return Some(self.keys.remove(0));
        }

        let key = self.children[0].pop_first(t, stats)?;
        self.repair_child(0, t, stats);
        Some(key)
    }

    // ========================================================================
    // Rebalance
    // ========================================================================

    #[inline]
    fn repair_child(&mut self, idx: usize, t: MinDegree, stats: &TreeStats) {
        if self.children[idx].is_underfull(t) {
            self.fix_underflow(idx, t, stats);
        }
    }

    /// Bring `children[idx]` back up to `t-1` keys.
    ///
    /// Tries, in order: borrow from the left sibling, borrow from the right
    /// sibling, merge with whichever sibling exists. A merge takes one key
    /// from this node, which may leave this node underfull in turn.
    ///
    /// # Panics
    /// Panics if `children[idx]` has no sibling. A well-formed non-root
    /// node always has one, so this is a bug in the tree, not bad input.
    pub(crate) fn fix_underflow(&mut self, idx: usize, t: MinDegree, stats: &TreeStats) {
        assert!(
            self.children.len() >= 2,
            "B-tree invariant violated: underfull child {idx} has no sibling"
        );

        let has_left = idx > 0;
        let has_right = idx + 1 < self.children.len();

        if has_left && self.children[idx - 1].keys.len() > t.min_keys() {
            self.borrow_from_left(idx);
            TreeStats::bump(&stats.borrows_left);
        } else if has_right && self.children[idx + 1].keys.len() > t.min_keys() {
            self.borrow_from_right(idx);
            TreeStats::bump(&stats.borrows_right);
        } else if has_right {
            self.merge_children(idx);
            TreeStats::bump(&stats.merges);
        } else {
            self.merge_children(idx - 1);
            TreeStats::bump(&stats.merges);
        }
    }

    /// Rotate the left sibling's last key through the separator into the
    /// front of `children[idx]`.
    fn borrow_from_left(&mut self, idx: usize) {
        let (before, after) = self.children.split_at_mut(idx);
        let sibling = &mut before[idx - 1];
        let child = &mut after[0];

        let up = sibling.keys.remove(sibling.keys.len() - 1);
        let down = mem::replace(&mut self.keys[idx - 1], up);
        child.keys.insert(0, down);

        if !sibling.is_leaf() {
            let link = sibling.children.remove(sibling.children.len() - 1);
            child.children.insert(0, link);
        }

        trace!(child = idx, keys = child.keys.len(), "borrowed from left sibling");
    }

    /// Rotate the right sibling's first key through the separator onto the
    /// back of `children[idx]`.
    fn borrow_from_right(&mut self, idx: usize) {
        let (before, after) = self.children.split_at_mut(idx + 1);
        let child = &mut before[idx];
        let sibling = &mut after[0];

        let up = sibling.keys.remove(0);
        let down = mem::replace(&mut self.keys[idx], up);
        child.keys.push(down);

        if !sibling.is_leaf() {
            let link = sibling.children.remove(0);
            child.children.push(link);
        }

        trace!(child = idx, keys = child.keys.len(), "borrowed from right sibling");
    }

    /// Fold `keys[idx]` and `children[idx + 1]` into `children[idx]`.
    fn merge_children(&mut self, idx: usize) {
        let separator = self.keys.remove(idx);
        let Node { keys, children } = *self.children.remove(idx + 1);

        let child = &mut self.children[idx];
        child.keys.push(separator);
        child.keys.extend(keys);
        child.children.extend(children);

        trace!(child = idx, keys = child.keys.len(), "merged with right sibling");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t3() -> MinDegree {
        MinDegree::new(3).unwrap()
    }

    fn leaf_of(t: MinDegree, keys: &[i32]) -> Node<i32> {
        let mut node = Node::leaf(t);
        node.keys.extend_from_slice(keys);
        node
    }

    fn internal_of(t: MinDegree, keys: &[i32], children: Vec<Node<i32>>) -> Node<i32> {
        let mut node = Node::internal(t);
        node.keys.extend_from_slice(keys);
        node.children.extend(children.into_iter().map(Box::new));
        node
    }

    fn child_keys(node: &Node<i32>) -> Vec<Vec<i32>> {
        node.children.iter().map(|c| c.keys.clone()).collect()
    }

    #[test]
    fn test_node_capacity_fixed_at_creation() {
        let t = t3();
        let leaf: Node<i32> = Node::leaf(t);
        let internal: Node<i32> = Node::internal(t);

        assert!(leaf.is_leaf());
        assert!(leaf.keys.capacity() >= t.max_keys());
        assert!(internal.children.capacity() >= t.max_children());
    }

    #[test]
    fn test_insert_into_leaf_keeps_order() {
        let t = t3();
        let stats = TreeStats::new();
        let mut node = Node::leaf(t);

        for key in [30, 10, 20] {
            assert!(node.insert_non_full(key, t, &stats));
        }

        assert_eq!(node.keys, vec![10, 20, 30]);
    }

    #[test]
    fn test_insert_duplicate_is_rejected() {
        let t = t3();
        let stats = TreeStats::new();
        let mut node = leaf_of(t, &[10, 20]);

        assert!(!node.insert_non_full(20, t, &stats));
        assert_eq!(node.keys, vec![10, 20]);
    }

    #[test]
    fn test_split_leaf_child() {
        let t = t3();
        let stats = TreeStats::new();
        let mut parent = internal_of(t, &[], vec![leaf_of(t, &[1, 2, 3, 4, 5])]);

        parent.split_child(0, t, &stats);

        assert_eq!(parent.keys, vec![3]);
        assert_eq!(child_keys(&parent), vec![vec![1, 2], vec![4, 5]]);
        assert_eq!(stats.snapshot().splits, 1);
    }

    #[test]
    fn test_split_internal_child_moves_upper_links() {
        let t = MinDegree::new(2).unwrap();
        let stats = TreeStats::new();
        let full = internal_of(
            t,
            &[10, 20, 30],
            vec![
                leaf_of(t, &[5]),
                leaf_of(t, &[15]),
                leaf_of(t, &[25]),
                leaf_of(t, &[35]),
            ],
        );
        let mut parent = internal_of(t, &[], vec![full]);

        parent.split_child(0, t, &stats);

        assert_eq!(parent.keys, vec![20]);
        let left = &parent.children[0];
        let right = &parent.children[1];
        assert_eq!(left.keys, vec![10]);
        assert_eq!(right.keys, vec![30]);
        assert_eq!(child_keys(left), vec![vec![5], vec![15]]);
        assert_eq!(child_keys(right), vec![vec![25], vec![35]]);
    }

    #[test]
    fn test_insert_splits_full_child_before_descending() {
        let t = t3();
        let stats = TreeStats::new();
        let mut root = internal_of(
            t,
            &[100],
            vec![leaf_of(t, &[10, 20, 30, 40, 50]), leaf_of(t, &[110, 120])],
        );

        assert!(root.insert_non_full(45, t, &stats));

        assert_eq!(root.keys, vec![30, 100]);
        assert_eq!(
            child_keys(&root),
            vec![vec![10, 20], vec![40, 45, 50], vec![110, 120]]
        );
    }

    #[test]
    fn test_insert_median_duplicate_after_split() {
        let t = t3();
        let stats = TreeStats::new();
        let mut root = internal_of(
            t,
            &[100],
            vec![leaf_of(t, &[10, 20, 30, 40, 50]), leaf_of(t, &[110, 120])],
        );

        assert!(!root.insert_non_full(30, t, &stats));
        assert_eq!(root.keys, vec![30, 100]);
    }

    #[test]
    fn test_search_descends() {
        let t = t3();
        let root = internal_of(t, &[30], vec![leaf_of(t, &[10, 20]), leaf_of(t, &[40, 50])]);

        assert_eq!(root.search(&30), Some(&30));
        assert_eq!(root.search(&40), Some(&40));
        assert_eq!(root.search(&35), None);
    }

    #[test]
    fn test_borrow_from_left() {
        let t = t3();
        let stats = TreeStats::new();
        let mut root = internal_of(t, &[40], vec![leaf_of(t, &[10, 20, 30]), leaf_of(t, &[50])]);

        root.fix_underflow(1, t, &stats);

        assert_eq!(root.keys, vec![30]);
        assert_eq!(child_keys(&root), vec![vec![10, 20], vec![40, 50]]);
        assert_eq!(stats.snapshot().borrows_left, 1);
    }

    #[test]
    fn test_borrow_from_right() {
        let t = t3();
        let stats = TreeStats::new();
        let mut root = internal_of(t, &[20], vec![leaf_of(t, &[10]), leaf_of(t, &[30, 40, 50])]);

        root.fix_underflow(0, t, &stats);

        assert_eq!(root.keys, vec![30]);
        assert_eq!(child_keys(&root), vec![vec![10, 20], vec![40, 50]]);
        assert_eq!(stats.snapshot().borrows_right, 1);
    }

    #[test]
    fn test_borrow_moves_child_link() {
        let t = MinDegree::new(2).unwrap();
        let stats = TreeStats::new();
        let left = internal_of(
            t,
            &[10, 20],
            vec![leaf_of(t, &[5]), leaf_of(t, &[15]), leaf_of(t, &[25])],
        );
        let right = internal_of(t, &[], vec![leaf_of(t, &[35])]);
        let mut root = internal_of(t, &[30], vec![left, right]);

        root.fix_underflow(1, t, &stats);

        assert_eq!(root.keys, vec![20]);
        assert_eq!(root.children[0].keys, vec![10]);
        assert_eq!(root.children[1].keys, vec![30]);
        assert_eq!(child_keys(&root.children[1]), vec![vec![25], vec![35]]);
    }

    #[test]
    fn test_merge_with_right_sibling() {
        let t = t3();
        let stats = TreeStats::new();
        let mut root = internal_of(
            t,
            &[20, 50],
            vec![leaf_of(t, &[10]), leaf_of(t, &[30, 40]), leaf_of(t, &[60, 70])],
        );

        root.fix_underflow(0, t, &stats);

        assert_eq!(root.keys, vec![50]);
        assert_eq!(child_keys(&root), vec![vec![10, 20, 30, 40], vec![60, 70]]);
        assert_eq!(stats.snapshot().merges, 1);
    }

    #[test]
    fn test_merge_last_child_into_left_sibling() {
        let t = t3();
        let stats = TreeStats::new();
        let mut root = internal_of(t, &[30], vec![leaf_of(t, &[10, 20]), leaf_of(t, &[40])]);

        root.fix_underflow(1, t, &stats);

        assert!(root.keys.is_empty());
        assert_eq!(child_keys(&root), vec![vec![10, 20, 30, 40]]);
    }

    #[test]
    #[should_panic(expected = "no sibling")]
    fn test_underflow_without_sibling_is_fatal() {
        let t = t3();
        let stats = TreeStats::new();
        let mut root = internal_of(t, &[], vec![leaf_of(t, &[10])]);

        root.fix_underflow(0, t, &stats);
    }

    #[test]
    fn test_remove_missing_key_leaves_node_untouched() {
        let t = t3();
        let stats = TreeStats::new();
        let mut root = internal_of(t, &[30], vec![leaf_of(t, &[10, 20]), leaf_of(t, &[40, 50])]);

        assert_eq!(root.remove(&35, t, &stats), None);
        assert_eq!(root.keys, vec![30]);
        assert_eq!(child_keys(&root), vec![vec![10, 20], vec![40, 50]]);
        assert_eq!(stats.snapshot().rebalances(), 0);
    }

    #[test]
    fn test_remove_separator_uses_predecessor() {
        let t = t3();
        let stats = TreeStats::new();
        let mut root = internal_of(
            t,
            &[30],
            vec![leaf_of(t, &[10, 20, 25]), leaf_of(t, &[40, 50])],
        );

        assert_eq!(root.remove(&30, t, &stats), Some(30));
        assert_eq!(root.keys, vec![25]);
        assert_eq!(child_keys(&root), vec![vec![10, 20], vec![40, 50]]);
    }

    #[test]
    fn test_first_and_last() {
        let t = t3();
        let root = internal_of(t, &[30], vec![leaf_of(t, &[10, 20]), leaf_of(t, &[40, 50])]);

        assert_eq!(root.first(), Some(&10));
        assert_eq!(root.last(), Some(&50));
        assert_eq!(Node::<i32>::leaf(t).first(), None);
    }
}
