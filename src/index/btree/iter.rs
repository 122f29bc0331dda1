//! In-order iteration over a [`BTree`](super::BTree).

use std::iter::FusedIterator;

use super::node::Node;

/// Lazy ascending iterator over the keys of a tree.
///
/// Holds the path from the root to the next key to yield, so it uses
/// `O(height)` memory and never touches the tree it borrows.
pub struct Iter<'a, K> {
    /// Each entry is a node and the index of its next unvisited key.
    stack: Vec<(&'a Node<K>, usize)>,

    /// Keys not yet yielded.
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(root: Option<&'a Node<K>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        if let Some(root) = root {
            iter.descend_left(root);
        }
        iter
    }

    /// Push `node` and its leftmost spine.
    fn descend_left(&mut self, mut node: &'a Node<K>) {
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) => node = child,
                None => break,
            }
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            let top = self.stack.last_mut()?;
            let node = top.0;
            let idx = top.1;

            if idx < node.keys.len() {
                top.1 += 1;
                if let Some(child) = node.children.get(idx + 1) {
                    self.descend_left(child);
                }
                self.remaining = self.remaining.saturating_sub(1);
                return Some(&node.keys[idx]);
            }

            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
