//! Ordered iteration over the leaf chain.
//!
//! Iterators descend once to their starting leaf and from there only follow
//! `next` links, so a full scan never revisits internal nodes.

use std::iter::FusedIterator;
use std::ops::{Bound, RangeBounds};

use super::node::Leaf;
use super::BPlusTree;

/// Ascending iterator over all entries of a tree
pub struct Iter<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    leaf: Option<&'a Leaf<K, V>>,
    pos: usize,
    remaining: usize,
}

/// Ascending iterator over the keys of a tree
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// Ascending iterator over the values of a tree
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// Ascending iterator over the entries within a key range
pub struct Range<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    leaf: Option<&'a Leaf<K, V>>,
    pos: usize,
    end: Bound<K>,
}

impl<K, V> BPlusTree<K, V> {
    /// Iterate over all entries in ascending key order
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            leaf: Some(self.leaf(self.first_leaf())),
            pos: 0,
            remaining: self.len(),
        }
    }

    /// Iterate over all keys in ascending order
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Iterate over all values in ascending key order
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Iterate over the entries whose keys fall within `range`.
    ///
    /// An empty or inverted range yields nothing.
    pub fn range<R>(&self, range: R) -> Range<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        let (leaf_id, pos) = match range.start_bound() {
            Bound::Unbounded => (self.first_leaf(), 0),
            Bound::Included(start) => {
                let id = self.find_leaf(start);
                (id, self.leaf(id).keys.partition_point(|k| k < start))
            }
            Bound::Excluded(start) => {
                let id = self.find_leaf(start);
                (id, self.leaf(id).keys.partition_point(|k| k <= start))
            }
        };

        Range {
            tree: self,
            leaf: Some(self.leaf(leaf_id)),
            pos,
            end: range.end_bound().cloned(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if self.pos < leaf.keys.len() {
                let i = self.pos;
                self.pos += 1;
                self.remaining -= 1;
                return Some((&leaf.keys[i], &leaf.values[i]));
            }
            let tree = self.tree;
            self.leaf = leaf.next.map(|id| tree.leaf(id));
            self.pos = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<'a, K: Ord, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf?;
            if self.pos < leaf.keys.len() {
                let key = &leaf.keys[self.pos];
                let past_end = match &self.end {
                    Bound::Included(end) => key > end,
                    Bound::Excluded(end) => key >= end,
                    Bound::Unbounded => false,
                };
                if past_end {
                    self.leaf = None;
                    return None;
                }
                let value = &leaf.values[self.pos];
                self.pos += 1;
                return Some((key, value));
            }
            let tree = self.tree;
            self.leaf = leaf.next.map(|id| tree.leaf(id));
            self.pos = 0;
        }
    }
}

impl<K: Ord, V> FusedIterator for Range<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a BPlusTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
