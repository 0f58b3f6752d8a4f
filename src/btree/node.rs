//! Node layout for the in-memory B+ tree.
//!
//! Nodes are plain data. All structural behavior (descent, splits, the
//! leaf chain splice) lives in [`BPlusTree`](super::BPlusTree).

use std::borrow::Borrow;

use crate::types::NodeId;

/// A page of the tree: either a leaf holding values or an internal
/// routing node holding child handles.
#[derive(Debug, Clone)]
pub(crate) enum Node<K, V> {
    Leaf(Leaf<K, V>),
    Internal(Internal<K>),
}

/// Leaf page: keys with parallel values and a link to the next leaf.
#[derive(Debug, Clone)]
pub(crate) struct Leaf<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
    /// Next leaf in ascending key order (`None` for the last leaf)
    pub(crate) next: Option<NodeId>,
}

/// Internal page: routing keys and `keys.len() + 1` children.
///
/// Child `i` holds keys `k` with `keys[i - 1] <= k < keys[i]`.
#[derive(Debug, Clone)]
pub(crate) struct Internal<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<NodeId>,
}

impl<K, V> Leaf<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            next: None,
        }
    }

    /// Split off the upper half, keeping keys `[0, mid)` here.
    ///
    /// The returned leaf owns `[mid, end)` and inherits this leaf's `next`
    /// link. The caller links this leaf to the new one once it has a handle.
    pub(crate) fn split_upper(&mut self) -> Self {
        let mid = self.keys.len() / 2;
        Self {
            keys: self.keys.split_off(mid),
            values: self.values.split_off(mid),
            next: self.next.take(),
        }
    }
}

impl<K> Internal<K> {
    /// Split off the upper half around the median key.
    ///
    /// Keeps keys `[0, mid)` and children `[0, mid]`; returns the median key
    /// together with a node holding keys `(mid, end)` and the remaining
    /// children. The median is kept by neither half.
    pub(crate) fn split_upper(&mut self) -> (K, Self) {
        let mid = self.keys.len() / 2;
        let keys = self.keys.split_off(mid + 1);
        let children = self.children.split_off(mid + 1);
        let median = self
            .keys
            .pop()
            .unwrap_or_else(|| unreachable!("split of an internal node with no keys"));
        (median, Self { keys, children })
    }

    /// Index of the child that covers `key`: the position of the first key
    /// strictly greater than `key`, or the last child if there is none.
    pub(crate) fn child_slot<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys.partition_point(|k| k.borrow() <= key)
    }
}

impl<K, V> Node<K, V> {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Self::Leaf(leaf) => &leaf.keys,
            Self::Internal(internal) => &internal.keys,
        }
    }
}
