//! B+ tree core implementation.
//!
//! This module provides the main BPlusTree struct with operations for:
//! - insert: Sorted leaf insertion with split propagation
//! - search: Point lookups
//! - stats: Shape information for reporting
//!
//! Nodes live in a flat arena owned by the tree and refer to each other by
//! [`NodeId`]. Nodes never store their parent; the root-to-leaf path taken
//! by an insertion is kept on a stack and reused for the whole split cascade.

use std::borrow::Borrow;

use tracing::{debug, trace};

use super::node::{Internal, Leaf, Node};
use crate::error::{IndexError, Result};
use crate::types::{IndexConfig, NodeId, MIN_DEGREE};

/// One step of a descent: the internal node visited and the child slot taken
type PathEntry = (NodeId, usize);

/// An in-memory B+ tree
#[derive(Debug, Clone)]
pub struct BPlusTree<K, V> {
    /// Node arena; `NodeId` indexes into it
    pub(super) nodes: Vec<Node<K, V>>,
    /// Current root node
    pub(super) root: NodeId,
    /// A node holding this many keys is split
    max_degree: usize,
    /// Number of stored entries
    len: usize,
    /// Number of levels, 1 for a lone leaf root
    height: usize,
}

/// Tree statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of stored entries
    pub len: usize,
    /// Height of the tree
    pub height: usize,
    /// Total number of nodes
    pub node_count: usize,
    /// Number of leaf nodes
    pub leaf_count: usize,
    /// Number of internal nodes
    pub internal_count: usize,
    /// Configured maximum degree
    pub max_degree: usize,
}

impl<K, V> BPlusTree<K, V> {
    /// Create an empty tree whose nodes split when they reach `max_degree` keys.
    ///
    /// Fails with [`IndexError::InvalidDegree`] when `max_degree < 3`.
    pub fn new(max_degree: usize) -> Result<Self> {
        if max_degree < MIN_DEGREE {
            return Err(IndexError::InvalidDegree {
                degree: max_degree,
                min: MIN_DEGREE,
            });
        }

        Ok(Self {
            nodes: vec![Node::Leaf(Leaf::new())],
            root: NodeId::new(0),
            max_degree,
            len: 0,
            height: 1,
        })
    }

    /// Create an empty tree from a configuration
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        Self::new(config.max_degree)
    }

    /// Get the configuration this tree was built with
    pub fn config(&self) -> IndexConfig {
        IndexConfig::new(self.max_degree)
    }

    /// Get the maximum degree
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no entries
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the height of the tree
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get statistics about the tree
    pub fn stats(&self) -> IndexStats {
        let leaf_count = self.nodes.iter().filter(|node| node.is_leaf()).count();
        IndexStats {
            len: self.len,
            height: self.height,
            node_count: self.nodes.len(),
            leaf_count,
            internal_count: self.nodes.len() - leaf_count,
            max_degree: self.max_degree,
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.index()]
    }

    pub(crate) fn leaf(&self, id: NodeId) -> &Leaf<K, V> {
        match self.node(id) {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => unreachable!("node {id} is not a leaf"),
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut Leaf<K, V> {
        match &mut self.nodes[id.index()] {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => unreachable!("node {id} is not a leaf"),
        }
    }

    fn internal_mut(&mut self, id: NodeId) -> &mut Internal<K> {
        match &mut self.nodes[id.index()] {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => unreachable!("node {id} on the insert path is not internal"),
        }
    }

    /// Leftmost leaf, the head of the leaf chain
    pub(crate) fn first_leaf(&self) -> NodeId {
        let mut current = self.root;
        while let Node::Internal(internal) = self.node(current) {
            current = internal.children[0];
        }
        current
    }

    /// Rightmost leaf, the tail of the leaf chain
    pub(crate) fn last_leaf(&self) -> NodeId {
        let mut current = self.root;
        while let Node::Internal(internal) = self.node(current) {
            current = internal.children[internal.children.len() - 1];
        }
        current
    }

    /// Smallest entry, or `None` for an empty tree
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.leaf(self.first_leaf());
        leaf.keys.first().zip(leaf.values.first())
    }

    /// Largest entry, or `None` for an empty tree
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.leaf(self.last_leaf());
        leaf.keys.last().zip(leaf.values.last())
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }
}

impl<K: Ord, V> BPlusTree<K, V> {
    /// Descend from the root to the leaf that owns `key`
    pub(crate) fn find_leaf<Q>(&self, key: &Q) -> NodeId
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Node::Internal(internal) = self.node(current) {
            current = internal.children[internal.child_slot(key)];
        }
        current
    }

    /// Same descent as [`find_leaf`](Self::find_leaf), recording every
    /// internal node passed and the child slot taken.
    fn find_leaf_with_path(&self, key: &K, path: &mut Vec<PathEntry>) -> NodeId {
        let mut current = self.root;
        while let Node::Internal(internal) = self.node(current) {
            let slot = internal.child_slot(key);
            path.push((current, slot));
            current = internal.children[slot];
        }
        current
    }

    /// Look up a key and return its value.
    ///
    /// A miss returns `None`.
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let leaf = self.leaf(self.find_leaf(key));
        let idx = leaf.keys.binary_search_by(|k| k.borrow().cmp(key)).ok()?;
        Some(&leaf.values[idx])
    }

    /// Check if a key exists
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    /// Mutable access to the value stored under `key`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let leaf_id = self.find_leaf(key);
        let leaf = self.leaf_mut(leaf_id);
        let idx = leaf.keys.binary_search_by(|k| k.borrow().cmp(key)).ok()?;
        Some(&mut leaf.values[idx])
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Insert a new key-value pair.
    ///
    /// Fails with [`IndexError::DuplicateKey`] if the key is already present,
    /// leaving the tree unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        let mut path = Vec::with_capacity(self.height);
        let leaf_id = self.find_leaf_with_path(&key, &mut path);
        let max_degree = self.max_degree;

        let leaf = self.leaf_mut(leaf_id);
        let pos = match leaf.keys.binary_search(&key) {
            Ok(_) => return Err(IndexError::DuplicateKey),
            Err(pos) => pos,
        };
        leaf.keys.insert(pos, key);
        leaf.values.insert(pos, value);
        let overflow = leaf.keys.len() >= max_degree;

        self.len += 1;
        if overflow {
            self.split_cascade(leaf_id, path);
        }
        Ok(())
    }

    /// Split `node_id` and push separators up `path` until a parent stays
    /// below capacity or the root itself splits.
    fn split_cascade(&mut self, mut node_id: NodeId, mut path: Vec<PathEntry>) {
        let max_degree = self.max_degree;

        loop {
            let (separator, right_id) = self.split_node(node_id);

            let Some((parent_id, slot)) = path.pop() else {
                self.grow_root(separator, node_id, right_id);
                return;
            };

            let parent = self.internal_mut(parent_id);
            parent.keys.insert(slot, separator);
            parent.children.insert(slot + 1, right_id);
            if parent.keys.len() < max_degree {
                return;
            }
            node_id = parent_id;
        }
    }

    /// Split one overfull node into itself (left half) and a new right
    /// sibling. Returns the separator to promote and the sibling's handle.
    fn split_node(&mut self, node_id: NodeId) -> (K, NodeId) {
        let right_id = NodeId::from_index(self.nodes.len());

        let (separator, right) = match &mut self.nodes[node_id.index()] {
            Node::Leaf(leaf) => {
                let right = leaf.split_upper();
                leaf.next = Some(right_id);
                // Leaves keep every entry; the separator is a copy of the
                // right leaf's first key.
                let separator = right.keys[0].clone();
                trace!(
                    node = %node_id,
                    right = %right_id,
                    left_keys = leaf.keys.len(),
                    right_keys = right.keys.len(),
                    "split leaf"
                );
                (separator, Node::Leaf(right))
            }
            Node::Internal(internal) => {
                let (median, right) = internal.split_upper();
                trace!(
                    node = %node_id,
                    right = %right_id,
                    left_keys = internal.keys.len(),
                    right_keys = right.keys.len(),
                    "split internal node"
                );
                (median, Node::Internal(right))
            }
        };

        let allocated = self.alloc(right);
        debug_assert_eq!(allocated, right_id);
        (separator, right_id)
    }

    /// Replace the root with a new internal node over `left` and `right`
    fn grow_root(&mut self, separator: K, left: NodeId, right: NodeId) {
        let root = self.alloc(Node::Internal(Internal {
            keys: vec![separator],
            children: vec![left, right],
        }));
        self.root = root;
        self.height += 1;
        debug!(root = %root, height = self.height, "root split");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn tree_from(max_degree: usize, keys: &[i32]) -> BPlusTree<i32, String> {
        let mut tree = BPlusTree::new(max_degree).unwrap();
        for &k in keys {
            tree.insert(k, format!("v{k}")).unwrap();
        }
        tree
    }

    #[test]
    fn test_new_rejects_small_degree() {
        let err = BPlusTree::<i32, ()>::new(2).unwrap_err();
        assert!(matches!(err, IndexError::InvalidDegree { degree: 2, min: 3 }));
        assert!(BPlusTree::<i32, ()>::new(0).is_err());
        assert!(BPlusTree::<i32, ()>::new(3).is_ok());
    }

    #[test]
    fn test_with_config() {
        let tree = BPlusTree::<i32, ()>::with_config(IndexConfig::new(5)).unwrap();
        assert_eq!(tree.max_degree(), 5);
        assert_eq!(tree.config(), IndexConfig::new(5));
        assert!(BPlusTree::<i32, ()>::with_config(IndexConfig::new(1)).is_err());
    }

    #[test]
    fn test_empty_tree() {
        let tree = BPlusTree::<i32, String>::new(3).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.search(&1), None);
        assert_eq!(tree.first_key_value(), None);
        assert_eq!(tree.last_key_value(), None);
    }

    #[test]
    fn test_single_insert() {
        let tree = tree_from(3, &[42]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.search(&42).map(String::as_str), Some("v42"));
        assert_eq!(tree.search(&7), None);
    }

    #[test]
    fn test_reference_scenario() {
        let tree = tree_from(4, &[10, 20, 5, 6, 12, 30, 7, 17]);

        let keys: Vec<i32> = tree.keys().copied().collect();
        assert_eq!(keys, vec![5, 6, 7, 10, 12, 17, 20, 30]);
        assert!(tree.height() > 1);
        assert_eq!(tree.height(), 2);

        for k in keys {
            assert_eq!(tree.search(&k), Some(&format!("v{k}")));
        }
        assert_eq!(tree.search(&11), None);
        tree.validate().unwrap();
    }

    #[test]
    fn test_first_leaf_split_shape() {
        // 4 keys in a degree-4 leaf: left keeps [0, 2), right [2, 4)
        let tree = tree_from(4, &[1, 2, 3, 4]);
        assert_eq!(tree.height(), 2);

        let Node::Internal(root) = tree.node(tree.root) else {
            panic!("root should be internal after a split");
        };
        assert_eq!(root.keys, vec![3]);
        assert_eq!(tree.node(root.children[0]).keys(), &[1, 2]);
        assert_eq!(tree.node(root.children[1]).keys(), &[3, 4]);
        assert_eq!(tree.leaf(root.children[0]).next, Some(root.children[1]));
        assert_eq!(tree.leaf(root.children[1]).next, None);
    }

    #[test]
    fn test_internal_split_promotes_to_new_root() {
        let tree = tree_from(3, &(1..=9).collect::<Vec<_>>());
        assert!(tree.height() >= 3);
        tree.validate().unwrap();

        // every routing key appears exactly once among internal nodes
        let mut routing: Vec<i32> = tree
            .nodes
            .iter()
            .filter(|node| !node.is_leaf())
            .flat_map(|node| node.keys().iter().copied())
            .collect();
        let total = routing.len();
        routing.sort_unstable();
        routing.dedup();
        assert_eq!(routing.len(), total);
    }

    #[test]
    fn test_duplicate_rejected_without_change() {
        let mut tree = tree_from(4, &[10, 20, 5, 6, 12, 30, 7, 17]);
        let before = tree.stats();

        let err = tree.insert(12, "other".to_string()).unwrap_err();
        assert!(matches!(err, IndexError::DuplicateKey));

        assert_eq!(tree.stats(), before);
        assert_eq!(tree.search(&12).map(String::as_str), Some("v12"));
        tree.validate().unwrap();
    }

    #[test]
    fn test_duplicate_of_separator_key() {
        let mut tree = tree_from(4, &[1, 2, 3, 4]);
        // 3 is the root separator and lives in the right leaf
        assert!(matches!(tree.insert(3, "x".into()), Err(IndexError::DuplicateKey)));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_get_mut() {
        let mut tree = tree_from(3, &[1, 2, 3, 4, 5]);
        tree.get_mut(&4).unwrap().push_str("-edited");
        assert_eq!(tree.search(&4).map(String::as_str), Some("v4-edited"));
        assert!(tree.get_mut(&99).is_none());
    }

    #[test]
    fn test_borrowed_lookup() {
        let mut tree = BPlusTree::new(3).unwrap();
        for word in ["pear", "apple", "fig", "kiwi", "date"] {
            tree.insert(word.to_string(), word.len()).unwrap();
        }
        assert_eq!(tree.search("kiwi"), Some(&4));
        assert!(tree.contains_key("fig"));
        assert!(!tree.contains_key("plum"));
    }

    #[test]
    fn test_first_and_last() {
        let tree = tree_from(3, &[50, 10, 40, 20, 30]);
        assert_eq!(tree.first_key_value().map(|(k, _)| *k), Some(10));
        assert_eq!(tree.last_key_value().map(|(k, _)| *k), Some(50));
    }

    #[test]
    fn test_stats() {
        let tree = tree_from(4, &[10, 20, 5, 6, 12, 30, 7, 17]);
        let stats = tree.stats();
        assert_eq!(stats.len, 8);
        assert_eq!(stats.height, 2);
        assert_eq!(stats.leaf_count, 3);
        assert_eq!(stats.internal_count, 1);
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.max_degree, 4);
    }

    #[test]
    fn test_many_inserts_ascending_and_descending() {
        let up: Vec<i32> = (0..500).collect();
        let down: Vec<i32> = (0..500).rev().collect();

        for keys in [up, down] {
            let tree = tree_from(5, &keys);
            assert_eq!(tree.len(), 500);
            tree.validate().unwrap();
            for k in &keys {
                assert_eq!(tree.search(k), Some(&format!("v{k}")), "Failed for key {k}");
            }
        }
    }

    #[test]
    fn test_shuffled_inserts() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        let mut keys: Vec<i32> = (0..1000).map(|k| k * 3).collect();
        keys.shuffle(&mut rng);

        for degree in [3, 4, 7, 16] {
            let tree = tree_from(degree, &keys);
            tree.validate().unwrap();

            let scanned: Vec<i32> = tree.keys().copied().collect();
            let mut expected = keys.clone();
            expected.sort_unstable();
            assert_eq!(scanned, expected);

            // keys between the inserted multiples of three are misses
            assert_eq!(tree.search(&1), None);
            assert_eq!(tree.search(&2999), None);
        }
    }

    proptest! {
        #[test]
        fn prop_matches_btreemap(
            degree in 3usize..9,
            keys in proptest::collection::vec(-500i32..500, 0..300),
        ) {
            let mut tree = BPlusTree::new(degree).unwrap();
            let mut model = BTreeMap::new();

            for (i, k) in keys.iter().enumerate() {
                let result = tree.insert(*k, i);
                if model.contains_key(k) {
                    prop_assert!(matches!(result, Err(IndexError::DuplicateKey)));
                } else {
                    prop_assert!(result.is_ok());
                    model.insert(*k, i);
                }
            }

            prop_assert!(tree.validate().is_ok());
            prop_assert_eq!(tree.len(), model.len());
            for k in -510i32..510 {
                prop_assert_eq!(tree.search(&k), model.get(&k));
            }
            let scanned: Vec<(i32, usize)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
            let expected: Vec<(i32, usize)> = model.into_iter().collect();
            prop_assert_eq!(scanned, expected);
        }
    }
}
