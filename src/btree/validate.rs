//! Structural checks over a whole tree.

use super::node::Node;
use super::BPlusTree;
use crate::error::{IndexError, Result};
use crate::types::NodeId;

/// State accumulated while walking the tree from the root.
struct Walk {
    /// Arena slots reached so far
    seen: Vec<bool>,
    /// Leaves in left-to-right order
    leaves: Vec<NodeId>,
}

impl<K: Ord, V> BPlusTree<K, V> {
    /// Check every structural invariant of the tree.
    ///
    /// Verifies per-node key order and occupancy, `#children == #keys + 1`
    /// for internal nodes, routing bounds, uniform leaf depth, that each
    /// arena node has exactly one parent, the entry count, and that the leaf
    /// chain visits every leaf once in ascending order before terminating.
    pub fn validate(&self) -> Result<()> {
        let mut walk = Walk {
            seen: vec![false; self.nodes.len()],
            leaves: Vec::new(),
        };

        let count = self.check_node(self.root, None, None, 1, &mut walk)?;

        if let Some(orphan) = walk.seen.iter().position(|seen| !seen) {
            return Err(IndexError::invariant(format!(
                "node #{orphan} is not reachable from the root"
            )));
        }
        if count != self.len() {
            return Err(IndexError::invariant(format!(
                "tree holds {count} entries but reports {}",
                self.len()
            )));
        }

        self.check_leaf_chain(&walk.leaves)
    }

    fn check_node(
        &self,
        id: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        walk: &mut Walk,
    ) -> Result<usize> {
        let seen = walk
            .seen
            .get_mut(id.index())
            .ok_or_else(|| IndexError::invariant(format!("node {id} is outside the arena")))?;
        if *seen {
            return Err(IndexError::invariant(format!(
                "node {id} is referenced by more than one parent"
            )));
        }
        *seen = true;

        let node = self.node(id);
        let keys = node.keys();

        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(IndexError::invariant(format!(
                "keys of node {id} are not strictly increasing"
            )));
        }
        if keys.len() >= self.max_degree() {
            return Err(IndexError::invariant(format!(
                "node {id} holds {} keys with max degree {}",
                keys.len(),
                self.max_degree()
            )));
        }
        if let (Some(lower), Some(first)) = (lower, keys.first()) {
            if first < lower {
                return Err(IndexError::invariant(format!(
                    "node {id} holds a key below its routing range"
                )));
            }
        }
        if let (Some(upper), Some(last)) = (upper, keys.last()) {
            if last >= upper {
                return Err(IndexError::invariant(format!(
                    "node {id} holds a key above its routing range"
                )));
            }
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.values.len() != leaf.keys.len() {
                    return Err(IndexError::invariant(format!(
                        "leaf {id} has {} keys but {} values",
                        leaf.keys.len(),
                        leaf.values.len()
                    )));
                }
                if depth != self.height() {
                    return Err(IndexError::invariant(format!(
                        "leaf {id} sits at depth {depth} in a tree of height {}",
                        self.height()
                    )));
                }
                if leaf.keys.is_empty() && id != self.root {
                    return Err(IndexError::invariant(format!("leaf {id} is empty")));
                }
                walk.leaves.push(id);
                Ok(leaf.keys.len())
            }
            Node::Internal(internal) => {
                if internal.children.len() != internal.keys.len() + 1 {
                    return Err(IndexError::invariant(format!(
                        "internal node {id} has {} keys but {} children",
                        internal.keys.len(),
                        internal.children.len()
                    )));
                }
                if internal.keys.is_empty() {
                    return Err(IndexError::invariant(format!(
                        "internal node {id} has no routing keys"
                    )));
                }

                let mut total = 0;
                for (i, &child) in internal.children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { Some(&internal.keys[i - 1]) };
                    let child_upper = internal.keys.get(i).or(upper);
                    total += self.check_node(child, child_lower, child_upper, depth + 1, walk)?;
                }
                Ok(total)
            }
        }
    }

    /// Follow `next` links from the leftmost leaf and compare against the
    /// left-to-right leaf order found by the tree walk.
    fn check_leaf_chain(&self, leaves: &[NodeId]) -> Result<()> {
        let mut current = Some(self.first_leaf());
        let mut previous: Option<&K> = None;

        for (step, &expected) in leaves.iter().enumerate() {
            let id = current.ok_or_else(|| {
                IndexError::invariant(format!(
                    "leaf chain ends after {step} of {} leaves",
                    leaves.len()
                ))
            })?;
            if id != expected {
                return Err(IndexError::invariant(format!(
                    "leaf chain reaches {id} where {expected} was expected"
                )));
            }

            let leaf = self.leaf(id);
            if let (Some(previous), Some(first)) = (previous, leaf.keys.first()) {
                if previous >= first {
                    return Err(IndexError::invariant(format!(
                        "leaf chain is out of order at {id}"
                    )));
                }
            }
            previous = leaf.keys.last().or(previous);
            current = leaf.next;
        }

        if let Some(extra) = current {
            return Err(IndexError::invariant(format!(
                "leaf chain continues past the last leaf to {extra}"
            )));
        }
        Ok(())
    }
}
