//! Diagnostic views of a tree: an indented text diagram, a serializable
//! snapshot, and a descent trace. None of them modify the tree.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::node::Node;
use super::BPlusTree;
use crate::error::Result;
use crate::types::NodeId;

/// Node type for visualization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Arena handle of the node
    pub node_id: u32,
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Keys in this node
    pub keys: Vec<String>,
    /// Next leaf handle (only for leaf nodes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<u32>,
    /// Child nodes (only for internal nodes)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

const BRANCH: &str = "├── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";

impl<K: fmt::Display, V> BPlusTree<K, V> {
    /// Write an indented pre-order diagram of the tree to `sink`.
    ///
    /// Each node is one line listing its keys; children are indented one
    /// level below their parent.
    pub fn write_diagram<W: fmt::Write>(&self, sink: &mut W) -> fmt::Result {
        self.write_node(sink, self.root, "")
    }

    fn write_node<W: fmt::Write>(&self, sink: &mut W, id: NodeId, prefix: &str) -> fmt::Result {
        let node = self.node(id);

        sink.write_str(prefix)?;
        sink.write_str(BRANCH)?;
        for (i, key) in node.keys().iter().enumerate() {
            if i > 0 {
                sink.write_str(", ")?;
            }
            write!(sink, "{key}")?;
        }
        sink.write_char('\n')?;

        if let Node::Internal(internal) = node {
            let last = internal.children.len() - 1;
            for (i, &child) in internal.children.iter().enumerate() {
                let child_prefix = format!("{prefix}{}", if i == last { BLANK } else { PIPE });
                self.write_node(sink, child, &child_prefix)?;
            }
        }
        Ok(())
    }

    /// Render the diagram into a string
    pub fn to_diagram(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_diagram(&mut out);
        out
    }

    /// Write the diagram to `path`, replacing any existing file
    pub fn write_diagram_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_diagram())?;
        Ok(())
    }

    /// Export the tree structure for visualization
    pub fn snapshot(&self) -> TreeNode {
        self.snapshot_node(self.root)
    }

    fn snapshot_node(&self, id: NodeId) -> TreeNode {
        let node = self.node(id);
        let keys = node.keys().iter().map(ToString::to_string).collect();

        match node {
            Node::Leaf(leaf) => TreeNode {
                node_id: id.value(),
                is_leaf: true,
                keys,
                next: leaf.next.map(NodeId::value),
                children: Vec::new(),
            },
            Node::Internal(internal) => TreeNode {
                node_id: id.value(),
                is_leaf: false,
                keys,
                next: None,
                children: internal
                    .children
                    .iter()
                    .map(|&child| self.snapshot_node(child))
                    .collect(),
            },
        }
    }

    /// Serialize the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

impl<K: Ord + fmt::Display, V> BPlusTree<K, V> {
    /// Debug search - traces the path through the tree
    pub fn trace_search(&self, key: &K) -> Vec<String> {
        let mut trace = Vec::new();
        trace.push(format!("Searching for key: {key}"));
        trace.push(format!("Root: {}, Height: {}", self.root, self.height()));

        let mut current = self.root;
        loop {
            match self.node(current) {
                Node::Internal(internal) => {
                    let slot = internal.child_slot(key);
                    let child = internal.children[slot];
                    trace.push(format!(
                        "  Node {current}: internal, keys=[{}]",
                        join(&internal.keys)
                    ));
                    trace.push(format!("  -> Descending to child {slot} ({child})"));
                    current = child;
                }
                Node::Leaf(leaf) => {
                    trace.push(format!("  Node {current}: leaf, keys=[{}]", join(&leaf.keys)));
                    match leaf.keys.binary_search(key) {
                        Ok(idx) => trace.push(format!("  FOUND at index {idx}")),
                        Err(_) => trace.push("  NOT FOUND in leaf".to_string()),
                    }
                    return trace;
                }
            }
        }
    }
}

fn join<K: fmt::Display>(keys: &[K]) -> String {
    let mut out = String::new();
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{key}");
    }
    out
}
