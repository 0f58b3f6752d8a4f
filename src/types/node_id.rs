//! Node handle type.

use std::fmt;

/// Handle of a node in the tree's node arena.
///
/// Handles are 0-indexed positions in the arena. Nodes are never removed,
/// so a handle stays valid for the lifetime of the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node handle
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw handle value
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Position of this node in the arena
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Handle for the arena slot at `index`
    pub(crate) fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index).unwrap_or_else(|_| {
            panic!("node arena exceeded {} nodes", u32::MAX)
        });
        Self(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
