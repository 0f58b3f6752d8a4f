//! B+ tree implementation.
//!
//! This module provides an in-memory B+ tree that supports:
//! - Insertions with split propagation (duplicates are rejected)
//! - Point lookups (search)
//! - Ordered scans over the leaf chain (iter, range)
//! - Diagnostics (diagram, snapshot, trace, validate)

mod iter;
mod node;
mod tree;
mod validate;
mod visualize;

pub use iter::{Iter, Keys, Range, Values};
pub use tree::{BPlusTree, IndexStats};
pub use visualize::TreeNode;
