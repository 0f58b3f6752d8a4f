//! # B+ Tree Index
//!
//! An in-memory B+ tree index for insert-only workloads keyed by any ordered type.
//!
//! ## Architecture
//!
//! - **B+ tree** (`btree`): Node arena, split propagation, leaf-chain scans, diagnostics
//! - **Batch loading** (`batch`): Groups records by key before they reach the tree
//! - **Reporting** (`report`): Collects counts and diagnostic lines for the caller
//!
//! ## Usage
//!
//! ```rust
//! use bplus_index::{BPlusTree, IndexError};
//!
//! let mut tree = BPlusTree::new(4)?;
//!
//! for key in [10, 20, 5, 6, 12, 30, 7, 17] {
//!     tree.insert(key, format!("record {key}"))?;
//! }
//!
//! // Point lookup; a miss is `None`
//! assert_eq!(tree.search(&12).map(String::as_str), Some("record 12"));
//! assert_eq!(tree.search(&11), None);
//!
//! // Duplicate keys are rejected
//! assert!(matches!(tree.insert(12, "again".into()), Err(IndexError::DuplicateKey)));
//!
//! // Ascending scan over the leaf chain
//! let keys: Vec<i32> = tree.keys().copied().collect();
//! assert_eq!(keys, vec![5, 6, 7, 10, 12, 17, 20, 30]);
//!
//! // Indented diagram
//! print!("{}", tree.to_diagram());
//! # Ok::<(), IndexError>(())
//! ```

pub mod batch;
pub mod btree;
pub mod error;
pub mod report;
pub mod types;

pub use error::{IndexError, Result};
pub use types::{IndexConfig, NodeId, DEFAULT_MAX_DEGREE, MIN_DEGREE};

// Re-export main public API
pub use batch::{group_by_key, load_groups, load_records, LoadSummary};
pub use btree::{BPlusTree, IndexStats, Iter, Keys, Range, TreeNode, Values};
pub use report::Narrative;
