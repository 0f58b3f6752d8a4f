//! Common types used throughout the index.

mod node_id;

pub use node_id::NodeId;

use serde::{Deserialize, Serialize};

/// Smallest maximum degree a tree accepts.
///
/// With fewer than three keys per node a split could leave one half empty.
pub const MIN_DEGREE: usize = 3;

/// Default maximum keys per node (small enough for readable diagrams)
pub const DEFAULT_MAX_DEGREE: usize = 4;

/// Index configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    /// A node holding this many keys is split
    pub max_degree: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_degree: DEFAULT_MAX_DEGREE,
        }
    }
}

impl IndexConfig {
    /// Create a config with a custom maximum degree.
    ///
    /// The value is checked when a tree is built from the config.
    pub fn new(max_degree: usize) -> Self {
        Self { max_degree }
    }

    /// Set the maximum degree
    pub fn max_degree(mut self, max_degree: usize) -> Self {
        self.max_degree = max_degree;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.max_degree, DEFAULT_MAX_DEGREE);
        assert_eq!(IndexConfig::new(2).max_degree, 2);
        assert_eq!(IndexConfig::default().max_degree(9).max_degree, 9);
    }

    #[test]
    fn test_config_serde() {
        let json = serde_json::to_string(&IndexConfig::new(5)).unwrap();
        assert_eq!(json, r#"{"maxDegree":5}"#);

        let config: IndexConfig = serde_json::from_str(r#"{"maxDegree":7}"#).unwrap();
        assert_eq!(config, IndexConfig::new(7));
    }
}
