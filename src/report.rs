//! Run narrative.
//!
//! Collects counts and diagnostic lines produced around the index so a
//! caller can decide whether and where to show them.

use std::fmt;

use crate::batch::LoadSummary;
use crate::btree::IndexStats;

/// Ordered list of report lines
#[derive(Debug, Clone, Default)]
pub struct Narrative {
    lines: Vec<String>,
}

impl Narrative {
    /// Create an empty narrative
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line
    pub fn record(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// Append the outcome of a batch load
    pub fn record_load(&mut self, source: &str, summary: &LoadSummary) -> &mut Self {
        self.record(format!(
            "{source}: {} unique keys added to the index ({} records)",
            summary.groups, summary.records
        ))
    }

    /// Append the shape of the tree
    pub fn record_stats(&mut self, stats: &IndexStats) -> &mut Self {
        self.record(format!("The index contains {} unique keys", stats.len));
        self.record(format!(
            "Tree height: {}, nodes: {} ({} leaves, {} internal), max degree: {}",
            stats.height, stats.node_count, stats.leaf_count, stats.internal_count, stats.max_degree
        ))
    }

    /// Recorded lines in order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
