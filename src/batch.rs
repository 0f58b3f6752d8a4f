//! Batch loading at the index boundary.
//!
//! The tree rejects duplicate keys instead of merging them, so records that
//! share an identifier are grouped here first and each group is inserted as a
//! single value. A key that reappears in a later batch is still rejected by
//! the tree.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::str::FromStr;

use tracing::debug;

use crate::btree::BPlusTree;
use crate::error::Result;

/// Counts from one batch load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Number of distinct keys inserted
    pub groups: usize,
    /// Number of records across all inserted groups
    pub records: usize,
}

/// Group records by key, keeping each key's records in input order
pub fn group_by_key<K, R, I>(records: I) -> BTreeMap<K, Vec<R>>
where
    K: Ord,
    I: IntoIterator<Item = (K, R)>,
{
    let mut groups: BTreeMap<K, Vec<R>> = BTreeMap::new();
    for (key, record) in records {
        groups.entry(key).or_default().push(record);
    }
    groups
}

/// Insert every group as one entry.
///
/// Stops at the first key already present in the tree and returns
/// [`IndexError::DuplicateKey`](crate::IndexError::DuplicateKey); groups
/// inserted before it remain in the tree.
pub fn load_groups<K, R>(
    tree: &mut BPlusTree<K, Vec<R>>,
    groups: BTreeMap<K, Vec<R>>,
) -> Result<LoadSummary>
where
    K: Ord + Clone,
{
    let mut summary = LoadSummary::default();
    for (key, records) in groups {
        let count = records.len();
        tree.insert(key, records)?;
        summary.groups += 1;
        summary.records += count;
    }
    debug!(groups = summary.groups, records = summary.records, "batch loaded");
    Ok(summary)
}

/// Group `records` by key and load them into `tree`
pub fn load_records<K, R, I>(tree: &mut BPlusTree<K, Vec<R>>, records: I) -> Result<LoadSummary>
where
    K: Ord + Clone,
    I: IntoIterator<Item = (K, R)>,
{
    load_groups(tree, group_by_key(records))
}

/// Read `id,payload` lines.
///
/// Lines whose first field does not parse as a key (a header row, blank
/// lines) are skipped. The payload is everything after the first comma.
pub fn read_records<K, B>(reader: B) -> Result<Vec<(K, String)>>
where
    K: FromStr,
    B: BufRead,
{
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let (id, payload) = line.split_once(',').unwrap_or((line.as_str(), ""));
        if let Ok(key) = id.trim().parse::<K>() {
            records.push((key, payload.to_string()));
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use std::io::Cursor;

    #[test]
    fn test_group_by_key_keeps_record_order() {
        let groups = group_by_key(vec![(2, "b1"), (1, "a1"), (2, "b2"), (3, "c1"), (2, "b3")]);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&2], vec!["b1", "b2", "b3"]);
        assert_eq!(groups[&1], vec!["a1"]);
    }

    #[test]
    fn test_load_records() {
        let mut tree = BPlusTree::new(3).unwrap();
        let summary =
            load_records(&mut tree, vec![(5, "x"), (1, "y"), (5, "z"), (9, "w")]).unwrap();

        assert_eq!(summary, LoadSummary { groups: 3, records: 4 });
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.search(&5), Some(&vec!["x", "z"]));
        tree.validate().unwrap();
    }

    #[test]
    fn test_second_batch_with_known_key_is_rejected() {
        let mut tree = BPlusTree::new(4).unwrap();
        load_records(&mut tree, vec![(1, "a"), (2, "b")]).unwrap();

        let err = load_records(&mut tree, vec![(0, "new"), (2, "again"), (3, "later")]);
        assert!(matches!(err, Err(IndexError::DuplicateKey)));

        // 0 sorts before 2 and was inserted; the original group for 2 is intact
        assert_eq!(tree.search(&0), Some(&vec!["new"]));
        assert_eq!(tree.search(&2), Some(&vec!["b"]));
        assert_eq!(tree.search(&3), None);
    }

    #[test]
    fn test_read_records_skips_unparseable_lines() {
        let input = "VAERS_ID,STATE,AGE\n101,CA,34\n\n102,NY,\nnot-a-number,x\n103\n";
        let records: Vec<(i64, String)> = read_records(Cursor::new(input)).unwrap();
        assert_eq!(
            records,
            vec![
                (101, "CA,34".to_string()),
                (102, "NY,".to_string()),
                (103, String::new()),
            ]
        );
    }
}
