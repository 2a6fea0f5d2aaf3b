//! Descriptors of registered table indexes.

use crate::index::IndexType;
use colidx_storage::ColumnId;
use serde::{Deserialize, Serialize};

/// Describes one table index: its columns, name and type.
///
/// Planners look these up to find an index for a predicate column without
/// touching the index itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableIndexStatistics {
    /// Indexed columns, leading column first.
    pub column_ids: Vec<ColumnId>,
    /// Unique index name within its table.
    pub name: String,
    /// Index family.
    pub index_type: IndexType,
}

impl TableIndexStatistics {
    /// Creates a descriptor.
    pub fn new(column_ids: Vec<ColumnId>, name: impl Into<String>, index_type: IndexType) -> Self {
        Self {
            column_ids,
            name: name.into(),
            index_type,
        }
    }

    /// Returns true if `column_id` is one of the indexed columns.
    #[must_use]
    pub fn covers_column(&self, column_id: ColumnId) -> bool {
        self.column_ids.contains(&column_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_and_hash_use_all_fields() {
        let a = TableIndexStatistics::new(vec![ColumnId::new(1)], "by_city", IndexType::PartialHash);
        let b = a.clone();
        let c = TableIndexStatistics::new(vec![ColumnId::new(2)], "by_city", IndexType::PartialHash);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<TableIndexStatistics> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serde_round_trip() {
        let stats = TableIndexStatistics::new(
            vec![ColumnId::new(0), ColumnId::new(3)],
            "composite",
            IndexType::CompositeDenseSorted,
        );
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"composite-dense-sorted\""));
        let back: TableIndexStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
        assert!(back.covers_column(ColumnId::new(3)));
    }
}
