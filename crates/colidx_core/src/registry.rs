//! Per-table registry of table-wide indexes.

use crate::config::IndexConfig;
use crate::error::{IndexError, IndexResult};
use crate::index::{
    estimate_memory_consumption, IndexType, PartialHashIndex, TableIndex, TableIndexStatistics,
};
use colidx_codec::Value;
use colidx_storage::{ChunkId, ColumnId, Table};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

struct RegisteredIndex {
    statistics: TableIndexStatistics,
    index: Arc<PartialHashIndex>,
}

/// The table indexes of one table, with their statistics.
///
/// Indexes are kept in creation order. A registered index is immutable and
/// shared; dropping it from the registry does not invalidate handles that
/// callers already hold.
///
/// # Thread Safety
///
/// The registry is `Send + Sync`. Lookups take a read lock, creation and
/// dropping take a write lock only to publish the change. Builds run
/// without holding any lock.
pub struct TableIndexRegistry {
    config: IndexConfig,
    indexes: RwLock<Vec<RegisteredIndex>>,
}

impl TableIndexRegistry {
    /// Creates an empty registry with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Creates an empty registry with the given configuration.
    #[must_use]
    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            config,
            indexes: RwLock::new(Vec::new()),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Builds a partial hash index on `column_id` over `chunk_ids` of `table`
    /// and registers it under `name`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::PreconditionViolation`] if `chunk_ids` is empty
    /// - [`IndexError::InvalidArgument`] if `name` is already taken or a chunk
    ///   ID repeats
    /// - [`IndexError::Storage`] if a chunk or the column does not exist
    /// - [`IndexError::BudgetExceeded`] if the estimate exceeds the budget
    pub fn create_partial_hash_index(
        &self,
        table: &Table,
        column_id: ColumnId,
        chunk_ids: &[ChunkId],
        name: &str,
    ) -> IndexResult<Arc<PartialHashIndex>> {
        self.check_name_free(name)?;
        if chunk_ids.is_empty() {
            return Err(IndexError::precondition("an index needs at least one chunk"));
        }

        let chunks = table.select_chunks(chunk_ids)?;

        if let Some(budget) = self.config.memory_budget {
            let mut rows = 0;
            let mut widest = 0;
            let mut distinct: HashSet<&Value> = HashSet::new();
            for (_, chunk) in &chunks {
                let segment = chunk.segment(column_id)?;
                rows += segment.len() - segment.null_count();
                widest = widest.max(segment.max_value_width());
                distinct.extend(segment.values().iter().filter(|v| !v.is_null()));
            }
            let value_bytes = u32::try_from(widest).unwrap_or(u32::MAX);
            let estimated =
                estimate_memory_consumption(IndexType::PartialHash, rows, distinct.len(), value_bytes)?;
            if estimated > budget {
                warn!(
                    index = name,
                    estimated,
                    budget,
                    "index build refused: over memory budget"
                );
                return Err(IndexError::BudgetExceeded {
                    index_type: IndexType::PartialHash,
                    estimated,
                    budget,
                });
            }
        }

        let index = Arc::new(PartialHashIndex::new(&chunks, column_id)?);

        let mut indexes = self.indexes.write();
        if indexes.iter().any(|entry| entry.statistics.name == name) {
            return Err(duplicate_name(name));
        }
        indexes.push(RegisteredIndex {
            statistics: TableIndexStatistics::new(vec![column_id], name, IndexType::PartialHash),
            index: Arc::clone(&index),
        });
        debug!(
            index = name,
            column = %column_id,
            chunks = index.indexed_chunk_ids().len(),
            "registered table index"
        );
        Ok(index)
    }

    /// Returns the statistics of every registered index, in creation order.
    #[must_use]
    pub fn statistics(&self) -> Vec<TableIndexStatistics> {
        self.indexes
            .read()
            .iter()
            .map(|entry| entry.statistics.clone())
            .collect()
    }

    /// Returns every index on `column_id`, in creation order.
    #[must_use]
    pub fn indexes_for_column(&self, column_id: ColumnId) -> Vec<Arc<PartialHashIndex>> {
        self.indexes
            .read()
            .iter()
            .filter(|entry| entry.statistics.covers_column(column_id))
            .map(|entry| Arc::clone(&entry.index))
            .collect()
    }

    /// Returns the index registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<PartialHashIndex>> {
        self.indexes
            .read()
            .iter()
            .find(|entry| entry.statistics.name == name)
            .map(|entry| Arc::clone(&entry.index))
    }

    /// Removes the index registered under `name`.
    ///
    /// Returns false if there is no such index.
    pub fn drop_index(&self, name: &str) -> bool {
        let mut indexes = self.indexes.write();
        let Some(position) = indexes.iter().position(|entry| entry.statistics.name == name) else {
            return false;
        };
        indexes.remove(position);
        debug!(index = name, "dropped table index");
        true
    }

    /// Returns the number of registered indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.read().len()
    }

    /// Returns true if no index is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.read().is_empty()
    }

    fn check_name_free(&self, name: &str) -> IndexResult<()> {
        if self.indexes.read().iter().any(|entry| entry.statistics.name == name) {
            return Err(duplicate_name(name));
        }
        Ok(())
    }
}

impl Default for TableIndexRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate_name(name: &str) -> IndexError {
    IndexError::invalid_argument(format!("index {name:?} already exists"))
}
