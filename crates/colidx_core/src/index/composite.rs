//! Composite (multi-column) dense sorted index.

use crate::error::{IndexError, IndexResult};
use crate::index::build::{offsets_bytes, value_footprint, SortedRows};
use crate::index::cursor::NullPositions;
use crate::index::kind::MemoryEstimate;
use crate::index::traits::{AbstractIndex, OrderedIndex};
use crate::index::IndexType;
use colidx_codec::Value;
use colidx_storage::{ChunkOffset, Segment};
use std::cmp::Ordering;
use std::mem::size_of;
use std::sync::Arc;

/// Dense sorted index over a tuple of segments.
///
/// Keys compare lexicographically, leading segment first. A query with
/// fewer values than key columns compares only that prefix, so an index on
/// `(D, A)` answers bounds on `D` alone as well as on `(D, A)`.
///
/// A row whose key has a null in any column is a null row.
#[derive(Debug)]
pub struct CompositeSortedIndex {
    segments: Vec<Arc<Segment>>,
    keys: Vec<Box<[Value]>>,
    run_starts: Vec<u32>,
    positions: Vec<ChunkOffset>,
    nulls: NullPositions<ChunkOffset>,
}

impl CompositeSortedIndex {
    /// Builds the index over `segments`, leading key column first.
    ///
    /// # Errors
    ///
    /// - [`IndexError::PreconditionViolation`] if `segments` is empty
    /// - [`IndexError::InvalidArgument`] if the segments differ in length
    pub fn new(segments: Vec<Arc<Segment>>) -> IndexResult<Self> {
        let rows = SortedRows::build(&segments)?;

        let keys: Vec<Box<[Value]>> = rows
            .representatives()
            .map(|(row, _)| segments.iter().map(|s| s.values()[row].clone()).collect())
            .collect();
        let mut run_starts = rows.run_starts;
        run_starts.push(rows.positions.len() as u32);

        let index = Self {
            segments,
            keys,
            run_starts,
            positions: rows.positions,
            nulls: rows.nulls.into(),
        };
        tracing::debug!(
            index_type = %IndexType::CompositeDenseSorted,
            key_columns = index.segments.len(),
            rows = index.positions.len(),
            distinct = index.keys.len(),
            nulls = index.nulls.len(),
            bytes = index.memory_consumption(),
            "built index"
        );
        Ok(index)
    }

    /// Builds the index, refusing keys wider than `max_key_columns`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidArgument`] for too many key columns, plus
    /// everything [`CompositeSortedIndex::new`] returns.
    pub fn with_max_key_columns(segments: Vec<Arc<Segment>>, max_key_columns: usize) -> IndexResult<Self> {
        if segments.len() > max_key_columns {
            return Err(IndexError::invalid_argument(format!(
                "{} key columns exceed the limit of {max_key_columns}",
                segments.len()
            )));
        }
        Self::new(segments)
    }

    /// Returns the number of key columns.
    #[must_use]
    pub fn key_columns(&self) -> usize {
        self.segments.len()
    }

    /// Returns the number of distinct non-null keys.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.keys.len()
    }

    fn slot(&self, values: &[Value], strict: bool) -> usize {
        let run = self.keys.partition_point(|key| {
            let order = compare_prefix(key, values);
            if strict {
                order != Ordering::Greater
            } else {
                order == Ordering::Less
            }
        });
        self.run_starts[run] as usize
    }
}

/// Compares `key` truncated to `prefix.len()` columns against `prefix`.
fn compare_prefix(key: &[Value], prefix: &[Value]) -> Ordering {
    key.iter()
        .zip(prefix)
        .map(|(k, p)| k.cmp(p))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl MemoryEstimate for CompositeSortedIndex {
    /// `value_bytes` is the width of the whole key.
    fn estimate_memory_consumption(row_count: usize, distinct_count: usize, value_bytes: u32) -> usize {
        let slots = row_count.saturating_add(distinct_count).saturating_add(1);
        let per_key = (value_bytes as usize).saturating_add(size_of::<Box<[Value]>>());
        offsets_bytes(slots).saturating_add(distinct_count.saturating_mul(per_key))
    }
}

impl AbstractIndex for CompositeSortedIndex {
    type Position = ChunkOffset;

    fn index_type(&self) -> IndexType {
        IndexType::CompositeDenseSorted
    }

    fn null_positions(&self) -> &NullPositions<ChunkOffset> {
        &self.nulls
    }

    fn storage_memory_consumption(&self) -> usize {
        let keys: usize = self
            .keys
            .iter()
            .map(|key| size_of::<Box<[Value]>>() + key.iter().map(value_footprint).sum::<usize>())
            .sum();
        offsets_bytes(self.positions.len()) + self.run_starts.len() * size_of::<u32>() + keys
    }
}

impl OrderedIndex for CompositeSortedIndex {
    fn indexed_segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    fn positions(&self) -> &[ChunkOffset] {
        &self.positions
    }

    fn lower_bound_slot(&self, values: &[Value]) -> usize {
        self.slot(values, false)
    }

    fn upper_bound_slot(&self, values: &[Value]) -> usize {
        self.slot(values, true)
    }
}
