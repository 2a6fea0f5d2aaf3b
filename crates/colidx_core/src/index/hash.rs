//! Partial hash index over a subset of a table's chunks.

use crate::error::{IndexError, IndexResult};
use crate::index::build::{check_offset_range, value_footprint};
use crate::index::cursor::NullPositions;
use crate::index::kind::MemoryEstimate;
use crate::index::traits::{AbstractIndex, TableIndex};
use crate::index::IndexType;
use colidx_codec::Value;
use colidx_storage::{Chunk, ChunkId, ColumnId, RowId, Segment};
use std::collections::{BTreeSet, HashMap};
use std::mem::size_of;
use std::sync::Arc;

/// Table-wide equality index on one column.
///
/// Only the chunks passed at build time contribute rows; that set is
/// reported by [`TableIndex::indexed_chunk_ids`]. A value that exists only
/// in uncovered chunks is not found here, so callers must scan those
/// chunks themselves.
///
/// Each distinct value owns one bucket of row IDs, ordered by chunk ID and
/// then chunk offset. Buckets are laid out in order of first appearance.
///
/// # Example
///
/// ```rust,ignore
/// let index = PartialHashIndex::new(&table.select_chunks(&[ChunkId::new(0)])?, column_id)?;
/// let (begin, end) = index.equals(&Value::from("berlin"));
/// let rows: Vec<RowId> = begin.to(end).copied().collect();
/// ```
#[derive(Debug)]
pub struct PartialHashIndex {
    column_id: ColumnId,
    chunk_ids: BTreeSet<ChunkId>,
    segments: Vec<Arc<Segment>>,
    lookup: HashMap<Value, usize>,
    buckets: Vec<Vec<RowId>>,
    row_count: usize,
    nulls: NullPositions<RowId>,
}

impl PartialHashIndex {
    /// Builds the index over column `column_id` of the given chunks.
    ///
    /// # Errors
    ///
    /// - [`IndexError::PreconditionViolation`] if `chunks` is empty
    /// - [`IndexError::InvalidArgument`] if a chunk ID appears twice or a
    ///   chunk has more rows than a chunk offset can address
    /// - [`IndexError::Storage`] if a chunk lacks the column
    pub fn new(chunks: &[(ChunkId, Arc<Chunk>)], column_id: ColumnId) -> IndexResult<Self> {
        if chunks.is_empty() {
            return Err(IndexError::precondition("an index needs at least one chunk"));
        }
        let mut ordered: Vec<&(ChunkId, Arc<Chunk>)> = chunks.iter().collect();
        ordered.sort_by_key(|(chunk_id, _)| *chunk_id);
        if let Some(pair) = ordered.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(IndexError::invalid_argument(format!(
                "chunk {} listed twice",
                pair[0].0
            )));
        }

        let mut chunk_ids = BTreeSet::new();
        let mut segments = Vec::with_capacity(ordered.len());
        let mut lookup: HashMap<Value, usize> = HashMap::new();
        let mut buckets: Vec<Vec<RowId>> = Vec::new();
        let mut nulls = Vec::new();
        let mut row_count = 0;

        for (chunk_id, chunk) in ordered {
            let segment = chunk.segment(column_id)?;
            check_offset_range(segment.len())?;
            for (offset, value) in segment.iter() {
                let row_id = RowId::new(*chunk_id, offset);
                if value.is_null() {
                    nulls.push(row_id);
                    continue;
                }
                row_count += 1;
                match lookup.get(value) {
                    Some(&bucket) => buckets[bucket].push(row_id),
                    None => {
                        lookup.insert(value.clone(), buckets.len());
                        buckets.push(vec![row_id]);
                    }
                }
            }
            chunk_ids.insert(*chunk_id);
            segments.push(Arc::clone(segment));
        }

        let index = Self {
            column_id,
            chunk_ids,
            segments,
            lookup,
            buckets,
            row_count,
            nulls: nulls.into(),
        };
        tracing::debug!(
            index_type = %IndexType::PartialHash,
            column = %index.column_id,
            chunks = index.chunk_ids.len(),
            rows = index.row_count,
            distinct = index.buckets.len(),
            nulls = index.nulls.len(),
            bytes = index.memory_consumption(),
            "built index"
        );
        Ok(index)
    }

    /// Returns the indexed segments, one per covered chunk in chunk order.
    #[must_use]
    pub fn indexed_segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    /// Returns the number of indexed non-null rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of distinct non-null values.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if `chunk_id` contributes rows to this index.
    #[must_use]
    pub fn covers(&self, chunk_id: ChunkId) -> bool {
        self.chunk_ids.contains(&chunk_id)
    }
}

/// Per-entry cost of the hash table: the stored value plus its bucket slot.
const SLOT_BYTES: usize = size_of::<usize>() + 1;

impl MemoryEstimate for PartialHashIndex {
    fn estimate_memory_consumption(row_count: usize, distinct_count: usize, value_bytes: u32) -> usize {
        let per_value = SLOT_BYTES
            .saturating_add(value_bytes as usize)
            .saturating_add(size_of::<Vec<RowId>>());
        distinct_count
            .saturating_mul(per_value)
            .saturating_add(row_count.saturating_mul(size_of::<RowId>()))
    }
}

impl AbstractIndex for PartialHashIndex {
    type Position = RowId;

    fn index_type(&self) -> IndexType {
        IndexType::PartialHash
    }

    fn null_positions(&self) -> &NullPositions<RowId> {
        &self.nulls
    }

    fn storage_memory_consumption(&self) -> usize {
        let table: usize = self
            .lookup
            .keys()
            .map(|v| SLOT_BYTES + value_footprint(v))
            .sum();
        let buckets: usize = self
            .buckets
            .iter()
            .map(|rows| size_of::<Vec<RowId>>() + rows.capacity() * size_of::<RowId>())
            .sum();
        let chunks = self.chunk_ids.len() * size_of::<ChunkId>()
            + self.segments.len() * size_of::<Arc<Segment>>();
        table + buckets + chunks
    }
}

impl TableIndex for PartialHashIndex {
    fn indexed_column_id(&self) -> ColumnId {
        self.column_id
    }

    fn indexed_chunk_ids(&self) -> &BTreeSet<ChunkId> {
        &self.chunk_ids
    }

    fn buckets(&self) -> &[Vec<RowId>] {
        &self.buckets
    }

    fn bucket_of(&self, value: &Value) -> Option<usize> {
        self.lookup.get(value).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cursor::IndexCursor;
    use colidx_storage::{ChunkOffset, Table};

    fn chunk<T: Into<Value>>(values: Vec<T>) -> Arc<Chunk> {
        Arc::new(Chunk::from_segments(vec![Segment::from_values(values)]).unwrap())
    }

    fn row(chunk: u32, offset: u32) -> RowId {
        RowId::new(ChunkId::new(chunk), ChunkOffset::new(offset))
    }

    fn rows_equal(index: &PartialHashIndex, value: impl Into<Value>) -> Vec<RowId> {
        let (begin, end) = index.equals(&value.into());
        begin.to(end).copied().collect()
    }

    #[test]
    fn equals_scoped_to_covered_chunks() {
        let table = Table::new(1);
        for values in [vec!["a", "b", "a"], vec!["c", "a"]] {
            let chunk = Chunk::from_segments(vec![Segment::from_values(values)]).unwrap();
            table.append_chunk(chunk).unwrap();
        }
        let covered = table.select_chunks(&[ChunkId::new(0)]).unwrap();
        let index = PartialHashIndex::new(&covered, ColumnId::new(0)).unwrap();

        assert_eq!(
            index.indexed_chunk_ids().iter().copied().collect::<Vec<_>>(),
            vec![ChunkId::new(0)]
        );
        assert!(rows_equal(&index, "c").is_empty());
        assert_eq!(rows_equal(&index, "a"), vec![row(0, 0), row(0, 2)]);
        assert!(!index.covers(ChunkId::new(1)));
    }

    #[test]
    fn runs_span_chunks_in_chunk_order() {
        let index = PartialHashIndex::new(
            &[
                (ChunkId::new(2), chunk(vec![7, 8])),
                (ChunkId::new(0), chunk(vec![8, 7, 7])),
            ],
            ColumnId::new(0),
        )
        .unwrap();
        assert_eq!(rows_equal(&index, 7), vec![row(0, 1), row(0, 2), row(2, 0)]);
        assert_eq!(rows_equal(&index, 8), vec![row(0, 0), row(2, 1)]);
        assert_eq!(index.row_count(), 5);
        assert_eq!(index.indexed_segments().len(), 2);

        let all: Vec<RowId> = index.cbegin().to(index.cend()).copied().collect();
        assert_eq!(all, vec![row(0, 0), row(2, 1), row(0, 1), row(0, 2), row(2, 0)]);
    }

    #[test]
    fn nulls_never_match() {
        let index = PartialHashIndex::new(
            &[(ChunkId::new(0), chunk(vec![Some(1), None, Some(1)]))],
            ColumnId::new(0),
        )
        .unwrap();
        let nulls: Vec<RowId> = index.null_cbegin().to(index.null_cend()).copied().collect();
        assert_eq!(nulls, vec![row(0, 1)]);
        let (begin, end) = index.equals(&Value::Null);
        assert_eq!(begin, end);
        assert_eq!(rows_equal(&index, 1), vec![row(0, 0), row(0, 2)]);
    }

    #[test]
    fn not_equals_surrounds_the_run() {
        let index = PartialHashIndex::new(
            &[(ChunkId::new(0), chunk(vec![1, 2, 3, 2]))],
            ColumnId::new(0),
        )
        .unwrap();
        let ((b1, e1), (b2, e2)) = index.not_equals(&Value::Integer(2));
        let mut others: Vec<RowId> = b1.to(e1).chain(b2.to(e2)).copied().collect();
        others.sort();
        assert_eq!(others, vec![row(0, 0), row(0, 2)]);

        let ((b1, e1), (b2, e2)) = index.not_equals(&Value::Integer(9));
        assert_eq!(b1.to(e1).count(), 4);
        assert_eq!(b2, e2);
    }

    #[test]
    fn column_checks() {
        let index =
            PartialHashIndex::new(&[(ChunkId::new(0), chunk(vec![1]))], ColumnId::new(0)).unwrap();
        assert!(index.is_index_for(ColumnId::new(0)));
        assert!(!index.is_index_for(ColumnId::new(1)));

        let err = PartialHashIndex::new(&[(ChunkId::new(0), chunk(vec![1]))], ColumnId::new(3))
            .unwrap_err();
        assert!(matches!(err, IndexError::Storage(_)));
    }

    #[test]
    fn duplicate_chunks_rejected() {
        let shared = chunk(vec![1]);
        let err = PartialHashIndex::new(
            &[
                (ChunkId::new(4), Arc::clone(&shared)),
                (ChunkId::new(4), shared),
            ],
            ColumnId::new(0),
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::InvalidArgument { .. }));
    }

    #[test]
    fn zero_chunks_rejected() {
        let err = PartialHashIndex::new(&[], ColumnId::new(0)).unwrap_err();
        assert!(matches!(err, IndexError::PreconditionViolation { .. }));
    }

    #[test]
    fn chunk_without_non_null_rows() {
        let index = PartialHashIndex::new(
            &[(ChunkId::new(0), chunk(vec![Value::Null, Value::Null]))],
            ColumnId::new(0),
        )
        .unwrap();
        assert_eq!(index.indexed_chunk_ids().len(), 1);
        assert_eq!(index.cbegin(), index.cend());
        assert_eq!(index.null_positions().len(), 2);
        assert!(rows_equal(&index, 1).is_empty());
    }

    #[test]
    fn estimate_and_measure() {
        let index = PartialHashIndex::new(
            &[(ChunkId::new(0), chunk((0..32).collect::<Vec<i64>>()))],
            ColumnId::new(0),
        )
        .unwrap();
        assert!(index.memory_consumption() >= 32 * size_of::<RowId>());
        assert!(
            PartialHashIndex::estimate_memory_consumption(10, 2, 8)
                < PartialHashIndex::estimate_memory_consumption(10, 3, 8)
        );
    }
}
