//! Index contracts.
//!
//! Two families share one base:
//!
//! - [`OrderedIndex`]: chunk-local, ordered, composite-key. Answers
//!   `lower_bound`/`upper_bound` over a prefix of its key columns.
//! - [`TableIndex`]: table-wide, single column, hash-based. Answers
//!   `equals` over the chunks it covers.
//!
//! Public operations validate their input and then call the implementor
//! hooks (`lower_bound_slot`, `bucket_of`, ...). Implementors fulfil the
//! hook contracts; callers use the public operations.

use crate::error::{IndexError, IndexResult};
use crate::index::cursor::{NullPositions, Position, PositionCursor, TableCursor};
use crate::index::IndexType;
use colidx_codec::Value;
use colidx_storage::{ChunkId, ChunkOffset, ColumnId, RowId, Segment};
use std::collections::BTreeSet;
use std::fmt;
use std::mem::size_of;
use std::sync::Arc;

/// State and bookkeeping shared by every index.
pub trait AbstractIndex: fmt::Debug + Send + Sync {
    /// Position type yielded by this index.
    type Position: Position;

    /// Returns the family tag set at construction.
    fn index_type(&self) -> IndexType;

    /// Returns the positions whose indexed value is null.
    fn null_positions(&self) -> &NullPositions<Self::Position>;

    /// Returns the implementation-specific storage cost in bytes.
    ///
    /// Excludes the null list and type tag; [`memory_consumption`] adds those.
    ///
    /// [`memory_consumption`]: AbstractIndex::memory_consumption
    fn storage_memory_consumption(&self) -> usize;

    /// Cursor at the first null position.
    fn null_cbegin(&self) -> PositionCursor<'_, Self::Position> {
        PositionCursor::begin(self.null_positions().as_slice())
    }

    /// Cursor past the last null position.
    fn null_cend(&self) -> PositionCursor<'_, Self::Position> {
        PositionCursor::end(self.null_positions().as_slice())
    }

    /// Returns the total memory held by this index in bytes.
    fn memory_consumption(&self) -> usize {
        self.storage_memory_consumption()
            + self.null_positions().memory_consumption()
            + size_of::<IndexType>()
    }
}

/// A chunk-local index ordered by a composite key.
///
/// The key is the tuple of values of the indexed segments, leading column
/// first. The main range holds every non-null row, sorted lexicographically
/// by key; rows with equal keys keep ascending offset order.
pub trait OrderedIndex: AbstractIndex<Position = ChunkOffset> {
    /// Returns the indexed segments in key order.
    fn indexed_segments(&self) -> &[Arc<Segment>];

    /// Returns the main range as a flat sorted array.
    fn positions(&self) -> &[ChunkOffset];

    /// Implementor hook for [`OrderedIndex::lower_bound`].
    ///
    /// `values` is non-empty and no wider than the key. Returns the slot of
    /// the first position whose key, truncated to `values.len()` columns,
    /// is not less than `values`.
    fn lower_bound_slot(&self, values: &[Value]) -> usize;

    /// Implementor hook for [`OrderedIndex::upper_bound`].
    ///
    /// Same contract as [`OrderedIndex::lower_bound_slot`], but returns the
    /// first slot whose truncated key is greater than `values`.
    fn upper_bound_slot(&self, values: &[Value]) -> usize;

    /// Checks whether the given segments are covered by the index.
    ///
    /// True iff `segments` is a non-empty prefix of the indexed segments,
    /// compared by handle identity. An index on `(D, A, B)` serves `D`,
    /// `(D, A)` and `(D, A, B)`, but not `A`, `(D, A, B, C)` or `(B, A, D)`.
    fn is_index_for(&self, segments: &[Arc<Segment>]) -> bool {
        is_segment_prefix(segments, self.indexed_segments())
    }

    /// Returns a cursor to the first position whose key, truncated to
    /// `values.len()` columns, is greater than or equal to `values`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::PreconditionViolation`] if `values` is empty
    /// - [`IndexError::InvalidArgument`] if `values` is wider than the key
    fn lower_bound(&self, values: &[Value]) -> IndexResult<PositionCursor<'_, ChunkOffset>> {
        check_query_width(values.len(), self.indexed_segments().len())?;
        Ok(PositionCursor::at(self.positions(), self.lower_bound_slot(values)))
    }

    /// Returns a cursor to the first position whose key, truncated to
    /// `values.len()` columns, is greater than `values`.
    ///
    /// # Errors
    ///
    /// Same as [`OrderedIndex::lower_bound`].
    fn upper_bound(&self, values: &[Value]) -> IndexResult<PositionCursor<'_, ChunkOffset>> {
        check_query_width(values.len(), self.indexed_segments().len())?;
        Ok(PositionCursor::at(self.positions(), self.upper_bound_slot(values)))
    }

    /// Cursor at the first position of the main range.
    fn cbegin(&self) -> PositionCursor<'_, ChunkOffset> {
        PositionCursor::begin(self.positions())
    }

    /// Cursor past the last position of the main range.
    fn cend(&self) -> PositionCursor<'_, ChunkOffset> {
        PositionCursor::end(self.positions())
    }
}

/// A table-wide equality index over one column.
///
/// It covers a subset of the table's chunks, its coverage set. Every
/// query result is scoped to that set; callers scan the rest.
pub trait TableIndex: AbstractIndex<Position = RowId> {
    /// Returns the indexed column.
    fn indexed_column_id(&self) -> ColumnId;

    /// Returns the covered chunks in ascending order.
    fn indexed_chunk_ids(&self) -> &BTreeSet<ChunkId>;

    /// Returns the value buckets: one non-empty row list per distinct value.
    fn buckets(&self) -> &[Vec<RowId>];

    /// Implementor hook for [`TableIndex::equals`]: the bucket holding
    /// `value`, if any.
    fn bucket_of(&self, value: &Value) -> Option<usize>;

    /// True iff `column_id` is the indexed column.
    fn is_index_for(&self, column_id: ColumnId) -> bool {
        column_id == self.indexed_column_id()
    }

    /// Returns the run of row IDs whose value equals `value`.
    ///
    /// The run is complete over the covered chunks. An absent value, or
    /// `Value::Null`, yields `begin == end`.
    fn equals(&self, value: &Value) -> (TableCursor<'_>, TableCursor<'_>) {
        let buckets = self.buckets();
        match self.bucket_of(value) {
            Some(bucket) => (
                TableCursor::at_bucket(buckets, bucket),
                TableCursor::at_bucket(buckets, bucket + 1),
            ),
            None => (TableCursor::end(buckets), TableCursor::end(buckets)),
        }
    }

    /// Returns the two runs around `value`'s run.
    ///
    /// Together they hold every non-null row whose value differs from
    /// `value`. For an absent value the first run is the whole main range.
    fn not_equals(
        &self,
        value: &Value,
    ) -> (
        (TableCursor<'_>, TableCursor<'_>),
        (TableCursor<'_>, TableCursor<'_>),
    ) {
        let (begin, end) = self.equals(value);
        ((self.cbegin(), begin), (end, self.cend()))
    }

    /// Cursor at the first row of the first bucket.
    fn cbegin(&self) -> TableCursor<'_> {
        TableCursor::begin(self.buckets())
    }

    /// Cursor past the last bucket.
    fn cend(&self) -> TableCursor<'_> {
        TableCursor::end(self.buckets())
    }
}

/// Prefix test by handle identity; an empty query never matches.
pub(crate) fn is_segment_prefix(query: &[Arc<Segment>], indexed: &[Arc<Segment>]) -> bool {
    if query.is_empty() || query.len() > indexed.len() {
        return false;
    }
    query
        .iter()
        .zip(indexed)
        .all(|(q, i)| Arc::ptr_eq(q, i))
}

fn check_query_width(width: usize, key_columns: usize) -> IndexResult<()> {
    if width == 0 {
        return Err(IndexError::precondition("bound query needs at least one value"));
    }
    if width > key_columns {
        return Err(IndexError::invalid_argument(format!(
            "bound query has {width} values, index has {key_columns} key columns"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(values: &[i64]) -> Arc<Segment> {
        Arc::new(Segment::from_values(values.iter().copied()))
    }

    #[test]
    fn segment_prefix_law() {
        let d = segment(&[1]);
        let a = segment(&[2]);
        let b = segment(&[3]);
        let c = segment(&[4]);
        let indexed = vec![Arc::clone(&d), Arc::clone(&a), Arc::clone(&b)];

        assert!(is_segment_prefix(&[Arc::clone(&d)], &indexed));
        assert!(is_segment_prefix(&[Arc::clone(&d), Arc::clone(&a)], &indexed));
        assert!(is_segment_prefix(&indexed, &indexed));

        assert!(!is_segment_prefix(&[], &indexed));
        assert!(!is_segment_prefix(&[Arc::clone(&a)], &indexed));
        assert!(!is_segment_prefix(
            &[Arc::clone(&d), Arc::clone(&a), Arc::clone(&b), c],
            &indexed
        ));
        assert!(!is_segment_prefix(&[b, a, d], &indexed));
    }

    #[test]
    fn identity_not_content() {
        let d = segment(&[1, 2]);
        let twin = segment(&[1, 2]);
        assert!(!is_segment_prefix(&[twin], &[d]));
    }

    #[test]
    fn boxed_indexes_are_debug() {
        let index: Box<dyn OrderedIndex> =
            Box::new(crate::index::DenseSortedIndex::new(segment(&[2, 1])).unwrap());
        assert!(format!("{index:?}").starts_with("DenseSortedIndex"));

        let failed: IndexResult<Box<dyn OrderedIndex>> =
            Err(IndexError::precondition("an index needs at least one segment"));
        assert!(matches!(
            failed.unwrap_err(),
            IndexError::PreconditionViolation { .. }
        ));
    }

    #[test]
    fn query_width_checks() {
        assert!(check_query_width(1, 2).is_ok());
        assert!(check_query_width(2, 2).is_ok());
        assert!(matches!(
            check_query_width(0, 2),
            Err(IndexError::PreconditionViolation { .. })
        ));
        assert!(matches!(
            check_query_width(3, 2),
            Err(IndexError::InvalidArgument { .. })
        ));
    }
}
