//! Dense sorted index over one segment.

use crate::error::IndexResult;
use crate::index::build::{offsets_bytes, value_footprint, SortedRows};
use crate::index::cursor::NullPositions;
use crate::index::kind::MemoryEstimate;
use crate::index::traits::{AbstractIndex, OrderedIndex};
use crate::index::IndexType;
use colidx_codec::Value;
use colidx_storage::{ChunkOffset, Segment};
use std::mem::size_of;
use std::sync::Arc;

/// Sorted distinct values plus the sorted offset array.
///
/// `values[i]` is the key of the run `run_starts[i]..run_starts[i + 1]` of
/// the position array. Bounds are a binary search over `values`.
///
/// # Example
///
/// ```rust,ignore
/// let index = DenseSortedIndex::new(segment)?;
/// let begin = index.lower_bound(&[Value::Integer(20)])?;
/// let end = index.upper_bound(&[Value::Integer(20)])?;
/// for offset in begin.to(end) { /* rows equal to 20 */ }
/// ```
#[derive(Debug)]
pub struct DenseSortedIndex {
    segment: [Arc<Segment>; 1],
    values: Vec<Value>,
    /// One entry per distinct value, plus the final end slot.
    run_starts: Vec<u32>,
    positions: Vec<ChunkOffset>,
    nulls: NullPositions<ChunkOffset>,
}

impl DenseSortedIndex {
    /// Builds the index over `segment`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::InvalidArgument`] if the segment has more
    /// rows than chunk offsets can address.
    pub fn new(segment: Arc<Segment>) -> IndexResult<Self> {
        let segment = [segment];
        let rows = SortedRows::build(&segment)?;

        let values: Vec<Value> = rows
            .representatives()
            .map(|(row, _)| segment[0].values()[row].clone())
            .collect();
        let mut run_starts = rows.run_starts;
        run_starts.push(rows.positions.len() as u32);

        let index = Self {
            segment,
            values,
            run_starts,
            positions: rows.positions,
            nulls: rows.nulls.into(),
        };
        tracing::debug!(
            index_type = %IndexType::DenseSorted,
            rows = index.positions.len(),
            distinct = index.values.len(),
            nulls = index.nulls.len(),
            bytes = index.memory_consumption(),
            "built index"
        );
        Ok(index)
    }

    /// Returns the number of distinct non-null values.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.values.len()
    }

    fn slot(&self, value: &Value, strict: bool) -> usize {
        let run = if strict {
            self.values.partition_point(|v| v <= value)
        } else {
            self.values.partition_point(|v| v < value)
        };
        self.run_starts[run] as usize
    }
}

impl MemoryEstimate for DenseSortedIndex {
    fn estimate_memory_consumption(row_count: usize, distinct_count: usize, value_bytes: u32) -> usize {
        let slots = row_count.saturating_add(distinct_count).saturating_add(1);
        offsets_bytes(slots).saturating_add(distinct_count.saturating_mul(value_bytes as usize))
    }
}

impl AbstractIndex for DenseSortedIndex {
    type Position = ChunkOffset;

    fn index_type(&self) -> IndexType {
        IndexType::DenseSorted
    }

    fn null_positions(&self) -> &NullPositions<ChunkOffset> {
        &self.nulls
    }

    fn storage_memory_consumption(&self) -> usize {
        let values: usize = self.values.iter().map(value_footprint).sum();
        offsets_bytes(self.positions.len()) + self.run_starts.len() * size_of::<u32>() + values
    }
}

impl OrderedIndex for DenseSortedIndex {
    fn indexed_segments(&self) -> &[Arc<Segment>] {
        &self.segment
    }

    fn positions(&self) -> &[ChunkOffset] {
        &self.positions
    }

    fn lower_bound_slot(&self, values: &[Value]) -> usize {
        self.slot(&values[0], false)
    }

    fn upper_bound_slot(&self, values: &[Value]) -> usize {
        self.slot(&values[0], true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::index::cursor::{IndexCursor, PositionCursor};

    fn index_over<T: Into<Value>>(values: Vec<T>) -> DenseSortedIndex {
        DenseSortedIndex::new(Arc::new(Segment::from_values(values))).unwrap()
    }

    fn offset_at(cursor: PositionCursor<'_, ChunkOffset>) -> Option<u32> {
        cursor.get().map(|o| o.as_u32())
    }

    #[test]
    fn bounds_on_sorted_values() {
        let index = index_over(vec![10, 20, 20, 30]);
        let lower = index.lower_bound(&[Value::Integer(20)]).unwrap();
        let upper = index.upper_bound(&[Value::Integer(20)]).unwrap();
        assert_eq!(offset_at(lower), Some(1));
        assert_eq!(offset_at(upper), Some(3));
        assert_eq!(lower.distance_to(&upper), 2);

        let missing = index.lower_bound(&[Value::Integer(25)]).unwrap();
        assert_eq!(offset_at(missing), Some(3));
    }

    #[test]
    fn bounds_past_the_end() {
        let index = index_over(vec![10, 20]);
        assert_eq!(index.lower_bound(&[Value::Integer(99)]).unwrap(), index.cend());
        assert_eq!(index.upper_bound(&[Value::Integer(20)]).unwrap(), index.cend());
        assert_eq!(index.lower_bound(&[Value::Integer(-5)]).unwrap(), index.cbegin());
    }

    #[test]
    fn main_range_is_sorted_with_stable_ties() {
        let index = index_over(vec![3, 1, 3, 2, 1]);
        let walked: Vec<u32> = index.cbegin().to(index.cend()).map(|o| o.as_u32()).collect();
        assert_eq!(walked, vec![1, 4, 3, 0, 2]);
        assert_eq!(index.distinct_count(), 3);
    }

    #[test]
    fn nulls_are_kept_apart() {
        let index = index_over(vec![Some(5), Some(7), None, Some(5)]);
        let nulls: Vec<u32> = index.null_cbegin().to(index.null_cend()).map(|o| o.as_u32()).collect();
        assert_eq!(nulls, vec![2]);
        let main: Vec<u32> = index.cbegin().to(index.cend()).map(|o| o.as_u32()).collect();
        assert_eq!(main, vec![0, 3, 1]);
    }

    #[test]
    fn empty_segment() {
        let index = index_over(Vec::<i64>::new());
        assert_eq!(index.cbegin(), index.cend());
        assert_eq!(index.null_cbegin(), index.null_cend());
        assert_eq!(index.lower_bound(&[Value::Integer(1)]).unwrap(), index.cend());
    }

    #[test]
    fn query_width_is_checked() {
        let index = index_over(vec![1]);
        assert!(matches!(
            index.lower_bound(&[]),
            Err(IndexError::PreconditionViolation { .. })
        ));
        assert!(matches!(
            index.upper_bound(&[Value::Integer(1), Value::Integer(2)]),
            Err(IndexError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn is_index_for_its_segment_only() {
        let segment = Arc::new(Segment::from_values([1, 2]));
        let index = DenseSortedIndex::new(Arc::clone(&segment)).unwrap();
        assert!(index.is_index_for(&[Arc::clone(&segment)]));
        assert!(!index.is_index_for(&[Arc::new(Segment::from_values([1, 2]))]));
        assert!(!index.is_index_for(&[Arc::clone(&segment), segment]));
    }

    #[test]
    fn memory_consumption_grows_with_content() {
        let small = index_over(vec![1, 2]);
        let large = index_over((0..100).collect::<Vec<i64>>());
        assert!(small.memory_consumption() < large.memory_consumption());
        assert_eq!(small.index_type(), IndexType::DenseSorted);
    }

    #[test]
    fn estimate_shape() {
        assert_eq!(DenseSortedIndex::estimate_memory_consumption(0, 0, 8), 4);
        assert_eq!(DenseSortedIndex::estimate_memory_consumption(4, 3, 8), 8 * 4 + 3 * 8);
        assert_eq!(
            DenseSortedIndex::estimate_memory_consumption(usize::MAX, usize::MAX, u32::MAX),
            usize::MAX
        );
    }
}
