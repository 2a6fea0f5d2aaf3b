//! Positions and the cursors that walk over them.
//!
//! Every index answers queries with a pair of cursors `(begin, end)`. A
//! cursor is a small `Copy` value pointing at one storage slot of an index;
//! it borrows the index, so it can never outlive it. Two cursors are equal
//! iff they point at the same slot of the same storage.
//!
//! Use [`CursorRange`] (or [`IndexCursor::to`]) to turn a pair into a
//! regular Rust iterator.

use colidx_storage::{ChunkOffset, RowId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::mem::size_of;

/// The unit an index yields.
///
/// Chunk-local indexes yield [`ChunkOffset`]s, table-wide indexes yield
/// [`RowId`]s. The two are never mixed within one index family.
pub trait Position: Copy + Ord + Hash + fmt::Debug + Send + Sync + 'static {}

impl Position for ChunkOffset {}
impl Position for RowId {}

/// A forward-only cursor over index positions.
pub trait IndexCursor<'a>: Copy + PartialEq {
    /// Position type yielded by this cursor.
    type Position: Position;

    /// Returns the position under the cursor, or `None` at the end.
    fn get(&self) -> Option<&'a Self::Position>;

    /// Moves to the next position. Does nothing at the end.
    fn advance(&mut self);

    /// Returns an iterator over `[self, end)`.
    fn to(self, end: Self) -> CursorRange<'a, Self> {
        CursorRange::new(self, end)
    }
}

/// Iterator over the half-open cursor range `[begin, end)`.
#[derive(Debug, Clone)]
pub struct CursorRange<'a, C: IndexCursor<'a>> {
    current: C,
    end: C,
    _storage: PhantomData<&'a C::Position>,
}

impl<'a, C: IndexCursor<'a>> CursorRange<'a, C> {
    /// Creates a range from a cursor pair.
    pub fn new(begin: C, end: C) -> Self {
        Self {
            current: begin,
            end,
            _storage: PhantomData,
        }
    }

    /// Returns true if the range yields nothing.
    pub fn is_empty(&self) -> bool {
        self.current == self.end
    }
}

impl<'a, C: IndexCursor<'a>> Iterator for CursorRange<'a, C> {
    type Item = &'a C::Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.end {
            return None;
        }
        let item = self.current.get()?;
        self.current.advance();
        Some(item)
    }
}

/// Cursor over a flat, ordered position array.
///
/// Used for the main range of ordered indexes and for null positions of
/// both families. Cursors over the same array are also ordered by slot.
#[derive(Debug, Clone, Copy)]
pub struct PositionCursor<'a, P> {
    positions: &'a [P],
    slot: usize,
}

impl<'a, P: Position> PositionCursor<'a, P> {
    /// Cursor at `slot`, clamped to the end of `positions`.
    #[must_use]
    pub fn at(positions: &'a [P], slot: usize) -> Self {
        Self {
            positions,
            slot: slot.min(positions.len()),
        }
    }

    /// Cursor at the first position.
    #[must_use]
    pub fn begin(positions: &'a [P]) -> Self {
        Self::at(positions, 0)
    }

    /// Cursor one past the last position.
    #[must_use]
    pub fn end(positions: &'a [P]) -> Self {
        Self::at(positions, positions.len())
    }

    /// Returns the slot index within the backing array.
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Returns true if the cursor is past the last position.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.slot == self.positions.len()
    }

    /// Returns the positions in `[self, end)` as a slice.
    ///
    /// Returns an empty slice if `end` belongs to other storage or lies
    /// before `self`.
    #[must_use]
    pub fn slice_to(&self, end: &Self) -> &'a [P] {
        if self.same_storage(end) && self.slot <= end.slot {
            &self.positions[self.slot..end.slot]
        } else {
            &[]
        }
    }

    /// Returns the number of positions in `[self, end)`.
    #[must_use]
    pub fn distance_to(&self, end: &Self) -> usize {
        self.slice_to(end).len()
    }

    fn same_storage(&self, other: &Self) -> bool {
        std::ptr::eq(self.positions, other.positions)
    }
}

impl<'a, P: Position> IndexCursor<'a> for PositionCursor<'a, P> {
    type Position = P;

    fn get(&self) -> Option<&'a P> {
        self.positions.get(self.slot)
    }

    fn advance(&mut self) {
        if self.slot < self.positions.len() {
            self.slot += 1;
        }
    }
}

impl<P: Position> PartialEq for PositionCursor<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        self.same_storage(other) && self.slot == other.slot
    }
}

impl<P: Position> Eq for PositionCursor<'_, P> {}

impl<P: Position> PartialOrd for PositionCursor<'_, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.same_storage(other).then(|| self.slot.cmp(&other.slot))
    }
}

/// Cursor over value buckets of a table-wide index.
///
/// A bucket holds every row ID of one value. The cursor is the pair
/// `(bucket, offset)`; advancing past a bucket's last row moves to the
/// first row of the next bucket. Buckets are never empty, so the end of
/// one bucket's run is exactly `(bucket + 1, 0)`.
#[derive(Debug, Clone, Copy)]
pub struct TableCursor<'a> {
    buckets: &'a [Vec<RowId>],
    bucket: usize,
    offset: usize,
}

impl<'a> TableCursor<'a> {
    /// Cursor at the first row of `bucket` (clamped to the end).
    #[must_use]
    pub fn at_bucket(buckets: &'a [Vec<RowId>], bucket: usize) -> Self {
        Self {
            buckets,
            bucket: bucket.min(buckets.len()),
            offset: 0,
        }
    }

    /// Cursor at the first row of the first bucket.
    #[must_use]
    pub fn begin(buckets: &'a [Vec<RowId>]) -> Self {
        Self::at_bucket(buckets, 0)
    }

    /// Cursor past the last bucket.
    #[must_use]
    pub fn end(buckets: &'a [Vec<RowId>]) -> Self {
        Self::at_bucket(buckets, buckets.len())
    }

    /// Returns the bucket index.
    #[must_use]
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// Returns the offset within the current bucket.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns true if the cursor is past the last bucket.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.bucket == self.buckets.len()
    }
}

impl<'a> IndexCursor<'a> for TableCursor<'a> {
    type Position = RowId;

    fn get(&self) -> Option<&'a RowId> {
        self.buckets.get(self.bucket)?.get(self.offset)
    }

    fn advance(&mut self) {
        let Some(rows) = self.buckets.get(self.bucket) else {
            return;
        };
        self.offset += 1;
        if self.offset >= rows.len() {
            self.bucket += 1;
            self.offset = 0;
        }
    }
}

impl PartialEq for TableCursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.buckets, other.buckets)
            && self.bucket == other.bucket
            && self.offset == other.offset
    }
}

impl Eq for TableCursor<'_> {}

/// Positions whose indexed value is null.
///
/// Collected while an index is built, then frozen. Null positions never
/// appear in an index's main range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullPositions<P> {
    positions: Box<[P]>,
}

impl<P: Position> NullPositions<P> {
    /// Returns the null positions in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[P] {
        &self.positions
    }

    /// Returns the number of null positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if there are no null positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the memory held by the list, header included.
    #[must_use]
    pub fn memory_consumption(&self) -> usize {
        size_of::<Box<[P]>>() + size_of::<P>() * self.positions.len()
    }
}

impl<P: Position> From<Vec<P>> for NullPositions<P> {
    fn from(positions: Vec<P>) -> Self {
        Self {
            positions: positions.into_boxed_slice(),
        }
    }
}

impl<P: Position> Default for NullPositions<P> {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colidx_storage::ChunkId;

    fn offsets(raw: &[u32]) -> Vec<ChunkOffset> {
        raw.iter().copied().map(ChunkOffset::new).collect()
    }

    fn row(chunk: u32, offset: u32) -> RowId {
        RowId::new(ChunkId::new(chunk), ChunkOffset::new(offset))
    }

    #[test]
    fn position_cursor_walks_range() {
        let positions = offsets(&[4, 2, 7]);
        let begin = PositionCursor::begin(&positions);
        let end = PositionCursor::end(&positions);
        let walked: Vec<u32> = begin.to(end).map(|p| p.as_u32()).collect();
        assert_eq!(walked, vec![4, 2, 7]);
        assert_eq!(begin.distance_to(&end), 3);
        assert!(begin < end);
    }

    #[test]
    fn position_cursor_copies_are_independent() {
        let positions = offsets(&[1, 2]);
        let mut a = PositionCursor::begin(&positions);
        let b = a;
        a.advance();
        assert_ne!(a, b);
        assert_eq!(b.get(), Some(&ChunkOffset::new(1)));
        assert_eq!(a.get(), Some(&ChunkOffset::new(2)));
    }

    #[test]
    fn position_cursor_saturates_at_end() {
        let positions = offsets(&[1]);
        let mut cursor = PositionCursor::end(&positions);
        cursor.advance();
        assert!(cursor.is_end());
        assert_eq!(cursor.get(), None);
        assert_eq!(PositionCursor::at(&positions, 9).slot(), 1);
    }

    #[test]
    fn cursors_over_different_storage_are_unequal() {
        let a = offsets(&[1]);
        let b = offsets(&[1]);
        let ca = PositionCursor::begin(&a);
        let cb = PositionCursor::begin(&b);
        assert_ne!(ca, cb);
        assert_eq!(ca.partial_cmp(&cb), None);
        assert!(ca.slice_to(&PositionCursor::end(&b)).is_empty());
    }

    #[test]
    fn table_cursor_crosses_buckets() {
        let buckets = vec![vec![row(0, 1), row(0, 3)], vec![row(1, 0)]];
        let begin = TableCursor::begin(&buckets);
        let end = TableCursor::end(&buckets);
        let walked: Vec<RowId> = begin.to(end).copied().collect();
        assert_eq!(walked, vec![row(0, 1), row(0, 3), row(1, 0)]);

        let mut cursor = begin;
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor, TableCursor::at_bucket(&buckets, 1));
        assert_eq!((cursor.bucket(), cursor.offset()), (1, 0));
    }

    #[test]
    fn empty_storage_begin_is_end() {
        let buckets: Vec<Vec<RowId>> = Vec::new();
        assert_eq!(TableCursor::begin(&buckets), TableCursor::end(&buckets));
        let nulls: NullPositions<RowId> = NullPositions::default();
        assert!(CursorRange::new(
            PositionCursor::begin(nulls.as_slice()),
            PositionCursor::end(nulls.as_slice())
        )
        .is_empty());
    }

    #[test]
    fn null_positions_memory() {
        let nulls = NullPositions::from(offsets(&[1, 5]));
        assert_eq!(nulls.len(), 2);
        assert_eq!(
            nulls.memory_consumption(),
            size_of::<Box<[ChunkOffset]>>() + 2 * size_of::<ChunkOffset>()
        );
    }
}
