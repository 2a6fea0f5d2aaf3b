//! B-tree index over one segment.

use crate::error::IndexResult;
use crate::index::build::{offsets_bytes, value_footprint, SortedRows};
use crate::index::cursor::NullPositions;
use crate::index::kind::MemoryEstimate;
use crate::index::traits::{AbstractIndex, OrderedIndex};
use crate::index::IndexType;
use colidx_codec::Value;
use colidx_storage::{ChunkOffset, Segment};
use std::collections::BTreeMap;
use std::mem::size_of;
use std::ops::Bound;
use std::sync::Arc;

/// Keys per node of the standard library B-tree.
const NODE_CAPACITY: usize = 11;

/// Fixed per-node bookkeeping: parent link, parent slot and key count.
const NODE_HEADER: usize = size_of::<usize>() + 2 * size_of::<u16>();

/// Ordered index backed by [`BTreeMap`].
///
/// The map goes from each distinct value to the first slot of its run in
/// the position array. Range lookups on the map give both bounds.
///
/// # Use Cases
///
/// - Range predicates (`a > 18`, `a BETWEEN x AND y`)
/// - Segments whose distinct values are few compared to rows
#[derive(Debug)]
pub struct BTreeIndex {
    segment: [Arc<Segment>; 1],
    tree: BTreeMap<Value, u32>,
    positions: Vec<ChunkOffset>,
    nulls: NullPositions<ChunkOffset>,
}

impl BTreeIndex {
    /// Builds the index over `segment`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::InvalidArgument`] if the segment has more
    /// rows than chunk offsets can address.
    pub fn new(segment: Arc<Segment>) -> IndexResult<Self> {
        let segment = [segment];
        let rows = SortedRows::build(&segment)?;

        let tree: BTreeMap<Value, u32> = rows
            .representatives()
            .map(|(row, start)| (segment[0].values()[row].clone(), start))
            .collect();

        let index = Self {
            segment,
            tree,
            positions: rows.positions,
            nulls: rows.nulls.into(),
        };
        tracing::debug!(
            index_type = %IndexType::BTree,
            rows = index.positions.len(),
            distinct = index.tree.len(),
            nulls = index.nulls.len(),
            bytes = index.memory_consumption(),
            "built index"
        );
        Ok(index)
    }

    /// Returns the number of distinct non-null values.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.tree.len()
    }

    fn slot(&self, value: &Value, strict: bool) -> usize {
        let from = if strict {
            Bound::Excluded(value)
        } else {
            Bound::Included(value)
        };
        self.tree
            .range::<Value, _>((from, Bound::Unbounded))
            .next()
            .map_or(self.positions.len(), |(_, &start)| start as usize)
    }

    fn node_bytes(key_bytes: usize) -> usize {
        NODE_CAPACITY
            .saturating_mul(key_bytes.saturating_add(size_of::<u32>()))
            .saturating_add(NODE_HEADER)
    }
}

impl MemoryEstimate for BTreeIndex {
    fn estimate_memory_consumption(row_count: usize, distinct_count: usize, value_bytes: u32) -> usize {
        let nodes = distinct_count.div_ceil(NODE_CAPACITY);
        nodes
            .saturating_mul(Self::node_bytes(value_bytes as usize))
            .saturating_add(offsets_bytes(row_count))
    }
}

impl AbstractIndex for BTreeIndex {
    type Position = ChunkOffset;

    fn index_type(&self) -> IndexType {
        IndexType::BTree
    }

    fn null_positions(&self) -> &NullPositions<ChunkOffset> {
        &self.nulls
    }

    fn storage_memory_consumption(&self) -> usize {
        let nodes = self.tree.len().div_ceil(NODE_CAPACITY);
        let heap: usize = self
            .tree
            .keys()
            .map(|v| value_footprint(v) - size_of::<Value>())
            .sum();
        nodes * Self::node_bytes(size_of::<Value>()) + heap + offsets_bytes(self.positions.len())
    }
}

impl OrderedIndex for BTreeIndex {
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
