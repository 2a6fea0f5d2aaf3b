//! Shared build pass for the chunk-local ordered indexes.

use crate::error::{IndexError, IndexResult};
use colidx_codec::Value;
use colidx_storage::{ChunkOffset, Segment};
use std::cmp::Ordering;
use std::mem::size_of;
use std::sync::Arc;

/// Non-null rows of one chunk in key order, grouped into runs of equal keys.
///
/// This is the build-time form every ordered index starts from. The
/// concrete index keeps `positions` as its main range and maps each run's
/// key to the run's first slot.
#[derive(Debug)]
pub(crate) struct SortedRows {
    /// Non-null offsets sorted by key tuple, ties in offset order.
    pub(crate) positions: Vec<ChunkOffset>,
    /// First slot of each run, one entry per distinct key.
    pub(crate) run_starts: Vec<u32>,
    /// Offsets where at least one key column is null.
    pub(crate) nulls: Vec<ChunkOffset>,
}

impl SortedRows {
    /// Sorts the rows of `segments`, leading segment first.
    pub(crate) fn build(segments: &[Arc<Segment>]) -> IndexResult<Self> {
        let row_count = check_segments(segments)?;

        let mut positions = Vec::with_capacity(row_count);
        let mut nulls = Vec::new();
        for row in 0..row_count {
            let offset = ChunkOffset::new(row as u32);
            if segments.iter().any(|s| s.values()[row].is_null()) {
                nulls.push(offset);
            } else {
                positions.push(offset);
            }
        }

        // Stable sort: offsets were pushed ascending, so ties stay ascending.
        positions.sort_by(|a, b| compare_rows(segments, a.index(), b.index()));

        let mut run_starts = Vec::new();
        for (slot, pair) in positions.windows(2).enumerate() {
            if compare_rows(segments, pair[0].index(), pair[1].index()) != Ordering::Equal {
                run_starts.push(slot as u32 + 1);
            }
        }
        if !positions.is_empty() {
            run_starts.insert(0, 0);
        }

        Ok(Self {
            positions,
            run_starts,
            nulls,
        })
    }

    /// Number of distinct non-null keys.
    pub(crate) fn distinct_count(&self) -> usize {
        self.run_starts.len()
    }

    /// Offset of the first row of each run, in key order.
    pub(crate) fn representatives(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.run_starts
            .iter()
            .map(|&start| (self.positions[start as usize].index(), start))
    }
}

/// Validates a key column list and returns the shared row count.
fn check_segments(segments: &[Arc<Segment>]) -> IndexResult<usize> {
    let Some(leading) = segments.first() else {
        return Err(IndexError::precondition("an index needs at least one segment"));
    };
    let row_count = leading.len();
    if let Some(ragged) = segments.iter().find(|s| s.len() != row_count) {
        return Err(IndexError::invalid_argument(format!(
            "key segments differ in length: {row_count} and {}",
            ragged.len()
        )));
    }
    check_offset_range(row_count)?;
    Ok(row_count)
}

/// Rejects chunks with more rows than a [`ChunkOffset`] can address.
pub(crate) fn check_offset_range(row_count: usize) -> IndexResult<()> {
    if u32::try_from(row_count).is_err() {
        return Err(IndexError::invalid_argument(format!(
            "{row_count} rows do not fit chunk offsets"
        )));
    }
    Ok(())
}

/// Compares two rows by their key tuples.
pub(crate) fn compare_rows(segments: &[Arc<Segment>], a: usize, b: usize) -> Ordering {
    segments
        .iter()
        .map(|s| s.values()[a].cmp(&s.values()[b]))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Heap and inline bytes held by one owned value.
pub(crate) fn value_footprint(value: &Value) -> usize {
    let heap = match value {
        Value::Text(s) => s.capacity(),
        Value::Bytes(b) => b.capacity(),
        _ => 0,
    };
    size_of::<Value>() + heap
}

/// Bytes held by a slot array of `len` offsets.
pub(crate) const fn offsets_bytes(len: usize) -> usize {
    len.saturating_mul(size_of::<ChunkOffset>())
}
