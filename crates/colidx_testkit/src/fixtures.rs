//! Table fixtures and brute-force references.
//!
//! The references compute index answers the slow way, by sorting and
//! scanning, so property tests can compare every index against them.

use colidx_codec::Value;
use colidx_core::{IndexCursor, PositionCursor, TableCursor};
use colidx_storage::{Chunk, ChunkId, ChunkOffset, RowId, Segment, Table};
use std::cmp::Ordering;
use std::sync::Arc;

/// Wraps values into a shared segment.
pub fn segment(values: Vec<Value>) -> Arc<Segment> {
    Arc::new(Segment::new(values))
}

/// Wraps each column into a shared segment.
pub fn segments(columns: Vec<Vec<Value>>) -> Vec<Arc<Segment>> {
    columns.into_iter().map(segment).collect()
}

/// Builds a single-column table with one chunk per entry of `chunks`.
///
/// # Panics
///
/// Panics if a chunk cannot be appended, which only happens for a bug in
/// the fixture itself.
pub fn single_column_table(chunks: &[Vec<Value>]) -> Table {
    let table = Table::new(1);
    for values in chunks {
        let chunk = Chunk::from_segments(vec![Segment::new(values.clone())])
            .expect("single segment chunk");
        table.append_chunk(chunk).expect("column count matches");
    }
    table
}

/// The two-chunk table used for coverage scenarios: the value `"only-in-1"`
/// exists in chunk 1 but not in chunk 0.
pub fn two_chunk_table() -> Table {
    single_column_table(&[
        vec![Value::from("a"), Value::from("b"), Value::from("a")],
        vec![Value::from("only-in-1"), Value::from("a")],
    ])
}

/// Returns true if the row has a null in any of `segments`.
pub fn is_null_row(segments: &[Arc<Segment>], row: usize) -> bool {
    segments.iter().any(|s| s.values()[row].is_null())
}

/// Compares row `row` truncated to `probe.len()` columns against `probe`.
pub fn compare_row_prefix(segments: &[Arc<Segment>], row: usize, probe: &[Value]) -> Ordering {
    segments
        .iter()
        .zip(probe)
        .map(|(s, p)| s.values()[row].cmp(p))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Non-null rows sorted by key tuple, ties in offset order.
pub fn reference_positions(segments: &[Arc<Segment>]) -> Vec<ChunkOffset> {
    let rows = segments.first().map_or(0, |s| s.len());
    let mut positions: Vec<ChunkOffset> = (0..rows)
        .filter(|&row| !is_null_row(segments, row))
        .map(|row| ChunkOffset::new(row as u32))
        .collect();
    positions.sort_by(|a, b| {
        segments
            .iter()
            .map(|s| s.values()[a.index()].cmp(&s.values()[b.index()]))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    positions
}

/// Rows with a null in any key column, in offset order.
pub fn reference_nulls(segments: &[Arc<Segment>]) -> Vec<ChunkOffset> {
    let rows = segments.first().map_or(0, |s| s.len());
    (0..rows)
        .filter(|&row| is_null_row(segments, row))
        .map(|row| ChunkOffset::new(row as u32))
        .collect()
}

/// Slot of the lower (or, if `strict`, upper) bound of `probe`.
pub fn reference_bound(segments: &[Arc<Segment>], probe: &[Value], strict: bool) -> usize {
    reference_positions(segments)
        .iter()
        .filter(|p| {
            let order = compare_row_prefix(segments, p.index(), probe);
            order == Ordering::Less || (strict && order == Ordering::Equal)
        })
        .count()
}

/// Rows of the covered chunks whose value equals `value`, sorted.
pub fn reference_equals(table: &Table, covered: &[ChunkId], value: &Value) -> Vec<RowId> {
    let mut rows: Vec<RowId> = table
        .chunks()
        .into_iter()
        .filter(|(id, _)| covered.contains(id))
        .flat_map(|(id, chunk)| {
            chunk.segments()[0]
                .iter()
                .filter(|(_, v)| !v.is_null() && *v == value)
                .map(|(offset, _)| RowId::new(id, offset))
                .collect::<Vec<_>>()
        })
        .collect();
    rows.sort();
    rows
}

/// Collects the chunk offsets of a cursor range.
pub fn collect_offsets(begin: PositionCursor<'_, ChunkOffset>, end: PositionCursor<'_, ChunkOffset>) -> Vec<ChunkOffset> {
    begin.to(end).copied().collect()
}

/// Collects the row IDs of a table cursor range, sorted.
pub fn collect_rows(begin: TableCursor<'_>, end: TableCursor<'_>) -> Vec<RowId> {
    let mut rows: Vec<RowId> = begin.to(end).copied().collect();
    rows.sort();
    rows
}
