//! Horizontal table partitions.

use crate::error::{StorageError, StorageResult};
use crate::segment::Segment;
use crate::types::ColumnId;
use std::sync::Arc;

/// A horizontal partition of a table: one segment per column.
///
/// All segments of a chunk have the same row count. A chunk is immutable;
/// indexes keep `Arc` handles to it and to its segments.
#[derive(Debug, Clone)]
pub struct Chunk {
    segments: Vec<Arc<Segment>>,
    row_count: usize,
}

impl Chunk {
    /// Creates a chunk from shared segments.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::RaggedChunk`] if the segments differ in length.
    pub fn new(segments: Vec<Arc<Segment>>) -> StorageResult<Self> {
        let row_count = segments.first().map_or(0, |s| s.len());
        for (i, segment) in segments.iter().enumerate() {
            if segment.len() != row_count {
                return Err(StorageError::RaggedChunk {
                    column_id: ColumnId::new(i as u16),
                    expected: row_count,
                    actual: segment.len(),
                });
            }
        }
        Ok(Self {
            segments,
            row_count,
        })
    }

    /// Creates a chunk that takes ownership of freshly built segments.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::RaggedChunk`] if the segments differ in length.
    pub fn from_segments(segments: Vec<Segment>) -> StorageResult<Self> {
        Self::new(segments.into_iter().map(Arc::new).collect())
    }

    /// Returns the segment for `column_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownColumn`] if the column does not exist.
    pub fn segment(&self, column_id: ColumnId) -> StorageResult<&Arc<Segment>> {
        self.segments
            .get(column_id.index())
            .ok_or(StorageError::UnknownColumn {
                column_id,
                column_count: self.segments.len(),
            })
    }

    /// Returns all segments in column order.
    #[must_use]
    pub fn segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}
