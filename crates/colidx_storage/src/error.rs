//! Error types for storage operations.

use crate::types::{ChunkId, ColumnId};
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur when assembling or reading column storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The table has no chunk with this identifier.
    #[error("unknown chunk: {0}")]
    UnknownChunk(ChunkId),

    /// The chunk has no segment for this column.
    #[error("unknown column: {column_id} (chunk has {column_count} columns)")]
    UnknownColumn {
        /// The requested column.
        column_id: ColumnId,
        /// Number of columns actually present.
        column_count: usize,
    },

    /// The segments of a chunk do not all have the same length.
    #[error("ragged chunk: segment {column_id} has {actual} rows, expected {expected}")]
    RaggedChunk {
        /// Column whose segment length differs.
        column_id: ColumnId,
        /// Row count of the first segment.
        expected: usize,
        /// Row count of the offending segment.
        actual: usize,
    },

    /// The chunk's column count does not match the table.
    #[error("column count mismatch: table has {expected} columns, chunk has {actual}")]
    ColumnCountMismatch {
        /// Columns defined by the table.
        expected: usize,
        /// Columns in the appended chunk.
        actual: usize,
    },
}
