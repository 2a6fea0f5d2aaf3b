//! Append-only tables of chunks.

use crate::chunk::Chunk;
use crate::error::{StorageError, StorageResult};
use crate::types::ChunkId;
use parking_lot::RwLock;
use std::sync::Arc;

/// A table: an append-only sequence of chunks.
///
/// Chunk IDs are dense and assigned in append order. Appending is the only
/// mutation; chunks themselves are never modified, so any `Arc<Chunk>`
/// handed out stays valid and unchanged.
///
/// # Thread Safety
///
/// The chunk list is guarded by a read-write lock, so chunks can be appended
/// while other threads take snapshots.
#[derive(Debug)]
pub struct Table {
    column_count: usize,
    chunks: RwLock<Vec<Arc<Chunk>>>,
}

impl Table {
    /// Creates an empty table with `column_count` columns.
    #[must_use]
    pub fn new(column_count: usize) -> Self {
        Self {
            column_count,
            chunks: RwLock::new(Vec::new()),
        }
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Appends a chunk and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ColumnCountMismatch`] if the chunk does not
    /// have exactly one segment per table column.
    pub fn append_chunk(&self, chunk: Chunk) -> StorageResult<ChunkId> {
        if chunk.column_count() != self.column_count {
            return Err(StorageError::ColumnCountMismatch {
                expected: self.column_count,
                actual: chunk.column_count(),
            });
        }
        let mut chunks = self.chunks.write();
        let id = ChunkId::new(chunks.len() as u32);
        chunks.push(Arc::new(chunk));
        Ok(id)
    }

    /// Returns the chunk with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownChunk`] if no such chunk exists.
    pub fn chunk(&self, id: ChunkId) -> StorageResult<Arc<Chunk>> {
        self.chunks
            .read()
            .get(id.as_u32() as usize)
            .cloned()
            .ok_or(StorageError::UnknownChunk(id))
    }

    /// Returns a snapshot of every chunk with its ID.
    #[must_use]
    pub fn chunks(&self) -> Vec<(ChunkId, Arc<Chunk>)> {
        self.chunks
            .read()
            .iter()
            .enumerate()
            .map(|(i, chunk)| (ChunkId::new(i as u32), Arc::clone(chunk)))
            .collect()
    }

    /// Returns the requested chunks with their IDs, in the requested order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UnknownChunk`] for the first missing ID.
    pub fn select_chunks(&self, ids: &[ChunkId]) -> StorageResult<Vec<(ChunkId, Arc<Chunk>)>> {
        let chunks = self.chunks.read();
        ids.iter()
            .map(|&id| {
                chunks
                    .get(id.as_u32() as usize)
                    .map(|chunk| (id, Arc::clone(chunk)))
                    .ok_or(StorageError::UnknownChunk(id))
            })
            .collect()
    }

    /// Returns the number of chunks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    /// Returns the total number of rows across all chunks.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.chunks.read().iter().map(|c| c.row_count()).sum()
    }
}
