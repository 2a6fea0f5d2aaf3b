//! Identifier types for column storage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a chunk within a table.
///
/// Chunk IDs are assigned in append order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkId(pub u32);

impl ChunkId {
    /// Creates a new chunk ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk:{}", self.0)
    }
}

/// Identifier of a column within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnId(pub u16);

impl ColumnId {
    /// Creates a new column ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns the ID as a slice index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col:{}", self.0)
    }
}

/// Position of a row within one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkOffset(pub u32);

impl ChunkOffset {
    /// Creates a new chunk offset.
    #[must_use]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Returns the raw offset value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the offset as a slice index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ChunkOffset {
    fn from(offset: u32) -> Self {
        Self(offset)
    }
}

impl fmt::Display for ChunkOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Table-wide row identifier: a chunk plus an offset within it.
///
/// Row IDs order by chunk first, then by offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId {
    /// The chunk holding the row.
    pub chunk_id: ChunkId,
    /// The row's position within that chunk.
    pub chunk_offset: ChunkOffset,
}

impl RowId {
    /// Creates a new row ID.
    #[must_use]
    pub const fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        Self {
            chunk_id,
            chunk_offset,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row:{}/{}", self.chunk_id.0, self.chunk_offset.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_id_ordering() {
        let a = RowId::new(ChunkId::new(0), ChunkOffset::new(9));
        let b = RowId::new(ChunkId::new(1), ChunkOffset::new(0));
        assert!(a < b);
    }

    #[test]
    fn display() {
        assert_eq!(ChunkId::new(3).to_string(), "chunk:3");
        assert_eq!(ColumnId::new(2).to_string(), "col:2");
        assert_eq!(
            RowId::new(ChunkId::new(1), ChunkOffset::new(4)).to_string(),
            "row:1/4"
        );
    }

    #[test]
    fn column_id_serde() {
        let json = serde_json::to_string(&ColumnId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
