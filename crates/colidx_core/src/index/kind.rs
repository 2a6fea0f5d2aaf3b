//! Index type tags and the planning-time cost model.

use crate::error::{IndexError, IndexResult};
use crate::index::{BTreeIndex, CompositeSortedIndex, DenseSortedIndex, PartialHashIndex, RadixTreeIndex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Family tag of an index.
///
/// `Invalid` is the unset sentinel. It only exists so construction-time
/// validation has something to reject; no built index ever carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum IndexType {
    /// Single-column dense sorted index.
    DenseSorted = 0,
    /// Multi-column dense sorted index.
    CompositeDenseSorted = 1,
    /// Single-column radix tree over order-preserving key bytes.
    RadixTree = 2,
    /// Single-column B-tree.
    BTree = 3,
    /// Table-wide hash index over a subset of chunks.
    PartialHash = 4,
    /// Unset sentinel.
    Invalid = 5,
}

impl IndexType {
    /// Every buildable index type.
    pub const ALL: [IndexType; 5] = [
        IndexType::DenseSorted,
        IndexType::CompositeDenseSorted,
        IndexType::RadixTree,
        IndexType::BTree,
        IndexType::PartialHash,
    ];

    /// Returns true for the chunk-local ordered families.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(
            self,
            IndexType::DenseSorted
                | IndexType::CompositeDenseSorted
                | IndexType::RadixTree
                | IndexType::BTree
        )
    }

    /// Returns true for every type except the sentinel.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, IndexType::Invalid)
    }

    /// Returns the stable name of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            IndexType::DenseSorted => "dense-sorted",
            IndexType::CompositeDenseSorted => "composite-dense-sorted",
            IndexType::RadixTree => "radix-tree",
            IndexType::BTree => "b-tree",
            IndexType::PartialHash => "partial-hash",
            IndexType::Invalid => "invalid",
        }
    }

    /// Predicts the memory consumption in bytes of building this index type.
    ///
    /// See [`estimate_memory_consumption`].
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidArgument`] for [`IndexType::Invalid`].
    pub fn estimate_memory_consumption(
        self,
        row_count: usize,
        distinct_count: usize,
        value_bytes: u32,
    ) -> IndexResult<usize> {
        estimate_memory_consumption(self, row_count, distinct_count, value_bytes)
    }
}

impl Default for IndexType {
    fn default() -> Self {
        IndexType::Invalid
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexType {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndexType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| IndexError::invalid_argument(format!("unknown index type: {s}")))
    }
}

impl TryFrom<u8> for IndexType {
    type Error = IndexError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(IndexType::DenseSorted),
            1 => Ok(IndexType::CompositeDenseSorted),
            2 => Ok(IndexType::RadixTree),
            3 => Ok(IndexType::BTree),
            4 => Ok(IndexType::PartialHash),
            5 => Ok(IndexType::Invalid),
            _ => Err(IndexError::invalid_argument(format!(
                "unknown index type tag: {value}"
            ))),
        }
    }
}

/// Static cost model of a concrete index type.
///
/// Estimates must be non-negative and non-decreasing in both `row_count`
/// and `distinct_count` for a fixed `value_bytes`.
pub trait MemoryEstimate {
    /// Predicts the memory consumption in bytes of an index over
    /// `row_count` rows holding `distinct_count` distinct keys of
    /// `value_bytes` bytes each.
    fn estimate_memory_consumption(row_count: usize, distinct_count: usize, value_bytes: u32)
        -> usize;
}

/// Predicts the memory consumption in bytes of building an index of
/// `index_type`, without building it.
///
/// This is a planning-time cost query: callers use it to decide whether an
/// index is worth building. For composite indexes `value_bytes` is the width
/// of the whole key, i.e. the sum over all key columns.
///
/// # Errors
///
/// Returns [`IndexError::InvalidArgument`] for [`IndexType::Invalid`].
pub fn estimate_memory_consumption(
    index_type: IndexType,
    row_count: usize,
    distinct_count: usize,
    value_bytes: u32,
) -> IndexResult<usize> {
    let bytes = match index_type {
        IndexType::DenseSorted => {
            DenseSortedIndex::estimate_memory_consumption(row_count, distinct_count, value_bytes)
        }
        IndexType::CompositeDenseSorted => {
            CompositeSortedIndex::estimate_memory_consumption(row_count, distinct_count, value_bytes)
        }
        IndexType::RadixTree => {
            RadixTreeIndex::estimate_memory_consumption(row_count, distinct_count, value_bytes)
        }
        IndexType::BTree => {
            BTreeIndex::estimate_memory_consumption(row_count, distinct_count, value_bytes)
        }
        IndexType::PartialHash => {
            PartialHashIndex::estimate_memory_consumption(row_count, distinct_count, value_bytes)
        }
        IndexType::Invalid => {
            return Err(IndexError::invalid_argument("index type is invalid"));
        }
    };
    Ok(bytes)
}
