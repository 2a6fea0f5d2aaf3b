//! # colidx Core
//!
//! Secondary indexes for an in-memory column store.
//!
//! This crate provides:
//! - Chunk-local ordered indexes with `lower_bound`/`upper_bound` over
//!   composite keys (dense sorted, composite, radix tree, B-tree)
//! - Table-wide partial hash indexes with explicit chunk coverage
//! - A planning-time memory cost model for every index type
//! - Statistics descriptors and a per-table index registry
//!
//! # Example
//!
//! ```rust,ignore
//! use colidx_core::{create_ordered_index, IndexConfig, IndexCursor, IndexType, OrderedIndex};
//!
//! let index = create_ordered_index(&IndexConfig::default(), IndexType::BTree, &[segment])?;
//! let begin = index.lower_bound(&[Value::Integer(18)])?;
//! for offset in begin.to(index.cend()) {
//!     // rows with a value >= 18
//! }
//! ```
//!
//! Indexes hold `Arc` handles to the segments they index and never copy
//! column data. Once built they are immutable and can be queried from any
//! number of threads.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
pub mod index;
mod registry;

pub use config::IndexConfig;
pub use error::{IndexError, IndexResult};
pub use index::{
    create_ordered_index, estimate_memory_consumption, AbstractIndex, BTreeIndex,
    CompositeSortedIndex, CursorRange, DenseSortedIndex, IndexCursor, IndexType, MemoryEstimate,
    NullPositions, OrderedIndex, PartialHashIndex, Position, PositionCursor, RadixTreeIndex,
    TableCursor, TableIndex, TableIndexStatistics,
};
pub use registry::TableIndexRegistry;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
