//! Secondary index implementations.
//!
//! Indexes are immutable access paths built once over column data they do
//! not own. Queries return cursor pairs over positions, never copies of rows.
//!
//! # Index Types
//!
//! Chunk-local, ordered ([`OrderedIndex`]):
//!
//! - [`DenseSortedIndex`]: sorted distinct values over one segment
//! - [`CompositeSortedIndex`]: sorted key tuples over several segments
//! - [`RadixTreeIndex`]: adaptive radix tree over order-preserving key bytes
//! - [`BTreeIndex`]: B-tree over one segment
//!
//! Table-wide, equality only ([`TableIndex`]):
//!
//! - [`PartialHashIndex`]: hash index over a chosen subset of chunks
//!
//! # Nulls
//!
//! Null rows are never part of an index's main range. Every index keeps
//! them in a separate list, walked with `null_cbegin()`/`null_cend()`.

mod btree;
mod build;
mod composite;
mod cursor;
mod dense;
mod factory;
mod hash;
mod kind;
mod radix;
mod stats;
mod traits;

pub use btree::BTreeIndex;
pub use composite::CompositeSortedIndex;
pub use cursor::{CursorRange, IndexCursor, NullPositions, Position, PositionCursor, TableCursor};
pub use dense::DenseSortedIndex;
pub use factory::create_ordered_index;
pub use hash::PartialHashIndex;
pub use kind::{estimate_memory_consumption, IndexType, MemoryEstimate};
pub use radix::RadixTreeIndex;
pub use stats::TableIndexStatistics;
pub use traits::{AbstractIndex, OrderedIndex, TableIndex};
