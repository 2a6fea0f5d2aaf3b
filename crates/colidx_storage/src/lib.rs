//! # colidx Storage
//!
//! Column storage as consumed by colidx indexes.
//!
//! Indexes never manage storage: they read already materialized segments
//! and chunks and keep handles to them. This crate provides the minimal
//! in-memory shapes they read from.
//!
//! ## Design Principles
//!
//! - A [`Segment`] holds one column's values for one chunk
//! - A [`Chunk`] is a horizontal partition: one segment per column
//! - A [`Table`] is an append-only list of chunks with stable [`ChunkId`]s
//! - Segments and chunks are shared as `Arc` handles; identity is the
//!   handle, not the contents
//!
//! ## Example
//!
//! ```rust
//! use colidx_codec::Value;
//! use colidx_storage::{Chunk, ColumnId, Segment, Table};
//!
//! let table = Table::new(1);
//! let chunk = Chunk::from_segments(vec![Segment::from_values([1, 2, 3])]).unwrap();
//! let chunk_id = table.append_chunk(chunk).unwrap();
//!
//! let chunk = table.chunk(chunk_id).unwrap();
//! let segment = chunk.segment(ColumnId::new(0)).unwrap();
//! assert_eq!(segment.get(1u32.into()), Some(&Value::Integer(2)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod error;
mod segment;
mod table;
mod types;

pub use chunk::Chunk;
pub use error::{StorageError, StorageResult};
pub use segment::Segment;
pub use table::Table;
pub use types::{ChunkId, ChunkOffset, ColumnId, RowId};
