//! # colidx Codec
//!
//! Column values as seen by the index layer.
//!
//! Indexes treat a column value as an opaque item that can be compared,
//! hashed and sized. This crate provides:
//! - [`Value`], the dynamic column value with a total order
//! - [`sortable`], a byte encoding whose bytewise order equals the value order
//!
//! ## Usage
//!
//! ```
//! use colidx_codec::{sortable, Value};
//!
//! let low = sortable::encode(&Value::Integer(-3));
//! let high = sortable::encode(&Value::Integer(7));
//! assert!(low < high);
//! assert!(Value::Integer(-3) < Value::Integer(7));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod sortable;
mod value;

pub use value::Value;
