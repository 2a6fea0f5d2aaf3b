//! Column segments.

use crate::types::ChunkOffset;
use colidx_codec::Value;
use std::collections::HashSet;

/// One column's values for one chunk.
///
/// A segment is frozen once built. Indexes hold it through an `Arc` and
/// compare segments by handle identity, never by content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    values: Vec<Value>,
}

impl Segment {
    /// Creates a segment from materialized values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Creates a segment from anything convertible into values.
    pub fn from_values<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::new(values.into_iter().map(Into::into).collect())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the segment holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at `offset`.
    #[must_use]
    pub fn get(&self, offset: ChunkOffset) -> Option<&Value> {
        self.values.get(offset.index())
    }

    /// Returns all values in offset order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterates over `(offset, value)` pairs in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkOffset, &Value)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (ChunkOffset::new(i as u32), v))
    }

    /// Returns the number of null rows.
    #[must_use]
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Returns the number of distinct non-null values.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Returns the widest non-null value payload in bytes.
    #[must_use]
    pub fn max_value_width(&self) -> usize {
        self.values
            .iter()
            .map(Value::byte_width)
            .max()
            .unwrap_or(0)
    }
}
