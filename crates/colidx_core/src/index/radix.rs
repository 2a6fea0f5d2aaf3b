//! Adaptive radix tree index over order-preserving key bytes.
//!
//! Every distinct value is encoded with [`colidx_codec::sortable`], whose
//! bytewise order equals the value order and which is prefix-free. The tree
//! is built once from the sorted distinct keys:
//!
//! - a single key becomes a leaf holding the full key;
//! - several keys become an inner node holding their common prefix, with
//!   one child per distinct next byte.
//!
//! Inner nodes keep sparse edges in a sorted byte array and switch to a
//! 256-slot table once the fanout gets large. Each node also remembers the
//! first position slot of its subtree, so a bound query never has to
//! descend into a subtree that lies entirely above the probe.

use crate::error::IndexResult;
use crate::index::build::{offsets_bytes, SortedRows};
use crate::index::cursor::NullPositions;
use crate::index::kind::MemoryEstimate;
use crate::index::traits::{AbstractIndex, OrderedIndex};
use crate::index::IndexType;
use colidx_codec::{sortable, Value};
use colidx_storage::{ChunkOffset, Segment};
use std::cmp::Ordering;
use std::mem::size_of;
use std::sync::Arc;

/// Fanout above which an inner node uses the 256-slot layout.
const SPARSE_FANOUT: usize = 48;

/// Encoding overhead per key: one kind tag plus a two-byte terminator.
const KEY_OVERHEAD: usize = 3;

/// Estimated size of one inner node with up to 16 children.
const NODE16_BYTES: usize = size_of::<RadixNode>() + 16 + 16 * size_of::<RadixNode>();

#[derive(Debug)]
enum RadixNode {
    Leaf {
        key: Box<[u8]>,
        start: u32,
    },
    Inner {
        prefix: Box<[u8]>,
        children: Children,
        first: u32,
    },
}

#[derive(Debug)]
enum Children {
    Sparse {
        edges: Box<[u8]>,
        nodes: Box<[RadixNode]>,
    },
    Dense {
        slots: Box<[Option<Box<RadixNode>>]>,
    },
}

impl RadixNode {
    /// Builds a subtree from sorted, distinct `(key, start)` leaves that all
    /// share their first `depth` bytes.
    fn build(leaves: &[(Box<[u8]>, u32)], depth: usize) -> Self {
        let (first_key, first) = &leaves[0];
        if leaves.len() == 1 {
            return RadixNode::Leaf {
                key: first_key.clone(),
                start: *first,
            };
        }

        let last_key = &leaves[leaves.len() - 1].0;
        let common = first_key[depth..]
            .iter()
            .zip(&last_key[depth..])
            .take_while(|(a, b)| a == b)
            .count();
        let branch = depth + common;

        let mut edges = Vec::new();
        let mut nodes = Vec::new();
        for group in leaves.chunk_by(|a, b| a.0.get(branch) == b.0.get(branch)) {
            edges.push(group[0].0.get(branch).copied().unwrap_or_default());
            nodes.push(RadixNode::build(group, branch + 1));
        }

        let children = if nodes.len() > SPARSE_FANOUT {
            let mut slots: Vec<Option<Box<RadixNode>>> = (0..256).map(|_| None).collect();
            for (edge, node) in edges.into_iter().zip(nodes) {
                slots[edge as usize] = Some(Box::new(node));
            }
            Children::Dense {
                slots: slots.into_boxed_slice(),
            }
        } else {
            Children::Sparse {
                edges: edges.into_boxed_slice(),
                nodes: nodes.into_boxed_slice(),
            }
        };

        RadixNode::Inner {
            prefix: first_key[depth..branch].into(),
            children,
            first: *first,
        }
    }

    fn first(&self) -> u32 {
        match self {
            RadixNode::Leaf { start, .. } => *start,
            RadixNode::Inner { first, .. } => *first,
        }
    }

    /// Returns the first slot of the first key that is greater than `probe`
    /// (or equal to it, unless `strict`), if that key lies in this subtree.
    fn seek(&self, probe: &[u8], depth: usize, strict: bool) -> Option<u32> {
        match self {
            RadixNode::Leaf { key, start } => match key[..].cmp(probe) {
                Ordering::Greater => Some(*start),
                Ordering::Equal if !strict => Some(*start),
                _ => None,
            },
            RadixNode::Inner {
                prefix,
                children,
                first,
            } => {
                for (i, &byte) in prefix.iter().enumerate() {
                    match probe.get(depth + i).map(|p| p.cmp(&byte)) {
                        None | Some(Ordering::Less) => return Some(*first),
                        Some(Ordering::Greater) => return None,
                        Some(Ordering::Equal) => {}
                    }
                }
                let branch = depth + prefix.len();
                let Some(&byte) = probe.get(branch) else {
                    return Some(*first);
                };
                children
                    .get(byte)
                    .and_then(|child| child.seek(probe, branch + 1, strict))
                    .or_else(|| children.next_after(byte).map(RadixNode::first))
            }
        }
    }

    fn memory_consumption(&self) -> usize {
        match self {
            RadixNode::Leaf { key, .. } => size_of::<RadixNode>() + key.len(),
            RadixNode::Inner {
                prefix, children, ..
            } => size_of::<RadixNode>() + prefix.len() + children.memory_consumption(),
        }
    }
}

impl Children {
    fn get(&self, byte: u8) -> Option<&RadixNode> {
        match self {
            Children::Sparse { edges, nodes } => {
                let i = edges.binary_search(&byte).ok()?;
                nodes.get(i)
            }
            Children::Dense { slots } => slots[byte as usize].as_deref(),
        }
    }

    /// First child whose edge is greater than `byte`.
    fn next_after(&self, byte: u8) -> Option<&RadixNode> {
        match self {
            Children::Sparse { edges, nodes } => nodes.get(edges.partition_point(|&e| e <= byte)),
            Children::Dense { slots } => slots[byte as usize + 1..]
                .iter()
                .find_map(|slot| slot.as_deref()),
        }
    }

    /// Bytes held by the child table. Sparse children live inline, so their
    /// own node header accounts for the table slot.
    fn memory_consumption(&self) -> usize {
        match self {
            Children::Sparse { edges, nodes } => {
                edges.len()
                    + nodes
                        .iter()
                        .map(RadixNode::memory_consumption)
                        .sum::<usize>()
            }
            Children::Dense { slots } => {
                slots.len() * size_of::<Option<Box<RadixNode>>>()
                    + slots
                        .iter()
                        .flatten()
                        .map(|node| node.memory_consumption())
                        .sum::<usize>()
            }
        }
    }
}

/// Radix tree index over one segment.
///
/// Leaves map a key to the first slot of its run in the position array;
/// the run ends where the next leaf's run starts.
#[derive(Debug)]
pub struct RadixTreeIndex {
    segment: [Arc<Segment>; 1],
    root: Option<RadixNode>,
    distinct_count: usize,
    positions: Vec<ChunkOffset>,
    nulls: NullPositions<ChunkOffset>,
}

impl RadixTreeIndex {
    /// Builds the index over `segment`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::InvalidArgument`] if the segment has more
    /// rows than chunk offsets can address.
    pub fn new(segment: Arc<Segment>) -> IndexResult<Self> {
        let segment = [segment];
        let rows = SortedRows::build(&segment)?;

        let leaves: Vec<(Box<[u8]>, u32)> = rows
            .representatives()
            .map(|(row, start)| {
                let key = sortable::encode(&segment[0].values()[row]);
                (key.into_boxed_slice(), start)
            })
            .collect();
        let root = (!leaves.is_empty()).then(|| RadixNode::build(&leaves, 0));

        let index = Self {
            segment,
            root,
            distinct_count: leaves.len(),
            positions: rows.positions,
            nulls: rows.nulls.into(),
        };
        tracing::debug!(
            index_type = %IndexType::RadixTree,
            rows = index.positions.len(),
            distinct = index.distinct_count,
            nulls = index.nulls.len(),
            bytes = index.memory_consumption(),
            "built index"
        );
        Ok(index)
    }

    /// Returns the number of distinct non-null values.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.distinct_count
    }

    fn slot(&self, value: &Value, strict: bool) -> usize {
        let probe = sortable::encode(value);
        self.root
            .as_ref()
            .and_then(|root| root.seek(&probe, 0, strict))
            .map_or(self.positions.len(), |slot| slot as usize)
    }
}

impl MemoryEstimate for RadixTreeIndex {
    fn estimate_memory_consumption(row_count: usize, distinct_count: usize, value_bytes: u32) -> usize {
        let leaf = size_of::<RadixNode>()
            .saturating_add(value_bytes as usize)
            .saturating_add(KEY_OVERHEAD);
        distinct_count
            .saturating_mul(leaf)
            .saturating_add((distinct_count / 4).saturating_mul(NODE16_BYTES))
            .saturating_add(offsets_bytes(row_count))
    }
}

impl AbstractIndex for RadixTreeIndex {
    type Position = ChunkOffset;

    fn index_type(&self) -> IndexType {
        IndexType::RadixTree
    }

    fn null_positions(&self) -> &NullPositions<ChunkOffset> {
        &self.nulls
    }

    fn storage_memory_consumption(&self) -> usize {
        let tree = self.root.as_ref().map_or(0, RadixNode::memory_consumption);
        tree + offsets_bytes(self.positions.len())
    }
}

impl OrderedIndex for RadixTreeIndex {
    fn indexed_segments(&self) -> &[Arc<Segment>] {
        &self.segment
    }

    fn positions(&self) -> &[ChunkOffset] {
        &self.positions
    }

    fn lower_bound_slot(&self, values: &[Value]) -> usize {
        self.slot(&values[0], false)
    }

    fn upper_bound_slot(&self, values: &[Value]) -> usize {
        self.slot(&values[0], true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cursor::IndexCursor;
    use crate::index::DenseSortedIndex;

    fn segment<T: Into<Value>>(values: Vec<T>) -> Arc<Segment> {
        Arc::new(Segment::from_values(values))
    }

    /// Both indexes must agree on every bound.
    fn assert_matches_dense(values: Vec<Value>, probes: &[Value]) {
        let segment = Arc::new(Segment::new(values));
        let radix = RadixTreeIndex::new(Arc::clone(&segment)).unwrap();
        let dense = DenseSortedIndex::new(segment).unwrap();
        for probe in probes {
            let probe = std::slice::from_ref(probe);
            assert_eq!(
                radix.lower_bound(probe).unwrap().slot(),
                dense.lower_bound(probe).unwrap().slot(),
                "lower_bound({probe:?})"
            );
            assert_eq!(
                radix.upper_bound(probe).unwrap().slot(),
                dense.upper_bound(probe).unwrap().slot(),
                "upper_bound({probe:?})"
            );
        }
    }

    #[test]
    fn integer_bounds() {
        let index = RadixTreeIndex::new(segment(vec![10, 20, 20, 30])).unwrap();
        let lower = index.lower_bound(&[Value::Integer(20)]).unwrap();
        let upper = index.upper_bound(&[Value::Integer(20)]).unwrap();
        assert_eq!(lower.get().map(|o| o.as_u32()), Some(1));
        assert_eq!(upper.get().map(|o| o.as_u32()), Some(3));
        assert_eq!(index.lower_bound(&[Value::Integer(25)]).unwrap().slot(), 3);
        assert_eq!(index.upper_bound(&[Value::Integer(30)]).unwrap(), index.cend());
    }

    #[test]
    fn text_keys_with_shared_prefixes() {
        let words = ["car", "cart", "carbon", "cat", "ca", "dog", "a", "car"];
        let values: Vec<Value> = words.iter().map(|w| Value::from(*w)).collect();
        let probes: Vec<Value> = ["", "c", "ca", "car", "carb", "cartz", "cat", "d", "zzz", "a\0"]
            .iter()
            .map(|w| Value::from(*w))
            .collect();
        assert_matches_dense(values, &probes);
    }

    #[test]
    fn negative_and_mixed_kinds() {
        let values = vec![
            Value::Integer(-3),
            Value::Integer(0),
            Value::Integer(i64::MIN),
            Value::Bool(true),
            Value::from("x"),
            Value::Bytes(vec![0, 0, 1]),
            Value::Integer(i64::MAX),
        ];
        let probes = vec![
            Value::Null,
            Value::Bool(false),
            Value::Integer(-4),
            Value::Integer(-3),
            Value::Integer(1),
            Value::from(""),
            Value::Bytes(vec![0]),
            Value::Bytes(vec![0, 0, 1, 0]),
        ];
        assert_matches_dense(values, &probes);
    }

    #[test]
    fn wide_fanout_uses_dense_children() {
        let values: Vec<Value> = (0u8..=200).map(|b| Value::Bytes(vec![b])).collect();
        let probes: Vec<Value> = [0u8, 1, 47, 48, 49, 150, 200, 255]
            .iter()
            .map(|&b| Value::Bytes(vec![b]))
            .collect();
        assert_matches_dense(values, &probes);
    }

    #[test]
    fn nulls_and_empty() {
        let index = RadixTreeIndex::new(segment(vec![None, Some("a"), None])).unwrap();
        let nulls: Vec<u32> = index.null_cbegin().to(index.null_cend()).map(|o| o.as_u32()).collect();
        assert_eq!(nulls, vec![0, 2]);
        assert_eq!(index.distinct_count(), 1);

        let empty = RadixTreeIndex::new(segment(Vec::<i64>::new())).unwrap();
        assert_eq!(empty.lower_bound(&[Value::Integer(1)]).unwrap(), empty.cend());
        assert_eq!(empty.cbegin(), empty.cend());
    }

    #[test]
    fn memory_and_estimate() {
        let index = RadixTreeIndex::new(segment((0..64).collect::<Vec<i64>>())).unwrap();
        assert!(index.memory_consumption() > offsets_bytes(64));
        assert!(
            RadixTreeIndex::estimate_memory_consumption(64, 64, 8)
                >= RadixTreeIndex::estimate_memory_consumption(64, 16, 8)
        );
    }
}
