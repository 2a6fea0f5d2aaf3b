//! Construction of ordered indexes by type tag.

use crate::config::IndexConfig;
use crate::error::{IndexError, IndexResult};
use crate::index::kind::estimate_memory_consumption;
use crate::index::{
    BTreeIndex, CompositeSortedIndex, DenseSortedIndex, IndexType, OrderedIndex, RadixTreeIndex,
};
use colidx_codec::Value;
use colidx_storage::Segment;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Builds an ordered index of `index_type` over `segments`.
///
/// This is where the [`IndexType::Invalid`] sentinel is rejected. The build
/// is refused up front if its estimated size does not fit the configured
/// memory budget.
///
/// # Errors
///
/// - [`IndexError::PreconditionViolation`] if `segments` is empty
/// - [`IndexError::InvalidArgument`] for `Invalid` or `PartialHash`, for more
///   than one segment on a single-column type, or for more key columns than
///   `config.max_key_columns`
/// - [`IndexError::BudgetExceeded`] if the estimate exceeds the budget
pub fn create_ordered_index(
    config: &IndexConfig,
    index_type: IndexType,
    segments: &[Arc<Segment>],
) -> IndexResult<Box<dyn OrderedIndex>> {
    if !index_type.is_valid() {
        return Err(IndexError::invalid_argument("index type is invalid"));
    }
    if !index_type.is_ordered() {
        return Err(IndexError::invalid_argument(format!(
            "{index_type} is not a chunk-local ordered index"
        )));
    }
    let Some(leading) = segments.first() else {
        return Err(IndexError::precondition("an index needs at least one segment"));
    };
    if index_type != IndexType::CompositeDenseSorted && segments.len() > 1 {
        return Err(IndexError::invalid_argument(format!(
            "{index_type} indexes one segment, got {}",
            segments.len()
        )));
    }
    if segments.len() > config.max_key_columns {
        return Err(IndexError::invalid_argument(format!(
            "{} key columns exceed the limit of {}",
            segments.len(),
            config.max_key_columns
        )));
    }

    if let Some(budget) = config.memory_budget {
        let (rows, distinct, value_bytes) = key_statistics(segments);
        let estimated = estimate_memory_consumption(index_type, rows, distinct, value_bytes)?;
        if estimated > budget {
            warn!(
                index_type = %index_type,
                estimated,
                budget,
                "index build refused: over memory budget"
            );
            return Err(IndexError::BudgetExceeded {
                index_type,
                estimated,
                budget,
            });
        }
    }

    let single = || Arc::clone(leading);
    let index: Box<dyn OrderedIndex> = match index_type {
        IndexType::DenseSorted => Box::new(DenseSortedIndex::new(single())?),
        IndexType::RadixTree => Box::new(RadixTreeIndex::new(single())?),
        IndexType::BTree => Box::new(BTreeIndex::new(single())?),
        IndexType::CompositeDenseSorted => Box::new(CompositeSortedIndex::new(segments.to_vec())?),
        IndexType::PartialHash | IndexType::Invalid => {
            return Err(IndexError::invalid_argument(format!(
                "{index_type} is not a chunk-local ordered index"
            )))
        }
    };
    Ok(index)
}

/// Non-null row count, distinct key count and key width of a prospective
/// index.
///
/// Rows with a null in any key column are left out of both counts, as they
/// only land in the null list. The key width sums the widest value of each
/// column.
fn key_statistics(segments: &[Arc<Segment>]) -> (usize, usize, u32) {
    let value_bytes: usize = segments.iter().map(|s| s.max_value_width()).sum();
    let value_bytes = u32::try_from(value_bytes).unwrap_or(u32::MAX);

    match segments {
        [segment] => (
            segment.len() - segment.null_count(),
            segment.distinct_count(),
            value_bytes,
        ),
        _ => {
            let row_count = segments.first().map_or(0, |s| s.len());
            let keys: Vec<Vec<&Value>> = (0..row_count)
                .filter(|&row| segments.iter().all(|s| !s.values()[row].is_null()))
                .map(|row| segments.iter().map(|s| &s.values()[row]).collect())
                .collect();
            let distinct = keys.iter().collect::<HashSet<_>>().len();
            (keys.len(), distinct, value_bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cursor::IndexCursor;
    use crate::index::AbstractIndex;

    fn segment<T: Into<Value>>(values: Vec<T>) -> Arc<Segment> {
        Arc::new(Segment::from_values(values))
    }

    #[test]
    fn builds_every_ordered_type() {
        let config = IndexConfig::default();
        let segments = [segment(vec![3, 1, 2, 1])];
        for index_type in IndexType::ALL.into_iter().filter(|t| t.is_ordered()) {
            let index = create_ordered_index(&config, index_type, &segments).unwrap();
            assert_eq!(index.index_type(), index_type);
            assert!(index.is_index_for(&segments));
            let begin = index.lower_bound(&[Value::Integer(1)]).unwrap();
            let end = index.upper_bound(&[Value::Integer(1)]).unwrap();
            let run: Vec<u32> = begin.to(end).map(|o| o.as_u32()).collect();
            assert_eq!(run, vec![1, 3], "{index_type}");
        }
    }

    #[test]
    fn rejects_invalid_and_table_types() {
        let config = IndexConfig::default();
        let segments = [segment(vec![1])];
        for index_type in [IndexType::Invalid, IndexType::PartialHash] {
            assert!(matches!(
                create_ordered_index(&config, index_type, &segments),
                Err(IndexError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn validates_segment_lists() {
        let config = IndexConfig::default().max_key_columns(2);
        let two = [segment(vec![1]), segment(vec![2])];
        let three = [segment(vec![1]), segment(vec![2]), segment(vec![3])];

        assert!(matches!(
            create_ordered_index(&config, IndexType::BTree, &[]),
            Err(IndexError::PreconditionViolation { .. })
        ));
        assert!(matches!(
            create_ordered_index(&config, IndexType::DenseSorted, &two),
            Err(IndexError::InvalidArgument { .. })
        ));
        assert!(create_ordered_index(&config, IndexType::CompositeDenseSorted, &two).is_ok());
        assert!(matches!(
            create_ordered_index(&config, IndexType::CompositeDenseSorted, &three),
            Err(IndexError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn budget_refuses_large_builds() {
        let segments = [segment((0..1000).collect::<Vec<i64>>())];
        let config = IndexConfig::default().memory_budget(64);
        let err = create_ordered_index(&config, IndexType::DenseSorted, &segments).unwrap_err();
        match err {
            IndexError::BudgetExceeded {
                index_type,
                estimated,
                budget,
            } => {
                assert_eq!(index_type, IndexType::DenseSorted);
                assert_eq!(budget, 64);
                assert!(estimated > budget);
            }
            other => panic!("unexpected error: {other}"),
        }

        let roomy = IndexConfig::default().memory_budget(1 << 20);
        assert!(create_ordered_index(&roomy, IndexType::DenseSorted, &segments).is_ok());
    }

    #[test]
    fn composite_key_statistics() {
        let segments = [
            segment(vec![Some(1), Some(1), Some(2), None]),
            segment(vec![Some("ab"), Some("ab"), Some("c"), Some("d")]),
        ];
        assert_eq!(key_statistics(&segments), (3, 2, 8 + 2));
    }

    #[test]
    fn budget_counts_non_null_rows() {
        let mut values = vec![None; 64];
        values.push(Some(7));
        let segments = [segment(values)];
        assert_eq!(key_statistics(&segments), (1, 1, 8));

        let fitted = estimate_memory_consumption(IndexType::DenseSorted, 1, 1, 8).unwrap();
        let config = IndexConfig::default().memory_budget(fitted);
        let index = create_ordered_index(&config, IndexType::DenseSorted, &segments).unwrap();
        assert_eq!(index.null_positions().len(), 64);
    }
}
