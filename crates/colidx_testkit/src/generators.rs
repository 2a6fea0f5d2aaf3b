//! Property-based test generators using proptest.
//!
//! Value domains are kept small on purpose so that generated segments hold
//! many duplicates and nulls, which is where index bounds get interesting.

use colidx_codec::Value;
use colidx_core::IndexType;
use proptest::prelude::*;

/// Strategy for generating non-null values of every kind.
pub fn non_null_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        1 => any::<bool>().prop_map(Value::Bool),
        4 => (-20i64..20).prop_map(Value::Integer),
        1 => prop_oneof![Just(i64::MIN), Just(i64::MAX)].prop_map(Value::Integer),
        3 => prop::string::string_regex("[a-c]{0,3}")
            .expect("Invalid regex")
            .prop_map(Value::Text),
        1 => prop::collection::vec(0u8..3, 0..3).prop_map(Value::Bytes),
    ]
}

/// Strategy for generating values, about one in eight of them null.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        1 => Just(Value::Null),
        7 => non_null_value_strategy(),
    ]
}

/// Strategy for generating integer-only values with nulls.
///
/// Integer segments stress run grouping without mixing kinds.
pub fn integer_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        1 => Just(Value::Null),
        6 => (0i64..10).prop_map(Value::Integer),
    ]
}

/// Strategy for generating one segment's values.
pub fn segment_values_strategy(max_rows: usize) -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(value_strategy(), 0..max_rows)
}

/// Strategy for generating `columns` equally long columns of values.
pub fn columns_strategy(columns: usize, max_rows: usize) -> impl Strategy<Value = Vec<Vec<Value>>> {
    (0..max_rows).prop_flat_map(move |rows| {
        prop::collection::vec(prop::collection::vec(value_strategy(), rows), columns)
    })
}

/// Strategy for generating the chunks of a single-column table.
pub fn chunked_column_strategy(
    max_chunks: usize,
    max_rows: usize,
) -> impl Strategy<Value = Vec<Vec<Value>>> {
    prop::collection::vec(
        prop::collection::vec(integer_value_strategy(), 0..max_rows),
        1..max_chunks,
    )
}

/// Strategy for generating a query tuple of 1 to `max_width` values.
pub fn probe_strategy(max_width: usize) -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(value_strategy(), 1..=max_width)
}

/// Strategy for picking a buildable index type.
pub fn index_type_strategy() -> impl Strategy<Value = IndexType> {
    prop::sample::select(IndexType::ALL.to_vec())
}

/// Strategy for generating cost model inputs `(rows, distinct, value_bytes)`
/// with `distinct <= rows`.
pub fn cost_inputs_strategy() -> impl Strategy<Value = (usize, usize, u32)> {
    (0usize..1_000_000)
        .prop_flat_map(|rows| (Just(rows), 0..=rows, 0u32..512))
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn columns_have_equal_length(columns in columns_strategy(3, 20)) {
            prop_assert_eq!(columns.len(), 3);
            let rows = columns[0].len();
            prop_assert!(columns.iter().all(|c| c.len() == rows));
        }

        #[test]
        fn cost_inputs_are_consistent((rows, distinct, _) in cost_inputs_strategy()) {
            prop_assert!(distinct <= rows);
        }

        #[test]
        fn non_null_values_are_not_null(value in non_null_value_strategy()) {
            prop_assert!(!value.is_null());
        }

        #[test]
        fn index_types_are_valid(index_type in index_type_strategy()) {
            prop_assert!(index_type.is_valid());
        }
    }
}
