//! Estimate command implementation.

use colidx_core::{estimate_memory_consumption, IndexType};
use serde::Serialize;

/// One row of the estimate report.
#[derive(Debug, Serialize)]
pub struct EstimateRow {
    /// Index type.
    pub index_type: IndexType,
    /// Predicted footprint in bytes.
    pub bytes: usize,
}

/// Estimate report.
#[derive(Debug, Serialize)]
pub struct EstimateResult {
    /// Number of indexed rows.
    pub rows: usize,
    /// Number of distinct keys.
    pub distinct: usize,
    /// Key width in bytes.
    pub value_bytes: u32,
    /// One estimate per requested type.
    pub estimates: Vec<EstimateRow>,
}

/// Computes the estimates for `index_type`, or for every type if `None`.
pub fn estimate(
    rows: usize,
    distinct: usize,
    value_bytes: u32,
    index_type: Option<IndexType>,
) -> Result<EstimateResult, colidx_core::IndexError> {
    let types = match index_type {
        Some(index_type) => vec![index_type],
        None => IndexType::ALL.to_vec(),
    };
    let estimates = types
        .into_iter()
        .map(|index_type| {
            estimate_memory_consumption(index_type, rows, distinct, value_bytes)
                .map(|bytes| EstimateRow { index_type, bytes })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EstimateResult {
        rows,
        distinct,
        value_bytes,
        estimates,
    })
}

/// Runs the estimate command.
pub fn run(
    rows: usize,
    distinct: usize,
    value_bytes: u32,
    index_type: Option<IndexType>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if distinct > rows {
        return Err(format!("distinct count {distinct} exceeds row count {rows}").into());
    }
    let result = estimate(rows, distinct, value_bytes, index_type)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &EstimateResult) {
    println!(
        "Estimates for {} rows, {} distinct keys, {} bytes per key",
        result.rows, result.distinct, result.value_bytes
    );
    println!();
    for row in &result.estimates {
        println!("  {:<24} {:>14} bytes", row.index_type.name(), row.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_types_by_default() {
        let result = estimate(1000, 100, 8, None).unwrap();
        assert_eq!(result.estimates.len(), IndexType::ALL.len());
    }

    #[test]
    fn single_type() {
        let result = estimate(1000, 100, 8, Some(IndexType::BTree)).unwrap();
        assert_eq!(result.estimates.len(), 1);
        assert_eq!(result.estimates[0].index_type, IndexType::BTree);
    }

    #[test]
    fn invalid_type_is_an_error() {
        assert!(estimate(1, 1, 8, Some(IndexType::Invalid)).is_err());
    }

    #[test]
    fn json_uses_type_names() {
        let result = estimate(10, 2, 8, Some(IndexType::RadixTree)).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"radix-tree\""));
    }
}
