//! Build command implementation.
//!
//! Generates a two-column synthetic table (an integer column and a text
//! column derived from it), builds every index kind over it and reports the
//! measured footprint next to the planning-time estimate.

use colidx_codec::Value;
use colidx_core::{
    create_ordered_index, AbstractIndex, IndexConfig, IndexType, OrderedIndex, TableIndex,
    TableIndexRegistry, TableIndexStatistics,
};
use colidx_storage::{Chunk, ChunkId, ColumnId, Segment, Table};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Synthetic data and build parameters.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Rows per chunk.
    pub rows: usize,
    /// Distinct integer values.
    pub distinct: usize,
    /// Number of chunks.
    pub chunks: usize,
    /// Chunks covered by the partial hash index.
    pub covered: usize,
    /// Null rate in percent.
    pub null_percent: u8,
    /// Random seed.
    pub seed: u64,
    /// Per-index memory budget in bytes.
    pub budget: Option<usize>,
}

/// Size report for one built index.
#[derive(Debug, Serialize)]
pub struct IndexReport {
    /// Index type.
    pub index_type: IndexType,
    /// Number of key columns.
    pub key_columns: usize,
    /// Indexed non-null rows.
    pub rows: usize,
    /// Null rows kept apart.
    pub nulls: usize,
    /// Estimated footprint in bytes.
    pub estimated_bytes: usize,
    /// Measured footprint in bytes.
    pub measured_bytes: usize,
}

/// Build report.
#[derive(Debug, Serialize)]
pub struct BuildResult {
    /// Chunks in the synthetic table.
    pub chunks: usize,
    /// Rows in the synthetic table.
    pub table_rows: usize,
    /// One report per built index.
    pub indexes: Vec<IndexReport>,
    /// Registered table indexes.
    pub statistics: Vec<TableIndexStatistics>,
}

/// Generates the synthetic table.
pub fn synthetic_table(options: &BuildOptions) -> Result<Table, Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let null_rate = f64::from(options.null_percent) / 100.0;
    let table = Table::new(2);

    for _ in 0..options.chunks {
        let mut numbers = Vec::with_capacity(options.rows);
        let mut labels = Vec::with_capacity(options.rows);
        for _ in 0..options.rows {
            if rng.gen_bool(null_rate) {
                numbers.push(Value::Null);
                labels.push(Value::Null);
            } else {
                let n = rng.gen_range(0..options.distinct.max(1)) as i64;
                numbers.push(Value::Integer(n));
                labels.push(Value::Text(format!("label-{}", n % 97)));
            }
        }
        let chunk = Chunk::from_segments(vec![Segment::new(numbers), Segment::new(labels)])?;
        table.append_chunk(chunk)?;
    }
    Ok(table)
}

/// Builds every index kind and collects the reports.
pub fn build(options: &BuildOptions) -> Result<BuildResult, Box<dyn std::error::Error>> {
    let table = synthetic_table(options)?;
    info!(
        chunks = table.chunk_count(),
        rows = table.row_count(),
        "generated synthetic table"
    );

    let mut config = IndexConfig::default();
    if let Some(budget) = options.budget {
        config = config.memory_budget(budget);
    }

    let mut indexes = Vec::new();
    if let Some((_, chunk)) = table.chunks().into_iter().next() {
        let number = Arc::clone(chunk.segment(ColumnId::new(0))?);
        let label = Arc::clone(chunk.segment(ColumnId::new(1))?);

        let plans = [
            (IndexType::DenseSorted, vec![Arc::clone(&number)]),
            (IndexType::RadixTree, vec![Arc::clone(&number)]),
            (IndexType::BTree, vec![Arc::clone(&number)]),
            (IndexType::CompositeDenseSorted, vec![number, label]),
        ];
        for (index_type, segments) in plans {
            let index = create_ordered_index(&config, index_type, &segments)?;
            indexes.push(ordered_report(index.as_ref(), &segments)?);
        }
    }

    let registry = TableIndexRegistry::with_config(config);
    let covered: Vec<ChunkId> = (0..options.covered.min(options.chunks))
        .map(|i| ChunkId::new(i as u32))
        .collect();
    let hash = registry.create_partial_hash_index(&table, ColumnId::new(0), &covered, "number_hash")?;
    let width = hash
        .indexed_segments()
        .iter()
        .map(|s| s.max_value_width())
        .max()
        .unwrap_or(0);
    indexes.push(IndexReport {
        index_type: hash.index_type(),
        key_columns: 1,
        rows: hash.row_count(),
        nulls: hash.null_positions().len(),
        estimated_bytes: IndexType::PartialHash.estimate_memory_consumption(
            hash.row_count(),
            hash.distinct_count(),
            u32::try_from(width)?,
        )?,
        measured_bytes: hash.memory_consumption(),
    });
    info!(
        chunks = hash.indexed_chunk_ids().len(),
        "built partial hash index"
    );

    Ok(BuildResult {
        chunks: table.chunk_count(),
        table_rows: table.row_count(),
        indexes,
        statistics: registry.statistics(),
    })
}

fn ordered_report(
    index: &dyn OrderedIndex,
    segments: &[Arc<Segment>],
) -> Result<IndexReport, Box<dyn std::error::Error>> {
    let rows = index.positions().len();
    let distinct = {
        let mut keys: Vec<Vec<&Value>> = index
            .positions()
            .iter()
            .map(|offset| segments.iter().map(|s| &s.values()[offset.index()]).collect())
            .collect();
        keys.dedup();
        keys.len()
    };
    let width: usize = segments.iter().map(|s| s.max_value_width()).sum();
    Ok(IndexReport {
        index_type: index.index_type(),
        key_columns: segments.len(),
        rows,
        nulls: index.null_positions().len(),
        estimated_bytes: index
            .index_type()
            .estimate_memory_consumption(rows, distinct, u32::try_from(width)?)?,
        measured_bytes: index.memory_consumption(),
    })
}

/// Runs the build command.
pub fn run(options: &BuildOptions, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = build(options)?;

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

fn print_text_output(result: &BuildResult) {
    println!(
        "Synthetic table: {} chunks, {} rows",
        result.chunks, result.table_rows
    );
    println!();
    println!(
        "  {:<24} {:>4} {:>10} {:>8} {:>14} {:>14}",
        "index", "cols", "rows", "nulls", "estimated", "measured"
    );
    for report in &result.indexes {
        println!(
            "  {:<24} {:>4} {:>10} {:>8} {:>14} {:>14}",
            report.index_type.name(),
            report.key_columns,
            report.rows,
            report.nulls,
            report.estimated_bytes,
            report.measured_bytes
        );
    }

    if !result.statistics.is_empty() {
        println!();
        println!("Table indexes:");
        for stats in &result.statistics {
            let columns: Vec<String> = stats.column_ids.iter().map(ToString::to_string).collect();
            println!(
                "  {} ({}) on [{}]",
                stats.name,
                stats.index_type,
                columns.join(", ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> BuildOptions {
        BuildOptions {
            rows: 200,
            distinct: 20,
            chunks: 3,
            covered: 2,
            null_percent: 10,
            seed: 7,
            budget: None,
        }
    }

    #[test]
    fn synthetic_table_is_deterministic() {
        let a = synthetic_table(&options()).unwrap();
        let b = synthetic_table(&options()).unwrap();
        assert_eq!(a.row_count(), 600);
        let first = |t: &Table| t.chunk(ChunkId::new(0)).unwrap().segments()[0].values().to_vec();
        assert_eq!(first(&a), first(&b));
    }

    #[test]
    fn builds_every_kind() {
        let result = build(&options()).unwrap();
        assert_eq!(result.indexes.len(), 5);
        for report in &result.indexes {
            assert!(report.measured_bytes > 0);
        }
        let hash = &result.indexes[4];
        assert_eq!(hash.index_type, IndexType::PartialHash);
        assert_eq!(hash.rows + hash.nulls, 400);
        assert_eq!(result.statistics.len(), 1);
    }

    #[test]
    fn zero_covered_chunks_is_an_error() {
        let mut options = options();
        options.covered = 0;
        let err = build(&options).unwrap_err();
        assert!(err.to_string().contains("at least one chunk"), "{err}");
    }

    #[test]
    fn budget_is_enforced() {
        let mut options = options();
        options.budget = Some(8);
        assert!(build(&options).is_err());
    }
}
