//! Benchmark utilities.

use colidx_codec::Value;
use colidx_storage::{Chunk, Segment, Table};
use rand::Rng;
use std::sync::Arc;

/// Generate `rows` integers drawn from `0..distinct`.
pub fn random_integers(rows: usize, distinct: usize) -> Vec<Value> {
    let mut rng = rand::thread_rng();
    (0..rows)
        .map(|_| Value::Integer(rng.gen_range(0..distinct.max(1)) as i64))
        .collect()
}

/// Generate `rows` short strings drawn from `distinct` labels.
pub fn random_labels(rows: usize, distinct: usize) -> Vec<Value> {
    let mut rng = rand::thread_rng();
    (0..rows)
        .map(|_| Value::Text(format!("label_{:06}", rng.gen_range(0..distinct.max(1)))))
        .collect()
}

/// Generate a shared integer segment.
pub fn integer_segment(rows: usize, distinct: usize) -> Arc<Segment> {
    Arc::new(Segment::new(random_integers(rows, distinct)))
}

/// Generate a single-column integer table with `chunks` chunks.
pub fn integer_table(chunks: usize, rows: usize, distinct: usize) -> Table {
    let table = Table::new(1);
    for _ in 0..chunks {
        let chunk = Chunk::from_segments(vec![Segment::new(random_integers(rows, distinct))])
            .expect("single segment chunk");
        table.append_chunk(chunk).expect("column count matches");
    }
    table
}
