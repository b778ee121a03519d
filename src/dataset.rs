//! Deterministic dataset generation and the in-memory footprint baseline.

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Row count of the default generated dataset.
pub const DEFAULT_ROWS: usize = 1_000_000;

/// Column count of the default generated dataset.
pub const DEFAULT_COLS: usize = 5;

/// Default RNG seed.
pub const DEFAULT_SEED: u64 = 2908;

/// Seeded batch generator (deterministic via ChaCha8Rng).
pub struct DataGen {
    rng: ChaCha8Rng,
}

impl DataGen {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Batch of `cols` Float64 columns × `rows` uniform values in [0, 1),
    /// columns named `a`, `b`, `c`, ...
    pub fn float_batch(&mut self, rows: usize, cols: usize) -> RecordBatch {
        let mut fields = Vec::with_capacity(cols);
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(cols);
        for c in 0..cols {
            let values: Vec<f64> = (0..rows).map(|_| self.rng.gen::<f64>()).collect();
            fields.push(Field::new(column_name(c), DataType::Float64, false));
            arrays.push(Arc::new(Float64Array::from(values)));
        }
        let schema = Arc::new(Schema::new(fields));
        RecordBatch::try_new(schema, arrays).unwrap()
    }

    /// Batch with one Int64, one Float64 and one Utf8 column, for exercising
    /// adapters against mixed column types.
    pub fn mixed_batch(&mut self, rows: usize) -> RecordBatch {
        let ids: Vec<i64> = (0..rows as i64).collect();
        let values: Vec<f64> = (0..rows).map(|_| self.rng.gen_range(1.0..10_000.0)).collect();
        let labels: Vec<String> = (0..rows).map(|i| format!("row-{:06}", i)).collect();
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("value", DataType::Float64, false),
            Field::new("label", DataType::Utf8, false),
        ]));
        let arrays: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(ids)),
            Arc::new(Float64Array::from(values)),
            Arc::new(StringArray::from(labels)),
        ];
        RecordBatch::try_new(schema, arrays).unwrap()
    }
}

fn column_name(index: usize) -> String {
    if index < 26 {
        ((b'a' + index as u8) as char).to_string()
    } else {
        format!("c{}", index)
    }
}

/// In-memory byte footprint of the dataset, the size-comparison baseline for
/// on-disk artifacts. Deterministic for an unmutated batch; computed once
/// per run, never per trial.
pub fn memory_footprint(batch: &RecordBatch) -> usize {
    batch.get_array_memory_size()
}
