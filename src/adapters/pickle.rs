//! Pickle adapter via serde-pickle.
//!
//! The artifact is a pickle stream of `(name, values)` column pairs, so the
//! batch round-trips exactly, including Int64 columns.

use crate::{BenchError, BenchResult, FormatAdapter};
use arrow::record_batch::RecordBatch;
use serde_pickle::{DeOptions, SerOptions};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use super::ColumnValues;

pub struct PickleAdapter;

impl FormatAdapter for PickleAdapter {
    fn name(&self) -> &'static str {
        "pickle"
    }

    fn extension(&self) -> &'static str {
        "pkl"
    }

    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        let columns = super::columns_of(batch)?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_pickle::to_writer(&mut writer, &columns, SerOptions::new())
            .map_err(|e| BenchError::Serialization(format!("pickle write: {}", e)))?;
        writer.flush()?;
        Ok(())
    }

    fn read(&self, path: &Path) -> BenchResult<RecordBatch> {
        let file = File::open(path)?;
        let columns: Vec<(String, ColumnValues)> =
            serde_pickle::from_reader(BufReader::new(file), DeOptions::new())
                .map_err(|e| BenchError::Serialization(format!("pickle read: {}", e)))?;
        super::batch_from_columns(columns)
    }
}
