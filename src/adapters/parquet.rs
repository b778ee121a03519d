//! Parquet adapter via the parquet crate's arrow bridge.

use crate::{BenchError, BenchResult, FormatAdapter};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;

pub struct ParquetAdapter;

impl FormatAdapter for ParquetAdapter {
    fn name(&self) -> &'static str {
        "parquet"
    }

    fn extension(&self) -> &'static str {
        "parquet"
    }

    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
            .map_err(|e| BenchError::Serialization(format!("parquet writer: {}", e)))?;
        writer
            .write(batch)
            .map_err(|e| BenchError::Serialization(format!("parquet write: {}", e)))?;
        writer
            .close()
            .map_err(|e| BenchError::Serialization(format!("parquet close: {}", e)))?;
        Ok(())
    }

    fn read(&self, path: &Path) -> BenchResult<RecordBatch> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| BenchError::Serialization(format!("parquet reader: {}", e)))?
            .build()
            .map_err(|e| BenchError::Serialization(format!("parquet reader: {}", e)))?;
        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BenchError::Serialization(format!("parquet read: {}", e)))?;
        super::concat(batches)
    }
}
