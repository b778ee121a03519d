//! CSV adapter via arrow-csv.
//!
//! The schema is re-inferred on read, so column types come back as whatever
//! the text representation suggests; float precision is bounded by the
//! decimal rendering.

use crate::{BenchError, BenchResult, FormatAdapter};
use arrow::csv::reader::Format as CsvFormat;
use arrow::csv::{ReaderBuilder, Writer};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

pub struct CsvAdapter;

impl FormatAdapter for CsvAdapter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        let file = File::create(path)?;
        let mut writer = Writer::new(file);
        writer
            .write(batch)
            .map_err(|e| BenchError::Serialization(format!("csv write: {}", e)))?;
        Ok(())
    }

    fn read(&self, path: &Path) -> BenchResult<RecordBatch> {
        let mut file = File::open(path)?;
        let format = CsvFormat::default().with_header(true);
        let (schema, _) = format
            .infer_schema(&mut file, None)
            .map_err(|e| BenchError::Serialization(format!("csv schema inference: {}", e)))?;
        file.rewind()?;
        let reader = ReaderBuilder::new(Arc::new(schema))
            .with_format(format)
            .build(file)
            .map_err(|e| BenchError::Serialization(format!("csv reader: {}", e)))?;
        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BenchError::Serialization(format!("csv read: {}", e)))?;
        super::concat(batches)
    }
}
