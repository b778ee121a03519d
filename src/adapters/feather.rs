//! Feather adapter. Feather v2 is the Arrow IPC file format, so this is a
//! direct pass-through to arrow-ipc and round-trips exactly.

use crate::{BenchError, BenchResult, FormatAdapter};
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::path::Path;

pub struct FeatherAdapter;

impl FormatAdapter for FeatherAdapter {
    fn name(&self) -> &'static str {
        "feather"
    }

    fn extension(&self) -> &'static str {
        "feather"
    }

    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        let file = File::create(path)?;
        let schema = batch.schema();
        let mut writer = FileWriter::try_new(file, &schema)
            .map_err(|e| BenchError::Serialization(format!("ipc writer: {}", e)))?;
        writer
            .write(batch)
            .map_err(|e| BenchError::Serialization(format!("ipc write: {}", e)))?;
        writer
            .finish()
            .map_err(|e| BenchError::Serialization(format!("ipc finish: {}", e)))?;
        Ok(())
    }

    fn read(&self, path: &Path) -> BenchResult<RecordBatch> {
        let file = File::open(path)?;
        let reader = FileReader::try_new(file, None)
            .map_err(|e| BenchError::Serialization(format!("ipc reader: {}", e)))?;
        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BenchError::Serialization(format!("ipc read: {}", e)))?;
        super::concat(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataGen;
    use tempfile::TempDir;

    #[test]
    fn round_trips_exactly() {
        let batch = DataGen::new(31).mixed_batch(256);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.feather");
        let adapter = FeatherAdapter;
        adapter.write(&batch, &path).unwrap();
        let restored = adapter.read(&path).unwrap();
        assert_eq!(batch, restored);
    }
}
