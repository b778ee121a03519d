//! ORC adapter via orc-rust (optional, behind the `orc` feature — orc-rust
//! pins its own arrow major, so the feature is enabled together with a
//! matching arrow bump).
//!
//! Without the feature, both operations report the backend as unavailable
//! so the controller records the failure and moves on.

use crate::{BenchResult, FormatAdapter};
use arrow::record_batch::RecordBatch;
use std::path::Path;

pub struct OrcAdapter;

impl FormatAdapter for OrcAdapter {
    fn name(&self) -> &'static str {
        "orc"
    }

    fn extension(&self) -> &'static str {
        "orc"
    }

    #[cfg(feature = "orc")]
    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        backend::write(batch, path)
    }

    #[cfg(not(feature = "orc"))]
    fn write(&self, _batch: &RecordBatch, _path: &Path) -> BenchResult<()> {
        Err(unavailable())
    }

    #[cfg(feature = "orc")]
    fn read(&self, path: &Path) -> BenchResult<RecordBatch> {
        backend::read(path)
    }

    #[cfg(not(feature = "orc"))]
    fn read(&self, _path: &Path) -> BenchResult<RecordBatch> {
        Err(unavailable())
    }
}

#[cfg(not(feature = "orc"))]
fn unavailable() -> crate::BenchError {
    crate::BenchError::Unavailable("orc backend not compiled in (enable the `orc` feature)".into())
}

#[cfg(feature = "orc")]
mod backend {
    use super::*;
    use crate::BenchError;
    use orc_rust::{ArrowReaderBuilder, ArrowWriterBuilder};
    use std::fs::File;

    pub fn write(batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        let file = File::create(path)?;
        let mut writer = ArrowWriterBuilder::new(file, batch.schema())
            .try_build()
            .map_err(|e| BenchError::Serialization(format!("orc writer: {}", e)))?;
        writer
            .write(batch)
            .map_err(|e| BenchError::Serialization(format!("orc write: {}", e)))?;
        writer
            .close()
            .map_err(|e| BenchError::Serialization(format!("orc close: {}", e)))?;
        Ok(())
    }

    pub fn read(path: &Path) -> BenchResult<RecordBatch> {
        let file = File::open(path)?;
        let reader = ArrowReaderBuilder::try_new(file)
            .map_err(|e| BenchError::Serialization(format!("orc reader: {}", e)))?
            .build();
        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BenchError::Serialization(format!("orc read: {}", e)))?;
        crate::adapters::concat(batches)
    }
}

#[cfg(all(test, feature = "orc"))]
mod tests {
    use super::*;
    use crate::adapters::test_util::assert_batches_close;
    use crate::dataset::DataGen;
    use tempfile::TempDir;

    #[test]
    fn round_trips_mixed_columns() {
        let batch = DataGen::new(71).mixed_batch(64);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.orc");
        let adapter = OrcAdapter;
        adapter.write(&batch, &path).unwrap();
        let restored = adapter.read(&path).unwrap();
        assert_batches_close(&batch, &restored, 0.0);
    }
}

#[cfg(all(test, not(feature = "orc")))]
mod tests {
    use super::*;
    use crate::dataset::DataGen;

    #[test]
    fn reports_unavailable_without_the_feature() {
        let batch = DataGen::new(71).float_batch(4, 1);
        let err = OrcAdapter
            .write(&batch, Path::new("/nonexistent/t.orc"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Unavailable);
    }
}
