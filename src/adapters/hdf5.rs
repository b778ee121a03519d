//! HDF5 adapter (optional, behind the `hdf5` feature, which needs a native
//! libhdf5).
//!
//! Each column is stored as a 1-D dataset named after the column; root
//! attributes record column order and types, since HDF5 group iteration
//! does not preserve insertion order. Without the feature, both operations
//! report the backend as unavailable so the controller records the failure
//! and moves on.

use crate::{BenchResult, FormatAdapter};
use arrow::record_batch::RecordBatch;
use std::path::Path;

pub struct Hdf5Adapter;

impl FormatAdapter for Hdf5Adapter {
    fn name(&self) -> &'static str {
        "hdf5"
    }

    fn extension(&self) -> &'static str {
        "h5"
    }

    #[cfg(feature = "hdf5")]
    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        backend::write(batch, path)
    }

    #[cfg(not(feature = "hdf5"))]
    fn write(&self, _batch: &RecordBatch, _path: &Path) -> BenchResult<()> {
        Err(unavailable())
    }

    #[cfg(feature = "hdf5")]
    fn read(&self, path: &Path) -> BenchResult<RecordBatch> {
        backend::read(path)
    }

    #[cfg(not(feature = "hdf5"))]
    fn read(&self, _path: &Path) -> BenchResult<RecordBatch> {
        Err(unavailable())
    }
}

#[cfg(not(feature = "hdf5"))]
fn unavailable() -> crate::BenchError {
    crate::BenchError::Unavailable(
        "hdf5 backend not compiled in (enable the `hdf5` feature)".into(),
    )
}

#[cfg(feature = "hdf5")]
mod backend {
    use super::*;
    use crate::adapters::ColumnValues;
    use crate::BenchError;
    use hdf5::types::VarLenUnicode;
    use hdf5::File as H5File;

    fn h5err(e: hdf5::Error) -> BenchError {
        BenchError::Serialization(format!("hdf5: {}", e))
    }

    fn varlen(s: &str) -> BenchResult<VarLenUnicode> {
        s.parse::<VarLenUnicode>()
            .map_err(|e| BenchError::Serialization(format!("hdf5 string: {}", e)))
    }

    pub fn write(batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        let columns = crate::adapters::columns_of(batch)?;
        let file = H5File::create(path).map_err(h5err)?;

        let order = columns
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let kinds = columns
            .iter()
            .map(|(_, values)| match values {
                ColumnValues::Float(_) => "f",
                ColumnValues::Int(_) => "i",
                ColumnValues::Text(_) => "s",
            })
            .collect::<Vec<_>>()
            .join(",");
        file.new_attr::<VarLenUnicode>()
            .create("column_order")
            .map_err(h5err)?
            .write_scalar(&varlen(&order)?)
            .map_err(h5err)?;
        file.new_attr::<VarLenUnicode>()
            .create("column_types")
            .map_err(h5err)?
            .write_scalar(&varlen(&kinds)?)
            .map_err(h5err)?;

        for (name, values) in &columns {
            match values {
                ColumnValues::Float(v) => {
                    file.new_dataset_builder()
                        .with_data(v.as_slice())
                        .create(name.as_str())
                        .map_err(h5err)?;
                }
                ColumnValues::Int(v) => {
                    file.new_dataset_builder()
                        .with_data(v.as_slice())
                        .create(name.as_str())
                        .map_err(h5err)?;
                }
                ColumnValues::Text(v) => {
                    let strings = v
                        .iter()
                        .map(|s| varlen(s))
                        .collect::<BenchResult<Vec<_>>>()?;
                    file.new_dataset_builder()
                        .with_data(strings.as_slice())
                        .create(name.as_str())
                        .map_err(h5err)?;
                }
            }
        }
        Ok(())
    }

    pub fn read(path: &Path) -> BenchResult<RecordBatch> {
        let file = H5File::open(path).map_err(h5err)?;
        let order: VarLenUnicode = file
            .attr("column_order")
            .map_err(h5err)?
            .read_scalar()
            .map_err(h5err)?;
        let kinds: VarLenUnicode = file
            .attr("column_types")
            .map_err(h5err)?
            .read_scalar()
            .map_err(h5err)?;

        let names: Vec<&str> = order.as_str().split(',').collect();
        let types: Vec<&str> = kinds.as_str().split(',').collect();
        if names.len() != types.len() {
            return Err(BenchError::Serialization(
                "hdf5: column_order and column_types disagree".into(),
            ));
        }

        let mut columns = Vec::with_capacity(names.len());
        for (name, kind) in names.iter().zip(&types) {
            let dataset = file.dataset(name).map_err(h5err)?;
            let values = match *kind {
                "f" => ColumnValues::Float(dataset.read_raw::<f64>().map_err(h5err)?),
                "i" => ColumnValues::Int(dataset.read_raw::<i64>().map_err(h5err)?),
                "s" => ColumnValues::Text(
                    dataset
                        .read_raw::<VarLenUnicode>()
                        .map_err(h5err)?
                        .into_iter()
                        .map(|s| s.as_str().to_string())
                        .collect(),
                ),
                other => {
                    return Err(BenchError::Serialization(format!(
                        "hdf5: unknown column kind '{}'",
                        other
                    )))
                }
            };
            columns.push((name.to_string(), values));
        }
        crate::adapters::batch_from_columns(columns)
    }
}

#[cfg(all(test, feature = "hdf5"))]
mod tests {
    use super::*;
    use crate::dataset::DataGen;
    use tempfile::TempDir;

    #[test]
    fn round_trips_mixed_columns() {
        let batch = DataGen::new(61).mixed_batch(64);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.h5");
        let adapter = Hdf5Adapter;
        adapter.write(&batch, &path).unwrap();
        let restored = adapter.read(&path).unwrap();
        assert_eq!(batch, restored);
    }
}

#[cfg(all(test, not(feature = "hdf5")))]
mod tests {
    use super::*;
    use crate::dataset::DataGen;

    #[test]
    fn reports_unavailable_without_the_feature() {
        let batch = DataGen::new(61).float_batch(4, 1);
        let err = Hdf5Adapter
            .write(&batch, Path::new("/nonexistent/t.h5"))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Unavailable);
    }
}
