//! Format adapter modules and the format registry.

pub mod csv;
pub mod excel;
pub mod feather;
pub mod hdf5;
pub mod json;
pub mod orc;
pub mod parquet;
pub mod pickle;
pub mod stata;
pub mod xml;

use crate::{BenchError, BenchResult, FormatAdapter};
use arrow::array::{ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ────────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────────

/// The closed set of supported serialization formats. Unknown names are
/// rejected when the selection is parsed, before any trial runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Csv,
    Json,
    Xml,
    Excel,
    Pickle,
    Hdf5,
    Feather,
    Parquet,
    Orc,
    Stata,
}

impl Format {
    pub const ALL: [Format; 10] = [
        Format::Csv,
        Format::Json,
        Format::Xml,
        Format::Excel,
        Format::Pickle,
        Format::Hdf5,
        Format::Feather,
        Format::Parquet,
        Format::Orc,
        Format::Stata,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Excel => "excel",
            Format::Pickle => "pickle",
            Format::Hdf5 => "hdf5",
            Format::Feather => "feather",
            Format::Parquet => "parquet",
            Format::Orc => "orc",
            Format::Stata => "stata",
        }
    }

    pub fn adapter(self) -> Box<dyn FormatAdapter> {
        match self {
            Format::Csv => Box::new(csv::CsvAdapter),
            Format::Json => Box::new(json::JsonAdapter),
            Format::Xml => Box::new(xml::XmlAdapter),
            Format::Excel => Box::new(excel::ExcelAdapter),
            Format::Pickle => Box::new(pickle::PickleAdapter),
            Format::Hdf5 => Box::new(hdf5::Hdf5Adapter),
            Format::Feather => Box::new(feather::FeatherAdapter),
            Format::Parquet => Box::new(parquet::ParquetAdapter),
            Format::Orc => Box::new(orc::OrcAdapter),
            Format::Stata => Box::new(stata::StataAdapter),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = BenchError;

    fn from_str(s: &str) -> BenchResult<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Format::ALL
            .into_iter()
            .find(|f| f.name() == lower)
            .ok_or_else(|| {
                let known: Vec<&str> = Format::ALL.iter().map(|f| f.name()).collect();
                BenchError::Config(format!(
                    "unknown format '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// Column views shared by the row-oriented adapters
// ────────────────────────────────────────────────────────────────────────────────

/// Owned values of one column, for adapters whose backing format is not
/// arrow-native (xml, excel, pickle, hdf5, stata).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum ColumnValues {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
}

/// Extract every column as owned values. Rejects nulls and any column type
/// outside Float64 / Int64 / Utf8.
pub(crate) fn columns_of(batch: &RecordBatch) -> BenchResult<Vec<(String, ColumnValues)>> {
    let schema = batch.schema();
    let mut out = Vec::with_capacity(batch.num_columns());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        if array.null_count() > 0 {
            return Err(BenchError::Serialization(format!(
                "column '{}' contains null values",
                field.name()
            )));
        }
        let values = match field.data_type() {
            DataType::Float64 => {
                ColumnValues::Float(array.as_primitive::<Float64Type>().values().to_vec())
            }
            DataType::Int64 => {
                ColumnValues::Int(array.as_primitive::<Int64Type>().values().to_vec())
            }
            DataType::Utf8 => {
                let strings = array.as_string::<i32>();
                ColumnValues::Text((0..strings.len()).map(|i| strings.value(i).to_string()).collect())
            }
            other => {
                return Err(BenchError::Serialization(format!(
                    "unsupported column type {} for column '{}'",
                    other,
                    field.name()
                )))
            }
        };
        out.push((field.name().clone(), values));
    }
    Ok(out)
}

/// Rebuild a batch from owned column values, in the given order.
pub(crate) fn batch_from_columns(
    columns: Vec<(String, ColumnValues)>,
) -> BenchResult<RecordBatch> {
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());
    for (name, values) in columns {
        match values {
            ColumnValues::Float(v) => {
                fields.push(Field::new(name.as_str(), DataType::Float64, false));
                arrays.push(Arc::new(Float64Array::from(v)));
            }
            ColumnValues::Int(v) => {
                fields.push(Field::new(name.as_str(), DataType::Int64, false));
                arrays.push(Arc::new(Int64Array::from(v)));
            }
            ColumnValues::Text(v) => {
                fields.push(Field::new(name.as_str(), DataType::Utf8, false));
                arrays.push(Arc::new(StringArray::from(v)));
            }
        }
    }
    let schema = Arc::new(Schema::new(fields));
    RecordBatch::try_new(schema, arrays)
        .map_err(|e| BenchError::Serialization(format!("rebuilding batch: {}", e)))
}

/// Concatenate the batches an artifact decoded into. Readers that chunk
/// their output go through this so every adapter returns a single batch.
pub(crate) fn concat(mut batches: Vec<RecordBatch>) -> BenchResult<RecordBatch> {
    match batches.len() {
        0 => Err(BenchError::Serialization(
            "artifact decoded to no record batches".into(),
        )),
        1 => Ok(batches.remove(0)),
        _ => {
            let schema = batches[0].schema();
            arrow::compute::concat_batches(&schema, &batches)
                .map_err(|e| BenchError::Serialization(format!("concatenating batches: {}", e)))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// Test support
// ────────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// Column-wise comparison: names and row counts must match exactly;
    /// numeric values must agree within `tol` (Int64 ↔ Float64 coercion is
    /// tolerated for formats that only store doubles); strings must match
    /// exactly.
    pub(crate) fn assert_batches_close(expected: &RecordBatch, actual: &RecordBatch, tol: f64) {
        assert_eq!(expected.num_rows(), actual.num_rows(), "row count");
        assert_eq!(expected.num_columns(), actual.num_columns(), "column count");
        let expected_cols = columns_of(expected).unwrap();
        let actual_cols = columns_of(actual).unwrap();
        for ((name_e, col_e), (name_a, col_a)) in expected_cols.iter().zip(actual_cols.iter()) {
            assert_eq!(name_e, name_a, "column name");
            match (col_e, col_a) {
                (ColumnValues::Text(e), ColumnValues::Text(a)) => assert_eq!(e, a, "{}", name_e),
                (e, a) => {
                    let e = as_floats(e).unwrap_or_else(|| panic!("{}: non-numeric", name_e));
                    let a = as_floats(a).unwrap_or_else(|| panic!("{}: non-numeric", name_e));
                    for (i, (x, y)) in e.iter().zip(a.iter()).enumerate() {
                        assert!(
                            (x - y).abs() <= tol.max(x.abs() * tol),
                            "{}[{}]: {} vs {}",
                            name_e,
                            i,
                            x,
                            y
                        );
                    }
                }
            }
        }
    }

    fn as_floats(values: &ColumnValues) -> Option<Vec<f64>> {
        match values {
            ColumnValues::Float(v) => Some(v.clone()),
            ColumnValues::Int(v) => Some(v.iter().map(|&i| i as f64).collect()),
            ColumnValues::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_name_parses_back() {
        for format in Format::ALL {
            assert_eq!(format.name().parse::<Format>().unwrap(), format);
            assert_eq!(format.adapter().name(), format.name());
        }
    }

    #[test]
    fn unknown_name_is_a_config_error() {
        let err = "avro".parse::<Format>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }

    #[test]
    fn parsing_is_case_and_whitespace_tolerant() {
        assert_eq!(" CSV ".parse::<Format>().unwrap(), Format::Csv);
        assert_eq!("Parquet".parse::<Format>().unwrap(), Format::Parquet);
    }

    #[test]
    fn mixed_columns_round_trip_through_views() {
        let batch = crate::dataset::DataGen::new(3).mixed_batch(16);
        let rebuilt = batch_from_columns(columns_of(&batch).unwrap()).unwrap();
        assert_eq!(batch, rebuilt);
    }
}
