//! Excel (.xlsx) adapter: rust_xlsxwriter for writing, calamine for reading.
//!
//! Spreadsheet cells hold 64-bit floats, so Int64 columns come back as
//! Float64. That is a fidelity limit of the format, not of the adapter.

use crate::{BenchError, BenchResult, FormatAdapter};
use arrow::record_batch::RecordBatch;
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::path::Path;

use super::ColumnValues;

pub struct ExcelAdapter;

impl FormatAdapter for ExcelAdapter {
    fn name(&self) -> &'static str {
        "excel"
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        let columns = super::columns_of(batch)?;
        if batch.num_rows() + 1 > 1_048_576 {
            return Err(BenchError::Serialization(format!(
                "{} rows exceed the xlsx sheet limit",
                batch.num_rows()
            )));
        }

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (c, (name, values)) in columns.iter().enumerate() {
            let c = c as u16;
            sheet
                .write_string(0, c, name.as_str())
                .map_err(|e| BenchError::Serialization(format!("xlsx write: {}", e)))?;
            match values {
                ColumnValues::Float(v) => {
                    for (r, x) in v.iter().enumerate() {
                        sheet
                            .write_number(r as u32 + 1, c, *x)
                            .map_err(|e| BenchError::Serialization(format!("xlsx write: {}", e)))?;
                    }
                }
                ColumnValues::Int(v) => {
                    for (r, x) in v.iter().enumerate() {
                        sheet
                            .write_number(r as u32 + 1, c, *x as f64)
                            .map_err(|e| BenchError::Serialization(format!("xlsx write: {}", e)))?;
                    }
                }
                ColumnValues::Text(v) => {
                    for (r, s) in v.iter().enumerate() {
                        sheet
                            .write_string(r as u32 + 1, c, s.as_str())
                            .map_err(|e| BenchError::Serialization(format!("xlsx write: {}", e)))?;
                    }
                }
            }
        }
        workbook
            .save(path)
            .map_err(|e| BenchError::Serialization(format!("xlsx save: {}", e)))?;
        Ok(())
    }

    fn read(&self, path: &Path) -> BenchResult<RecordBatch> {
        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e| BenchError::Serialization(format!("xlsx open: {}", e)))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| BenchError::Serialization("workbook has no sheets".into()))?;
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| BenchError::Serialization(format!("xlsx read: {}", e)))?;

        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| BenchError::Serialization("worksheet is empty".into()))?;
        let names: Vec<String> = header
            .iter()
            .map(|cell| match cell {
                Data::String(s) => Ok(s.clone()),
                other => Err(BenchError::Serialization(format!(
                    "header cell is not a string: {:?}",
                    other
                ))),
            })
            .collect::<BenchResult<_>>()?;

        let mut floats: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
        let mut texts: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        let mut is_text: Vec<Option<bool>> = vec![None; names.len()];
        for row in rows {
            for (c, cell) in row.iter().enumerate().take(names.len()) {
                match cell {
                    Data::Float(x) => {
                        mark(&mut is_text, c, false)?;
                        floats[c].push(*x);
                    }
                    Data::Int(x) => {
                        mark(&mut is_text, c, false)?;
                        floats[c].push(*x as f64);
                    }
                    Data::String(s) => {
                        mark(&mut is_text, c, true)?;
                        texts[c].push(s.clone());
                    }
                    other => {
                        return Err(BenchError::Serialization(format!(
                            "unsupported cell value {:?}",
                            other
                        )))
                    }
                }
            }
        }

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(c, name)| {
                let values = if is_text[c] == Some(true) {
                    ColumnValues::Text(std::mem::take(&mut texts[c]))
                } else {
                    ColumnValues::Float(std::mem::take(&mut floats[c]))
                };
                (name, values)
            })
            .collect();
        super::batch_from_columns(columns)
    }
}

fn mark(is_text: &mut [Option<bool>], column: usize, text: bool) -> BenchResult<()> {
    match is_text[column] {
        None => {
            is_text[column] = Some(text);
            Ok(())
        }
        Some(seen) if seen == text => Ok(()),
        Some(_) => Err(BenchError::Serialization(format!(
            "column {} mixes text and numeric cells",
            column
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_util::assert_batches_close;
    use crate::dataset::DataGen;
    use tempfile::TempDir;

    #[test]
    fn round_trips_with_int_to_float_coercion() {
        let batch = DataGen::new(12).mixed_batch(64);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.xlsx");
        let adapter = ExcelAdapter;
        adapter.write(&batch, &path).unwrap();
        let restored = adapter.read(&path).unwrap();
        // Int64 survives only as Float64; values still compare numerically.
        assert_batches_close(&batch, &restored, 1e-9);
        assert_eq!(
            restored.schema().field(0).data_type(),
            &arrow::datatypes::DataType::Float64
        );
    }

    #[test]
    fn float_columns_survive_the_decimal_rendering() {
        let batch = DataGen::new(13).float_batch(32, 3);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.xlsx");
        ExcelAdapter.write(&batch, &path).unwrap();
        let restored = ExcelAdapter.read(&path).unwrap();
        assert_batches_close(&batch, &restored, 1e-12);
    }
}
