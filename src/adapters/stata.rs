//! Stata (.dta) adapter.
//!
//! No registry crate covers Stata files, so this module carries a small
//! codec for the release-118 layout: tagged sections, little-endian header,
//! 129-byte variable names, fixed-width cells. Only the sections needed to
//! round-trip this harness's column types are written. Float64 maps to
//! `double`, Int64 to `long` when every value fits in 32 bits (otherwise
//! `double`, a documented fidelity limit), Utf8 to a fixed-width `str`.

use crate::{BenchError, BenchResult, FormatAdapter};
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use super::ColumnValues;

// Release-118 type codes.
const TYPE_DOUBLE: u16 = 65526;
const TYPE_LONG: u16 = 65528;
const MAX_STR_WIDTH: usize = 2045;
const VARNAME_BYTES: usize = 129;

pub struct StataAdapter;

impl FormatAdapter for StataAdapter {
    fn name(&self) -> &'static str {
        "stata"
    }

    fn extension(&self) -> &'static str {
        "dta"
    }

    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        let columns = super::columns_of(batch)?;
        let rows = batch.num_rows();
        if columns.len() > u16::MAX as usize {
            return Err(BenchError::Serialization(format!(
                "{} columns exceed the dta variable limit",
                columns.len()
            )));
        }

        let types: Vec<u16> = columns
            .iter()
            .map(|(name, values)| cell_type(name, values))
            .collect::<BenchResult<_>>()?;

        let file = File::create(path)?;
        let mut w = BufWriter::new(file);

        w.write_all(b"<stata_dta><header><release>118</release>")?;
        w.write_all(b"<byteorder>LSF</byteorder><K>")?;
        w.write_all(&(columns.len() as u16).to_le_bytes())?;
        w.write_all(b"</K><N>")?;
        w.write_all(&(rows as u64).to_le_bytes())?;
        w.write_all(b"</N></header>")?;

        w.write_all(b"<varnames>")?;
        for (name, _) in &columns {
            let bytes = name.as_bytes();
            if bytes.len() >= VARNAME_BYTES {
                return Err(BenchError::Serialization(format!(
                    "variable name '{}' is too long for dta",
                    name
                )));
            }
            w.write_all(bytes)?;
            w.write_all(&vec![0u8; VARNAME_BYTES - bytes.len()])?;
        }
        w.write_all(b"</varnames>")?;

        w.write_all(b"<variable_types>")?;
        for t in &types {
            w.write_all(&t.to_le_bytes())?;
        }
        w.write_all(b"</variable_types>")?;

        w.write_all(b"<data>")?;
        for row in 0..rows {
            for ((_, values), &t) in columns.iter().zip(&types) {
                match (values, t) {
                    (ColumnValues::Float(v), TYPE_DOUBLE) => {
                        w.write_all(&v[row].to_le_bytes())?;
                    }
                    (ColumnValues::Int(v), TYPE_LONG) => {
                        w.write_all(&(v[row] as i32).to_le_bytes())?;
                    }
                    (ColumnValues::Int(v), TYPE_DOUBLE) => {
                        w.write_all(&(v[row] as f64).to_le_bytes())?;
                    }
                    (ColumnValues::Text(v), width) => {
                        let bytes = v[row].as_bytes();
                        w.write_all(bytes)?;
                        w.write_all(&vec![0u8; width as usize - bytes.len()])?;
                    }
                    _ => unreachable!("type plan diverged from column values"),
                }
            }
        }
        w.write_all(b"</data></stata_dta>")?;

        w.flush()?;
        Ok(())
    }

    fn read(&self, path: &Path) -> BenchResult<RecordBatch> {
        let data = std::fs::read(path)?;
        let mut pos = 0usize;

        expect(&data, &mut pos, b"<stata_dta><header><release>118</release>")?;
        expect(&data, &mut pos, b"<byteorder>LSF</byteorder><K>")?;
        let k = u16::from_le_bytes(take(&data, &mut pos, 2)?.try_into().unwrap()) as usize;
        expect(&data, &mut pos, b"</K><N>")?;
        let n = u64::from_le_bytes(take(&data, &mut pos, 8)?.try_into().unwrap()) as usize;
        expect(&data, &mut pos, b"</N></header>")?;

        expect(&data, &mut pos, b"<varnames>")?;
        let mut names = Vec::with_capacity(k);
        for _ in 0..k {
            let raw = take(&data, &mut pos, VARNAME_BYTES)?;
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            let name = std::str::from_utf8(&raw[..end])
                .map_err(|_| malformed("variable name is not UTF-8"))?;
            names.push(name.to_string());
        }
        expect(&data, &mut pos, b"</varnames>")?;

        expect(&data, &mut pos, b"<variable_types>")?;
        let mut types = Vec::with_capacity(k);
        for _ in 0..k {
            types.push(u16::from_le_bytes(take(&data, &mut pos, 2)?.try_into().unwrap()));
        }
        expect(&data, &mut pos, b"</variable_types>")?;

        expect(&data, &mut pos, b"<data>")?;
        let mut columns: Vec<ColumnValues> = types
            .iter()
            .map(|&t| match t {
                TYPE_DOUBLE => Ok(ColumnValues::Float(Vec::with_capacity(n))),
                TYPE_LONG => Ok(ColumnValues::Int(Vec::with_capacity(n))),
                w if (1..=MAX_STR_WIDTH as u16).contains(&w) => {
                    Ok(ColumnValues::Text(Vec::with_capacity(n)))
                }
                other => Err(malformed(&format!("unsupported variable type {}", other))),
            })
            .collect::<BenchResult<_>>()?;
        for _ in 0..n {
            for (column, &t) in columns.iter_mut().zip(&types) {
                match column {
                    ColumnValues::Float(v) => {
                        v.push(f64::from_le_bytes(take(&data, &mut pos, 8)?.try_into().unwrap()));
                    }
                    ColumnValues::Int(v) => {
                        v.push(
                            i32::from_le_bytes(take(&data, &mut pos, 4)?.try_into().unwrap())
                                as i64,
                        );
                    }
                    ColumnValues::Text(v) => {
                        let raw = take(&data, &mut pos, t as usize)?;
                        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
                        let s = std::str::from_utf8(&raw[..end])
                            .map_err(|_| malformed("string cell is not UTF-8"))?;
                        v.push(s.to_string());
                    }
                }
            }
        }
        expect(&data, &mut pos, b"</data></stata_dta>")?;

        super::batch_from_columns(names.into_iter().zip(columns).collect())
    }
}

/// Pick the dta type code for one column: the str width for text, `long`
/// for 32-bit-safe integers, `double` otherwise.
fn cell_type(name: &str, values: &ColumnValues) -> BenchResult<u16> {
    match values {
        ColumnValues::Float(_) => Ok(TYPE_DOUBLE),
        ColumnValues::Int(v) => {
            let fits = v
                .iter()
                .all(|&x| x >= i32::MIN as i64 && x <= i32::MAX as i64);
            Ok(if fits { TYPE_LONG } else { TYPE_DOUBLE })
        }
        ColumnValues::Text(v) => {
            let width = v.iter().map(|s| s.len()).max().unwrap_or(1).max(1);
            if width > MAX_STR_WIDTH {
                return Err(BenchError::Serialization(format!(
                    "column '{}' has strings wider than the dta str limit",
                    name
                )));
            }
            Ok(width as u16)
        }
    }
}

fn take<'a>(data: &'a [u8], pos: &mut usize, len: usize) -> BenchResult<&'a [u8]> {
    let end = pos
        .checked_add(len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| malformed("truncated artifact"))?;
    let slice = &data[*pos..end];
    *pos = end;
    Ok(slice)
}

fn expect(data: &[u8], pos: &mut usize, tag: &[u8]) -> BenchResult<()> {
    if take(data, pos, tag.len())? != tag {
        return Err(malformed(&format!(
            "expected '{}'",
            String::from_utf8_lossy(tag)
        )));
    }
    Ok(())
}

fn malformed(detail: &str) -> BenchError {
    BenchError::Serialization(format!("not a dta artifact: {}", detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_util::assert_batches_close;
    use crate::adapters::{batch_from_columns, columns_of};
    use crate::dataset::DataGen;
    use rstest::rstest;
    use tempfile::TempDir;

    fn round_trip(batch: &RecordBatch) -> RecordBatch {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.dta");
        StataAdapter.write(batch, &path).unwrap();
        StataAdapter.read(&path).unwrap()
    }

    #[test]
    fn mixed_columns_round_trip() {
        let batch = DataGen::new(51).mixed_batch(128);
        let restored = round_trip(&batch);
        // ids fit in 32 bits, so the Int64 column comes back exactly.
        assert_eq!(batch, restored);
    }

    #[rstest]
    #[case::i32_bounds(vec![i32::MIN as i64, -1, 0, i32::MAX as i64], true)]
    #[case::beyond_i32(vec![0, i32::MAX as i64 + 1], false)]
    #[case::large_negative(vec![i32::MIN as i64 - 1, 5], false)]
    fn integer_columns_keep_exactness_inside_i32(#[case] ints: Vec<i64>, #[case] exact: bool) {
        let batch =
            batch_from_columns(vec![("n".to_string(), ColumnValues::Int(ints.clone()))]).unwrap();
        let restored = round_trip(&batch);
        let restored_cols = columns_of(&restored).unwrap();
        match (&restored_cols[0].1, exact) {
            (ColumnValues::Int(v), true) => assert_eq!(v, &ints),
            (ColumnValues::Float(v), false) => {
                for (x, y) in ints.iter().zip(v) {
                    assert_eq!(*x as f64, *y);
                }
            }
            (other, _) => panic!("unexpected column shape: {:?}", other),
        }
    }

    #[test]
    fn unicode_strings_round_trip() {
        let batch = batch_from_columns(vec![(
            "s".to_string(),
            ColumnValues::Text(vec!["plain".into(), "tschüß".into(), "".into()]),
        )])
        .unwrap();
        let restored = round_trip(&batch);
        assert_batches_close(&batch, &restored, 0.0);
    }

    #[test]
    fn rejects_malformed_artifacts() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.dta");
        std::fs::write(&path, b"<stata_dta><header><release>117</release>").unwrap();
        let err = StataAdapter.read(&path).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Serialization);
    }
}
