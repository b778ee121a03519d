//! XML adapter via quick-xml.
//!
//! Layout is one element per row with one child element per column:
//! `<data><row><a>0.25</a><b>7</b></row>...</data>`. Column types are
//! re-inferred on read (integer, then float, then text), matching how the
//! other text formats behave.

use crate::{BenchError, BenchResult, FormatAdapter};
use arrow::record_batch::RecordBatch;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use super::ColumnValues;

pub struct XmlAdapter;

impl FormatAdapter for XmlAdapter {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn extension(&self) -> &'static str {
        "xml"
    }

    fn write(&self, batch: &RecordBatch, path: &Path) -> BenchResult<()> {
        let columns = super::columns_of(batch)?;
        let file = File::create(path)?;
        let mut writer = Writer::new(BufWriter::new(file));

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| BenchError::Serialization(format!("xml write: {}", e)))?;
        write_open(&mut writer, "data")?;
        let mut cell = String::new();
        for row in 0..batch.num_rows() {
            write_open(&mut writer, "row")?;
            for (name, values) in &columns {
                cell.clear();
                match values {
                    ColumnValues::Float(v) => cell.push_str(&v[row].to_string()),
                    ColumnValues::Int(v) => cell.push_str(&v[row].to_string()),
                    ColumnValues::Text(v) => cell.push_str(&v[row]),
                }
                write_open(&mut writer, name)?;
                writer
                    .write_event(Event::Text(BytesText::new(&cell)))
                    .map_err(|e| BenchError::Serialization(format!("xml write: {}", e)))?;
                write_close(&mut writer, name)?;
            }
            write_close(&mut writer, "row")?;
        }
        write_close(&mut writer, "data")?;

        writer.into_inner().flush()?;
        Ok(())
    }

    fn read(&self, path: &Path) -> BenchResult<RecordBatch> {
        let file = File::open(path)?;
        let mut reader = Reader::from_reader(BufReader::new(file));

        // Raw cell strings per column, in first-row column order.
        let mut names: Vec<String> = Vec::new();
        let mut cells: Vec<Vec<String>> = Vec::new();
        let mut rows = 0usize;
        let mut field: Option<(usize, bool)> = None; // (column index, text seen)
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match tag.as_str() {
                        "data" => {}
                        "row" => rows += 1,
                        _ => {
                            let index = match names.iter().position(|n| *n == tag) {
                                Some(i) => i,
                                None if rows == 1 => {
                                    names.push(tag);
                                    cells.push(Vec::new());
                                    names.len() - 1
                                }
                                None => {
                                    return Err(BenchError::Serialization(format!(
                                        "xml read: unexpected element '{}' after first row",
                                        tag
                                    )))
                                }
                            };
                            field = Some((index, false));
                        }
                    }
                }
                Ok(Event::Text(t)) => {
                    if let Some((index, seen)) = field.as_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| BenchError::Serialization(format!("xml read: {}", e)))?;
                        if !text.trim().is_empty() || !*seen {
                            if *seen {
                                // second text node in one cell, concatenate
                                let last = cells[*index].last_mut().unwrap();
                                last.push_str(&text);
                            } else {
                                cells[*index].push(text.into_owned());
                            }
                            *seen = true;
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if tag != "row" && tag != "data" {
                        if let Some((index, seen)) = field.take() {
                            if !seen {
                                cells[index].push(String::new());
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(BenchError::Serialization(format!("xml read: {}", e)));
                }
            }
            buf.clear();
        }

        if names.is_empty() {
            return Err(BenchError::Serialization(
                "xml read: no row elements found".into(),
            ));
        }
        for (name, column) in names.iter().zip(cells.iter()) {
            if column.len() != rows {
                return Err(BenchError::Serialization(format!(
                    "xml read: column '{}' has {} values for {} rows",
                    name,
                    column.len(),
                    rows
                )));
            }
        }

        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| (name, infer_values(raw)))
            .collect();
        super::batch_from_columns(columns)
    }
}

fn write_open<W: std::io::Write>(writer: &mut Writer<W>, tag: &str) -> BenchResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(|e| BenchError::Serialization(format!("xml write: {}", e)))
}

fn write_close<W: std::io::Write>(writer: &mut Writer<W>, tag: &str) -> BenchResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(|e| BenchError::Serialization(format!("xml write: {}", e)))
}

/// Narrowest type that parses every cell: Int64, then Float64, then Utf8.
fn infer_values(raw: Vec<String>) -> ColumnValues {
    if let Ok(ints) = raw.iter().map(|s| s.parse::<i64>()).collect::<Result<Vec<_>, _>>() {
        return ColumnValues::Int(ints);
    }
    if let Ok(floats) = raw.iter().map(|s| s.parse::<f64>()).collect::<Result<Vec<_>, _>>() {
        return ColumnValues::Float(floats);
    }
    ColumnValues::Text(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_util::assert_batches_close;
    use crate::dataset::DataGen;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn round_trips_mixed_columns() {
        let batch = DataGen::new(9).mixed_batch(64);
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.xml");
        let adapter = XmlAdapter;
        adapter.write(&batch, &path).unwrap();
        let restored = adapter.read(&path).unwrap();
        assert_batches_close(&batch, &restored, 1e-9);
    }

    #[test]
    fn escapes_markup_in_text_cells() {
        use arrow::array::StringArray;
        use arrow::datatypes::{DataType, Field, Schema};
        use std::sync::Arc;

        let schema = Arc::new(Schema::new(vec![Field::new("s", DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["a <b> & \"c\"", "plain"]))],
        )
        .unwrap();
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.xml");
        XmlAdapter.write(&batch, &path).unwrap();
        let restored = XmlAdapter.read(&path).unwrap();
        assert_eq!(batch, restored);
    }

    #[rstest]
    #[case::ints(vec!["1", "-2", "30"], ColumnValues::Int(vec![1, -2, 30]))]
    #[case::floats(vec!["1.5", "2", "-0.25"], ColumnValues::Float(vec![1.5, 2.0, -0.25]))]
    #[case::text(vec!["1", "x", "3"], ColumnValues::Text(vec!["1".into(), "x".into(), "3".into()]))]
    fn inference_picks_narrowest_type(#[case] raw: Vec<&str>, #[case] expected: ColumnValues) {
        let raw: Vec<String> = raw.into_iter().map(String::from).collect();
        assert_eq!(infer_values(raw), expected);
    }
}
