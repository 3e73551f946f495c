//! CSV export of tabular rows.
//!
//! The header is taken from the first row's keys. Cells are written as
//! plain text: strings verbatim, null as empty, nested objects and arrays
//! as their compact JSON text.

use crate::error::{DocsetError, Result};
use crate::record::Row;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Write `rows` as CSV to any writer.
///
/// Keys missing from a row produce empty cells; keys absent from the header
/// are dropped with a warning.
///
/// # Errors
///
/// Returns [`DocsetError::Formatting`] when `rows` is empty, or a CSV/IO
/// error when writing fails.
pub fn write_csv_to<W: Write>(rows: &[Row], writer: W) -> Result<usize> {
    let first = rows
        .first()
        .ok_or_else(|| DocsetError::Formatting("No data to convert to CSV".to_string()))?;
    let header: Vec<&String> = first.keys().collect();

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&header)?;

    for (index, row) in rows.iter().enumerate() {
        let extra = row.keys().filter(|k| !first.contains_key(*k)).count();
        if extra > 0 {
            log::warn!("CSV row {index} has {extra} field(s) not in the header; dropping them");
        }
        let record: Vec<String> = header
            .iter()
            .map(|key| row.get(*key).map(cell_text).unwrap_or_default())
            .collect();
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(rows.len())
}

/// Write `rows` as a UTF-8 CSV file at `path`.
///
/// Nothing is created when `rows` is empty.
///
/// # Errors
///
/// Returns [`DocsetError::Formatting`] when `rows` is empty, or an IO/CSV
/// error when the file cannot be written.
pub fn write_csv(rows: &[Row], path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if rows.is_empty() {
        return Err(DocsetError::Formatting(
            "No data to convert to CSV".to_string(),
        ));
    }

    let file = std::fs::File::create(path)?;
    let written = write_csv_to(rows, std::io::BufWriter::new(file))?;
    log::debug!("Wrote {written} CSV rows to {}", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: &[Value]) -> Vec<Row> {
        values
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn to_string(rows: &[Row]) -> String {
        let mut buf = Vec::new();
        write_csv_to(rows, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_from_first_row() {
        let data = rows(&[json!({"a": "1", "b": "2"}), json!({"a": "3", "b": "4"})]);
        assert_eq!(to_string(&data), "a,b\n1,2\n3,4\n");
    }

    #[test]
    fn test_cell_rendering() {
        let data = rows(&[json!({
            "s": "x, y",
            "n": 2.5,
            "i": 7,
            "b": true,
            "z": null,
            "o": {"k": 1},
            "l": [1, 2]
        })]);
        let out = to_string(&data);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("s,n,i,b,z,o,l"));
        assert_eq!(
            lines.next(),
            Some(r#""x, y",2.5,7,true,,"{""k"":1}","[1,2]""#)
        );
    }

    #[test]
    fn test_missing_and_extra_keys() {
        let data = rows(&[json!({"a": "1", "b": "2"}), json!({"b": "4", "c": "9"})]);
        assert_eq!(to_string(&data), "a,b\n1,2\n,4\n");
    }

    #[test]
    fn test_empty_rows_is_formatting_error() {
        let mut buf = Vec::new();
        let err = write_csv_to(&[], &mut buf).unwrap_err();
        assert!(matches!(err, DocsetError::Formatting(_)));
        assert_eq!(err.to_string(), "No data to convert to CSV");
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let data = rows(&[json!({"name": "Ann"})]);

        let written = write_csv(&data, &path).unwrap();
        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "name\nAnn\n");
    }

    #[test]
    fn test_write_csv_empty_creates_no_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        assert!(write_csv(&[], &path).is_err());
        assert!(!path.exists());
    }
}
