//! Microsoft Excel (.xlsx, .xls) extractor using calamine
//!
//! Every worksheet is read independently. The first non-empty row of a
//! sheet is its header; each following non-blank row becomes a keyed row.
//!
//! ## Column handling
//!
//! - Blank header cells are named `Unnamed: <index>`
//! - Repeated header names get `.1`, `.2`, ... suffixes
//! - Each column gets a type label: `int64`, `float64`, `bool`,
//!   `datetime64[ns]` or `object`. Integer columns with gaps become
//!   `float64`; columns with no values at all are `float64` too.
//! - Numeric columns get a summary: count, mean, sample std, min,
//!   quartiles (linear interpolation) and max

// Clippy pedantic allows:
// - Statistics convert counts and integers to f64
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

use crate::traits::DocumentExtractor;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Duration, NaiveDate};
use docset_core::{
    DocsetError, DocumentType, ExtractionRecord, InputFormat, NumericSummary, Row, Sheet,
    SheetStatistics, Units,
};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::io::Cursor;

/// Largest integer an f64 represents exactly (2^53)
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Milliseconds per day, for Excel serial date conversion
const MS_PER_DAY: f64 = 86_400_000.0;

/// Excel extractor (workbooks in both the 2007+ and the legacy format)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExcelExtractor;

/// Cell value after type normalization
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(String),
    Text(String),
}

impl Cell {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn to_header(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
            Self::DateTime(s) | Self::Text(s) => Some(s.clone()),
        }
    }
}

/// Inferred column type, named with the usual dataframe dtype labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Int64,
    Float64,
    Bool,
    DateTime,
    Object,
}

impl ColumnType {
    const fn label(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::DateTime => "datetime64[ns]",
            Self::Object => "object",
        }
    }

    const fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Infer a column's type from its cells
    fn infer<'a>(cells: impl Iterator<Item = &'a Cell>) -> Self {
        let (mut nulls, mut ints, mut floats, mut bools, mut dates, mut texts) =
            (0usize, 0usize, 0usize, 0usize, 0usize, 0usize);
        for cell in cells {
            match cell {
                Cell::Null => nulls += 1,
                Cell::Int(_) => ints += 1,
                Cell::Float(_) => floats += 1,
                Cell::Bool(_) => bools += 1,
                Cell::DateTime(_) => dates += 1,
                Cell::Text(_) => texts += 1,
            }
        }
        let non_null = ints + floats + bools + dates + texts;

        if non_null == 0 {
            Self::Float64
        } else if ints + floats == non_null {
            if floats > 0 || nulls > 0 {
                Self::Float64
            } else {
                Self::Int64
            }
        } else if bools == non_null && nulls == 0 {
            Self::Bool
        } else if dates == non_null {
            Self::DateTime
        } else {
            Self::Object
        }
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

/// JSON value of a cell within a column of the given type
fn cell_value(cell: &Cell, column: ColumnType) -> Value {
    match (cell, column) {
        (Cell::Null, _) => Value::Null,
        (Cell::Int(i), ColumnType::Float64) => float_value(*i as f64),
        (Cell::Int(i), _) => Value::from(*i),
        (Cell::Float(f), _) => float_value(*f),
        (Cell::Bool(b), _) => Value::Bool(*b),
        (Cell::DateTime(s) | Cell::Text(s), _) => Value::String(s.clone()),
    }
}

/// Render an Excel serial date (1900 date system) as `YYYY-MM-DD HH:MM:SS`
fn excel_serial_to_string(serial: f64) -> Option<String> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * MS_PER_DAY).round();
    if !millis.is_finite() {
        return None;
    }
    let datetime = base.checked_add_signed(Duration::milliseconds(millis as i64))?;
    Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn normalize_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Null,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => {
            // Workbooks store every number as a double; whole values read back as integers
            if f.is_finite() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INT {
                Cell::Int(*f as i64)
            } else {
                Cell::Float(*f)
            }
        }
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(e.to_string()),
        Data::DateTime(dt) => {
            if dt.is_datetime() {
                excel_serial_to_string(dt.as_f64())
                    .map_or_else(|| Cell::Float(dt.as_f64()), Cell::DateTime)
            } else {
                Cell::Float(dt.as_f64())
            }
        }
        Data::DateTimeIso(s) => Cell::DateTime(s.replacen('T', " ", 1)),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Make header names unique (`a`, `a.1`, `a.2`, ...)
fn dedupe_headers(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        let mut column = name;
        let mut current = counts.get(&column).copied().unwrap_or(0);
        while current > 0 {
            counts.insert(column.clone(), current + 1);
            column = format!("{column}.{current}");
            current = counts.get(&column).copied().unwrap_or(0);
        }
        counts.insert(column.clone(), current + 1);
        unique.push(column);
    }
    unique
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Describe-style summary of a numeric column
fn summarize(values: &[f64]) -> NumericSummary {
    let count = values.len();
    if count == 0 {
        return NumericSummary {
            count,
            mean: None,
            std: None,
            min: None,
            q25: None,
            q50: None,
            q75: None,
            max: None,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (count > 1).then(|| {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    });

    NumericSummary {
        count,
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        q50: quantile(&sorted, 0.50),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

impl ExcelExtractor {
    /// Create a new Excel extractor instance
    #[inline]
    #[must_use = "creates an extractor instance that should be used for parsing"]
    pub const fn new() -> Self {
        Self
    }

    /// Build a sheet from a worksheet range
    fn read_sheet(name: &str, range: &Range<Data>) -> Sheet {
        let mut raw_rows = range
            .rows()
            .map(|row| row.iter().map(normalize_cell).collect::<Vec<Cell>>())
            .filter(|row| !row.iter().all(|c| *c == Cell::Null));

        let Some(header_row) = raw_rows.next() else {
            log::debug!("Sheet '{name}' is empty");
            return Sheet {
                sheet_name: name.to_string(),
                column_names: Vec::new(),
                rows: Vec::new(),
                statistics: SheetStatistics {
                    total_rows: 0,
                    total_columns: 0,
                    null_values: Vec::new(),
                    data_types: Vec::new(),
                    numeric_summary: None,
                },
            };
        };

        let column_names = dedupe_headers(
            header_row
                .iter()
                .enumerate()
                .map(|(i, cell)| cell.to_header().unwrap_or_else(|| format!("Unnamed: {i}")))
                .collect(),
        );
        let body: Vec<Vec<Cell>> = raw_rows.collect();

        let column_types: Vec<ColumnType> = (0..column_names.len())
            .map(|col| ColumnType::infer(body.iter().map(|row| &row[col])))
            .collect();

        let rows: Vec<Row> = body
            .iter()
            .map(|cells| {
                column_names
                    .iter()
                    .zip(cells)
                    .zip(&column_types)
                    .map(|((name, cell), column)| (name.clone(), cell_value(cell, *column)))
                    .collect()
            })
            .collect();

        let null_values = column_names
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let nulls = body.iter().filter(|row| row[col] == Cell::Null).count();
                (name.clone(), nulls)
            })
            .collect();
        let data_types = column_names
            .iter()
            .zip(&column_types)
            .map(|(name, column)| (name.clone(), column.label().to_string()))
            .collect();

        let numeric: Vec<(String, NumericSummary)> = column_names
            .iter()
            .enumerate()
            .filter(|(col, _)| column_types[*col].is_numeric())
            .map(|(col, name)| {
                let values: Vec<f64> = body.iter().filter_map(|row| row[col].as_f64()).collect();
                (name.clone(), summarize(&values))
            })
            .collect();

        log::debug!(
            "Sheet '{name}': {} rows x {} columns",
            rows.len(),
            column_names.len()
        );

        Sheet {
            sheet_name: name.to_string(),
            statistics: SheetStatistics {
                total_rows: rows.len(),
                total_columns: column_names.len(),
                null_values,
                data_types,
                numeric_summary: (!numeric.is_empty()).then_some(numeric),
            },
            column_names,
            rows,
        }
    }
}

impl DocumentExtractor for ExcelExtractor {
    #[inline]
    fn document_type(&self) -> DocumentType {
        DocumentType::Excel
    }

    fn parse_bytes(&self, data: &[u8], format: InputFormat) -> Result<ExtractionRecord, DocsetError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
            .map_err(|e| DocsetError::Backend(format!("Failed to open workbook: {e}")))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name).map_err(|e| {
                DocsetError::Backend(format!("Failed to read sheet '{name}': {e}"))
            })?;
            sheets.push(Self::read_sheet(&name, &range));
        }

        let all_data: Vec<Row> = sheets.iter().flat_map(|s| s.rows.iter().cloned()).collect();
        log::debug!(
            "Workbook: {} sheets, {} rows in total",
            sheets.len(),
            all_data.len()
        );

        let mut record = ExtractionRecord::new(DocumentType::Excel);
        record.units = Units::Sheets(sheets);
        record.all_data = Some(all_data);
        record.metadata.insert("file_type", DocumentType::Excel.label());
        record
            .metadata
            .insert("format", format.extension().to_uppercase());
        Ok(record)
    }
}
