//! Extraction record: the normalized in-memory representation of one document.
//!
//! Every extractor produces an [`ExtractionRecord`]. The record is a closed
//! struct rather than an open key/value bag: format-specific structure lives
//! in [`Units`], tables in [`Table`], and tabular data in [`Row`] maps.
//!
//! Serialization is hand-written so the emitted JSON has a stable key order
//! per document type and carries derived counts (`total_pages`,
//! `total_rows`, ...) that are never stored separately and so cannot drift
//! from the data they count.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

/// One tabular row: column name to cell value, in column order.
pub type Row = Map<String, Value>;

/// Number of rows included in sheet and CSV previews.
pub const PREVIEW_ROWS: usize = 10;

/// Whitespace-delimited word count.
#[inline]
#[must_use = "returns the word count without side effects"]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Kind of document an extraction record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// PDF document
    Pdf,
    /// Word document (.docx, .doc)
    Word,
    /// Excel workbook (.xlsx, .xls)
    Excel,
    /// Plain text file
    Text,
    /// Delimited text file
    Csv,
}

impl DocumentType {
    /// Label written to the `document_type` field.
    #[inline]
    #[must_use = "returns the label without side effects"]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Word => "Word Document",
            Self::Excel => "Excel Spreadsheet",
            Self::Text => "Text File",
            Self::Csv => "CSV File",
        }
    }

    /// Noun used in extraction failure messages (`Failed to extract <noun>: ...`).
    #[inline]
    #[must_use = "returns the noun without side effects"]
    pub const fn failure_noun(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Word => "Word document",
            Self::Excel => "Excel file",
            Self::Text => "text file",
            Self::Csv => "CSV file",
        }
    }
}

impl std::fmt::Display for DocumentType {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DocumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Ordered string-to-string metadata map.
///
/// Keys keep insertion order; inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    /// Placeholder for metadata fields the document does not carry.
    pub const NOT_AVAILABLE: &'static str = "N/A";

    /// Create an empty metadata map.
    #[inline]
    #[must_use = "creates an empty metadata map"]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Insert a value, substituting `N/A` when it is absent or blank.
    pub fn insert_or_na(&mut self, key: impl Into<String>, value: Option<String>) {
        let value = value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| Self::NOT_AVAILABLE.to_string());
        self.insert(key, value);
    }

    /// Look up a value by key.
    #[must_use = "returns the value without side effects"]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[inline]
    #[must_use = "returns the length without side effects"]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[inline]
    #[must_use = "returns whether the map is empty without side effects"]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Serialize a list of pairs as an ordered map.
fn serialize_pairs<S, V>(pairs: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in pairs {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Text of one PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageUnit {
    /// 1-based page number
    pub page_number: usize,
    pub text: String,
    pub word_count: usize,
}

impl PageUnit {
    /// Build a page, counting its words.
    #[must_use = "creates a page unit"]
    pub fn new(page_number: usize, text: String) -> Self {
        let word_count = word_count(&text);
        Self {
            page_number,
            text,
            word_count,
        }
    }
}

/// One non-empty Word paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParagraphUnit {
    pub text: String,
    /// Display name of the paragraph style
    pub style: String,
    pub word_count: usize,
}

impl ParagraphUnit {
    /// Build a paragraph, counting its words.
    #[must_use = "creates a paragraph unit"]
    pub fn new(text: String, style: String) -> Self {
        let word_count = word_count(&text);
        Self {
            text,
            style,
            word_count,
        }
    }
}

/// One non-blank line of a text file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineUnit {
    /// 1-based position in the raw file, blank lines included
    pub line_number: usize,
    pub text: String,
}

/// Descriptive statistics of one numeric spreadsheet column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation, absent below two values
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Per-sheet statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetStatistics {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Null cell count per column
    #[serde(serialize_with = "serialize_pairs")]
    pub null_values: Vec<(String, usize)>,
    /// Inferred type label per column
    #[serde(serialize_with = "serialize_pairs")]
    pub data_types: Vec<(String, String)>,
    /// Present only when the sheet has numeric columns
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_summary"
    )]
    pub numeric_summary: Option<Vec<(String, NumericSummary)>>,
}

#[allow(clippy::ref_option)] // serde serialize_with signature
fn serialize_summary<S: Serializer>(
    summary: &Option<Vec<(String, NumericSummary)>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match summary {
        Some(pairs) => serialize_pairs(pairs, serializer),
        None => serializer.serialize_none(),
    }
}

/// One worksheet of a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub sheet_name: String,
    pub column_names: Vec<String>,
    pub rows: Vec<Row>,
    pub statistics: SheetStatistics,
}

impl Serialize for Sheet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let preview = &self.rows[..self.rows.len().min(PREVIEW_ROWS)];
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("sheet_name", &self.sheet_name)?;
        map.serialize_entry("rows", &self.rows.len())?;
        map.serialize_entry("columns", &self.column_names.len())?;
        map.serialize_entry("column_names", &self.column_names)?;
        map.serialize_entry("data", &self.rows)?;
        map.serialize_entry("preview", preview)?;
        map.serialize_entry("statistics", &self.statistics)?;
        map.end()
    }
}

/// A table as rows of cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// 1-based page number (PDF only)
    pub page: Option<usize>,
    /// 1-based index of the table within its page or document
    pub table_index: usize,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    #[inline]
    #[must_use = "returns the row count without side effects"]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row.
    #[inline]
    #[must_use = "returns the column count without side effects"]
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Convert to rows keyed by the first row's cells.
    ///
    /// Returns `None` unless the table has a header and at least one data row.
    /// Rows shorter or longer than the header are truncated to the shorter of
    /// the two.
    #[must_use = "returns the keyed rows without side effects"]
    pub fn to_keyed_rows(&self) -> Option<Vec<Row>> {
        let (header, body) = self.rows.split_first()?;
        if body.is_empty() {
            return None;
        }
        let rows = body
            .iter()
            .map(|cells| {
                header
                    .iter()
                    .zip(cells)
                    .map(|(key, cell)| (key.clone(), Value::String(cell.clone())))
                    .collect()
            })
            .collect();
        Some(rows)
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(page) = self.page {
            map.serialize_entry("page", &page)?;
        }
        map.serialize_entry("table_index", &self.table_index)?;
        map.serialize_entry("rows", &self.row_count())?;
        map.serialize_entry("columns", &self.column_count())?;
        map.serialize_entry("data", &self.rows)?;
        map.end()
    }
}

/// Format-specific structural units of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Units {
    #[default]
    None,
    Pages(Vec<PageUnit>),
    Paragraphs(Vec<ParagraphUnit>),
    Lines(Vec<LineUnit>),
    Sheets(Vec<Sheet>),
    /// First rows of a delimited file
    Preview(Vec<Row>),
}

/// Normalized result of extracting one document.
///
/// When `error` is set every other field except `document_type` is
/// meaningless and is not serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRecord {
    pub document_type: DocumentType,
    /// Detected text encoding (text and CSV files)
    pub encoding: Option<String>,
    pub full_text: Option<String>,
    pub units: Units,
    pub tables: Option<Vec<Table>>,
    /// Rows of a delimited file, serialized as `data`
    pub tabular_rows: Option<Vec<Row>>,
    /// Header row of a delimited file
    pub headers: Option<Vec<String>>,
    /// Rows of every sheet of a workbook, concatenated
    pub all_data: Option<Vec<Row>>,
    /// Raw line count of a text file, blank lines included
    pub total_lines: Option<usize>,
    pub metadata: Metadata,
    pub error: Option<String>,
}

impl ExtractionRecord {
    /// Create an empty record of the given type.
    #[inline]
    #[must_use = "creates an empty record"]
    pub const fn new(document_type: DocumentType) -> Self {
        Self {
            document_type,
            encoding: None,
            full_text: None,
            units: Units::None,
            tables: None,
            tabular_rows: None,
            headers: None,
            all_data: None,
            total_lines: None,
            metadata: Metadata::new(),
            error: None,
        }
    }

    /// Create an error record.
    #[must_use = "creates an error record"]
    pub fn failed(document_type: DocumentType, message: impl Into<String>) -> Self {
        let mut record = Self::new(document_type);
        record.error = Some(message.into());
        record
    }

    #[inline]
    #[must_use = "returns whether extraction failed without side effects"]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Character count of `full_text` (0 when absent).
    #[must_use = "returns the text length without side effects"]
    pub fn text_length(&self) -> usize {
        self.full_text.as_deref().map_or(0, |t| t.chars().count())
    }

    /// Word count of `full_text` (0 when absent).
    #[must_use = "returns the word count without side effects"]
    pub fn word_count(&self) -> usize {
        self.full_text.as_deref().map_or(0, word_count)
    }

    /// Number of pages, when the document is paginated.
    #[must_use = "returns the page count without side effects"]
    pub fn total_pages(&self) -> Option<usize> {
        match &self.units {
            Units::Pages(pages) => Some(pages.len()),
            _ => None,
        }
    }

    /// Number of non-empty paragraphs, when the document has paragraphs.
    #[must_use = "returns the paragraph count without side effects"]
    pub fn total_paragraphs(&self) -> Option<usize> {
        match &self.units {
            Units::Paragraphs(paragraphs) => Some(paragraphs.len()),
            _ => None,
        }
    }

    /// Whether the record carries page or paragraph structure.
    #[inline]
    #[must_use = "returns whether the record is structured without side effects"]
    pub const fn has_structure(&self) -> bool {
        matches!(self.units, Units::Pages(_) | Units::Paragraphs(_))
    }

    /// Whether at least one table was found.
    #[must_use = "returns whether tables exist without side effects"]
    pub fn has_tables(&self) -> bool {
        self.tables.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Number of tables found.
    #[must_use = "returns the table count without side effects"]
    pub fn table_count(&self) -> usize {
        self.tables.as_ref().map_or(0, Vec::len)
    }
}

impl Serialize for ExtractionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
            map.serialize_entry("document_type", &self.document_type)?;
            return map.end();
        }

        map.serialize_entry("document_type", &self.document_type)?;
        if let Some(encoding) = &self.encoding {
            map.serialize_entry("encoding", encoding)?;
        }

        // Derived counts come before the content they describe.
        match &self.units {
            Units::Pages(pages) => map.serialize_entry("total_pages", &pages.len())?,
            Units::Paragraphs(paragraphs) => {
                map.serialize_entry("total_paragraphs", &paragraphs.len())?;
                map.serialize_entry("total_tables", &self.table_count())?;
            }
            Units::Sheets(sheets) => {
                let names: Vec<&str> = sheets.iter().map(|s| s.sheet_name.as_str()).collect();
                map.serialize_entry("total_sheets", &sheets.len())?;
                map.serialize_entry("sheet_names", &names)?;
            }
            Units::Lines(_) => {
                if let Some(total_lines) = self.total_lines {
                    map.serialize_entry("total_lines", &total_lines)?;
                }
                map.serialize_entry("total_characters", &self.text_length())?;
                map.serialize_entry("word_count", &self.word_count())?;
            }
            Units::Preview(_) => {
                let rows = self.tabular_rows.as_ref().map_or(0, Vec::len);
                let columns = self.headers.as_ref().map_or(0, Vec::len);
                map.serialize_entry("total_rows", &rows)?;
                map.serialize_entry("total_columns", &columns)?;
            }
            Units::None => {}
        }

        if let Some(text) = &self.full_text {
            map.serialize_entry("full_text", text)?;
        }

        match &self.units {
            Units::Pages(pages) => map.serialize_entry("pages", pages)?,
            Units::Paragraphs(paragraphs) => map.serialize_entry("paragraphs", paragraphs)?,
            Units::Lines(lines) => map.serialize_entry("lines", lines)?,
            Units::Sheets(sheets) => map.serialize_entry("sheets", sheets)?,
            Units::Preview(_) | Units::None => {}
        }

        if let Some(headers) = &self.headers {
            map.serialize_entry("headers", headers)?;
        }
        if let Some(rows) = &self.tabular_rows {
            map.serialize_entry("data", rows)?;
        }
        if let Units::Preview(preview) = &self.units {
            map.serialize_entry("preview", preview)?;
        }
        if let Some(tables) = &self.tables {
            map.serialize_entry("tables", tables)?;
        }
        if let Some(all_data) = &self.all_data {
            map.serialize_entry("all_data", all_data)?;
        }

        map.serialize_entry("metadata", &self.metadata)?;
        map.end()
    }
}
