//! Microsoft Word (.docx) extractor
//!
//! A DOCX file is a ZIP package of XML parts. Three parts are read:
//!
//! - `word/document.xml`: body paragraphs and tables
//! - `word/styles.xml`: paragraph style display names
//! - `docProps/core.xml`: title, author, dates and similar properties
//!
//! Only body-level paragraphs become paragraph units; paragraphs inside
//! tables contribute to cell text instead. Tables nested inside table cells
//! are skipped.
//!
//! Legacy binary `.doc` files are not ZIP packages and fail with an
//! extraction error.

use crate::traits::DocumentExtractor;
use chrono::{DateTime, NaiveDateTime, Utc};
use docset_core::{
    DocsetError, DocumentType, ExtractionRecord, InputFormat, Metadata, ParagraphUnit, Table,
    Units,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Style name used when a document defines no default paragraph style
const FALLBACK_STYLE: &str = "Normal";

/// Extract an attribute value by key from an element
#[inline]
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Read one part of the package as a string, `None` when absent
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, DocsetError> {
    let Ok(mut part) = archive.by_name(name) else {
        return Ok(None);
    };
    let mut content = String::new();
    part.read_to_string(&mut content)
        .map_err(DocsetError::IoError)?;
    Ok(Some(content))
}

fn open_package<R: Read + Seek>(reader: R) -> Result<ZipArchive<R>, DocsetError> {
    ZipArchive::new(reader)
        .map_err(|e| DocsetError::Backend(format!("File is not a Word package (.docx): {e}")))
}

/// Paragraph styles declared in `word/styles.xml`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct StyleSheet {
    /// Style ID to display name
    names: HashMap<String, String>,
    /// Display name of the default paragraph style
    default_name: Option<String>,
}

impl StyleSheet {
    fn parse(xml: &str) -> Result<Self, DocsetError> {
        let mut sheet = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current_id: Option<String> = None;
        let mut is_paragraph_style = false;
        let mut is_default = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) if e.name().as_ref() == b"w:style" => {
                    current_id = get_attr(&e, b"w:styleId");
                    is_paragraph_style = get_attr(&e, b"w:type").as_deref() == Some("paragraph");
                    is_default = matches!(get_attr(&e, b"w:default").as_deref(), Some("1" | "true"));
                }
                Ok(Event::Empty(e)) if e.name().as_ref() == b"w:name" => {
                    if let (Some(id), Some(name)) = (&current_id, get_attr(&e, b"w:val")) {
                        let name = ui_style_name(&name);
                        if is_paragraph_style && is_default {
                            sheet.default_name = Some(name.clone());
                        }
                        sheet.names.insert(id.clone(), name);
                    }
                }
                Ok(Event::End(e)) if e.name().as_ref() == b"w:style" => {
                    current_id = None;
                    is_paragraph_style = false;
                    is_default = false;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DocsetError::Backend(format!(
                        "Error parsing styles.xml: {e}"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    fn default_name(&self) -> &str {
        self.default_name.as_deref().unwrap_or(FALLBACK_STYLE)
    }

    /// Display name for a paragraph's style ID; unknown IDs use the default style
    fn resolve(&self, style_id: Option<&str>) -> String {
        style_id
            .and_then(|id| self.names.get(id))
            .map_or_else(|| self.default_name().to_string(), Clone::clone)
    }
}

/// Built-in style names are stored lowercase ("heading 1"); show them capitalized
fn ui_style_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let builtin = matches!(
        lower.as_str(),
        "caption" | "footer" | "header" | "title" | "subtitle" | "normal"
    ) || lower
        .strip_prefix("heading ")
        .is_some_and(|level| level.len() == 1 && level.as_bytes()[0].is_ascii_digit());

    if !builtin {
        return name.to_string();
    }
    let mut chars = lower.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Widest horizontal span honoured; Word tables hold at most 63 columns
const MAX_GRID_SPAN: usize = 63;

/// Walk state for `word/document.xml`
struct BodyWalker<'a> {
    styles: &'a StyleSheet,
    paragraphs: Vec<ParagraphUnit>,
    tables: Vec<Table>,

    table_depth: usize,
    /// Table depth at which the open paragraph started, if it is collected
    paragraph_depth: Option<usize>,
    paragraph_text: String,
    paragraph_style: Option<String>,
    in_run: bool,
    in_text: bool,

    // Top-level table being built
    rows: Vec<Vec<String>>,
    row_cells: Vec<String>,
    cell_paragraphs: Vec<String>,
    cell_span: usize,
    cell_continues_merge: bool,
}

impl<'a> BodyWalker<'a> {
    fn new(styles: &'a StyleSheet) -> Self {
        Self {
            styles,
            paragraphs: Vec::new(),
            tables: Vec::new(),
            table_depth: 0,
            paragraph_depth: None,
            paragraph_text: String::new(),
            paragraph_style: None,
            in_run: false,
            in_text: false,
            rows: Vec::new(),
            row_cells: Vec::new(),
            cell_paragraphs: Vec::new(),
            cell_span: 1,
            cell_continues_merge: false,
        }
    }

    const fn collecting(&self) -> bool {
        matches!(self.paragraph_depth, Some(depth) if depth == self.table_depth)
    }

    const fn in_top_table(&self) -> bool {
        self.table_depth == 1
    }

    fn walk(mut self, xml: &str) -> Result<(Vec<ParagraphUnit>, Vec<Table>), DocsetError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => self.handle_start(&e),
                Ok(Event::Empty(e)) => self.handle_empty(&e),
                Ok(Event::Text(e)) => {
                    if self.in_text && self.collecting() {
                        let text = e.unescape().map_err(|e| {
                            DocsetError::Backend(format!("Invalid text in document.xml: {e}"))
                        })?;
                        self.paragraph_text.push_str(&text);
                    }
                }
                Ok(Event::End(e)) => self.handle_end(e.name().as_ref()),
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DocsetError::Backend(format!(
                        "Error parsing document.xml at position {}: {e}",
                        reader.buffer_position()
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok((self.paragraphs, self.tables))
    }

    fn handle_start(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:tbl" => {
                self.table_depth += 1;
                if self.in_top_table() {
                    self.rows.clear();
                }
            }
            b"w:tr" if self.in_top_table() => self.row_cells.clear(),
            b"w:tc" if self.in_top_table() => {
                self.cell_paragraphs.clear();
                self.cell_span = 1;
                self.cell_continues_merge = false;
            }
            b"w:p" if self.table_depth <= 1 => {
                self.paragraph_depth = Some(self.table_depth);
                self.paragraph_text.clear();
                self.paragraph_style = None;
            }
            b"w:r" => self.in_run = true,
            b"w:t" => self.in_text = true,
            _ => {}
        }
    }

    fn handle_empty(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:p" if self.in_top_table() => self.cell_paragraphs.push(String::new()),
            b"w:pStyle" if self.collecting() => {
                self.paragraph_style = get_attr(e, b"w:val");
            }
            b"w:tab" if self.in_run && self.collecting() => self.paragraph_text.push('\t'),
            b"w:br" | b"w:cr" if self.in_run && self.collecting() => {
                self.paragraph_text.push('\n');
            }
            b"w:gridSpan" if self.in_top_table() => {
                self.cell_span = get_attr(e, b"w:val")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1)
                    .clamp(1, MAX_GRID_SPAN);
            }
            b"w:vMerge" if self.in_top_table() => {
                self.cell_continues_merge = get_attr(e, b"w:val").as_deref() != Some("restart");
            }
            _ => {}
        }
    }

    fn handle_end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:r" => self.in_run = false,
            b"w:p" if self.collecting() => self.finish_paragraph(),
            b"w:tc" if self.in_top_table() => self.finish_cell(),
            b"w:tr" if self.in_top_table() => {
                self.rows.push(std::mem::take(&mut self.row_cells));
            }
            b"w:tbl" => {
                if self.in_top_table() {
                    self.tables.push(Table {
                        page: None,
                        table_index: self.tables.len() + 1,
                        rows: std::mem::take(&mut self.rows),
                    });
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self) {
        self.paragraph_depth = None;
        let text = std::mem::take(&mut self.paragraph_text);
        if self.table_depth == 0 {
            if !text.trim().is_empty() {
                let style = self.styles.resolve(self.paragraph_style.as_deref());
                self.paragraphs.push(ParagraphUnit::new(text, style));
            }
        } else {
            self.cell_paragraphs.push(text);
        }
    }

    /// Close a cell: vertical-merge continuations repeat the cell above,
    /// horizontal spans repeat the cell across the grid columns it covers
    fn finish_cell(&mut self) {
        let column = self.row_cells.len();
        let text = if self.cell_continues_merge {
            self.rows
                .last()
                .and_then(|above| above.get(column))
                .cloned()
                .unwrap_or_default()
        } else {
            self.cell_paragraphs.join("\n")
        };
        for _ in 0..self.cell_span {
            self.row_cells.push(text.clone());
        }
    }
}

/// Core property being read from `docProps/core.xml`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoreField {
    Title,
    Author,
    Subject,
    Keywords,
    Created,
    Modified,
    LastModifiedBy,
}

impl CoreField {
    const ALL: [Self; 7] = [
        Self::Title,
        Self::Author,
        Self::Subject,
        Self::Keywords,
        Self::Created,
        Self::Modified,
        Self::LastModifiedBy,
    ];

    fn from_element(name: &[u8]) -> Option<Self> {
        match name {
            b"dc:title" => Some(Self::Title),
            b"dc:creator" => Some(Self::Author),
            b"dc:subject" => Some(Self::Subject),
            b"cp:keywords" => Some(Self::Keywords),
            b"dcterms:created" => Some(Self::Created),
            b"dcterms:modified" => Some(Self::Modified),
            b"cp:lastModifiedBy" => Some(Self::LastModifiedBy),
            _ => None,
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Subject => "subject",
            Self::Keywords => "keywords",
            Self::Created => "created",
            Self::Modified => "modified",
            Self::LastModifiedBy => "last_modified_by",
        }
    }

    const fn is_date(self) -> bool {
        matches!(self, Self::Created | Self::Modified)
    }
}

/// Parse a W3CDTF timestamp (`2024-01-15T10:30:00Z`) as UTC
fn parse_w3cdtf(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.and_utc())
        })
        .ok()
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S+00:00").to_string()
}

/// Read core properties; a missing or malformed part yields all `N/A`
fn parse_core_properties(xml: Option<&str>) -> Metadata {
    let mut values: HashMap<&'static str, String> = HashMap::new();

    if let Some(xml) = xml {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current: Option<CoreField> = None;
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => current = CoreField::from_element(e.name().as_ref()),
                Ok(Event::Text(e)) => {
                    if let (Some(field), Ok(text)) = (current, e.unescape()) {
                        let text = text.trim();
                        let value = if field.is_date() {
                            parse_w3cdtf(text).map(|dt| format_timestamp(&dt))
                        } else {
                            Some(text.to_string())
                        };
                        if let Some(value) = value {
                            values.insert(field.key(), value);
                        }
                    }
                }
                Ok(Event::End(_)) => current = None,
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("Malformed docProps/core.xml: {e}");
                    break;
                }
                _ => {}
            }
            buf.clear();
        }
    }

    let mut metadata = Metadata::new();
    for field in CoreField::ALL {
        metadata.insert_or_na(field.key(), values.remove(field.key()));
    }
    metadata
}

/// Word document extractor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WordExtractor;

impl WordExtractor {
    /// Create a new Word extractor instance
    #[inline]
    #[must_use = "creates an extractor instance that should be used for parsing"]
    pub const fn new() -> Self {
        Self
    }

    fn parse_package<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<ExtractionRecord, DocsetError> {
        let document_xml = read_part(archive, "word/document.xml")?.ok_or_else(|| {
            DocsetError::Backend("Missing word/document.xml in package".to_string())
        })?;
        let styles = match read_part(archive, "word/styles.xml")? {
            Some(xml) => StyleSheet::parse(&xml)?,
            None => StyleSheet::default(),
        };

        let (paragraphs, tables) = BodyWalker::new(&styles).walk(&document_xml)?;
        let full_text = paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        log::debug!(
            "Word document: {} paragraphs, {} tables",
            paragraphs.len(),
            tables.len()
        );

        let mut record = ExtractionRecord::new(DocumentType::Word);
        record.full_text = Some(full_text);
        record.units = Units::Paragraphs(paragraphs);
        record.tables = Some(tables);
        record.metadata = parse_core_properties(read_part(archive, "docProps/core.xml")?.as_deref());
        Ok(record)
    }
}

impl DocumentExtractor for WordExtractor {
    #[inline]
    fn document_type(&self) -> DocumentType {
        DocumentType::Word
    }

    fn parse_bytes(&self, data: &[u8], _format: InputFormat) -> Result<ExtractionRecord, DocsetError> {
        let mut archive = open_package(Cursor::new(data))?;
        Self::parse_package(&mut archive)
    }

    /// Reads only `docProps/core.xml`
    fn metadata<P: AsRef<Path>>(&self, path: P) -> Result<Metadata, DocsetError> {
        let file = std::fs::File::open(path.as_ref()).map_err(DocsetError::IoError)?;
        let mut archive = open_package(file)?;
        let core = read_part(&mut archive, "docProps/core.xml")?;
        Ok(parse_core_properties(core.as_deref()))
    }
}
