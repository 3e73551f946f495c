//! PDF extractor using lopdf
//!
//! Page text comes from lopdf's text extraction. Tables are found by
//! replaying each page's content stream: text-showing operators are turned
//! into positioned runs (tracking the text and graphics matrices) and handed
//! to the [`TableDetector`]. Glyph widths are not read from the fonts; run
//! widths are estimated from the character count and the font size.
//!
//! Metadata comes from the document Info dictionary.

use crate::table_detector::{TableDetector, TextCell};
use crate::traits::DocumentExtractor;
use docset_core::{
    DocsetError, DocumentType, ExtractionRecord, InputFormat, Metadata, PageUnit, Table, Units,
};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Average glyph advance as a fraction of the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustment (thousandths of an em) treated as a word space
const TJ_SPACE_THRESHOLD: f32 = 250.0;

/// Info dictionary keys and the metadata names they map to
const INFO_KEYS: [(&[u8], &str); 7] = [
    (b"Title", "title"),
    (b"Author", "author"),
    (b"Subject", "subject"),
    (b"Creator", "creator"),
    (b"Producer", "producer"),
    (b"CreationDate", "creation_date"),
    (b"ModDate", "modification_date"),
];

/// PDF extractor
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PdfExtractor {
    detector: TableDetector,
}

/// 2D affine matrix `[a b c d e f]` in PDF row-vector convention
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    const fn translate(tx: f32, ty: f32) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() != 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, operand) in m.iter_mut().zip(operands) {
            *slot = operand.as_float().ok()?;
        }
        Some(Self(m))
    }

    /// `self × other`: apply `self` first, then `other`
    fn then(self, other: Self) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Self([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn horizontal_scale(self) -> f32 {
        self.0[0].hypot(self.0[1])
    }

    fn vertical_scale(self) -> f32 {
        self.0[2].hypot(self.0[3])
    }
}

/// Text state while replaying a content stream
struct RunCollector {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_size: f32,
    leading: f32,
    runs: Vec<TextCell>,
}

impl RunCollector {
    fn new() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_size: 12.0,
            leading: 0.0,
            runs: Vec::new(),
        }
    }

    fn operand(operation: &Operation, index: usize) -> Option<f32> {
        operation.operands.get(index).and_then(|o| o.as_float().ok())
    }

    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translate(tx, ty).then(self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn apply(&mut self, operation: &Operation) {
        match operation.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => self.ctm = self.ctm_stack.pop().unwrap_or(Matrix::IDENTITY),
            "cm" => {
                if let Some(m) = Matrix::from_operands(&operation.operands) {
                    self.ctm = m.then(self.ctm);
                }
            }
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(size) = Self::operand(operation, 1) {
                    self.font_size = size;
                }
            }
            "TL" => self.leading = Self::operand(operation, 0).unwrap_or(self.leading),
            "Td" | "TD" => {
                let tx = Self::operand(operation, 0).unwrap_or(0.0);
                let ty = Self::operand(operation, 1).unwrap_or(0.0);
                if operation.operator == "TD" {
                    self.leading = -ty;
                }
                self.next_line(tx, ty);
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(&operation.operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(0.0, -self.leading),
            "Tj" => self.show(operation.operands.first().into_iter()),
            "'" => {
                self.next_line(0.0, -self.leading);
                self.show(operation.operands.first().into_iter());
            }
            "\"" => {
                self.next_line(0.0, -self.leading);
                self.show(operation.operands.get(2).into_iter());
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operation.operands.first() {
                    self.show(items.iter());
                }
            }
            _ => {}
        }
    }

    /// Emit one run for a text-showing operator and advance the text matrix
    fn show<'a>(&mut self, items: impl Iterator<Item = &'a Object>) {
        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = decode_pdf_string(bytes);
                    advance += decoded.chars().count() as f32 * self.font_size * AVG_GLYPH_WIDTH;
                    text.push_str(&decoded);
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = item.as_float().unwrap_or(0.0);
                    advance -= adjustment / 1000.0 * self.font_size;
                    if adjustment <= -TJ_SPACE_THRESHOLD && !text.is_empty() && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
                _ => {}
            }
        }

        let rendering = self.text_matrix.then(self.ctm);
        let height = self.font_size * rendering.vertical_scale();
        let baseline = rendering.0[5];
        if !text.trim().is_empty() {
            self.runs.push(TextCell {
                text,
                x: rendering.0[4],
                y: -(baseline + height),
                width: advance * rendering.horizontal_scale(),
                height,
            });
        }
        self.text_matrix = Matrix::translate(advance, 0.0).then(self.text_matrix);
    }

    /// Join runs that continue each other on the same baseline
    fn into_merged_runs(self) -> Vec<TextCell> {
        let mut merged: Vec<TextCell> = Vec::with_capacity(self.runs.len());
        for run in self.runs {
            if let Some(last) = merged.last_mut() {
                let gap = run.x - (last.x + last.width);
                let same_line = (run.y - last.y).abs() < 0.5;
                if same_line && run.x >= last.x && gap < last.height * AVG_GLYPH_WIDTH {
                    if gap > last.height * 0.15 && !last.text.ends_with(' ') {
                        last.text.push(' ');
                    }
                    last.text.push_str(&run.text);
                    last.width = run.x + run.width - last.x;
                    continue;
                }
            }
            merged.push(run);
        }
        merged
    }
}

/// Decode a PDF text string: UTF-16BE with a byte order mark, UTF-8 when
/// valid, Latin-1 otherwise
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let (decoded, _) = encoding_rs::UTF_16BE.decode_without_bom_handling(utf16);
        return decoded.into_owned();
    }
    String::from_utf8(bytes.to_vec())
        .unwrap_or_else(|_| bytes.iter().map(|&b| char::from(b)).collect())
}

/// Read the Info dictionary; missing or empty entries become `N/A`
fn read_info(doc: &Document) -> Metadata {
    let info = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };
    if info.is_none() {
        log::debug!("PDF has no Info dictionary");
    }

    let mut metadata = Metadata::new();
    for (key, name) in INFO_KEYS {
        let value = info
            .and_then(|dict| dict.get(key).ok())
            .and_then(|obj| match obj {
                Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
                Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            });
        metadata.insert_or_na(name, value);
    }
    metadata
}

fn load(data: &[u8]) -> Result<Document, DocsetError> {
    Document::load_mem(data).map_err(|e| DocsetError::Backend(format!("Failed to load PDF: {e}")))
}

impl PdfExtractor {
    /// Create a new PDF extractor instance
    #[inline]
    #[must_use = "creates an extractor instance that should be used for parsing"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with a custom table detector
    #[inline]
    #[must_use = "creates an extractor instance that should be used for parsing"]
    pub const fn with_detector(detector: TableDetector) -> Self {
        Self { detector }
    }

    /// Positioned text runs of one page
    fn page_runs(doc: &Document, page_id: ObjectId) -> Result<Vec<TextCell>, DocsetError> {
        let data = doc
            .get_page_content(page_id)
            .map_err(|e| DocsetError::Backend(format!("Failed to read page content: {e}")))?;
        let content = Content::decode(&data)
            .map_err(|e| DocsetError::Backend(format!("Failed to decode page content: {e}")))?;

        let mut collector = RunCollector::new();
        for operation in &content.operations {
            collector.apply(operation);
        }
        Ok(collector.into_merged_runs())
    }

    /// Tables of one page, numbered from 1 within the page
    fn page_tables(&self, doc: &Document, page_number: u32, page_id: ObjectId) -> Vec<Table> {
        let runs = match Self::page_runs(doc, page_id) {
            Ok(runs) => runs,
            Err(e) => {
                log::warn!("Skipping table detection on page {page_number}: {e}");
                return Vec::new();
            }
        };

        self.detector
            .detect(&runs)
            .into_iter()
            .enumerate()
            .map(|(i, rows)| Table {
                page: Some(page_number as usize),
                table_index: i + 1,
                rows,
            })
            .collect()
    }
}

impl DocumentExtractor for PdfExtractor {
    #[inline]
    fn document_type(&self) -> DocumentType {
        DocumentType::Pdf
    }

    fn parse_bytes(&self, data: &[u8], _format: InputFormat) -> Result<ExtractionRecord, DocsetError> {
        let doc = load(data)?;

        let mut pages = Vec::new();
        let mut tables = Vec::new();
        for (page_number, page_id) in doc.get_pages() {
            let text = doc.extract_text(&[page_number]).unwrap_or_else(|e| {
                log::warn!("Failed to extract text from page {page_number}: {e}");
                String::new()
            });
            pages.push(PageUnit::new(page_number as usize, text));
            tables.extend(self.page_tables(&doc, page_number, page_id));
        }

        let full_text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        log::debug!("PDF: {} pages, {} tables", pages.len(), tables.len());

        let mut record = ExtractionRecord::new(DocumentType::Pdf);
        record.full_text = Some(full_text);
        record.units = Units::Pages(pages);
        record.tables = Some(tables);
        record.metadata = read_info(&doc);
        Ok(record)
    }

    /// Reads only the Info dictionary
    fn metadata<P: AsRef<Path>>(&self, path: P) -> Result<Metadata, DocsetError> {
        let data = std::fs::read(path.as_ref()).map_err(DocsetError::IoError)?;
        Ok(read_info(&load(&data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream, StringFormat};

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn literal(text: &str) -> Object {
        Object::string_literal(text)
    }

    fn collect(operations: Vec<Operation>) -> Vec<TextCell> {
        let mut collector = RunCollector::new();
        for operation in &operations {
            collector.apply(operation);
        }
        collector.into_merged_runs()
    }

    #[test]
    fn test_matrix_composition() {
        let m = Matrix::translate(10.0, 20.0).then(Matrix([2.0, 0.0, 0.0, 2.0, 5.0, 5.0]));
        assert_eq!(m, Matrix([2.0, 0.0, 0.0, 2.0, 25.0, 45.0]));
    }

    #[test]
    fn test_runs_follow_text_positioning() {
        let runs = collect(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("Td", vec![72.into(), 700.into()]),
            op("Tj", vec![literal("Name")]),
            op("Td", vec![100.into(), 0.into()]),
            op("Tj", vec![literal("Age")]),
            op("TL", vec![14.into()]),
            op("T*", vec![]),
            op("Tj", vec![literal("42")]),
            op("ET", vec![]),
        ]);

        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text, "Name");
        assert!((runs[0].x - 72.0).abs() < 0.01);
        assert!((runs[0].y + 710.0).abs() < 0.01);
        assert!((runs[0].width - 20.0).abs() < 0.01);
        assert!((runs[1].x - 172.0).abs() < 0.01);
        assert!((runs[2].x - 172.0).abs() < 0.01);
        assert!((runs[2].y + 696.0).abs() < 0.01);
    }

    #[test]
    fn test_adjacent_runs_merge() {
        let runs = collect(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), 700.into()]),
            op("Tj", vec![literal("New")]),
            op("Td", vec![17.into(), 0.into()]),
            op("Tj", vec![literal("York")]),
            op("ET", vec![]),
        ]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "New York");
    }

    #[test]
    fn test_tj_array_spacing() {
        let runs = collect(vec![
            op("BT", vec![]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    literal("Hel"),
                    Object::Integer(-20),
                    literal("lo"),
                    Object::Integer(-400),
                    literal("world"),
                ])],
            ),
            op("ET", vec![]),
        ]);
        assert_eq!(runs[0].text, "Hello world");
    }

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string(b"plain"), "plain");
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0xE9]), "H\u{e9}");
        assert_eq!(decode_pdf_string(&[0x43, 0x61, 0x66, 0xE9]), "Caf\u{e9}");
    }

    #[test]
    fn test_read_info() {
        let mut doc = Document::with_version("1.5");
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(b"Annual Report".to_vec(), StringFormat::Literal),
            "Author" => Object::String(Vec::new(), StringFormat::Literal),
            "CreationDate" => Object::string_literal("D:20240115103000Z"),
        });
        doc.trailer.set("Info", info_id);

        let metadata = read_info(&doc);
        assert_eq!(metadata.get("title"), Some("Annual Report"));
        assert_eq!(metadata.get("author"), Some("N/A"));
        assert_eq!(metadata.get("creation_date"), Some("D:20240115103000Z"));
        assert_eq!(metadata.get("producer"), Some("N/A"));
        assert_eq!(metadata.len(), 7);
    }

    #[test]
    fn test_missing_info() {
        let doc = Document::with_version("1.5");
        let metadata = read_info(&doc);
        assert!(metadata.iter().all(|(_, v)| v == "N/A"));
    }

    #[test]
    fn test_page_runs_from_stream() {
        let mut doc = Document::with_version("1.5");
        let content = Content {
            operations: vec![
                op("BT", vec![]),
                op("Tf", vec!["F1".into(), 12.into()]),
                op("Td", vec![72.into(), 700.into()]),
                op("Tj", vec![literal("cell")]),
                op("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Contents" => content_id,
        });

        let runs = PdfExtractor::page_runs(&doc, page_id).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "cell");
    }

    #[test]
    fn test_invalid_pdf() {
        let err = PdfExtractor::new()
            .parse_bytes(b"not a pdf", InputFormat::Pdf)
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to load PDF"));
    }
}
