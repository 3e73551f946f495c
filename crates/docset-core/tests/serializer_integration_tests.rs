//! Integration tests for the JSON, CSV, XML and training serializers
//!
//! These tests drive the serializers with complete extraction records, the
//! way the conversion pipeline does.

use docset_core::serializer::{write_csv, XML_DECLARATION};
use docset_core::{
    select_tabular_rows, to_training_record, DocumentType, ExtractionRecord, JsonSerializer,
    LineUnit, PageUnit, Row, Statistics, Table, Units, XmlSerializer,
};
use serde_json::{json, Value};

fn csv_record() -> ExtractionRecord {
    let rows: Vec<Row> = [json!({"a": "1", "b": "2"}), json!({"a": "3", "b": "4"})]
        .into_iter()
        .map(|v| v.as_object().cloned().expect("object"))
        .collect();
    let mut record = ExtractionRecord::new(DocumentType::Csv);
    record.encoding = Some("ascii".to_string());
    record.headers = Some(vec!["a".to_string(), "b".to_string()]);
    record.units = Units::Preview(rows.clone());
    record.tabular_rows = Some(rows);
    record.metadata.insert("encoding", "ascii");
    record.metadata.insert("file_extension", "CSV");
    record
}

fn pdf_record() -> ExtractionRecord {
    let mut record = ExtractionRecord::new(DocumentType::Pdf);
    record.full_text = Some("Quarterly report\n\nRegion Sales".to_string());
    record.units = Units::Pages(vec![
        PageUnit::new(1, "Quarterly report".to_string()),
        PageUnit::new(2, "Region Sales".to_string()),
    ]);
    record.tables = Some(vec![Table {
        page: Some(2),
        table_index: 1,
        rows: vec![
            vec!["Region".to_string(), "Sales".to_string()],
            vec!["North".to_string(), "100".to_string()],
        ],
    }]);
    for key in ["title", "author", "subject"] {
        record.metadata.insert_or_na(key, None);
    }
    record
}

/// CSV `a,b` with two rows survives a write/read cycle
#[test]
fn test_csv_round_trip_through_file() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("data_converted.csv");
    let record = csv_record();

    let rows = select_tabular_rows(&record).expect("rows");
    write_csv(&rows, &path).expect("write csv");

    let mut reader = csv::Reader::from_path(&path).expect("open csv");
    let headers: Vec<String> = reader
        .headers()
        .expect("headers")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(headers, vec!["a", "b"]);

    let read_back: Vec<Row> = reader
        .records()
        .map(|r| {
            let r = r.expect("record");
            headers
                .iter()
                .zip(r.iter())
                .map(|(k, v)| (k.clone(), Value::String(v.to_string())))
                .collect()
        })
        .collect();
    assert_eq!(read_back, rows.into_owned());
}

#[test]
fn test_pdf_table_exports_as_csv() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("report_converted.csv");

    let record = pdf_record();
    let rows = select_tabular_rows(&record).expect("rows from first table");
    write_csv(&rows, &path).expect("write csv");

    assert_eq!(
        std::fs::read_to_string(&path).expect("read csv"),
        "Region,Sales\nNorth,100\n"
    );
}

#[test]
fn test_json_of_full_pdf_record() {
    let json = JsonSerializer::new()
        .serialize(&pdf_record())
        .expect("JSON serialization failed");
    let value: Value = serde_json::from_str(&json).expect("JSON should be valid");

    assert_eq!(value["document_type"], "PDF");
    assert_eq!(value["total_pages"], 2);
    assert_eq!(value["pages"][1]["word_count"], 2);
    assert_eq!(value["tables"][0]["page"], 2);
    assert_eq!(value["tables"][0]["rows"], 2);
    assert_eq!(value["metadata"]["author"], "N/A");
}

#[test]
fn test_xml_of_full_pdf_record() {
    let xml = XmlSerializer::new()
        .serialize(&pdf_record(), "document")
        .expect("XML serialization failed");

    assert!(xml.starts_with(&format!("{XML_DECLARATION}\n<document>\n")));
    assert!(xml.ends_with("</document>"));
    assert_eq!(xml.matches("<pages>").count(), 2);
    assert!(xml.contains("    <data>\n      <item>Region</item>\n      <item>Sales</item>\n    </data>"));
    assert!(xml.contains("    <title>N/A</title>"));
}

#[test]
fn test_training_format_for_plain_text() {
    let mut record = ExtractionRecord::new(DocumentType::Text);
    record.full_text = Some("a b c".to_string());
    record.total_lines = Some(1);
    record.units = Units::Lines(vec![LineUnit {
        line_number: 1,
        text: "a b c".to_string(),
    }]);

    let json = JsonSerializer::new()
        .serialize(&to_training_record(&record))
        .expect("serialize training record");
    let value: Value = serde_json::from_str(&json).expect("valid JSON");

    assert_eq!(
        value,
        json!({
            "input_text": "a b c",
            "metadata": {},
            "features": {
                "document_type": "Text File",
                "word_count": 3,
                "has_tables": false,
                "has_structure": false
            },
            "structured_data": []
        })
    );
}

#[test]
fn test_statistics_for_csv_record() {
    let stats = Statistics::from_record(&csv_record());
    assert_eq!(stats.text_length, 0);
    assert_eq!(stats.word_count, 0);
    assert!(!stats.has_tables);
    assert!(stats.to_string().starts_with("**Document Statistics**\n\n"));
}
