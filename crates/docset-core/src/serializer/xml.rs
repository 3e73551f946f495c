//! XML serialization of extraction records.
//!
//! The record is first converted to a JSON value (so the XML follows the
//! same key order as the JSON output) and then rendered as nested elements:
//!
//! - object keys become element names, nested objects nest
//! - arrays repeat their key's element once per item
//! - an array directly inside an array becomes an element of `<item>` children
//! - null and empty objects become empty elements, empty arrays vanish
//!
//! The mapping is lossy: types are not recorded and a one-element array is
//! indistinguishable from a scalar.

use crate::error::{DocsetError, Result};
use quick_xml::escape::escape;
use serde::Serialize;
use serde_json::Value;

/// Declaration line written before the root element.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Element name used for items of nested arrays.
const ITEM_TAG: &str = "item";

/// Options for XML serialization
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XmlOptions {
    /// Indentation per nesting level (default: 2 spaces)
    pub indent: String,
}

impl Default for XmlOptions {
    #[inline]
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

/// XML serializer
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct XmlSerializer {
    options: XmlOptions,
}

impl XmlSerializer {
    /// Create a new XML serializer with default options
    #[inline]
    #[must_use = "creates serializer with default options"]
    pub fn new() -> Self {
        Self {
            options: XmlOptions::default(),
        }
    }

    /// Create a new XML serializer with custom options
    #[inline]
    #[must_use = "creates serializer with custom options"]
    pub const fn with_options(options: XmlOptions) -> Self {
        Self { options }
    }

    /// Serialize a value under a single root element named `root_name`.
    ///
    /// # Errors
    ///
    /// Returns [`DocsetError::Formatting`] if the value cannot be converted
    /// to a JSON tree.
    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T, root_name: &str) -> Result<String> {
        let tree = serde_json::to_value(value)
            .map_err(|e| DocsetError::Formatting(format!("Error creating XML: {e}")))?;
        Ok(self.serialize_value(&tree, root_name))
    }

    /// Serialize an already-built JSON tree.
    #[must_use = "returns the XML document without side effects"]
    pub fn serialize_value(&self, value: &Value, root_name: &str) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        let root = sanitize_tag(root_name);
        match value {
            // A top-level array still needs a single root element.
            Value::Array(items) => {
                out.push_str(&format!("<{root}>\n"));
                for item in items {
                    self.write_element(&mut out, ITEM_TAG, item, 1);
                }
                out.push_str(&format!("</{root}>"));
            }
            _ => self.write_element(&mut out, &root, value, 0),
        }
        // write_element terminates every element with a newline
        if out.ends_with('\n') {
            out.pop();
        }
        out
    }

    fn pad(&self, depth: usize) -> String {
        self.options.indent.repeat(depth)
    }

    /// Write one element (or, for arrays, one element per item).
    fn write_element(&self, out: &mut String, tag: &str, value: &Value, depth: usize) {
        let pad = self.pad(depth);
        match value {
            Value::Object(map) if !map.is_empty() => {
                out.push_str(&format!("{pad}<{tag}>\n"));
                for (key, child) in map {
                    self.write_element(out, &sanitize_tag(key), child, depth + 1);
                }
                out.push_str(&format!("{pad}</{tag}>\n"));
            }
            Value::Array(items) => {
                for item in items {
                    if let Value::Array(inner) = item {
                        out.push_str(&format!("{pad}<{tag}>\n"));
                        for leaf in inner {
                            self.write_element(out, ITEM_TAG, leaf, depth + 1);
                        }
                        out.push_str(&format!("{pad}</{tag}>\n"));
                    } else {
                        self.write_element(out, tag, item, depth);
                    }
                }
            }
            scalar => {
                let text = leaf_text(scalar);
                out.push_str(&format!("{pad}<{tag}>{}</{tag}>\n", escape(text.as_str())));
            }
        }
    }
}

fn leaf_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Object(_) | Value::Array(_) => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
    }
}

/// Turn an arbitrary key into a valid XML element name.
///
/// Spaces, hyphens and every other character outside `[A-Za-z0-9_.]`
/// become `_`; a name that does not start with a letter or `_` gets a `_`
/// prefix.
#[must_use = "returns the sanitized name without side effects"]
pub fn sanitize_tag(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        name.insert(0, '_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        XmlSerializer::new().serialize_value(value, "document")
    }

    #[test]
    fn test_declaration_and_single_root() {
        let xml = render(&json!({"a": 1}));
        let mut lines = xml.lines();
        assert_eq!(lines.next(), Some(XML_DECLARATION));
        assert_eq!(lines.next(), Some("<document>"));
        assert!(xml.ends_with("</document>"));
        assert_eq!(xml.matches("<document>").count(), 1);
    }

    #[test]
    fn test_nested_objects_indent() {
        let xml = render(&json!({"metadata": {"title": "T", "author": "A"}}));
        let expected = format!(
            "{XML_DECLARATION}\n<document>\n  <metadata>\n    <title>T</title>\n    <author>A</author>\n  </metadata>\n</document>"
        );
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_arrays_repeat_element() {
        let xml = render(&json!({"pages": [{"n": 1}, {"n": 2}], "tags": ["x", "y"]}));
        assert_eq!(xml.matches("<pages>").count(), 2);
        assert!(xml.contains("    <n>1</n>"));
        assert!(xml.contains("  <tags>x</tags>\n  <tags>y</tags>"));
    }

    #[test]
    fn test_nested_arrays_use_item_elements() {
        let xml = render(&json!({"data": [["a", "b"], ["1", "2"]]}));
        assert!(xml.contains("  <data>\n    <item>a</item>\n    <item>b</item>\n  </data>"));
        assert_eq!(xml.matches("<data>").count(), 2);
    }

    #[test]
    fn test_escaping_and_nulls() {
        let xml = render(&json!({"text": "a < b & \"c\"", "none": null, "empty": {}}));
        assert!(xml.contains("<text>a &lt; b &amp; &quot;c&quot;</text>"));
        assert!(xml.contains("<none></none>"));
        assert!(xml.contains("<empty></empty>"));
    }

    #[test]
    fn test_empty_array_emits_nothing() {
        let xml = render(&json!({"tables": [], "x": true}));
        assert!(!xml.contains("tables"));
        assert!(xml.contains("<x>true</x>"));
    }

    #[test]
    fn test_sanitize_tag() {
        assert_eq!(sanitize_tag("file name"), "file_name");
        assert_eq!(sanitize_tag("last-modified"), "last_modified");
        assert_eq!(sanitize_tag("25%"), "_25_");
        assert_eq!(sanitize_tag("Unnamed: 0"), "Unnamed__0");
        assert_eq!(sanitize_tag(""), "_");
        assert_eq!(sanitize_tag("x.1"), "x.1");
    }

    #[test]
    fn test_serialize_record() {
        use crate::record::{DocumentType, ExtractionRecord};
        let record = ExtractionRecord::failed(DocumentType::Csv, "bad");
        let xml = XmlSerializer::new().serialize(&record, "document").unwrap();
        assert!(xml.contains("<error>bad</error>"));
        assert!(xml.contains("<document_type>CSV File</document_type>"));
    }

    #[test]
    fn test_top_level_array() {
        let xml = render(&json!([1, 2]));
        assert!(xml.contains("<document>\n  <item>1</item>\n  <item>2</item>\n</document>"));
    }
}
