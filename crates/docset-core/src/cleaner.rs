//! Text cleaning.
//!
//! [`clean_text`] applies a fixed sequence of regex substitutions selected
//! by [`CleaningOptions`]. The remaining functions are standalone helpers
//! for line-oriented and row-oriented cleanup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::record::Row;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\\(\\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
        .expect("Invalid URL regex")
});
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+").expect("Invalid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("Invalid phone regex"));
static PHONE_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{10}\b").expect("Invalid phone digits regex"));
static SPECIAL_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("Invalid special character regex"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid digits regex"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
static PAGE_OF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Page \d+ of \d+$").expect("Invalid page footer regex"));
static PAGE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("Invalid page number regex"));

/// Lines shorter than this (after trimming) are treated as header/footer noise.
const MIN_LINE_CHARS: usize = 3;

/// Which cleaning steps [`clean_text`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CleaningOptions {
    /// Collapse whitespace runs to one space and trim
    pub remove_extra_spaces: bool,
    /// Drop everything except ASCII letters, digits and whitespace
    pub remove_special_chars: bool,
    pub remove_numbers: bool,
    pub lowercase: bool,
    pub remove_urls: bool,
    pub remove_emails: bool,
    pub remove_phone_numbers: bool,
}

impl Default for CleaningOptions {
    #[inline]
    fn default() -> Self {
        Self {
            remove_extra_spaces: true,
            remove_special_chars: false,
            remove_numbers: false,
            lowercase: false,
            remove_urls: true,
            remove_emails: false,
            remove_phone_numbers: false,
        }
    }
}

impl CleaningOptions {
    /// Options with every step disabled.
    #[inline]
    #[must_use = "creates cleaning options"]
    pub const fn none() -> Self {
        Self {
            remove_extra_spaces: false,
            remove_special_chars: false,
            remove_numbers: false,
            lowercase: false,
            remove_urls: false,
            remove_emails: false,
            remove_phone_numbers: false,
        }
    }
}

/// Clean `text` according to `options`.
///
/// Steps run in a fixed order: URLs, emails, phone numbers, special
/// characters, digits, lowercasing, whitespace collapsing. Later steps see
/// the output of earlier ones, so cleaning is not always idempotent: special
/// character removal can assemble a phone number, and lowercasing or digit
/// removal can expose a URL.
#[must_use = "returns the cleaned text without modifying the input"]
pub fn clean_text(text: &str, options: &CleaningOptions) -> String {
    let mut cleaned = text.to_string();

    if options.remove_urls {
        cleaned = URL_RE.replace_all(&cleaned, "").into_owned();
    }
    if options.remove_emails {
        cleaned = EMAIL_RE.replace_all(&cleaned, "").into_owned();
    }
    if options.remove_phone_numbers {
        cleaned = PHONE_RE.replace_all(&cleaned, "").into_owned();
        cleaned = PHONE_DIGITS_RE.replace_all(&cleaned, "").into_owned();
    }
    if options.remove_special_chars {
        cleaned = SPECIAL_CHAR_RE.replace_all(&cleaned, "").into_owned();
    }
    if options.remove_numbers {
        cleaned = DIGITS_RE.replace_all(&cleaned, "").into_owned();
    }
    if options.lowercase {
        cleaned = cleaned.to_lowercase();
    }
    if options.remove_extra_spaces {
        cleaned = WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string();
    }

    cleaned
}

/// Drop page-number lines, `Page N of M` lines and very short lines.
#[must_use = "returns the filtered text without modifying the input"]
pub fn remove_headers_footers(text: &str) -> String {
    text.split('\n')
        .filter(|line| {
            let trimmed = line.trim();
            !(PAGE_OF_RE.is_match(trimmed)
                || PAGE_NUMBER_RE.is_match(trimmed)
                || trimmed.chars().count() < MIN_LINE_CHARS)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse every whitespace run to a single space and trim.
#[inline]
#[must_use = "returns the normalized text without modifying the input"]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Identity key for duplicate detection: objects compare by sorted pairs.
fn dedup_key(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            let pairs: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("{k:?}:{}", dedup_key(v)))
                .collect();
            format!("{{{}}}", pairs.join(","))
        }
        other => other.to_string(),
    }
}

/// Remove repeated items, keeping the first occurrence of each.
#[must_use = "returns the deduplicated items without modifying the input"]
pub fn remove_duplicates(items: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(dedup_key(item)))
        .cloned()
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Drop rows whose every value is null or blank text.
#[must_use = "returns the filtered rows without modifying the input"]
pub fn remove_empty_entries(rows: &[Row]) -> Vec<Row> {
    rows.iter()
        .filter(|row| !row.values().all(is_blank))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_options() {
        let options = CleaningOptions::default();
        assert!(options.remove_extra_spaces);
        assert!(options.remove_urls);
        assert!(!options.lowercase);
        assert!(!options.remove_emails);
    }

    #[test]
    fn test_default_removes_urls_and_spaces() {
        let cleaned = clean_text(
            "Visit  https://example.com/a?b=1   now\n\nplease",
            &CleaningOptions::default(),
        );
        assert_eq!(cleaned, "Visit now please");
    }

    #[test]
    fn test_no_options_is_identity() {
        let text = "  Mixed CASE 123 http://x.io a@b.c  ";
        assert_eq!(clean_text(text, &CleaningOptions::none()), text);
    }

    #[test]
    fn test_remove_emails() {
        let options = CleaningOptions {
            remove_emails: true,
            ..CleaningOptions::default()
        };
        assert_eq!(clean_text("mail ann@example.com today", &options), "mail today");
    }

    #[test]
    fn test_remove_phone_numbers() {
        let options = CleaningOptions {
            remove_phone_numbers: true,
            ..CleaningOptions::default()
        };
        assert_eq!(
            clean_text("call 555-123-4567 or 555.123.4567 or 5551234567", &options),
            "call or or"
        );
    }

    #[test]
    fn test_special_chars_can_form_phone_number() {
        // Phones are matched before special characters go, so a second
        // pass finds the number the first pass assembled
        let options = CleaningOptions {
            remove_extra_spaces: true,
            remove_phone_numbers: true,
            remove_special_chars: true,
            ..CleaningOptions::none()
        };
        let once = clean_text("call 12345!67890 now", &options);
        assert_eq!(once, "call 1234567890 now");
        assert_eq!(clean_text(&once, &options), "call now");
    }

    #[test]
    fn test_later_steps_can_expose_url() {
        let lowercase = CleaningOptions {
            lowercase: true,
            ..CleaningOptions::default()
        };
        let once = clean_text("see HTTP://Example.com", &lowercase);
        assert_eq!(once, "see http://example.com");
        assert_eq!(clean_text(&once, &lowercase), "see");

        let numbers = CleaningOptions {
            remove_numbers: true,
            ..CleaningOptions::default()
        };
        let once = clean_text("see http1://example.com", &numbers);
        assert_eq!(once, "see http://example.com");
        assert_eq!(clean_text(&once, &numbers), "see");
    }

    #[test]
    fn test_url_with_backslash() {
        assert_eq!(
            clean_text(r"path http://host/a\c end", &CleaningOptions::default()),
            "path end"
        );
    }

    #[test]
    fn test_special_chars_then_numbers_then_lowercase() {
        let options = CleaningOptions {
            remove_special_chars: true,
            remove_numbers: true,
            lowercase: true,
            ..CleaningOptions::default()
        };
        assert_eq!(clean_text("Hello, World! Year 2024.", &options), "hello world year");
    }

    #[test]
    fn test_special_chars_drops_non_ascii_letters() {
        let options = CleaningOptions {
            remove_special_chars: true,
            ..CleaningOptions::none()
        };
        assert_eq!(clean_text("café olé", &options), "caf ol");
    }

    #[test]
    fn test_remove_headers_footers() {
        let text = "Title of report\n12\nBody line here\nPage 3 of 10\nok\npage 4 OF 10\nEnd of body";
        assert_eq!(
            remove_headers_footers(text),
            "Title of report\nBody line here\nEnd of body"
        );
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t b\n\nc  "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_remove_duplicates_scalars() {
        let items = vec![json!(1), json!("a"), json!(1), json!("1"), json!("a")];
        assert_eq!(remove_duplicates(&items), vec![json!(1), json!("a"), json!("1")]);
    }

    #[test]
    fn test_remove_duplicates_objects_ignore_key_order() {
        let items = vec![
            json!({"a": 1, "b": 2}),
            json!({"b": 2, "a": 1}),
            json!({"a": 1, "b": 3}),
        ];
        let unique = remove_duplicates(&items);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_remove_empty_entries() {
        let rows: Vec<Row> = [
            json!({"a": "", "b": null}),
            json!({"a": " x ", "b": null}),
            json!({"a": "  "}),
            json!({"a": 0}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let kept = remove_empty_entries(&rows);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0]["a"], " x ");
        assert_eq!(kept[1]["a"], 0);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: CleaningOptions = serde_json::from_str(r#"{"lowercase": true}"#).unwrap();
        assert!(options.lowercase);
        assert!(options.remove_extra_spaces);
        assert!(options.remove_urls);
    }
}
