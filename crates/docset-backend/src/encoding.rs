//! Character encoding detection and strict decoding.
//!
//! Detection order:
//! 1. BOM (Byte Order Mark)
//! 2. UTF-16 null-byte patterns without a BOM
//! 3. UTF-8 validity (pure ASCII reported separately)
//! 4. chardetng statistical detection for legacy encodings
//!
//! Decoding is strict: malformed input is an error, not replacement
//! characters, so a mis-detected file is reported instead of silently
//! corrupted.

use chardetng::EncodingDetector;
use docset_core::DocsetError;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// Detected character encoding of a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedEncoding {
    /// ASCII (subset of UTF-8)
    Ascii,
    /// UTF-8 (no BOM)
    Utf8,
    /// UTF-8 with BOM
    Utf8Bom,
    /// UTF-16 Little Endian
    Utf16Le,
    /// UTF-16 Big Endian
    Utf16Be,
    /// UTF-32 Little Endian
    Utf32Le,
    /// UTF-32 Big Endian
    Utf32Be,
    /// Legacy encoding detected by chardetng (e.g., Windows-1252, Shift_JIS)
    Legacy(&'static Encoding),
}

impl DetectedEncoding {
    /// Lower-case encoding name recorded in extraction records.
    #[must_use = "returns the label without side effects"]
    pub fn label(&self) -> String {
        match self {
            Self::Ascii => "ascii".to_string(),
            Self::Utf8 => "utf-8".to_string(),
            Self::Utf8Bom => "utf-8-sig".to_string(),
            Self::Utf16Le => "utf-16le".to_string(),
            Self::Utf16Be => "utf-16be".to_string(),
            Self::Utf32Le => "utf-32le".to_string(),
            Self::Utf32Be => "utf-32be".to_string(),
            Self::Legacy(enc) => enc.name().to_lowercase(),
        }
    }
}

impl std::fmt::Display for DetectedEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// UTF-8 BOM: EF BB BF
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
/// UTF-16 LE BOM: FF FE
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
/// UTF-16 BE BOM: FE FF
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];
/// UTF-32 LE BOM: FF FE 00 00
const UTF32_LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
/// UTF-32 BE BOM: 00 00 FE FF
const UTF32_BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// Detect the character encoding of a byte buffer.
#[must_use = "returns the detected encoding without side effects"]
pub fn detect_encoding(buffer: &[u8]) -> DetectedEncoding {
    if let Some(bom_encoding) = detect_bom(buffer) {
        return bom_encoding;
    }

    if let Some(unicode_encoding) = detect_utf16_without_bom(buffer) {
        return unicode_encoding;
    }

    if std::str::from_utf8(buffer).is_ok() {
        if buffer.is_ascii() {
            return DetectedEncoding::Ascii;
        }
        return DetectedEncoding::Utf8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(buffer, true);
    let (encoding, confident) = detector.guess_assess(None, true);
    if !confident {
        log::debug!("Low-confidence encoding guess: {}", encoding.name());
    }
    if encoding == UTF_8 {
        // Not valid UTF-8 (checked above); chardetng's fallback is Windows-1252
        return DetectedEncoding::Legacy(encoding_rs::WINDOWS_1252);
    }
    DetectedEncoding::Legacy(encoding)
}

/// Detect encoding from BOM (Byte Order Mark).
fn detect_bom(buffer: &[u8]) -> Option<DetectedEncoding> {
    // UTF-32 LE starts with the UTF-16 LE BOM, so check it first
    if buffer.starts_with(UTF32_LE_BOM) {
        return Some(DetectedEncoding::Utf32Le);
    }
    if buffer.starts_with(UTF32_BE_BOM) {
        return Some(DetectedEncoding::Utf32Be);
    }
    if buffer.starts_with(UTF8_BOM) {
        return Some(DetectedEncoding::Utf8Bom);
    }
    if buffer.starts_with(UTF16_LE_BOM) {
        return Some(DetectedEncoding::Utf16Le);
    }
    if buffer.starts_with(UTF16_BE_BOM) {
        return Some(DetectedEncoding::Utf16Be);
    }
    None
}

/// Detect UTF-16 without BOM by looking at null byte patterns.
///
/// ASCII text in UTF-16 has alternating null bytes.
fn detect_utf16_without_bom(buffer: &[u8]) -> Option<DetectedEncoding> {
    let total_pairs = buffer.len() / 2;
    if total_pairs <= 4 {
        return None;
    }

    let nulls_at_odd = buffer
        .iter()
        .skip(1)
        .step_by(2)
        .filter(|&&b| b == 0)
        .count();
    let nulls_at_even = buffer.iter().step_by(2).filter(|&&b| b == 0).count();

    if nulls_at_odd > total_pairs * 3 / 4 && nulls_at_even < total_pairs / 4 {
        return Some(DetectedEncoding::Utf16Le);
    }
    if nulls_at_even > total_pairs * 3 / 4 && nulls_at_odd < total_pairs / 4 {
        return Some(DetectedEncoding::Utf16Be);
    }
    None
}

fn malformed(encoding: DetectedEncoding) -> DocsetError {
    DocsetError::Backend(format!(
        "'{}' codec can't decode the file content",
        encoding.label()
    ))
}

fn decode_strict(
    encoding: &'static Encoding,
    data: &[u8],
    detected: DetectedEncoding,
) -> Result<String, DocsetError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(data)
        .map(std::borrow::Cow::into_owned)
        .ok_or_else(|| malformed(detected))
}

fn decode_utf32(
    data: &[u8],
    big_endian: bool,
    detected: DetectedEncoding,
) -> Result<String, DocsetError> {
    if data.len() % 4 != 0 {
        return Err(malformed(detected));
    }
    data.chunks_exact(4)
        .map(|chunk| {
            let bytes = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let codepoint = if big_endian {
                u32::from_be_bytes(bytes)
            } else {
                u32::from_le_bytes(bytes)
            };
            char::from_u32(codepoint).ok_or_else(|| malformed(detected))
        })
        .collect()
}

/// Decode a buffer with an already-detected encoding, stripping any BOM.
///
/// # Errors
///
/// Returns [`DocsetError::Backend`] when the bytes are malformed for the
/// encoding.
pub fn decode_with_encoding(
    buffer: &[u8],
    encoding: DetectedEncoding,
) -> Result<String, DocsetError> {
    match encoding {
        DetectedEncoding::Ascii | DetectedEncoding::Utf8 => decode_strict(UTF_8, buffer, encoding),
        DetectedEncoding::Utf8Bom => {
            let data = buffer.strip_prefix(UTF8_BOM).unwrap_or(buffer);
            decode_strict(UTF_8, data, encoding)
        }
        DetectedEncoding::Utf16Le => {
            let data = buffer.strip_prefix(UTF16_LE_BOM).unwrap_or(buffer);
            decode_strict(UTF_16LE, data, encoding)
        }
        DetectedEncoding::Utf16Be => {
            let data = buffer.strip_prefix(UTF16_BE_BOM).unwrap_or(buffer);
            decode_strict(UTF_16BE, data, encoding)
        }
        DetectedEncoding::Utf32Le => {
            let data = buffer.strip_prefix(UTF32_LE_BOM).unwrap_or(buffer);
            decode_utf32(data, false, encoding)
        }
        DetectedEncoding::Utf32Be => {
            let data = buffer.strip_prefix(UTF32_BE_BOM).unwrap_or(buffer);
            decode_utf32(data, true, encoding)
        }
        DetectedEncoding::Legacy(enc) => decode_strict(enc, buffer, encoding),
    }
}

/// Detect the encoding of `buffer` and decode it to a `String`.
///
/// # Errors
///
/// Returns [`DocsetError::Backend`] when the content is malformed for the
/// detected encoding.
pub fn decode_to_utf8(buffer: &[u8]) -> Result<(String, DetectedEncoding), DocsetError> {
    let encoding = detect_encoding(buffer);
    log::debug!("Detected text encoding: {encoding}");
    let text = decode_with_encoding(buffer, encoding)?;
    Ok((text, encoding))
}

/// Apply universal newline translation: `\r\n` and lone `\r` become `\n`.
#[must_use = "returns the translated text without side effects"]
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_ascii() {
        assert_eq!(detect_encoding(b"Hello, World!"), DetectedEncoding::Ascii);
        assert_eq!(detect_encoding(b""), DetectedEncoding::Ascii);
    }

    #[test]
    fn test_detect_utf8() {
        assert_eq!(detect_encoding("Héllo wörld".as_bytes()), DetectedEncoding::Utf8);
    }

    #[test]
    fn test_detect_utf8_bom() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(b"Hello");
        assert_eq!(detect_encoding(&data), DetectedEncoding::Utf8Bom);
        let (text, encoding) = decode_to_utf8(&data).unwrap();
        assert_eq!(text, "Hello");
        assert_eq!(encoding.label(), "utf-8-sig");
    }

    #[test]
    fn test_detect_utf16_le_bom() {
        let data = [0xFF, 0xFE, b'H', 0x00, b'i', 0x00];
        assert_eq!(detect_encoding(&data), DetectedEncoding::Utf16Le);
        assert_eq!(decode_to_utf8(&data).unwrap().0, "Hi");
    }

    #[test]
    fn test_detect_utf16_be_bom() {
        let data = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(detect_encoding(&data), DetectedEncoding::Utf16Be);
        assert_eq!(decode_to_utf8(&data).unwrap().0, "Hi");
    }

    #[test]
    fn test_detect_utf16_le_without_bom() {
        let data: Vec<u8> = "Hello World".bytes().flat_map(|b| [b, 0]).collect();
        assert_eq!(detect_encoding(&data), DetectedEncoding::Utf16Le);
        assert_eq!(decode_to_utf8(&data).unwrap().0, "Hello World");
    }

    #[test]
    fn test_detect_utf32_le_bom() {
        let data = [0xFF, 0xFE, 0x00, 0x00, b'A', 0x00, 0x00, 0x00];
        assert_eq!(detect_encoding(&data), DetectedEncoding::Utf32Le);
        assert_eq!(decode_to_utf8(&data).unwrap().0, "A");
    }

    #[test]
    fn test_truncated_utf32_is_error() {
        let data = [0x00, 0x00, 0xFE, 0xFF, 0x00, 0x00];
        assert!(decode_to_utf8(&data).is_err());
    }

    #[test]
    fn test_detect_latin1_text() {
        // "Café résumé naïve" in Windows-1252
        let data = b"Caf\xe9 r\xe9sum\xe9 na\xefve, d\xe9j\xe0 vu";
        let (text, encoding) = decode_to_utf8(data).unwrap();
        assert!(matches!(encoding, DetectedEncoding::Legacy(_)));
        assert!(text.starts_with("Caf"));
        assert_eq!(text.chars().count(), data.len());
    }

    #[test]
    fn test_malformed_utf16_is_error() {
        // Unpaired high surrogate
        let data = [0xFF, 0xFE, 0x00, 0xD8, b'a', 0x00];
        let err = decode_to_utf8(&data).unwrap_err();
        assert!(err.to_string().contains("utf-16le"));
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_newlines("plain"), "plain");
    }
}
