// Byte order mark detection for XML sources.
// UTF-8 is assumed, but exported files sometimes carry a UTF-8 or UTF-16 BOM.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::fs;
use std::path::Path;

use crate::logger;
use crate::types::ExtractError;

/// Read an XML file and return its text as UTF-8 with Unix line endings.
pub fn read_xml_file(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path).map_err(|e| ExtractError::SourceUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(decode_xml_bytes(&bytes, path))
}

fn decode_xml_bytes(bytes: &[u8], path: &Path) -> String {
    let (encoding, bom_len) = detect_encoding(bytes);

    logger::debug(&format!(
        "File: {:?}, Encoding: {}, BOM: {}",
        path.file_name().unwrap_or_default(),
        encoding.name(),
        bom_len > 0
    ));

    let (decoded, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);

    if had_errors {
        logger::warn(&format!("Encoding errors detected while decoding {:?}", path));
    }

    decoded.replace("\r\n", "\n")
}

/// Returns the encoding and the length of its BOM (0 when absent).
fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return (UTF_16LE, 2);
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return (UTF_16BE, 2);
    }
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return (UTF_8, 3);
    }
    (UTF_8, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_utf16le_bom() {
        let bytes = vec![0xFF, 0xFE, 0x41, 0x00];
        assert_eq!(detect_encoding(&bytes), (UTF_16LE, 2));
    }

    #[test]
    fn test_detect_utf8_bom() {
        let bytes = vec![0xEF, 0xBB, 0xBF, 0x41];
        assert_eq!(detect_encoding(&bytes), (UTF_8, 3));
    }

    #[test]
    fn test_detect_no_bom() {
        assert_eq!(detect_encoding(b"<x/>"), (UTF_8, 0));
    }

    #[test]
    fn test_decode_utf16le_with_crlf() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<a>\r\nb</a>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let text = decode_xml_bytes(&bytes, Path::new("test.xml"));
        assert_eq!(text, "<a>\nb</a>");
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = read_xml_file(Path::new("does/not/exist.xml")).unwrap_err();
        assert!(matches!(err, ExtractError::SourceUnavailable { .. }));
    }
}
