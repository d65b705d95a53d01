//! Loading HTML source text.
//!
//! [§ 13.2.3 The input byte stream](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream)
//!
//! Encoding sniffing is not implemented: input must be UTF-8. A leading
//! UTF-8 byte order mark is stripped, as BOM sniffing would do.

use std::path::Path;

use thiserror::Error;

/// The UTF-8 encoding of U+FEFF BYTE ORDER MARK.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Error type for loading source documents.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not valid UTF-8.
    #[error("input is not valid UTF-8 (first invalid byte at {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the valid prefix.
        valid_up_to: usize,
    },
}

/// Decode raw bytes as UTF-8 text, dropping a leading byte order mark.
///
/// # Errors
///
/// Returns [`SourceError::InvalidUtf8`] if the bytes are not valid UTF-8.
pub fn decode_bytes(bytes: &[u8]) -> Result<String, SourceError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| SourceError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })
}

/// Read a document from disk.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read and
/// [`SourceError::InvalidUtf8`] if its contents are not UTF-8.
pub fn read_source(path: &Path) -> Result<String, SourceError> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_bom() {
        let decoded = decode_bytes(b"\xEF\xBB\xBF<p>hi").unwrap();
        assert_eq!(decoded, "<p>hi");
    }

    #[test]
    fn test_decode_keeps_inner_bom() {
        let decoded = decode_bytes("a\u{FEFF}b".as_bytes()).unwrap();
        assert_eq!(decoded, "a\u{FEFF}b");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode_bytes(b"ab\xFFcd").unwrap_err();
        assert!(matches!(err, SourceError::InvalidUtf8 { valid_up_to: 2 }));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_source(Path::new("/definitely/not/here.html")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.html"));
    }
}
