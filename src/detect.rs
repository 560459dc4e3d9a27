//! PDF header sniffing.
//!
//! PDFium accepts almost anything and reports a generic failure, so the
//! input is checked for a `%PDF-x.y` marker before it reaches the renderer.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header information read from the start of a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Byte offset of the `%PDF-` marker
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Readers tolerate junk before the marker as long as it sits in the first KiB.
const HEADER_WINDOW: usize = 1024;

/// Read the header of a file on disk.
///
/// # Example
/// ```no_run
/// use covercrop::detect::detect_format_from_path;
///
/// let header = detect_format_from_path("catalogue.pdf").unwrap();
/// println!("PDF version: {}", header.version);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let file = File::open(path)?;
    let mut window = Vec::with_capacity(HEADER_WINDOW);
    file.take(HEADER_WINDOW as u64).read_to_end(&mut window)?;
    detect_format_from_bytes(&window)
}

/// Read the header from the leading bytes of a document.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_WINDOW)];

    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = window
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version, offset })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3
        && matches!(bytes[0], b'1' | b'2')
        && bytes[1] == b'.'
        && bytes[2].is_ascii_digit()
}

/// Check if bytes start like a PDF document.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_valid_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        let header = detect_format_from_bytes(data).unwrap();
        assert_eq!(header.version, "1.7");
        assert_eq!(header.offset, 0);
    }

    #[test]
    fn test_detect_marker_after_junk() {
        let mut data = vec![0u8; 40];
        data.extend_from_slice(b"%PDF-1.4\n");
        let header = detect_format_from_bytes(&data).unwrap();
        assert_eq!(header.version, "1.4");
        assert_eq!(header.offset, 40);
    }

    #[test]
    fn test_detect_marker_outside_window() {
        let mut data = vec![b' '; HEADER_WINDOW];
        data.extend_from_slice(b"%PDF-1.4\n");
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_invalid_format() {
        let result = detect_format_from_bytes(b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_truncated_version() {
        let result = detect_format_from_bytes(b"%PDF-1");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_bad_version() {
        let result = detect_format_from_bytes(b"%PDF-x.y\n");
        assert!(matches!(result, Err(Error::UnsupportedVersion(v)) if v == "x.y"));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\n"));
        assert!(!is_pdf_bytes(b"Not a PDF"));
        assert!(!is_pdf_bytes(b""));
    }

    #[test]
    fn test_detect_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.pdf");
        std::fs::write(&path, b"%PDF-2.0\n%%EOF\n").unwrap();
        assert_eq!(detect_format_from_path(&path).unwrap().version, "2.0");
    }
}
