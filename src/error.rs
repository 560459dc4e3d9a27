//! Error types for covercrop.

use std::io;
use thiserror::Error;

/// Result type alias for covercrop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while scanning a catalogue.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error reported by the PDFium bindings (binding, loading, rendering).
    #[error("PDFium error: {0}")]
    Pdfium(String),

    /// Page index is out of range (0-based index, page count).
    #[error("Page index {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Requested page does not exist (1-based page number, page count).
    #[error("Page {0} does not exist (document has {1} pages)")]
    PageNotFound(u32, u32),

    /// The crop region is degenerate or outside the page.
    #[error("Invalid crop region: {0}")]
    InvalidRegion(String),

    /// The scan configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error cropping or encoding the cover image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Error reading a JSON configuration file.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<pdfium_render::prelude::PdfiumError> for Error {
    fn from(err: pdfium_render::prelude::PdfiumError) -> Self {
        Error::Pdfium(err.to_string())
    }
}
