//! # covercrop
//!
//! Pulls product covers out of a publisher's catalogue PDF.
//!
//! Every page whose text names one of the configured subjects together with
//! one of the configured keywords (e.g. "Mathematics" and "Coursebook") is
//! rendered, cropped to the cover region and saved as a JPEG named after the
//! first ISBN found on the page. Covers with an ISBN are also copied into a
//! second, "high-res" directory.
//!
//! ## Quick Start
//!
//! ```no_run
//! use covercrop::{scan, ScanConfig};
//!
//! fn main() -> covercrop::Result<()> {
//!     let config = ScanConfig::new()
//!         .with_input("catalogue.pdf")
//!         .with_staging_dir("selected_subjects")
//!         .with_highres_dir("highres");
//!
//!     let summary = scan(config, None)?;
//!     println!("{}", summary.summary_line());
//!     Ok(())
//! }
//! ```
//!
//! Rendering goes through PDFium, which is loaded at runtime; see
//! [`bind_pdfium`].

pub mod backend;
pub mod config;
pub mod detect;
pub mod error;
pub mod filter;
pub mod inventory;
pub mod isbn;
pub mod output;
pub mod region;
pub mod scanner;

// Re-export commonly used types
pub use backend::{bind_pdfium, CatalogueBackend, PdfiumBackend};
pub use config::{ConfigFile, PageSelection, ScanConfig};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf_bytes, PdfHeader};
pub use error::{Error, Result};
pub use filter::PageFilter;
pub use inventory::inventory;
pub use isbn::{is_valid_isbn13, IsbnExtractor, IsbnMatches};
pub use output::{artifact_stem, debug_text, Artifact, OutputWriter, PageCapture};
pub use region::{CropRegion, PixelRect};
pub use scanner::{PageReport, ScanEvent, ScanSummary, Scanner};

use std::path::Path;

/// Scan the catalogue named in `config` with PDFium.
///
/// `pdfium_lib` is a directory holding the PDFium shared library; `None`
/// searches the system library path.
pub fn scan(config: ScanConfig, pdfium_lib: Option<&Path>) -> Result<ScanSummary> {
    let scanner = Scanner::new(config)?;
    let pdfium = bind_pdfium(pdfium_lib)?;
    let config = scanner.config();
    let backend = PdfiumBackend::open(&pdfium, &config.input, config.password.as_deref())?;
    scanner.run(&backend)
}
