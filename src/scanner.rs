//! The page-by-page scan pipeline.
//!
//! Pages are visited in document order. Each page that passes the
//! [`PageFilter`] is rasterized, cropped to the configured cover region,
//! searched for ISBNs and handed to the [`OutputWriter`]. The first error
//! aborts the run.
//!
//! # Example
//!
//! ```no_run
//! use covercrop::{bind_pdfium, PdfiumBackend, ScanConfig, ScanEvent, Scanner};
//!
//! fn main() -> covercrop::Result<()> {
//!     let config = ScanConfig::new().with_input("catalogue.pdf");
//!     let pdfium = bind_pdfium(None)?;
//!     let backend = PdfiumBackend::open(&pdfium, &config.input, None)?;
//!
//!     let scanner = Scanner::new(config)?;
//!     let summary = scanner.run_with(&backend, |event| {
//!         if let ScanEvent::ArtifactWritten(artifact) = event {
//!             println!("page {} -> {}", artifact.page_number, artifact.stem);
//!         }
//!     })?;
//!     println!("{}", summary.summary_line());
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;

use image::DynamicImage;
use serde::Serialize;

use crate::backend::CatalogueBackend;
use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::filter::PageFilter;
use crate::isbn::{is_valid_isbn13, IsbnExtractor, IsbnMatches};
use crate::output::{Artifact, OutputWriter, PageCapture};

/// Progress events emitted while scanning.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// The scan is starting.
    ScanStart {
        /// Total number of pages in the document
        page_count: u32,
    },

    /// A page did not mention a subject/keyword pair.
    PageSkipped {
        /// 1-indexed page number
        number: u32,
    },

    /// A page qualified and is about to be captured.
    PageMatched {
        /// 1-indexed page number
        number: u32,
        subject: String,
        keyword: String,
    },

    /// Files for a qualifying page were written (or planned, in a dry run).
    ArtifactWritten(Artifact),
}

/// Totals for a finished scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    /// Pages in the document
    pub pages_total: u32,
    /// Pages inside the page selection
    pub pages_scanned: u32,
    /// Pages that passed the filter
    pub pages_matched: u32,
    /// Qualifying pages named after an ISBN
    pub with_isbn: u32,
    /// Qualifying pages saved under a `page_<n>_nocode` name
    pub without_isbn: u32,
    /// Output of every qualifying page, in page order
    pub artifacts: Vec<Artifact>,
    /// Whether anything was actually written
    pub dry_run: bool,
}

impl ScanSummary {
    fn record(&mut self, artifact: Artifact) {
        self.pages_matched += 1;
        if artifact.isbn.is_some() {
            self.with_isbn += 1;
        } else {
            self.without_isbn += 1;
        }
        self.artifacts.push(artifact);
    }

    /// One-line human readable summary.
    pub fn summary_line(&self) -> String {
        format!(
            "Scanned {} of {} pages: {} matched, {} with ISBN, {} without",
            self.pages_scanned, self.pages_total, self.pages_matched, self.with_isbn, self.without_isbn
        )
    }
}

/// What the scanner sees on a single page, without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// 1-indexed page number
    pub page_number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// First (subject, keyword) pair found, if the page qualifies
    pub matched: Option<(String, String)>,
    pub isbns: IsbnMatches,
    /// Names the page would be saved under
    pub planned: Option<Artifact>,
    pub text: String,
}

/// Runs the scan pipeline over a [`CatalogueBackend`].
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
    filter: PageFilter,
    extractor: IsbnExtractor,
    writer: OutputWriter,
}

impl Scanner {
    /// Validate `config` and build a scanner from it.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;

        let filter = PageFilter::new(config.subjects.clone(), config.keywords.clone());
        let writer = OutputWriter::new(
            config.staging_dir.clone(),
            config.highres_dir.clone(),
            config.jpeg_quality,
        );

        Ok(Self {
            config,
            filter,
            extractor: IsbnExtractor::new(),
            writer,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan every selected page.
    pub fn run<B: CatalogueBackend + ?Sized>(&self, backend: &B) -> Result<ScanSummary> {
        self.run_with(backend, |_| {})
    }

    /// Scan every selected page, reporting progress through `on_event`.
    pub fn run_with<B, F>(&self, backend: &B, mut on_event: F) -> Result<ScanSummary>
    where
        B: CatalogueBackend + ?Sized,
        F: FnMut(&ScanEvent),
    {
        let dry_run = self.config.dry_run;
        if !dry_run {
            self.writer.prepare()?;
        }

        let page_count = backend.page_count();
        on_event(&ScanEvent::ScanStart { page_count });
        log::debug!("Scanning {} pages", page_count);

        let mut summary = ScanSummary {
            pages_total: page_count,
            dry_run,
            ..Default::default()
        };
        let mut stems = HashSet::new();

        for index in 0..page_count {
            let number = index + 1;
            if !self.config.pages.includes(number) {
                continue;
            }
            summary.pages_scanned += 1;

            let text = backend.page_text(index)?;
            let Some((subject, keyword)) = self.filter.matched_pair(&text) else {
                log::debug!("Page {}: no subject/keyword pair", number);
                on_event(&ScanEvent::PageSkipped { number });
                continue;
            };

            log::info!("Page {}: {} {} found", number, subject, keyword);
            on_event(&ScanEvent::PageMatched {
                number,
                subject: subject.to_string(),
                keyword: keyword.to_string(),
            });

            let isbns = self.extractor.extract(&text);
            match isbns.selected() {
                None => log::warn!("Page {}: no ISBN detected", number),
                Some(isbn) if !is_valid_isbn13(isbn) => {
                    log::warn!("Page {}: {} fails the ISBN-13 checksum", number, isbn)
                }
                Some(_) => {}
            }

            let artifact = if dry_run {
                self.writer.plan(number, &isbns)
            } else {
                let image = self.capture_cover(backend, index)?;
                self.writer.write(&PageCapture {
                    page_number: number,
                    image,
                    text,
                    isbns,
                })?
            };

            if !stems.insert(artifact.stem.clone()) {
                log::warn!(
                    "Page {}: {} was already produced by an earlier page and is overwritten",
                    number,
                    artifact.stem
                );
            }

            on_event(&ScanEvent::ArtifactWritten(artifact.clone()));
            summary.record(artifact);
        }

        log::info!("{}", summary.summary_line());
        Ok(summary)
    }

    /// Render a page and cut out the cover region.
    pub fn capture_cover<B: CatalogueBackend + ?Sized>(
        &self,
        backend: &B,
        index: u32,
    ) -> Result<DynamicImage> {
        let (width, height) = backend.page_size(index)?;
        let crop = &self.config.crop;
        log::debug!(
            "Page {}: cropping x {:.1}-{:.1}, y {:.1}-{:.1} of {:.1}x{:.1}pt at {}x",
            index + 1,
            crop.left * width,
            crop.right * width,
            crop.top * height,
            crop.bottom * height,
            width,
            height,
            self.config.scale
        );

        let page = backend.render_page(index, self.config.scale)?;
        Ok(crop.crop(&page))
    }

    /// Describe a single page (1-indexed) without writing anything.
    pub fn inspect_page<B: CatalogueBackend + ?Sized>(
        &self,
        backend: &B,
        page_number: u32,
    ) -> Result<PageReport> {
        let page_count = backend.page_count();
        if page_number == 0 || page_number > page_count {
            return Err(Error::PageNotFound(page_number, page_count));
        }
        let index = page_number - 1;

        let text = backend.page_text(index)?;
        let (width, height) = backend.page_size(index)?;
        let matched = self
            .filter
            .matched_pair(&text)
            .map(|(s, k)| (s.to_string(), k.to_string()));
        let isbns = self.extractor.extract(&text);
        let planned = matched
            .as_ref()
            .map(|_| self.writer.plan(page_number, &isbns));

        Ok(PageReport {
            page_number,
            width,
            height,
            matched,
            isbns,
            planned,
            text,
        })
    }
}
