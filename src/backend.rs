//! Document backend abstraction layer.
//!
//! The scanner only needs page text, page geometry and a raster of each page.
//! [`CatalogueBackend`] isolates those from the concrete PDF library so the
//! pipeline can be driven by something other than PDFium in tests.

use std::path::Path;

use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;

use crate::detect::detect_format_from_path;
use crate::error::{Error, Result};

/// Read access to a paginated document. Page indices are 0-based.
pub trait CatalogueBackend {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Plain text of a whole page.
    fn page_text(&self, index: u32) -> Result<String>;

    /// Page width and height in points.
    fn page_size(&self, index: u32) -> Result<(f32, f32)>;

    /// Rasterize a whole page at `scale` × its native 72 dpi size.
    fn render_page(&self, index: u32, scale: f32) -> Result<DynamicImage>;
}

/// Bind to the PDFium shared library.
///
/// `lib_dir` is tried first; when it is missing or does not hold a loadable
/// library the system library search path is used instead.
pub fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium> {
    let bindings = match lib_dir {
        Some(dir) => {
            Pdfium::bind_to_library(&Pdfium::pdfium_platform_library_name_at_path(dir)).or_else(
                |e| {
                    log::warn!(
                        "No usable PDFium in {} ({}), trying system library",
                        dir.display(),
                        e
                    );
                    Pdfium::bind_to_system_library()
                },
            )?
        }
        None => Pdfium::bind_to_system_library()?,
    };
    Ok(Pdfium::new(bindings))
}

/// [`CatalogueBackend`] backed by a PDFium document.
pub struct PdfiumBackend<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumBackend<'a> {
    /// Open a catalogue from disk.
    pub fn open<P: AsRef<Path>>(
        pdfium: &'a Pdfium,
        path: P,
        password: Option<&'a str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let header = detect_format_from_path(path)?;
        log::debug!("Opening {} ({})", path.display(), header);

        let document = pdfium.load_pdf_from_file(path, password)?;
        Ok(Self { document })
    }

    fn page(&self, index: u32) -> Result<PdfPage<'a>> {
        let count = self.page_count();
        if index >= count {
            return Err(Error::PageOutOfRange(index, count));
        }
        let index =
            PdfPageIndex::try_from(index).map_err(|_| Error::PageOutOfRange(index, count))?;
        Ok(self.document.pages().get(index)?)
    }
}

impl CatalogueBackend for PdfiumBackend<'_> {
    fn page_count(&self) -> u32 {
        self.document.pages().len() as u32
    }

    fn page_text(&self, index: u32) -> Result<String> {
        Ok(self.page(index)?.text()?.all())
    }

    fn page_size(&self, index: u32) -> Result<(f32, f32)> {
        let page = self.page(index)?;
        Ok((page.width().value, page.height().value))
    }

    fn render_page(&self, index: u32, scale: f32) -> Result<DynamicImage> {
        let page = self.page(index)?;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page.render_with_config(&config)?;

        let width = bitmap.width().max(0) as u32;
        let height = bitmap.height().max(0) as u32;
        let raster = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(
            || Error::Pdfium(format!("bitmap for page {} has unexpected size", index + 1)),
        )?;

        Ok(DynamicImage::ImageRgba8(raster))
    }
}
