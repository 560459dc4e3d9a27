//! Persisting cropped covers and their debug sidecars.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::Serialize;

use crate::error::Result;
use crate::isbn::IsbnMatches;

/// Everything captured from one qualifying page.
#[derive(Debug, Clone)]
pub struct PageCapture {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Cropped cover raster
    pub image: DynamicImage,
    /// Full page text
    pub text: String,
    /// ISBN candidates found in the text
    pub isbns: IsbnMatches,
}

/// Files produced (or planned, in a dry run) for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Shared basename of the image and text files
    pub stem: String,
    /// ISBN used for the name, if one was detected
    pub isbn: Option<String>,
    /// Every unique candidate on the page
    pub candidates: Vec<String>,
    /// Cover image in the staging directory
    pub image_path: PathBuf,
    /// Debug text in the staging directory
    pub text_path: PathBuf,
    /// Copy of the cover in the high-res directory
    pub secondary_path: Option<PathBuf>,
}

/// Writes covers into the staging directory and mirrors identified ones.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    staging_dir: PathBuf,
    highres_dir: PathBuf,
    jpeg_quality: u8,
}

impl OutputWriter {
    pub fn new(
        staging_dir: impl Into<PathBuf>,
        highres_dir: impl Into<PathBuf>,
        jpeg_quality: u8,
    ) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            highres_dir: highres_dir.into(),
            jpeg_quality,
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn highres_dir(&self) -> &Path {
        &self.highres_dir
    }

    /// Create both output directories if they are missing.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.staging_dir)?;
        fs::create_dir_all(&self.highres_dir)?;
        Ok(())
    }

    /// Work out the file names for a page without touching the disk.
    pub fn plan(&self, page_number: u32, isbns: &IsbnMatches) -> Artifact {
        let isbn = isbns.selected().map(str::to_string);
        let stem = artifact_stem(isbn.as_deref(), page_number);
        let secondary_path = isbn
            .as_ref()
            .map(|_| self.highres_dir.join(format!("{}.jpg", stem)));

        Artifact {
            page_number,
            image_path: self.staging_dir.join(format!("{}.jpg", stem)),
            text_path: self.staging_dir.join(format!("{}.txt", stem)),
            stem,
            isbn,
            candidates: isbns.candidates.clone(),
            secondary_path,
        }
    }

    /// Save the cover and sidecar, then copy the cover if it has an ISBN.
    pub fn write(&self, capture: &PageCapture) -> Result<Artifact> {
        let artifact = self.plan(capture.page_number, &capture.isbns);

        self.save_jpeg(&capture.image, &artifact.image_path)?;
        fs::write(
            &artifact.text_path,
            debug_text(capture.page_number, &capture.isbns, &capture.text),
        )?;

        if let Some(ref secondary) = artifact.secondary_path {
            copy_with_mtime(&artifact.image_path, secondary)?;
        }

        Ok(artifact)
    }

    fn save_jpeg(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality);
            encoder.encode_image(&image.to_rgb8())?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// `<isbn>` when an ISBN was detected, `page_<n>_nocode` otherwise.
pub fn artifact_stem(isbn: Option<&str>, page_number: u32) -> String {
    match isbn {
        Some(isbn) => isbn.to_string(),
        None => format!("page_{}_nocode", page_number),
    }
}

/// Contents of the `.txt` sidecar written next to each cover.
pub fn debug_text(page_number: u32, isbns: &IsbnMatches, text: &str) -> String {
    format!(
        "Page: {}\nDetected ISBNs: {}\n\n{}",
        page_number,
        isbns.display_list(),
        text
    )
}

fn copy_with_mtime(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    let modified = fs::metadata(from)?.modified()?;
    OpenOptions::new().write(true).open(to)?.set_modified(modified)
}
