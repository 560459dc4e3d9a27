//! Scan configuration.

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::region::CropRegion;

/// Subjects advertised in the secondary catalogue.
pub const DEFAULT_SUBJECTS: &[&str] = &[
    "Mathematics",
    "English",
    "Physics",
    "Chemistry",
    "Biology",
];

/// Product lines whose covers are wanted.
pub const DEFAULT_KEYWORDS: &[&str] = &["Coursebook", "Workbook"];

/// Linear upscale applied when rasterizing the crop region.
pub const DEFAULT_SCALE: f32 = 2.0;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Options for a catalogue scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Source catalogue PDF
    pub input: PathBuf,

    /// Receives every qualifying page (image + debug text)
    pub staging_dir: PathBuf,

    /// Receives a copy of each cover whose ISBN was detected
    pub highres_dir: PathBuf,

    /// A page must mention at least one of these...
    pub subjects: Vec<String>,

    /// ...and at least one of these
    pub keywords: Vec<String>,

    /// Part of the page holding the cover
    pub crop: CropRegion,

    /// Render scale relative to 72 dpi
    pub scale: f32,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// Which pages to look at (1-indexed)
    pub pages: PageSelection,

    /// Report what would be written without touching the filesystem
    pub dry_run: bool,

    /// Password for encrypted catalogues
    pub password: Option<String>,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config file on top of the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        ConfigFile::load(path)?.apply(Self::default())
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = path.into();
        self
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_highres_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.highres_dir = dir.into();
        self
    }

    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_crop(mut self, crop: CropRegion) -> Self {
        self.crop = crop;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Check the options before any page is touched.
    pub fn validate(&self) -> Result<()> {
        if self.subjects.iter().all(|s| s.is_empty()) {
            return Err(Error::InvalidConfig("no subjects configured".into()));
        }
        if self.keywords.iter().all(|k| k.is_empty()) {
            return Err(Error::InvalidConfig("no keywords configured".into()));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::InvalidConfig(format!(
                "JPEG quality must be within 1-100, got {}",
                self.jpeg_quality
            )));
        }
        self.crop.validate()
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("catalogue.pdf"),
            staging_dir: PathBuf::from("selected_subjects"),
            highres_dir: PathBuf::from("highres"),
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            crop: CropRegion::right_half(),
            scale: DEFAULT_SCALE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            pages: PageSelection::All,
            dry_run: false,
            password: None,
        }
    }
}

/// On-disk JSON form of [`ScanConfig`]; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub input: Option<PathBuf>,
    pub staging_dir: Option<PathBuf>,
    pub highres_dir: Option<PathBuf>,
    pub subjects: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub crop: Option<CropRegion>,
    pub scale: Option<f32>,
    pub jpeg_quality: Option<u8>,
    pub pages: Option<String>,
}

impl ConfigFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Overlay the fields present in the file onto `config`.
    pub fn apply(self, mut config: ScanConfig) -> Result<ScanConfig> {
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(dir) = self.staging_dir {
            config.staging_dir = dir;
        }
        if let Some(dir) = self.highres_dir {
            config.highres_dir = dir;
        }
        if let Some(subjects) = self.subjects {
            config.subjects = subjects;
        }
        if let Some(keywords) = self.keywords {
            config.keywords = keywords;
        }
        if let Some(crop) = self.crop {
            config.crop = crop;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(quality) = self.jpeg_quality {
            config.jpeg_quality = quality;
        }
        if let Some(pages) = self.pages {
            config.pages = PageSelection::parse(&pages)?;
        }
        Ok(config)
    }
}

/// Page selection for a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed, sorted)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number (1-indexed) should be scanned.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.binary_search(&page).is_ok(),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10", "all").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let (start, end) = (page_number(start)?, page_number(end)?);
                check_order(start, end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (page_number(start)?, page_number(end)?);
                    check_order(start, end)?;
                    pages.extend(start..=end);
                }
                None => pages.push(page_number(part)?),
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn page_number(s: &str) -> Result<u32> {
    match s.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidConfig(format!(
            "invalid page number '{}'",
            s.trim()
        ))),
        Ok(n) => Ok(n),
    }
}

fn check_order(start: u32, end: u32) -> Result<()> {
    if start > end {
        return Err(Error::InvalidConfig(format!(
            "page range {}-{} is reversed",
            start, end
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.subjects.len(), 5);
        assert_eq!(config.keywords, vec!["Coursebook", "Workbook"]);
        assert_eq!(config.crop, CropRegion::right_half());
        assert_eq!(config.scale, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ScanConfig::new()
            .with_input("cat.pdf")
            .with_staging_dir("out")
            .with_highres_dir("hi")
            .with_subjects(["Geography"])
            .with_keywords(["Workbook"])
            .with_scale(3.0)
            .with_dry_run(true);

        assert_eq!(config.input, PathBuf::from("cat.pdf"));
        assert_eq!(config.staging_dir, PathBuf::from("out"));
        assert_eq!(config.highres_dir, PathBuf::from("hi"));
        assert_eq!(config.subjects, vec!["Geography"]);
        assert_eq!(config.scale, 3.0);
        assert!(config.dry_run);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ScanConfig::new()
            .with_subjects(Vec::<String>::new())
            .validate()
            .is_err());
        assert!(ScanConfig::new().with_keywords([""]).validate().is_err());
        assert!(ScanConfig::new().with_scale(0.0).validate().is_err());
        assert!(ScanConfig::new().with_scale(f32::INFINITY).validate().is_err());
        assert!(ScanConfig::new().with_jpeg_quality(0).validate().is_err());
        assert!(ScanConfig::new().with_jpeg_quality(101).validate().is_err());
        assert!(matches!(
            ScanConfig::new()
                .with_crop(CropRegion::new(0.5, 0.0, 0.5, 1.0))
                .validate(),
            Err(Error::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_config_file_overlay() {
        let file = ConfigFile::parse(
            r#"{
                "staging_dir": "stage",
                "subjects": ["Computer Science"],
                "crop": { "left": 0.6, "top": 0.0, "right": 1.0, "bottom": 0.9 },
                "pages": "2-4"
            }"#,
        )
        .unwrap();
        let config = file.apply(ScanConfig::default()).unwrap();

        assert_eq!(config.staging_dir, PathBuf::from("stage"));
        assert_eq!(config.highres_dir, PathBuf::from("highres"));
        assert_eq!(config.subjects, vec!["Computer Science"]);
        assert_eq!(config.keywords.len(), 2);
        assert_eq!(config.crop.left, 0.6);
        assert_eq!(config.pages, PageSelection::Range(2..=4));
    }

    #[test]
    fn test_config_file_rejects_unknown_fields() {
        assert!(ConfigFile::parse(r#"{ "stagingdir": "x" }"#).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        fs::write(&path, r#"{ "scale": 1.5, "jpeg_quality": 75 }"#).unwrap();

        let config = ScanConfig::from_json_file(&path).unwrap();
        assert_eq!(config.scale, 1.5);
        assert_eq!(config.jpeg_quality, 75);
    }

    #[test]
    fn test_page_selection_includes() {
        let all = PageSelection::All;
        assert!(all.includes(1));
        assert!(all.includes(100));

        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3, 5, 7]);
        assert!(pages.includes(1));
        assert!(!pages.includes(2));
        assert!(pages.includes(3));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("1-10").unwrap(),
            PageSelection::Range(1..=10)
        );
        assert_eq!(
            PageSelection::parse("7,1,3,5-7,10").unwrap(),
            PageSelection::Pages(vec![1, 3, 5, 6, 7, 10])
        );
    }

    #[test]
    fn test_page_selection_parse_errors() {
        assert!(PageSelection::parse("0").is_err());
        assert!(PageSelection::parse("5-2").is_err());
        assert!(PageSelection::parse("1,x").is_err());
    }
}
