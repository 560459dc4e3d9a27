//! Crop regions expressed as fractions of the page box.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A rectangle in page-relative coordinates.
///
/// All edges are fractions of the page width/height, with the origin at the
/// top-left corner. The default is the right half of the page, which is where
/// the catalogue prints its cover art.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// A rectangle in raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// x ∈ [0.5, 1.0], y ∈ [0, 1].
    pub fn right_half() -> Self {
        Self::new(0.5, 0.0, 1.0, 1.0)
    }

    pub fn full_page() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Parse `"left,top,right,bottom"`, e.g. `"0.5,0,1,1"`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(Error::InvalidRegion(format!(
                "expected 4 comma-separated fractions, got '{}'",
                s
            )));
        }

        let mut edges = [0f32; 4];
        for (edge, part) in edges.iter_mut().zip(&parts) {
            *edge = part
                .parse()
                .map_err(|_| Error::InvalidRegion(format!("'{}' is not a number", part)))?;
        }

        let region = Self::new(edges[0], edges[1], edges[2], edges[3]);
        region.validate()?;
        Ok(region)
    }

    /// Reject regions that are non-finite, outside the page or empty.
    pub fn validate(&self) -> Result<()> {
        let edges = [self.left, self.top, self.right, self.bottom];
        if edges.iter().any(|e| !e.is_finite() || *e < 0.0 || *e > 1.0) {
            return Err(Error::InvalidRegion(format!(
                "edges must lie within [0, 1]: {:?}",
                edges
            )));
        }
        if self.left >= self.right || self.top >= self.bottom {
            return Err(Error::InvalidRegion(format!(
                "region has no area: {:?}",
                edges
            )));
        }
        Ok(())
    }

    /// Map the region onto a raster of the given size.
    ///
    /// Edges are rounded outwards and the result is never smaller than one
    /// pixel on a non-empty raster.
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let (x, w) = span(self.left, self.right, width);
        let (y, h) = span(self.top, self.bottom, height);
        PixelRect {
            x,
            y,
            width: w,
            height: h,
        }
    }

    /// Cut the region out of a rendered page.
    pub fn crop(&self, page: &DynamicImage) -> DynamicImage {
        let rect = self.to_pixels(page.width(), page.height());
        page.crop_imm(rect.x, rect.y, rect.width, rect.height)
    }
}

impl Default for CropRegion {
    fn default() -> Self {
        Self::right_half()
    }
}

fn span(start: f32, end: f32, extent: u32) -> (u32, u32) {
    if extent == 0 {
        return (0, 0);
    }
    let extent_f = extent as f32;
    let lo = ((start * extent_f).floor() as u32).min(extent - 1);
    let hi = ((end * extent_f).ceil() as u32).clamp(lo + 1, extent);
    (lo, hi - lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_right_half_pixels() {
        let rect = CropRegion::right_half().to_pixels(1190, 1684);
        assert_eq!(
            rect,
            PixelRect {
                x: 595,
                y: 0,
                width: 595,
                height: 1684
            }
        );
    }

    #[test]
    fn test_odd_width_rounds_outwards() {
        let rect = CropRegion::right_half().to_pixels(101, 10);
        assert_eq!(rect.x, 50);
        assert_eq!(rect.width, 51);
    }

    #[test]
    fn test_tiny_region_keeps_one_pixel() {
        let region = CropRegion::new(0.5, 0.5, 0.5001, 0.5001);
        let rect = region.to_pixels(10, 10);
        assert_eq!(rect.width, 1);
        assert_eq!(rect.height, 1);
    }

    #[test]
    fn test_empty_raster() {
        let rect = CropRegion::right_half().to_pixels(0, 0);
        assert_eq!(rect.width, 0);
        assert_eq!(rect.height, 0);
    }

    #[test]
    fn test_parse() {
        let region = CropRegion::parse("0.5, 0, 1, 1").unwrap();
        assert_eq!(region, CropRegion::right_half());

        assert!(CropRegion::parse("0.5,0,1").is_err());
        assert!(CropRegion::parse("a,0,1,1").is_err());
        assert!(CropRegion::parse("0.6,0,0.4,1").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(CropRegion::full_page().validate().is_ok());
        assert!(CropRegion::new(-0.1, 0.0, 1.0, 1.0).validate().is_err());
        assert!(CropRegion::new(0.0, 0.0, 1.5, 1.0).validate().is_err());
        assert!(CropRegion::new(0.0, 0.3, 1.0, 0.3).validate().is_err());
        assert!(CropRegion::new(f32::NAN, 0.0, 1.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_crop_keeps_right_half_pixels() {
        let mut page = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
        page.put_pixel(2, 0, Rgb([255, 0, 0]));
        page.put_pixel(1, 0, Rgb([0, 255, 0]));

        let cropped = CropRegion::right_half()
            .crop(&DynamicImage::ImageRgb8(page))
            .to_rgb8();

        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(*cropped.get_pixel(0, 0), Rgb([255, 0, 0]));
        assert!(cropped.pixels().all(|p| *p != Rgb([0, 255, 0])));
    }
}
