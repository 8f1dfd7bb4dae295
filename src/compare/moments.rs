use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::{
    foundation::core::{Canvas, Point, Vec2},
    raster::image::{RasterImage, normalized_pair},
};

/// Where, and along which axis, two rasters differ the most.
///
/// Derived from the image moments of a thresholded difference mask. Only
/// produced when the mask is non-empty.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DiscrepancyReport {
    /// Mask centroid in comparison-grid pixels, measured at pixel centers.
    pub centroid: Point,
    /// Second central moments normalized by area (`mu20 / m00`, `mu02 / m00`).
    pub spread: Vec2,
    /// Number of differing pixels (the zeroth moment).
    pub area: u64,
    /// Size of the comparison grid both rasters were normalized to.
    pub extent: (u32, u32),
}

impl DiscrepancyReport {
    /// Horizontal spread moment.
    pub fn spread_x(&self) -> f64 {
        self.spread.x
    }

    /// Vertical spread moment.
    pub fn spread_y(&self) -> f64 {
        self.spread.y
    }

    /// Centroid rescaled from the comparison grid to canvas pixels.
    pub fn centroid_on(&self, canvas: Canvas) -> Point {
        let sx = f64::from(canvas.width) / f64::from(self.extent.0);
        let sy = f64::from(canvas.height) / f64::from(self.extent.1);
        Point::new(self.centroid.x * sx, self.centroid.y * sy)
    }
}

/// Thresholded-difference localizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscrepancyLocalizer {
    /// Luminance of the absolute difference above which a pixel counts as changed.
    pub threshold: u8,
}

impl Default for DiscrepancyLocalizer {
    fn default() -> Self {
        Self { threshold: 50 }
    }
}

impl DiscrepancyLocalizer {
    /// Build a localizer with a custom intensity threshold.
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Binary mask (0 or 255) of pixels whose difference luminance exceeds the threshold.
    pub fn difference_mask(&self, reference: &RasterImage, candidate: &RasterImage) -> GrayImage {
        let (a, b) = normalized_pair(reference, candidate);
        let (w, h) = a.dimensions();
        let diff = RgbImage::from_fn(w, h, |x, y| {
            let pa = a.get_pixel(x, y).0;
            let pb = b.get_pixel(x, y).0;
            Rgb([pa[0].abs_diff(pb[0]), pa[1].abs_diff(pb[1]), pa[2].abs_diff(pb[2])])
        });

        let mut mask = image::imageops::grayscale(&diff);
        for px in mask.pixels_mut() {
            *px = if px.0[0] > self.threshold {
                Luma([255])
            } else {
                Luma([0])
            };
        }
        mask
    }

    /// Summarize the difference between two rasters, or `None` when no pixel
    /// clears the threshold.
    pub fn localize(
        &self,
        reference: &RasterImage,
        candidate: &RasterImage,
    ) -> Option<DiscrepancyReport> {
        mask_moments(&self.difference_mask(reference, candidate))
    }
}

/// Moments of a binary mask; any non-zero pixel counts with unit weight.
pub fn mask_moments(mask: &GrayImage) -> Option<DiscrepancyReport> {
    let mut m00 = 0u64;
    let mut m10 = 0.0f64;
    let mut m01 = 0.0f64;

    for (x, y, px) in mask.enumerate_pixels() {
        if px.0[0] != 0 {
            m00 += 1;
            m10 += f64::from(x) + 0.5;
            m01 += f64::from(y) + 0.5;
        }
    }

    if m00 == 0 {
        return None;
    }

    let n = m00 as f64;
    let cx = m10 / n;
    let cy = m01 / n;

    let mut mu20 = 0.0f64;
    let mut mu02 = 0.0f64;
    for (x, y, px) in mask.enumerate_pixels() {
        if px.0[0] != 0 {
            let dx = f64::from(x) + 0.5 - cx;
            let dy = f64::from(y) + 0.5 - cy;
            mu20 += dx * dx;
            mu02 += dy * dy;
        }
    }

    Some(DiscrepancyReport {
        centroid: Point::new(cx, cy),
        spread: Vec2::new(mu20 / n, mu02 / n),
        area: m00,
        extent: mask.dimensions(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compare/moments.rs"]
mod tests;
