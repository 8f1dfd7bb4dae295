use image::GrayImage;

use crate::raster::image::{RasterImage, normalized_pair};

/// Structural-similarity scorer over luminance.
///
/// Uses a uniform square window with sample covariance and averages the
/// per-window index over every window that fits fully inside the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityScorer {
    /// Side of the square window in pixels (odd). Shrunk for images smaller
    /// than the window.
    pub window: u32,
    /// Luminance stabilizer constant.
    pub k1: f64,
    /// Contrast stabilizer constant.
    pub k2: f64,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self {
            window: 7,
            k1: 0.01,
            k2: 0.03,
        }
    }
}

const DATA_RANGE: f64 = 255.0;

impl SimilarityScorer {
    /// Mean structural similarity of `candidate` against `reference`, clamped to `[0, 1]`.
    ///
    /// Both rasters are resized to their shared minimum size first. Identical
    /// inputs score exactly `1.0`.
    pub fn score(&self, reference: &RasterImage, candidate: &RasterImage) -> f64 {
        let (a, b) = normalized_pair(reference, candidate);
        let la = image::imageops::grayscale(a.as_ref());
        let lb = image::imageops::grayscale(b.as_ref());
        self.mean_ssim(&la, &lb).clamp(0.0, 1.0)
    }

    fn effective_window(&self, width: u32, height: u32) -> u32 {
        let mut win = self.window.max(1).min(width).min(height);
        if win.is_multiple_of(2) {
            win -= 1;
        }
        win.max(1)
    }

    fn mean_ssim(&self, x: &GrayImage, y: &GrayImage) -> f64 {
        debug_assert_eq!(x.dimensions(), y.dimensions());
        let (width, height) = x.dimensions();
        let win = self.effective_window(width, height) as usize;
        let (w, h) = (width as usize, height as usize);

        let np = (win * win) as f64;
        let cov_norm = if win > 1 { np / (np - 1.0) } else { 1.0 };
        let c1 = (self.k1 * DATA_RANGE).powi(2);
        let c2 = (self.k2 * DATA_RANGE).powi(2);

        let xs = x.as_raw();
        let ys = y.as_raw();

        // Per-column sums over the current vertical band of `win` rows. Integer
        // accumulation keeps the sums exact.
        let mut cols = vec![WindowSums::default(); w];
        for row in 0..win {
            for (c, col) in cols.iter_mut().enumerate() {
                col.add(xs[row * w + c], ys[row * w + c]);
            }
        }

        let mut total = 0.0f64;
        let mut count = 0u64;

        for top in 0..=(h - win) {
            if top > 0 {
                let out = top - 1;
                let inc = top + win - 1;
                for (c, col) in cols.iter_mut().enumerate() {
                    col.sub(xs[out * w + c], ys[out * w + c]);
                    col.add(xs[inc * w + c], ys[inc * w + c]);
                }
            }

            let mut acc = WindowSums::default();
            for col in &cols[..win] {
                acc.merge(col);
            }

            for left in 0..=(w - win) {
                if left > 0 {
                    acc.unmerge(&cols[left - 1]);
                    acc.merge(&cols[left + win - 1]);
                }

                let ux = acc.x as f64 / np;
                let uy = acc.y as f64 / np;
                let vx = cov_norm * (acc.xx as f64 / np - ux * ux);
                let vy = cov_norm * (acc.yy as f64 / np - uy * uy);
                let vxy = cov_norm * (acc.xy as f64 / np - ux * uy);

                let num = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
                let den = (ux * ux + uy * uy + c1) * (vx + vy + c2);
                total += num / den;
                count += 1;
            }
        }

        total / count as f64
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct WindowSums {
    x: u64,
    y: u64,
    xx: u64,
    yy: u64,
    xy: u64,
}

impl WindowSums {
    fn add(&mut self, a: u8, b: u8) {
        let (a, b) = (u64::from(a), u64::from(b));
        self.x += a;
        self.y += b;
        self.xx += a * a;
        self.yy += b * b;
        self.xy += a * b;
    }

    fn sub(&mut self, a: u8, b: u8) {
        let (a, b) = (u64::from(a), u64::from(b));
        self.x -= a;
        self.y -= b;
        self.xx -= a * a;
        self.yy -= b * b;
        self.xy -= a * b;
    }

    fn merge(&mut self, o: &Self) {
        self.x += o.x;
        self.y += o.y;
        self.xx += o.xx;
        self.yy += o.yy;
        self.xy += o.xy;
    }

    fn unmerge(&mut self, o: &Self) {
        self.x -= o.x;
        self.y -= o.y;
        self.xx -= o.xx;
        self.yy -= o.yy;
        self.xy -= o.xy;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compare/ssim.rs"]
mod tests;
