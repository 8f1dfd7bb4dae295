use std::{borrow::Cow, io::Cursor, path::Path};

use anyhow::Context as _;
use image::{GrayImage, Rgb, RgbImage, imageops};

use crate::foundation::error::{AlignError, AlignResult};

/// Decoded RGB8 raster, immutable once produced.
///
/// Construction rejects zero-sized images so every comparison downstream works
/// on at least one pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    rgb: RgbImage,
}

impl RasterImage {
    /// Wrap an existing RGB buffer.
    pub fn from_rgb(rgb: RgbImage) -> AlignResult<Self> {
        let (w, h) = rgb.dimensions();
        if w == 0 || h == 0 {
            return Err(AlignError::image(format!(
                "raster must be non-empty, got {w}x{h}"
            )));
        }
        Ok(Self { rgb })
    }

    /// Uniformly colored raster.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> AlignResult<Self> {
        Self::from_rgb(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    /// Decode an encoded image (PNG, JPEG, BMP) and drop any alpha channel.
    pub fn decode(bytes: &[u8]) -> AlignResult<Self> {
        if bytes.is_empty() {
            return Err(AlignError::image("no image data"));
        }
        let dyn_img = image::load_from_memory(bytes)?;
        Self::from_rgb(dyn_img.to_rgb8())
    }

    /// Load and decode an image file.
    pub fn open(path: &Path) -> AlignResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        Self::decode(&bytes)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.rgb.dimensions()
    }

    /// Underlying RGB buffer.
    pub fn as_rgb(&self) -> &RgbImage {
        &self.rgb
    }

    /// Single-channel luminance copy.
    pub fn luma(&self) -> GrayImage {
        imageops::grayscale(&self.rgb)
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> AlignResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.rgb
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        Ok(buf)
    }

    /// Write the raster to `path` as PNG, creating parent directories.
    pub fn save_png(&self, path: &Path) -> AlignResult<()> {
        save_png(&self.rgb, path)
    }
}

/// Write any 8-bit image buffer (frames, difference masks) to `path` as PNG,
/// creating parent directories.
pub fn save_png<P>(img: &image::ImageBuffer<P, Vec<u8>>, path: &Path) -> AlignResult<()>
where
    P: image::PixelWithColorType<Subpixel = u8>,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Resize both rasters to their shared minimum width and height.
///
/// Rasters already at the common size are borrowed untouched, so identical
/// inputs stay bit-identical.
pub fn normalized_pair<'a>(
    a: &'a RasterImage,
    b: &'a RasterImage,
) -> (Cow<'a, RgbImage>, Cow<'a, RgbImage>) {
    let width = a.width().min(b.width());
    let height = a.height().min(b.height());
    (fit(a, width, height), fit(b, width, height))
}

fn fit(img: &RasterImage, width: u32, height: u32) -> Cow<'_, RgbImage> {
    if img.dimensions() == (width, height) {
        Cow::Borrowed(&img.rgb)
    } else {
        Cow::Owned(imageops::resize(
            &img.rgb,
            width,
            height,
            imageops::FilterType::Triangle,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/image.rs"]
mod tests;
