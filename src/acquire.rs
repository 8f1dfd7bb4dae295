use crate::{
    backend::{AutomationBackend, ScreenshotFormat},
    foundation::{
        core::Canvas,
        error::{AlignError, AlignResult},
    },
    raster::image::RasterImage,
};

/// Grabs the current composited output as a decoded raster.
#[derive(Clone, Debug)]
pub struct FrameAcquirer {
    source: String,
    canvas: Canvas,
    format: ScreenshotFormat,
}

impl FrameAcquirer {
    /// Capture `source` at the canvas resolution as PNG.
    pub fn new(source: impl Into<String>, canvas: Canvas) -> Self {
        Self {
            source: source.into(),
            canvas,
            format: ScreenshotFormat::Png,
        }
    }

    /// Request a different encoded format from the backend.
    pub fn with_format(mut self, format: ScreenshotFormat) -> Self {
        self.format = format;
        self
    }

    /// Source being captured.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Take one screenshot and decode it.
    ///
    /// A missing source, a rejected request, or an empty/undecodable payload all
    /// surface as [`AlignError::Capture`]; transport failures keep their class.
    pub fn capture<B: AutomationBackend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> AlignResult<RasterImage> {
        let bytes = backend
            .screenshot(
                &self.source,
                self.format,
                self.canvas.width,
                self.canvas.height,
            )
            .map_err(|e| match e {
                AlignError::NotFound(msg) | AlignError::Backend(msg) => AlignError::capture(
                    format!("screenshot of '{}' failed: {msg}", self.source),
                ),
                other => other,
            })?;

        if bytes.is_empty() {
            return Err(AlignError::capture(format!(
                "backend returned no image data for '{}'",
                self.source
            )));
        }

        RasterImage::decode(&bytes).map_err(|e| {
            AlignError::capture(format!(
                "screenshot of '{}' could not be decoded: {e}",
                self.source
            ))
        })
    }
}
