use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    foundation::error::{AlignError, AlignResult},
    raster::image::RasterImage,
};

/// Target composited image, loaded once and shared read-only for a run.
#[derive(Clone, Debug)]
pub struct ReferenceStore {
    image: Arc<RasterImage>,
    source: Option<PathBuf>,
}

impl ReferenceStore {
    /// Load the reference from disk. Any failure is a configuration error.
    #[tracing::instrument]
    pub fn load(path: &Path) -> AlignResult<Self> {
        if !path.is_file() {
            return Err(AlignError::config(format!(
                "reference image '{}' does not exist",
                path.display()
            )));
        }
        let image = RasterImage::open(path).map_err(|e| {
            AlignError::config(format!(
                "reference image '{}' is unreadable: {e}",
                path.display()
            ))
        })?;
        tracing::info!(
            width = image.width(),
            height = image.height(),
            "loaded reference image"
        );
        Ok(Self {
            image: Arc::new(image),
            source: Some(path.to_path_buf()),
        })
    }

    /// Use an already decoded raster as the reference.
    pub fn from_image(image: RasterImage) -> Self {
        Self {
            image: Arc::new(image),
            source: None,
        }
    }

    /// The reference raster.
    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// File the reference was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/reference.rs"]
mod tests;
