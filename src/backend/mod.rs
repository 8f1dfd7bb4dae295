//! Automation backend seam: the remote compositor the controller drives.

pub mod obs;
pub mod protocol;

use crate::foundation::{
    core::{Canvas, SceneItemId, Transform},
    error::AlignResult,
};

/// Encoded image format requested from the compositor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScreenshotFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// JPEG.
    Jpg,
    /// Uncompressed BMP.
    Bmp,
}

impl ScreenshotFormat {
    /// Format name as the compositor spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Bmp => "bmp",
        }
    }
}

/// Remote compositor operations used by a convergence run.
///
/// Implementations report a missing scene or source as
/// [`AlignError::NotFound`](crate::AlignError::NotFound) and a rejected
/// request as [`AlignError::Backend`](crate::AlignError::Backend).
pub trait AutomationBackend {
    /// Base resolution of the composited output.
    fn canvas_size(&mut self) -> AlignResult<Canvas>;

    /// Resolve a source placed in `scene` to its scene item id.
    fn scene_item_id(&mut self, scene: &str, source: &str) -> AlignResult<SceneItemId>;

    /// Current transform of a scene item.
    fn transform(&mut self, scene: &str, item: SceneItemId) -> AlignResult<Transform>;

    /// Replace the transform of a scene item.
    fn set_transform(
        &mut self,
        scene: &str,
        item: SceneItemId,
        transform: &Transform,
    ) -> AlignResult<()>;

    /// Render `source` (a scene or input) and return the encoded image bytes.
    fn screenshot(
        &mut self,
        source: &str,
        format: ScreenshotFormat,
        width: u32,
        height: u32,
    ) -> AlignResult<Vec<u8>>;

    /// Release the connection. Calling it more than once is a no-op.
    fn disconnect(&mut self) -> AlignResult<()>;
}

impl<B: AutomationBackend + ?Sized> AutomationBackend for &mut B {
    fn canvas_size(&mut self) -> AlignResult<Canvas> {
        (**self).canvas_size()
    }

    fn scene_item_id(&mut self, scene: &str, source: &str) -> AlignResult<SceneItemId> {
        (**self).scene_item_id(scene, source)
    }

    fn transform(&mut self, scene: &str, item: SceneItemId) -> AlignResult<Transform> {
        (**self).transform(scene, item)
    }

    fn set_transform(
        &mut self,
        scene: &str,
        item: SceneItemId,
        transform: &Transform,
    ) -> AlignResult<()> {
        (**self).set_transform(scene, item, transform)
    }

    fn screenshot(
        &mut self,
        source: &str,
        format: ScreenshotFormat,
        width: u32,
        height: u32,
    ) -> AlignResult<Vec<u8>> {
        (**self).screenshot(source, format, width, height)
    }

    fn disconnect(&mut self) -> AlignResult<()> {
        (**self).disconnect()
    }
}

impl<B: AutomationBackend + ?Sized> AutomationBackend for Box<B> {
    fn canvas_size(&mut self) -> AlignResult<Canvas> {
        (**self).canvas_size()
    }

    fn scene_item_id(&mut self, scene: &str, source: &str) -> AlignResult<SceneItemId> {
        (**self).scene_item_id(scene, source)
    }

    fn transform(&mut self, scene: &str, item: SceneItemId) -> AlignResult<Transform> {
        (**self).transform(scene, item)
    }

    fn set_transform(
        &mut self,
        scene: &str,
        item: SceneItemId,
        transform: &Transform,
    ) -> AlignResult<()> {
        (**self).set_transform(scene, item, transform)
    }

    fn screenshot(
        &mut self,
        source: &str,
        format: ScreenshotFormat,
        width: u32,
        height: u32,
    ) -> AlignResult<Vec<u8>> {
        (**self).screenshot(source, format, width, height)
    }

    fn disconnect(&mut self) -> AlignResult<()> {
        (**self).disconnect()
    }
}
