use crate::foundation::error::{AlignError, AlignResult};

pub use kurbo::{Point, Vec2};

/// Base (canvas) resolution of the composited output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> AlignResult<Self> {
        if width == 0 || height == 0 {
            return Err(AlignError::backend(format!(
                "canvas size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Center of the canvas in pixel space.
    pub fn midpoint(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Backend-assigned identifier of a source placed in a scene.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SceneItemId(pub i64);

/// Anchor that a source's position is measured from.
///
/// Bit flags as used by the compositor: no bits set is the center, `LEFT`/`RIGHT`
/// pick a horizontal edge and `TOP`/`BOTTOM` a vertical one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Alignment(pub u32);

impl Alignment {
    /// Position refers to the source's center.
    pub const CENTER: Self = Self(0);
    /// Anchored on the left edge.
    pub const LEFT: Self = Self(1);
    /// Anchored on the right edge.
    pub const RIGHT: Self = Self(2);
    /// Anchored on the top edge.
    pub const TOP: Self = Self(4);
    /// Anchored on the bottom edge.
    pub const BOTTOM: Self = Self(8);
    /// Anchored on the top-left corner.
    pub const TOP_LEFT: Self = Self(Self::TOP.0 | Self::LEFT.0);

    /// Whether every flag in `other` is set on `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Geometric placement of one capture source within the composition.
///
/// Field names serialize in the compositor's camelCase form. Fields the
/// compositor reports beyond these are ignored on read and never written back.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Horizontal anchor position.
    pub position_x: f64,
    /// Vertical anchor position.
    pub position_y: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Horizontal scale, 1.0 is native size.
    pub scale_x: f64,
    /// Vertical scale, 1.0 is native size.
    pub scale_y: f64,
    /// Pixels cropped from the left edge.
    #[serde(default)]
    pub crop_left: i32,
    /// Pixels cropped from the right edge.
    #[serde(default)]
    pub crop_right: i32,
    /// Pixels cropped from the top edge.
    #[serde(default)]
    pub crop_top: i32,
    /// Pixels cropped from the bottom edge.
    #[serde(default)]
    pub crop_bottom: i32,
    /// Anchor the position is measured from.
    #[serde(default)]
    pub alignment: Alignment,
}

impl Transform {
    /// Canonical starting placement: centered on the canvas, unscaled, uncropped,
    /// center-aligned.
    pub fn centered(canvas: Canvas) -> Self {
        let mid = canvas.midpoint();
        Self {
            position_x: mid.x,
            position_y: mid.y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            crop_left: 0,
            crop_right: 0,
            crop_top: 0,
            crop_bottom: 0,
            alignment: Alignment::CENTER,
        }
    }

    /// Anchor position as a point.
    pub fn position(&self) -> Point {
        Point::new(self.position_x, self.position_y)
    }

    /// Scale factors as a vector.
    pub fn scale(&self) -> Vec2 {
        Vec2::new(self.scale_x, self.scale_y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
