//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. [`Rect`] is the texel-space rectangle used to pick a
//! region out of a texture.

pub use glam::{Mat4, Vec2, Vec4};

/// A rectangle in texel coordinates: `left`/`top` inclusive, `right`/`bottom`
/// exclusive, with Y growing downwards.
///
/// Used to select a sub-region of a texture for rendering — for example, a
/// single frame from a sprite sheet.
///
/// Callers are expected to pass non-inverted rectangles with a positive area
/// that lie inside the texture. An inverted rectangle is not corrected: it
/// simply produces a quad with negative extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Rectangle covering `(0, 0)` to `(width, height)`.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Build from a top-left corner and a size, the way sprite-sheet frames
    /// are usually described.
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    /// Whether this rectangle lies within `(0, 0)-(width, height)`.
    pub fn fits_within(&self, width: f32, height: f32) -> bool {
        self.left >= 0.0 && self.top >= 0.0 && self.right <= width && self.bottom <= height
    }
}
