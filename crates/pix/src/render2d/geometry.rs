//! Quad geometry: pivot origin, rotation, texture coordinates, projection.
//!
//! Everything here is plain math on `glam` types so it can be tested without
//! a GPU. Screen space is in pixels with `(0, 0)` at the top-left of the back
//! buffer and Y growing downwards.

use crate::math::{Mat4, Rect, Vec2, Vec4};

use super::vertex::SpriteVertex;
use super::{Flip, Pivot};

/// Texture coordinates of a quad's top-left (`u0`, `v0`) and bottom-right
/// (`u1`, `v1`) corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: Self = Self { u0: 0.0, v0: 0.0, u1: 1.0, v1: 1.0 };

    /// Normalize a texel rectangle by the texture size.
    pub fn from_texels(source: &Rect, texture_width: f32, texture_height: f32) -> Self {
        Self {
            u0: source.left / texture_width,
            v0: source.top / texture_height,
            u1: source.right / texture_width,
            v1: source.bottom / texture_height,
        }
    }

    /// Mirror the coordinates along the axes named by `flip`.
    pub fn flipped(mut self, flip: Flip) -> Self {
        if flip.horizontal() {
            std::mem::swap(&mut self.u0, &mut self.u1);
        }
        if flip.vertical() {
            std::mem::swap(&mut self.v0, &mut self.v1);
        }
        self
    }
}

/// Offset of the pivot from the sprite's top-left corner, in pixels.
pub fn pivot_origin(size: Vec2, pivot: Pivot) -> Vec2 {
    size * pivot.offset()
}

/// Rotate `point` around the origin. With Y pointing down, a positive angle
/// turns clockwise on screen.
pub fn rotate(point: Vec2, rotation: f32) -> Vec2 {
    Vec2::from_angle(rotation).rotate(point)
}

/// Screen positions of a quad's corners, in the order
/// (left,top) (right,top) (left,bottom) (right,bottom).
pub fn quad_corners(position: Vec2, size: Vec2, origin: Vec2, rotation: f32) -> [Vec2; 4] {
    let left = -origin.x;
    let top = -origin.y;
    let right = size.x - origin.x;
    let bottom = size.y - origin.y;

    let rotation = Vec2::from_angle(rotation);
    [
        Vec2::new(left, top),
        Vec2::new(right, top),
        Vec2::new(left, bottom),
        Vec2::new(right, bottom),
    ]
    .map(|corner| rotation.rotate(corner) + position)
}

/// Everything needed to turn one draw request into four vertices.
#[derive(Debug, Clone, Copy)]
pub struct SpriteQuad {
    pub position: Vec2,
    /// Unscaled size in pixels.
    pub size: Vec2,
    pub scale: Vec2,
    pub pivot: Pivot,
    pub rotation: f32,
    pub uv: UvRect,
    pub flip: Flip,
    pub color: [f32; 4],
}

/// Build the four vertices of a sprite quad.
pub fn quad_vertices(quad: &SpriteQuad) -> [SpriteVertex; 4] {
    let size = quad.size * quad.scale;
    let origin = pivot_origin(size, quad.pivot);
    let [p0, p1, p2, p3] = quad_corners(quad.position, size, origin, quad.rotation);
    let uv = quad.uv.flipped(quad.flip);
    let color = quad.color;

    [
        SpriteVertex { position: p0.to_array(), uv: [uv.u0, uv.v0], color },
        SpriteVertex { position: p1.to_array(), uv: [uv.u1, uv.v0], color },
        SpriteVertex { position: p2.to_array(), uv: [uv.u0, uv.v1], color },
        SpriteVertex { position: p3.to_array(), uv: [uv.u1, uv.v1], color },
    ]
}

/// Orthographic projection mapping pixels `(0, 0)-(width, height)` to clip
/// space, `(0, 0)` landing on `(-1, 1)` and `(width, height)` on `(1, -1)`.
pub fn screen_projection(width: u32, height: u32) -> Mat4 {
    let width = width.max(1) as f32;
    let height = height.max(1) as f32;
    Mat4::from_cols(
        Vec4::new(2.0 / width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -2.0 / height, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(-1.0, 1.0, 0.0, 1.0),
    )
}

/// The matrix the vertex shader applies: the user transform first, then the
/// screen projection.
pub fn final_transform(user: Mat4, width: u32, height: u32) -> Mat4 {
    screen_projection(width, height) * user
}
