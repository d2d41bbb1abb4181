//! # Render2d — Batched Sprite Rendering
//!
//! A sprite renderer turns a stream of "draw this texture here" requests into
//! as few GPU draw calls as possible. Each sprite is a *quad* — four vertices
//! forming a rectangle — that can be positioned, rotated around a pivot, and
//! flipped. Consecutive sprites that share a texture are merged into one
//! indexed draw.
//!
//! ## Per-Frame Flow
//!
//! ```text
//!  begin_render(target)
//!     │  pending = 0, bound texture = none
//!     ▼
//!  draw / draw_region  ──────────────┐
//!     │                              │ texture changed?  ──► flush
//!     │                              │ batch full?       ──► flush
//!     ▼                              │
//!  geometry: pivot origin, rotate,   │
//!  translate, UVs + flip             │
//!     │                              │
//!     ▼                              │
//!  append 4 vertices  ◄──────────────┘
//!     │
//!     ▼
//!  end_render()  ──► flush remaining, close the backend frame
//! ```
//!
//! A *flush* hands the pending vertices, the bound texture, and the final
//! transform (`screen projection × user transform`) to a [`QuadBackend`],
//! which turns them into one `draw_indexed` over a static index buffer.
//!
//! ## Painter's Order
//!
//! There is no depth buffer and no sorting: quads reach the GPU in call order,
//! within a batch and across flush boundaries, so later draws composite on top
//! of earlier ones. Callers control layering purely by draw order, which is
//! what an editor drawing canvas, grid, and selection overlay wants.
//!
//! ## Modules
//!
//! - [`geometry`] — pivot, rotation, and UV math (pure, no GPU)
//! - [`batch`] — the [`SpriteRenderer`] batching state machine
//! - [`backend`] — the [`QuadBackend`] seam between batching and the GPU
//! - [`draw`] — [`GpuQuadBackend`], the wgpu implementation
//! - [`pipeline`] — shader, bind group layouts, render pipeline
//! - [`texture`] — GPU textures and the path cache
//! - [`vertex`] — vertex and uniform layouts

pub mod backend;
pub mod batch;
pub mod draw;
pub mod geometry;
pub mod pipeline;
pub mod texture;
pub mod vertex;

pub use backend::{QuadBackend, QuadBatch, SpriteTexture, TextureId};
pub use batch::{FrameStats, SpriteRenderer};
pub use draw::GpuQuadBackend;
pub use pipeline::PipelineConfig;
pub use texture::Texture;
pub use vertex::SpriteVertex;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Anchor point inside a sprite's bounds. The sprite is placed and rotated
/// around this point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pivot {
    TopLeft,
    Top,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Pivot {
    pub const ALL: [Pivot; 9] = [
        Pivot::TopLeft,
        Pivot::Top,
        Pivot::TopRight,
        Pivot::Left,
        Pivot::Center,
        Pivot::Right,
        Pivot::BottomLeft,
        Pivot::Bottom,
        Pivot::BottomRight,
    ];

    /// Normalized position of the pivot inside the sprite, `(0, 0)` being the
    /// top-left corner and `(1, 1)` the bottom-right one.
    pub fn offset(self) -> Vec2 {
        match self {
            Pivot::TopLeft => Vec2::new(0.0, 0.0),
            Pivot::Top => Vec2::new(0.5, 0.0),
            Pivot::TopRight => Vec2::new(1.0, 0.0),
            Pivot::Left => Vec2::new(0.0, 0.5),
            Pivot::Center => Vec2::new(0.5, 0.5),
            Pivot::Right => Vec2::new(1.0, 0.5),
            Pivot::BottomLeft => Vec2::new(0.0, 1.0),
            Pivot::Bottom => Vec2::new(0.5, 1.0),
            Pivot::BottomRight => Vec2::new(1.0, 1.0),
        }
    }
}

/// Texture mirroring applied to a single draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    pub fn horizontal(self) -> bool {
        matches!(self, Flip::Horizontal | Flip::Both)
    }

    pub fn vertical(self) -> bool {
        matches!(self, Flip::Vertical | Flip::Both)
    }
}

/// An RGBA color with floating-point components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const TRANSPARENT: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    /// Create a color from RGB (alpha = 1).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Per-draw options: rotation (radians), scale, pivot, flip, and tint.
///
/// `scale` multiplies the drawn size; the pivot is taken on the scaled quad.
/// `tint: None` uses the renderer's configured default tint (opaque white
/// unless the config says otherwise).
///
/// ```ignore
/// renderer.draw(&player, pos, DrawParams::new().pivot(Pivot::Bottom).flip(Flip::Horizontal));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    pub rotation: f32,
    pub scale: Vec2,
    pub pivot: Pivot,
    pub flip: Flip,
    pub tint: Option<Color>,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            scale: Vec2::ONE,
            pivot: Pivot::default(),
            flip: Flip::default(),
            tint: None,
        }
    }
}

impl DrawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rotation in radians. Positive angles turn clockwise on screen.
    pub fn rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    /// Scale the quad, e.g. by the canvas zoom level.
    pub fn scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn pivot(mut self, pivot: Pivot) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }

    /// Set the color multiplied with the texture sample.
    pub fn tint(mut self, color: Color) -> Self {
        self.tint = Some(color);
        self
    }
}
