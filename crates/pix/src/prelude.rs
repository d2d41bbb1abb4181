//! Common imports: `use pix::prelude::*`.

pub use crate::config::{RendererConfig, TextureFilter};
pub use crate::error::RenderError;
pub use crate::math::{Mat4, Rect, Vec2};
pub use crate::render::{ClearColor, Frame, GpuContext, RenderTarget};
pub use crate::render2d::{
    Color, DrawParams, Flip, FrameStats, Pivot, SpriteRenderer, SpriteTexture, Texture,
};
