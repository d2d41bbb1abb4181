//! # Pix — Sprite Batching for a Pixel-Art Editor
//!
//! The rendering core of a small 2D engine shell: a wgpu device wrapper and a
//! sprite renderer that batches textured quads by texture, with per-draw
//! pivot, rotation, flip, scale, and tint.
//!
//! Start with `use pix::prelude::*`, create a [`GpuContext`](render::GpuContext)
//! for your window and a [`SpriteRenderer`](render2d::SpriteRenderer) on top
//! of it.

pub mod config;
pub mod error;
pub mod math;
pub mod prelude;
pub mod render;
pub mod render2d;
