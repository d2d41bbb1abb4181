//! # Vertex — Per-Corner Data Sent to the GPU
//!
//! Every quad has four vertices. Each carries a screen-space position, a
//! texture coordinate (UV), and a tint color, packed into a flat `#[repr(C)]`
//! struct so `bytemuck` can cast a `&[SpriteVertex]` straight to bytes for
//! upload.
//!
//! ```text
//! SpriteVertex (32 bytes per vertex)
//! ┌──────────────┬──────────────┬────────────────────────┐
//! │ position     │ uv           │ color                  │
//! │ [f32; 2]     │ [f32; 2]     │ [f32; 4]               │
//! │ offset 0     │ offset 8     │ offset 16              │
//! │ location(0)  │ location(1)  │ location(2)            │
//! └──────────────┴──────────────┴────────────────────────┘
//! ```
//!
//! Positions are in pixels (Y down). The vertex shader multiplies them by the
//! [`TransformUniform`], which already contains the screen projection.
//!
//! ## Index Layout
//!
//! Quads are emitted as (left,top) (right,top) (left,bottom) (right,bottom),
//! and the two triangles of quad `i` are `4i + (0,1,2)` and `4i + (2,1,3)`.
//! The pattern never changes, so the index buffer is built once for the whole
//! batch capacity.

use bytemuck::{Pod, Zeroable};

/// Per-vertex data for sprite quads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };
}

/// Final transform uploaded to the uniform buffer before each flush.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct TransformUniform {
    pub transform: [[f32; 4]; 4],
}

pub(crate) const VERTICES_PER_QUAD: usize = 4;
pub(crate) const INDICES_PER_QUAD: usize = 6;

/// Index data for `quads` quads using the fixed `(0,1,2,2,1,3)` pattern.
pub(crate) fn quad_indices(quads: usize) -> Vec<u16> {
    let mut indices = Vec::with_capacity(quads * INDICES_PER_QUAD);
    for i in 0..quads {
        let base = (i * VERTICES_PER_QUAD) as u16;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 32);
        let attrs = SpriteVertex::LAYOUT.attributes;
        assert_eq!(attrs[1].offset, std::mem::offset_of!(SpriteVertex, uv) as u64);
        assert_eq!(attrs[2].offset, std::mem::offset_of!(SpriteVertex, color) as u64);
    }

    #[test]
    fn indices_follow_quad_pattern() {
        let idx = quad_indices(2);
        assert_eq!(idx, vec![0, 1, 2, 2, 1, 3, 4, 5, 6, 6, 5, 7]);
    }

    #[test]
    fn largest_batch_stays_in_u16_range() {
        let quads = crate::config::MAX_SPRITES_LIMIT as usize;
        let idx = quad_indices(quads);
        assert_eq!(idx.len(), quads * INDICES_PER_QUAD);
        assert_eq!(*idx.iter().max().unwrap() as usize, quads * VERTICES_PER_QUAD - 1);
    }
}
