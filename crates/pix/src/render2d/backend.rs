//! The seam between the batching state machine and whatever submits quads.
//!
//! [`SpriteRenderer`](super::SpriteRenderer) decides *when* to flush and
//! *what* a flush contains; a [`QuadBackend`] decides *how* the flush reaches
//! the GPU. [`GpuQuadBackend`](super::GpuQuadBackend) is the wgpu
//! implementation. Tests drive the same state machine through a backend that
//! just records what it was handed.

use crate::math::Mat4;

use super::vertex::SpriteVertex;

/// Identity of a texture binding. Two textures with the same id are treated
/// as the same binding and batch together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// What the renderer needs to know about a texture.
pub trait SpriteTexture {
    fn id(&self) -> TextureId;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// One flush: a run of quads sharing a texture.
pub struct QuadBatch<'a, T> {
    pub texture: &'a T,
    /// `4 × quads` vertices, in draw order.
    pub vertices: &'a [SpriteVertex],
    /// Projection already composed with the user transform.
    pub transform: Mat4,
}

impl<T> QuadBatch<'_, T> {
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

/// Receives flushed batches and turns them into draw calls.
pub trait QuadBackend {
    type Texture: SpriteTexture + Clone;
    /// Where one frame's sprites are drawn.
    type Target;

    /// Start a frame. Work already flushed in an unfinished frame is still
    /// submitted.
    fn begin(&mut self, target: Self::Target);

    /// Current size of the render target in pixels.
    fn target_size(&self) -> (u32, u32);

    /// Most quads a single [`QuadBatch`] may hold. The renderer flushes
    /// before a batch grows past this.
    fn max_quads(&self) -> usize;

    /// Issue one indexed draw for the batch.
    fn flush(&mut self, batch: QuadBatch<'_, Self::Texture>);

    /// Finish the frame so no sprite state leaks into later rendering.
    fn end(&mut self);
}
