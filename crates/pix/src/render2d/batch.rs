//! # Batch — The Sprite Batching State Machine
//!
//! [`SpriteRenderer`] collects quads between `begin_render` and `end_render`
//! and hands them to its [`QuadBackend`] in runs that share one texture:
//!
//! ```text
//!            draw(tex A)   draw(tex A)   draw(tex B)   draw(tex A)   end_render
//! pending:   [A]           [A A]         [B]           [A]           []
//! flushes:                               A×2           B×1           A×1
//! ```
//!
//! A run is also cut when it reaches `max_sprites` quads, so a frame can draw
//! any number of sprites; it just costs one extra draw call per full batch.
//!
//! The renderer never reorders: the backend receives quads in exactly the
//! order they were drawn, which gives painter's-order layering for free.

use crate::math::{Mat4, Rect, Vec2};

use super::backend::{QuadBackend, QuadBatch, SpriteTexture};
use super::draw::GpuQuadBackend;
use super::geometry::{SpriteQuad, UvRect, final_transform, quad_vertices};
use super::vertex::{SpriteVertex, VERTICES_PER_QUAD};
use super::{Color, DrawParams};

/// Counters for the current (or last finished) frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Quads drawn this frame.
    pub sprites: u32,
    /// Draw calls issued, one per flush.
    pub flushes: u32,
    /// Times the bound texture changed.
    pub texture_binds: u32,
}

/// Batches textured quads by texture and submits them through a backend.
///
/// ```ignore
/// renderer.set_transform(camera);
/// renderer.begin_render(frame.target());
/// renderer.draw(&canvas, Vec2::new(400.0, 300.0), DrawParams::default());
/// renderer.draw_region(&sheet, Rect::from_xywh(0.0, 0.0, 16.0, 16.0), cursor, DrawParams::new().pivot(Pivot::TopLeft));
/// let stats = renderer.end_render();
/// ```
pub struct SpriteRenderer<B: QuadBackend = GpuQuadBackend> {
    backend: B,
    vertices: Vec<SpriteVertex>,
    max_sprites: usize,
    bound: Option<B::Texture>,
    transform: Mat4,
    default_tint: Color,
    in_frame: bool,
    stats: FrameStats,
}

impl<B: QuadBackend> SpriteRenderer<B> {
    /// Wrap a backend. Batches hold up to [`QuadBackend::max_quads`] quads.
    pub fn with_backend(backend: B) -> Self {
        let max_sprites = backend.max_quads();
        assert!(max_sprites > 0, "[SpriteRenderer] backend must accept at least one quad");
        Self {
            backend,
            vertices: Vec::with_capacity(max_sprites * VERTICES_PER_QUAD),
            max_sprites,
            bound: None,
            transform: Mat4::IDENTITY,
            default_tint: Color::WHITE,
            in_frame: false,
            stats: FrameStats::default(),
        }
    }

    /// Tint used by draws whose [`DrawParams`] leave `tint` unset.
    pub fn set_default_tint(&mut self, tint: Color) {
        self.default_tint = tint;
    }

    /// Set the camera/screen transform applied to every following flush.
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn max_sprites(&self) -> usize {
        self.max_sprites
    }

    /// Quads waiting for the next flush.
    pub fn pending_sprites(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Start a frame. Resets the pending batch and the bound texture.
    ///
    /// If the previous frame was never ended, its pending sprites are dropped
    /// but the batches it already flushed are still submitted.
    pub fn begin_render(&mut self, target: B::Target) {
        if self.in_frame {
            log::warn!(
                "[SpriteRenderer] begin_render without end_render; discarding {} unflushed sprites",
                self.pending_sprites()
            );
            self.backend.end();
        }
        self.vertices.clear();
        self.bound = None;
        self.stats = FrameStats::default();
        self.in_frame = true;
        self.backend.begin(target);
    }

    /// Draw the whole texture as one quad.
    pub fn draw(&mut self, texture: &B::Texture, position: Vec2, params: DrawParams) {
        let size = Vec2::new(texture.width() as f32, texture.height() as f32);
        self.push_quad(texture, position, size, UvRect::FULL, params);
    }

    /// Draw the texel region `source` of the texture.
    ///
    /// `source` must lie inside the texture and have a positive area; other
    /// rectangles are drawn as given, mirrored or degenerate.
    pub fn draw_region(
        &mut self,
        texture: &B::Texture,
        source: Rect,
        position: Vec2,
        params: DrawParams,
    ) {
        let (tex_w, tex_h) = (texture.width() as f32, texture.height() as f32);
        debug_assert!(
            source.fits_within(tex_w, tex_h),
            "[SpriteRenderer] source rect {source:?} outside {tex_w}x{tex_h} texture"
        );
        let uv = UvRect::from_texels(&source, tex_w, tex_h);
        self.push_quad(texture, position, source.size(), uv, params);
    }

    /// Submit the pending quads as one draw call. Does nothing when the batch
    /// is empty.
    pub fn flush(&mut self) {
        let Some(texture) = self.bound.as_ref() else {
            return;
        };
        if self.vertices.is_empty() {
            return;
        }

        let (width, height) = self.backend.target_size();
        let transform = final_transform(self.transform, width, height);

        log::trace!(
            "[SpriteRenderer] flush {} sprites on texture {:?}",
            self.vertices.len() / VERTICES_PER_QUAD,
            texture.id()
        );
        self.backend.flush(QuadBatch {
            texture,
            vertices: &self.vertices,
            transform,
        });

        self.vertices.clear();
        self.stats.flushes += 1;
    }

    /// Flush what is left and close the frame. Returns the frame's counters.
    pub fn end_render(&mut self) -> FrameStats {
        assert!(self.in_frame, "[SpriteRenderer] end_render called without begin_render");
        self.flush();
        self.backend.end();
        self.bound = None;
        self.in_frame = false;
        self.stats
    }

    fn push_quad(
        &mut self,
        texture: &B::Texture,
        position: Vec2,
        size: Vec2,
        uv: UvRect,
        params: DrawParams,
    ) {
        assert!(self.in_frame, "[SpriteRenderer] draw called outside begin_render/end_render");

        let id = texture.id();
        if self.bound.as_ref().map(SpriteTexture::id) != Some(id) {
            self.flush();
            self.bound = Some(texture.clone());
            self.stats.texture_binds += 1;
        }

        if self.pending_sprites() >= self.max_sprites {
            self.flush();
        }

        let quad = quad_vertices(&SpriteQuad {
            position,
            size,
            scale: params.scale,
            pivot: params.pivot,
            rotation: params.rotation,
            uv,
            flip: params.flip,
            color: params.tint.unwrap_or(self.default_tint).to_array(),
        });
        self.vertices.extend_from_slice(&quad);
        self.stats.sprites += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::math::Vec4;
    use crate::render2d::backend::TextureId;
    use crate::render2d::{Flip, Pivot};

    #[derive(Debug, Clone)]
    struct FakeTexture {
        id: u64,
        width: u32,
        height: u32,
    }

    impl FakeTexture {
        fn new(id: u64, width: u32, height: u32) -> Self {
            Self { id, width, height }
        }
    }

    impl SpriteTexture for FakeTexture {
        fn id(&self) -> TextureId {
            TextureId(self.id)
        }
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
    }

    struct Flushed {
        texture: TextureId,
        vertices: Vec<SpriteVertex>,
        transform: Mat4,
    }

    struct RecordingBackend {
        capacity: usize,
        size: (u32, u32),
        flushes: Vec<Flushed>,
        frames_begun: u32,
        frames_ended: u32,
    }

    impl RecordingBackend {
        fn new(capacity: usize) -> Self {
            Self {
                capacity,
                size: (0, 0),
                flushes: Vec::new(),
                frames_begun: 0,
                frames_ended: 0,
            }
        }
    }

    impl QuadBackend for RecordingBackend {
        type Texture = FakeTexture;
        type Target = (u32, u32);

        fn begin(&mut self, target: (u32, u32)) {
            self.size = target;
            self.frames_begun += 1;
        }

        fn target_size(&self) -> (u32, u32) {
            self.size
        }

        fn max_quads(&self) -> usize {
            self.capacity
        }

        fn flush(&mut self, batch: QuadBatch<'_, FakeTexture>) {
            assert!(batch.quad_count() > 0, "empty batches must not reach the backend");
            assert!(
                batch.quad_count() <= self.capacity,
                "batch of {} quads overflows a backend sized for {}",
                batch.quad_count(),
                self.capacity
            );
            self.flushes.push(Flushed {
                texture: batch.texture.id(),
                vertices: batch.vertices.to_vec(),
                transform: batch.transform,
            });
        }

        fn end(&mut self) {
            self.frames_ended += 1;
        }
    }

    fn renderer(max_sprites: usize) -> SpriteRenderer<RecordingBackend> {
        SpriteRenderer::with_backend(RecordingBackend::new(max_sprites))
    }

    fn flush_sizes(r: &SpriteRenderer<RecordingBackend>) -> Vec<usize> {
        r.backend().flushes.iter().map(|f| f.vertices.len() / 4).collect()
    }

    #[test]
    fn single_texture_frame_is_one_flush() {
        let mut r = renderer(8);
        let tex = FakeTexture::new(1, 16, 16);
        r.begin_render((640, 480));
        for i in 0..8 {
            r.draw(&tex, Vec2::new(i as f32, 0.0), DrawParams::default());
        }
        assert!(r.backend().flushes.is_empty(), "nothing should flush before end_render");
        let stats = r.end_render();
        assert_eq!(flush_sizes(&r), vec![8]);
        assert_eq!(stats, FrameStats { sprites: 8, flushes: 1, texture_binds: 1 });
    }

    #[test]
    fn overflow_flushes_once_per_full_batch() {
        let mut r = renderer(4);
        let tex = FakeTexture::new(1, 8, 8);
        r.begin_render((100, 100));
        for _ in 0..10 {
            r.draw(&tex, Vec2::ZERO, DrawParams::default());
        }
        let stats = r.end_render();
        // ceil(10 / 4) == 3
        assert_eq!(flush_sizes(&r), vec![4, 4, 2]);
        assert_eq!(stats.flushes, 3);
        assert_eq!(stats.sprites, 10);
    }

    #[test]
    fn exact_multiple_of_capacity_has_no_empty_flush() {
        let mut r = renderer(4);
        let tex = FakeTexture::new(1, 8, 8);
        r.begin_render((100, 100));
        for _ in 0..8 {
            r.draw(&tex, Vec2::ZERO, DrawParams::default());
        }
        r.end_render();
        assert_eq!(flush_sizes(&r), vec![4, 4]);
    }

    #[test]
    fn texture_change_forces_flush() {
        let mut r = renderer(64);
        let a = FakeTexture::new(1, 8, 8);
        let b = FakeTexture::new(2, 8, 8);
        r.begin_render((100, 100));
        r.draw(&a, Vec2::ZERO, DrawParams::default());
        r.draw(&a, Vec2::ZERO, DrawParams::default());
        r.draw(&b, Vec2::ZERO, DrawParams::default());
        r.draw(&a, Vec2::ZERO, DrawParams::default());
        let stats = r.end_render();

        let order: Vec<u64> = r.backend().flushes.iter().map(|f| f.texture.0).collect();
        assert_eq!(order, vec![1, 2, 1]);
        assert_eq!(flush_sizes(&r), vec![2, 1, 1]);
        assert_eq!(stats.texture_binds, 3);
    }

    #[test]
    fn same_id_batches_even_for_distinct_handles() {
        let mut r = renderer(64);
        let a = FakeTexture::new(7, 8, 8);
        let a_again = a.clone();
        r.begin_render((100, 100));
        r.draw(&a, Vec2::ZERO, DrawParams::default());
        r.draw(&a_again, Vec2::ZERO, DrawParams::default());
        r.end_render();
        assert_eq!(flush_sizes(&r), vec![2]);
    }

    #[test]
    fn draw_order_is_preserved_across_flushes() {
        let mut r = renderer(2);
        let tex = FakeTexture::new(1, 2, 2);
        r.begin_render((100, 100));
        for i in 0..5 {
            r.draw(&tex, Vec2::new(i as f32 * 10.0, 0.0), DrawParams::new().pivot(Pivot::TopLeft));
        }
        r.end_render();

        let xs: Vec<f32> = r
            .backend()
            .flushes
            .iter()
            .flat_map(|f| f.vertices.chunks(4).map(|q| q[0].position[0]))
            .collect();
        assert_eq!(xs, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn empty_frame_issues_no_draw_calls() {
        let mut r = renderer(4);
        r.begin_render((100, 100));
        let stats = r.end_render();
        assert!(r.backend().flushes.is_empty());
        assert_eq!(stats, FrameStats::default());
        assert_eq!(r.backend().frames_begun, 1);
        assert_eq!(r.backend().frames_ended, 1);
    }

    #[test]
    fn begin_render_resets_leftover_state() {
        let mut r = renderer(16);
        let tex = FakeTexture::new(1, 8, 8);
        r.begin_render((100, 100));
        r.draw(&tex, Vec2::ZERO, DrawParams::default());
        r.draw(&tex, Vec2::ZERO, DrawParams::default());
        assert_eq!(r.pending_sprites(), 2);

        // Frame abandoned without end_render.
        r.begin_render((100, 100));
        assert_eq!(r.pending_sprites(), 0);
        assert_eq!(r.stats(), FrameStats::default());

        r.draw(&tex, Vec2::ZERO, DrawParams::default());
        r.end_render();
        assert_eq!(flush_sizes(&r), vec![1], "discarded sprites must not be flushed");
    }

    #[test]
    fn abandoned_frame_still_submits_flushed_batches() {
        let mut r = renderer(16);
        let a = FakeTexture::new(1, 8, 8);
        let b = FakeTexture::new(2, 8, 8);
        r.begin_render((100, 100));
        r.draw(&a, Vec2::ZERO, DrawParams::default());
        r.draw(&b, Vec2::ZERO, DrawParams::default());

        r.begin_render((100, 100));
        assert_eq!(r.backend().frames_ended, 1, "the unfinished frame must be closed");
        let order: Vec<u64> = r.backend().flushes.iter().map(|f| f.texture.0).collect();
        assert_eq!(order, vec![1], "only the pending sprite on texture 2 is dropped");

        r.end_render();
        assert_eq!(r.backend().frames_begun, 2);
        assert_eq!(r.backend().frames_ended, 2);
    }

    #[test]
    fn batch_capacity_comes_from_the_backend() {
        let mut r = SpriteRenderer::with_backend(RecordingBackend::new(3));
        assert_eq!(r.max_sprites(), 3);

        let tex = FakeTexture::new(1, 8, 8);
        r.begin_render((100, 100));
        for _ in 0..7 {
            r.draw(&tex, Vec2::ZERO, DrawParams::default());
        }
        r.end_render();
        assert_eq!(flush_sizes(&r), vec![3, 3, 1]);
    }

    #[test]
    #[should_panic(expected = "at least one quad")]
    fn zero_capacity_backend_is_rejected() {
        SpriteRenderer::with_backend(RecordingBackend::new(0));
    }

    #[test]
    fn texture_binding_does_not_leak_into_next_frame() {
        let mut r = renderer(16);
        let tex = FakeTexture::new(1, 8, 8);
        for _ in 0..2 {
            r.begin_render((100, 100));
            r.draw(&tex, Vec2::ZERO, DrawParams::default());
            let stats = r.end_render();
            assert_eq!(stats.texture_binds, 1);
        }
        assert_eq!(flush_sizes(&r), vec![1, 1]);
    }

    #[test]
    fn region_of_whole_texture_matches_plain_draw() {
        let tex = FakeTexture::new(1, 100, 50);
        let params = DrawParams::new()
            .rotation(0.3)
            .pivot(Pivot::BottomLeft)
            .flip(Flip::Vertical);

        let mut r = renderer(4);
        r.begin_render((800, 600));
        r.draw(&tex, Vec2::new(12.0, 34.0), params);
        r.draw_region(&tex, Rect::from_size(100.0, 50.0), Vec2::new(12.0, 34.0), params);
        r.end_render();

        let verts = &r.backend().flushes[0].vertices;
        assert_eq!(verts[0..4], verts[4..8]);
    }

    #[test]
    fn region_draw_uses_source_size_and_uvs() {
        let sheet = FakeTexture::new(1, 64, 32);
        let mut r = renderer(4);
        r.begin_render((800, 600));
        r.draw_region(
            &sheet,
            Rect::from_xywh(16.0, 0.0, 16.0, 16.0),
            Vec2::new(100.0, 100.0),
            DrawParams::new().pivot(Pivot::TopLeft).flip(Flip::Horizontal),
        );
        r.end_render();

        let v = &r.backend().flushes[0].vertices;
        assert_eq!(v[0].position, [100.0, 100.0]);
        assert_eq!(v[3].position, [116.0, 116.0]);
        assert_eq!(v[0].uv, [0.5, 0.0], "horizontal flip puts u1 on the left edge");
        assert_eq!(v[1].uv, [0.25, 0.0]);
        assert_eq!(v[3].uv, [0.25, 0.5]);
    }

    #[test]
    fn center_pivot_on_100x50() {
        let tex = FakeTexture::new(1, 100, 50);
        let mut r = renderer(4);
        r.begin_render((800, 600));
        r.draw(&tex, Vec2::new(300.0, 200.0), DrawParams::default());
        r.end_render();

        let v = &r.backend().flushes[0].vertices;
        assert_eq!(v[0].position, [250.0, 175.0]);
        assert_eq!(v[3].position, [350.0, 225.0]);
    }

    #[test]
    fn quarter_turn_rotates_clockwise_on_screen() {
        // 2x2 texture pivoted at its top-left corner; after a quarter turn the top
        // edge should point down the screen.
        let tex = FakeTexture::new(1, 2, 2);
        let mut r = renderer(4);
        r.begin_render((100, 100));
        r.draw(
            &tex,
            Vec2::new(50.0, 50.0),
            DrawParams::new().pivot(Pivot::TopLeft).rotation(FRAC_PI_2),
        );
        r.end_render();

        let right_top = Vec2::from_array(r.backend().flushes[0].vertices[1].position);
        assert!(right_top.abs_diff_eq(Vec2::new(50.0, 52.0), 1e-4), "got {right_top}");
    }

    #[test]
    fn tint_defaults_and_overrides() {
        let tex = FakeTexture::new(1, 4, 4);
        let mut r = renderer(4);
        r.begin_render((100, 100));
        r.draw(&tex, Vec2::ZERO, DrawParams::default());
        r.draw(&tex, Vec2::ZERO, DrawParams::new().tint(Color::rgba(1.0, 0.0, 0.0, 0.5)));
        r.set_default_tint(Color::BLACK);
        r.draw(&tex, Vec2::ZERO, DrawParams::default());
        r.end_render();

        let v = &r.backend().flushes[0].vertices;
        assert_eq!(v[0].color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(v[4].color, [1.0, 0.0, 0.0, 0.5]);
        assert_eq!(v[8].color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn flush_composes_projection_with_current_transform() {
        let tex = FakeTexture::new(1, 4, 4);
        let mut r = renderer(4);
        r.begin_render((200, 100));
        r.draw(&tex, Vec2::ZERO, DrawParams::default());
        r.flush();
        r.set_transform(Mat4::from_scale(glam::Vec3::new(2.0, 2.0, 1.0)));
        r.draw(&tex, Vec2::ZERO, DrawParams::default());
        r.end_render();

        let flushes = &r.backend().flushes;
        let corner = Vec4::new(100.0, 50.0, 0.0, 1.0);
        let first = flushes[0].transform * corner;
        let second = flushes[1].transform * corner;
        assert!(first.abs_diff_eq(Vec4::new(0.0, 0.0, 0.0, 1.0), 1e-5), "got {first}");
        assert!(second.abs_diff_eq(Vec4::new(1.0, -1.0, 0.0, 1.0), 1e-5), "got {second}");
    }

    #[test]
    fn projection_follows_target_size_each_frame() {
        let tex = FakeTexture::new(1, 4, 4);
        let mut r = renderer(4);
        for size in [(100, 100), (400, 200)] {
            r.begin_render(size);
            r.draw(&tex, Vec2::ZERO, DrawParams::default());
            r.end_render();
        }
        let p = Vec4::new(100.0, 100.0, 0.0, 1.0);
        let small = r.backend().flushes[0].transform * p;
        let large = r.backend().flushes[1].transform * p;
        assert!(small.abs_diff_eq(Vec4::new(1.0, -1.0, 0.0, 1.0), 1e-5));
        assert!(large.abs_diff_eq(Vec4::new(-0.5, 0.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn explicit_flush_on_empty_batch_is_a_no_op() {
        let mut r = renderer(4);
        r.begin_render((100, 100));
        r.flush();
        r.end_render();
        assert!(r.backend().flushes.is_empty());
    }

    #[test]
    #[should_panic(expected = "outside begin_render")]
    fn draw_outside_frame_panics() {
        let mut r = renderer(4);
        r.draw(&FakeTexture::new(1, 4, 4), Vec2::ZERO, DrawParams::default());
    }

    #[test]
    #[should_panic(expected = "without begin_render")]
    fn end_without_begin_panics() {
        let mut r = renderer(4);
        r.end_render();
    }
}
