//! # Draw — Submitting Batches with wgpu
//!
//! [`GpuQuadBackend`] is the [`QuadBackend`] behind a
//! [`SpriteRenderer`]. It owns every GPU object the sprite path needs:
//!
//! - a vertex buffer sized for `max_sprites` quads, rewritten per flush
//! - a static `u16` index buffer, built once
//! - a 64-byte uniform buffer holding the final transform
//! - the [`SpritePipeline`] and the [`TextureStore`]
//!
//! ## One Frame
//!
//! ```text
//! begin(target)        create command encoder
//!   flush #1           belt ─copy─► uniform + vertex prefix
//!                      render pass (LoadOp::Load) ─► draw_indexed(0..6n)
//!   flush #2           belt ─copy─► uniform + vertex prefix
//!                      render pass (LoadOp::Load) ─► draw_indexed(0..6m)
//! end()                belt.finish, queue.submit, belt.recall
//! ```
//!
//! `queue.write_buffer` would not work here: every write lands before the
//! command buffer runs, so all flushes of a frame would see the last batch.
//! Recording the copies into the encoder keeps each flush paired with its own
//! data while still re-using one vertex buffer. Each flush uploads only the
//! used prefix, never the whole buffer.
//!
//! The copies are sourced from a [`wgpu::util::StagingBelt`]. Its chunks are
//! mapped again once the GPU is done with them, so after the first few frames
//! a flush allocates nothing.
//!
//! Render passes end with the flush, so no blend, depth, or raster state
//! survives past `end()`; the next user of the target starts clean.

use wgpu::util::{DeviceExt, StagingBelt};

use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::render::{GpuContext, RenderTarget};

use super::backend::{QuadBackend, QuadBatch, SpriteTexture};
use super::batch::SpriteRenderer;
use super::pipeline::{SpritePipeline, create_checked};
use super::texture::{Texture, TextureStore};
use super::vertex::{
    INDICES_PER_QUAD, SpriteVertex, TransformUniform, VERTICES_PER_QUAD, quad_indices,
};

const TRANSFORM_SIZE: u64 = std::mem::size_of::<TransformUniform>() as u64;

/// Command encoder and target of the frame being recorded.
struct FrameRecording {
    target: RenderTarget,
    encoder: wgpu::CommandEncoder,
}

/// wgpu implementation of [`QuadBackend`].
pub struct GpuQuadBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: SpritePipeline,
    textures: TextureStore,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    belt: StagingBelt,
    max_sprites: usize,
    frame: Option<FrameRecording>,
}

impl GpuQuadBackend {
    /// Create the pipeline, buffers, and default texture.
    ///
    /// Fails with [`RenderError::ResourceCreation`] naming the first GPU
    /// object that did not validate; nothing is returned half-built.
    pub fn new(gpu: &GpuContext, config: &RendererConfig) -> Result<Self, RenderError> {
        config.validate()?;
        let device = &gpu.device;
        let max_sprites = config.max_sprites as usize;
        let vertex_buffer_size =
            (max_sprites * VERTICES_PER_QUAD * std::mem::size_of::<SpriteVertex>()) as u64;

        let pipeline =
            SpritePipeline::new(device, gpu.surface_format(), &config.pipeline, config.filter)?;

        let vertex_buffer = create_checked(device, "vertex buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("sprite vertex buffer"),
                size: vertex_buffer_size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;

        let index_buffer = create_checked(device, "index buffer", || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sprite index buffer"),
                contents: bytemuck::cast_slice(&quad_indices(max_sprites)),
                usage: wgpu::BufferUsages::INDEX,
            })
        })?;

        let (transform_buffer, transform_bind_group) =
            create_checked(device, "transform buffer", || {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("sprite transform buffer"),
                    contents: bytemuck::cast_slice(&[TransformUniform {
                        transform: glam::Mat4::IDENTITY.to_cols_array_2d(),
                    }]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("sprite transform bind group"),
                    layout: &pipeline.transform_bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                (buffer, bind_group)
            })?;

        let textures = TextureStore::new(device, &gpu.queue, &pipeline)?;

        Ok(Self {
            device: gpu.device.clone(),
            queue: gpu.queue.clone(),
            pipeline,
            textures,
            vertex_buffer,
            index_buffer,
            transform_buffer,
            transform_bind_group,
            // One chunk fits a full batch plus its transform.
            belt: StagingBelt::new(vertex_buffer_size + TRANSFORM_SIZE + wgpu::MAP_ALIGNMENT),
            max_sprites,
            frame: None,
        })
    }

    /// Upload raw RGBA8 pixels as a new texture.
    pub fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Texture, RenderError> {
        self.textures
            .create(&self.device, &self.queue, &self.pipeline, label, width, height, data)
    }

    /// Load a PNG or JPEG from disk. Loading the same path twice returns the
    /// same texture.
    pub fn load_texture(&mut self, path: &str) -> Result<Texture, RenderError> {
        self.textures
            .load(&self.device, &self.queue, &self.pipeline, path)
    }

    /// The built-in 1x1 white texture. Draw it with a tint and a
    /// [`DrawParams::scale`](super::DrawParams::scale) to get solid rectangles.
    pub fn white_texture(&self) -> Texture {
        self.textures.white().clone()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn submit_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.belt.finish();
            self.queue.submit(std::iter::once(frame.encoder.finish()));
            self.belt.recall();
        }
    }
}

impl QuadBackend for GpuQuadBackend {
    type Texture = Texture;
    type Target = RenderTarget;

    fn begin(&mut self, target: RenderTarget) {
        if self.frame.is_some() {
            log::warn!("[SpriteRenderer] previous frame was never ended; submitting it now");
            self.submit_frame();
        }
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sprite encoder"),
            });
        self.frame = Some(FrameRecording { target, encoder });
    }

    fn target_size(&self) -> (u32, u32) {
        self.frame
            .as_ref()
            .map(|f| (f.target.width, f.target.height))
            .unwrap_or((1, 1))
    }

    fn max_quads(&self) -> usize {
        self.max_sprites
    }

    fn flush(&mut self, batch: QuadBatch<'_, Texture>) {
        let Some(frame) = self.frame.as_mut() else {
            log::warn!("[SpriteRenderer] flush outside a frame ignored");
            return;
        };
        let quads = batch.quad_count();
        assert!(
            quads <= self.max_sprites,
            "[SpriteRenderer] batch of {quads} quads exceeds the vertex buffer ({})",
            self.max_sprites
        );

        let uniform = TransformUniform {
            transform: batch.transform.to_cols_array_2d(),
        };
        let vertex_bytes: &[u8] = bytemuck::cast_slice(batch.vertices);
        let vertex_len = vertex_bytes.len() as wgpu::BufferAddress;
        let (Some(transform_size), Some(vertex_size)) = (
            wgpu::BufferSize::new(TRANSFORM_SIZE),
            wgpu::BufferSize::new(vertex_len),
        ) else {
            return;
        };

        self.belt
            .write_buffer(
                &mut frame.encoder,
                &self.transform_buffer,
                0,
                transform_size,
                &self.device,
            )
            .copy_from_slice(bytemuck::bytes_of(&uniform));
        self.belt
            .write_buffer(
                &mut frame.encoder,
                &self.vertex_buffer,
                0,
                vertex_size,
                &self.device,
            )
            .copy_from_slice(vertex_bytes);

        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprite batch pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline.pipeline);
        render_pass.set_bind_group(0, &self.transform_bind_group, &[]);
        render_pass.set_bind_group(1, &batch.texture.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..vertex_len));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..(quads * INDICES_PER_QUAD) as u32, 0, 0..1);

        log::trace!("sprite batch: {quads} quads, texture {:?}", batch.texture.id());
    }

    fn end(&mut self) {
        self.submit_frame();
    }
}

impl SpriteRenderer<GpuQuadBackend> {
    /// Create a wgpu-backed sprite renderer for the given device.
    pub fn new(gpu: &GpuContext, config: &RendererConfig) -> Result<Self, RenderError> {
        let backend = GpuQuadBackend::new(gpu, config)?;
        let mut renderer = Self::with_backend(backend);
        renderer.set_default_tint(config.default_tint);
        log::info!(
            "Sprite renderer ready: {} sprites per batch, {:?} filtering",
            config.max_sprites,
            config.filter
        );
        Ok(renderer)
    }

    /// See [`GpuQuadBackend::create_texture`].
    pub fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Texture, RenderError> {
        self.backend_mut().create_texture(label, width, height, data)
    }

    /// See [`GpuQuadBackend::load_texture`].
    pub fn load_texture(&mut self, path: &str) -> Result<Texture, RenderError> {
        self.backend_mut().load_texture(path)
    }

    /// See [`GpuQuadBackend::white_texture`].
    pub fn white_texture(&self) -> Texture {
        self.backend().white_texture()
    }
}
