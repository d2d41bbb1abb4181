//! # Pipeline — The Fixed GPU Configuration for Sprites
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ RenderPipeline                                              │
//! │                                                             │
//! │  Shader module ─── PipelineConfig (default: shader.wgsl)    │
//! │                                                             │
//! │  Vertex layout ─── SpriteVertex { pos, uv, color }          │
//! │                                                             │
//! │  Bind group layouts                                         │
//! │    group 0: transform uniform (mat4x4, vertex-only)         │
//! │    group 1: texture + sampler (fragment-only)               │
//! │                                                             │
//! │  Blend state ─── non-premultiplied alpha                    │
//! │    rgb = src.rgb × src.a + dst.rgb × (1 - src.a)            │
//! │    a   = src.a           + dst.a   × (1 - src.a)            │
//! │                                                             │
//! │  Primitive ─── TriangleList, no culling                     │
//! │  Depth/stencil ─── None (draw order is the layering)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every creation step runs inside a wgpu validation error scope, so a bad
//! shader or descriptor comes back as a [`RenderError::ResourceCreation`]
//! naming the object instead of a panic deep inside the driver.

use std::borrow::Cow;

use crate::config::TextureFilter;
use crate::error::RenderError;

use super::vertex::SpriteVertex;

/// Shader source and entry points for the sprite pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Prefix for the debug labels of every GPU object.
    pub label: Cow<'static, str>,
    /// WGSL source. Must declare the bindings and vertex inputs of the
    /// built-in shader.
    pub shader_source: Cow<'static, str>,
    pub vertex_entry: Cow<'static, str>,
    pub fragment_entry: Cow<'static, str>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("sprite"),
            shader_source: Cow::Borrowed(include_str!("shader.wgsl")),
            vertex_entry: Cow::Borrowed("vs_main"),
            fragment_entry: Cow::Borrowed("fs_main"),
        }
    }
}

/// Straight (non-premultiplied) alpha blending.
pub(crate) const NON_PREMULTIPLIED_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Run `create` inside a validation error scope and turn any error into a
/// [`RenderError::ResourceCreation`] for `resource`.
pub(crate) fn create_checked<T>(
    device: &wgpu::Device,
    resource: &'static str,
    create: impl FnOnce() -> T,
) -> Result<T, RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => {
            log::error!("[SpriteRenderer] failed to create {resource}: {err}");
            Err(RenderError::ResourceCreation {
                resource,
                message: err.to_string(),
            })
        }
        None => Ok(value),
    }
}

/// Shader, layouts, pipeline, and sampler shared by every sprite draw.
pub(crate) struct SpritePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub transform_bind_group_layout: wgpu::BindGroupLayout,
    pub texture_bind_group_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
}

impl SpritePipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        config: &PipelineConfig,
        filter: TextureFilter,
    ) -> Result<Self, RenderError> {
        let label = config.label.as_ref();

        let shader = create_checked(device, "sprite shader", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{label} shader")),
                source: wgpu::ShaderSource::Wgsl(config.shader_source.clone()),
            })
        })?;

        let (transform_bind_group_layout, texture_bind_group_layout) =
            create_checked(device, "bind group layouts", || {
                let transform = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{label} transform layout")),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });
                let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{label} texture layout")),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                multisampled: false,
                                view_dimension: wgpu::TextureViewDimension::D2,
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });
                (transform, texture)
            })?;

        let pipeline = create_checked(device, "sprite pipeline", || {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{label} pipeline layout")),
                bind_group_layouts: &[&transform_bind_group_layout, &texture_bind_group_layout],
                push_constant_ranges: &[],
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{label} pipeline")),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(config.vertex_entry.as_ref()),
                    buffers: &[SpriteVertex::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(config.fragment_entry.as_ref()),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(NON_PREMULTIPLIED_BLEND),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        let sampler = create_checked(device, "sprite sampler", || {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(&format!("{label} sampler")),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter.to_wgpu(),
                min_filter: filter.to_wgpu(),
                ..Default::default()
            })
        })?;

        Ok(Self {
            pipeline,
            transform_bind_group_layout,
            texture_bind_group_layout,
            sampler,
        })
    }
}
