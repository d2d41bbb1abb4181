//! # Texture — Image Data on the GPU
//!
//! A [`Texture`] is a cheap, clonable handle: an id, the size in texels, and
//! the bind group (view + sampler) the sprite pipeline samples from. The
//! renderer only compares ids to decide whether two draws can share a batch.
//!
//! [`TextureStore`] keeps a path cache so the same file is only uploaded once,
//! and owns the 1x1 white texture used for solid-colored quads (grid lines,
//! selection boxes, color swatches).
//!
//! Ids come from one process-wide counter, not from the store. Several
//! renderers can share a device, and a texture created by one of them must
//! never compare equal to a different texture of another.
//!
//! ```text
//! TextureStore                         NEXT_TEXTURE_ID (process-wide)
//! ┌───────────────────────────────────────────────┐
//! │ white: Texture(id 4, 1x1)     ◄── always here │
//! │ created: 3                                    │
//! │ path_cache: HashMap<String, Texture>          │
//! │   "brushes.png" → Texture(id 5)               │
//! │   "palette.png" → Texture(id 6)               │
//! └───────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use wgpu::util::DeviceExt;

use crate::error::RenderError;

use super::backend::{SpriteTexture, TextureId};
use super::pipeline::{SpritePipeline, create_checked};

/// Handle to a GPU texture usable with the sprite renderer.
#[derive(Debug, Clone)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    pub(crate) bind_group: wgpu::BindGroup,
}

impl SpriteTexture for Texture {
    fn id(&self) -> TextureId {
        self.id
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(0);

/// Hand out a texture id no other texture in this process has.
pub(crate) fn next_texture_id() -> TextureId {
    TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
}

/// Check that `len` bytes are exactly one RGBA8 image of `width` x `height`.
pub(crate) fn validate_rgba(width: u32, height: u32, len: usize) -> Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("zero size {width}x{height}"));
    }
    let expected = width as usize * height as usize * 4;
    if len != expected {
        return Err(format!("{width}x{height} needs {expected} bytes of RGBA8 data, got {len}"));
    }
    Ok(())
}

/// Owns the path cache and the default white texture.
pub(crate) struct TextureStore {
    white: Texture,
    created: usize,
    path_cache: HashMap<String, Texture>,
}

impl TextureStore {
    /// Create a new store with its own 1x1 white texture.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &SpritePipeline,
    ) -> Result<Self, RenderError> {
        let white = upload(
            device,
            queue,
            pipeline,
            next_texture_id(),
            "white 1x1",
            1,
            1,
            &[255u8, 255, 255, 255],
        )?;
        Ok(Self {
            white,
            created: 1,
            path_cache: HashMap::new(),
        })
    }

    pub fn white(&self) -> &Texture {
        &self.white
    }

    /// Upload raw RGBA8 pixels as a new texture.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &SpritePipeline,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Texture, RenderError> {
        validate_rgba(width, height, data.len()).map_err(|message| {
            RenderError::ResourceCreation {
                resource: "texture",
                message: format!("'{label}': {message}"),
            }
        })?;

        let texture = upload(
            device,
            queue,
            pipeline,
            next_texture_id(),
            label,
            width,
            height,
            data,
        )?;
        self.created += 1;
        Ok(texture)
    }

    /// Load an image from disk. The same path returns the cached texture.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &SpritePipeline,
        path: &str,
    ) -> Result<Texture, RenderError> {
        if let Some(texture) = self.path_cache.get(path) {
            return Ok(texture.clone());
        }

        let img = image::open(path)
            .map_err(|e| RenderError::TextureLoad {
                path: path.to_owned(),
                message: e.to_string(),
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let texture = self.create(device, queue, pipeline, path, width, height, img.as_raw())?;

        log::debug!("Loaded texture '{path}' ({width}x{height}) as {:?}", texture.id);
        self.path_cache.insert(path.to_owned(), texture.clone());
        Ok(texture)
    }

    /// Number of textures created so far, the white one included.
    pub fn len(&self) -> usize {
        self.created
    }
}

#[allow(clippy::too_many_arguments)]
fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipeline: &SpritePipeline,
    id: TextureId,
    label: &str,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<Texture, RenderError> {
    let bind_group = create_checked(device, "texture", || {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &pipeline.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&pipeline.sampler),
                },
            ],
        })
    })?;

    Ok(Texture {
        id,
        width,
        height,
        bind_group,
    })
}
