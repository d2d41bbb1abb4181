//! Rendering subsystem — wgpu device and back buffer.

pub mod gpu;
pub mod pass;

pub use gpu::GpuContext;
pub use pass::{ClearColor, Frame, RenderTarget};
