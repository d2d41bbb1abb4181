//! Per-frame back buffer handling.
//!
//! [`GpuContext::begin_frame`](super::GpuContext::begin_frame) acquires and
//! clears the back buffer and returns a [`Frame`]. Renderers draw into
//! [`Frame::target`], then [`Frame::present`] shows the result.

/// The clear color for the back buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor(pub [f64; 4]);

impl ClearColor {
    pub(crate) fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.0[0],
            g: self.0[1],
            b: self.0[2],
            a: self.0[3],
        }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        // Neutral editor grey.
        Self([0.18, 0.18, 0.2, 1.0])
    }
}

/// A color attachment plus its size in pixels.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// An acquired back buffer, already cleared.
pub struct Frame {
    output: wgpu::SurfaceTexture,
    target: RenderTarget,
}

impl Frame {
    pub(crate) fn new(
        output: wgpu::SurfaceTexture,
        view: wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            output,
            target: RenderTarget { view, width, height },
        }
    }

    /// The back buffer as a render target.
    pub fn target(&self) -> RenderTarget {
        self.target.clone()
    }

    /// Show the frame. Everything drawn into the target must have been
    /// submitted by now.
    pub fn present(self) {
        self.output.present();
    }
}
