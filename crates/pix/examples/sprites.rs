//! Sprite renderer demo: a checkerboard canvas, rotating sprites on every
//! pivot, flipped copies, a sub-region, and tinted rectangles drawn with the
//! white texture.
//!
//! Run with `RUST_LOG=info cargo run -p pix --example sprites`.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Instant;

use pix::prelude::*;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

const CHECKER_SIZE: u32 = 16;

/// 16x16 RGBA checkerboard with 4x4 cells, two shades of grey.
fn checkerboard() -> Vec<u8> {
    let mut data = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let shade = if (x / 4 + y / 4) % 2 == 0 { 200 } else { 120 };
            data.extend_from_slice(&[shade, shade, shade, 255]);
        }
    }
    data
}

/// 8x8 arrow pointing right, so flips and rotations are visible.
fn arrow() -> Vec<u8> {
    const SHAPE: [&str; 8] = [
        "...#....", "...##...", "...###..", "#######.", "########", "#######.", "...###..",
        "...##...",
    ];
    SHAPE
        .iter()
        .flat_map(|row| row.bytes())
        .flat_map(|b| if b == b'#' { [240, 180, 60, 255] } else { [0, 0, 0, 0] })
        .collect()
}

struct Scene {
    renderer: SpriteRenderer,
    checker: Texture,
    arrow: Texture,
    white: Texture,
}

impl Scene {
    fn new(gpu: &GpuContext) -> Result<Self, RenderError> {
        let config = RendererConfig {
            filter: TextureFilter::Nearest,
            ..RendererConfig::default()
        };
        let mut renderer = SpriteRenderer::new(gpu, &config)?;
        let checker =
            renderer.create_texture("checker", CHECKER_SIZE, CHECKER_SIZE, &checkerboard())?;
        let arrow = renderer.create_texture("arrow", 8, 8, &arrow())?;
        let white = renderer.white_texture();
        Ok(Self { renderer, checker, arrow, white })
    }

    fn draw(&mut self, target: RenderTarget, time: f32) -> FrameStats {
        let (width, height) = (target.width as f32, target.height as f32);
        let r = &mut self.renderer;
        r.begin_render(target);

        // Canvas background, scaled up 16x.
        r.draw(
            &self.checker,
            Vec2::new(width * 0.5, height * 0.5),
            DrawParams::new().scale(Vec2::splat(16.0)),
        );

        // One rotating arrow per pivot, laid out on a 3x3 grid.
        for (i, pivot) in Pivot::ALL.into_iter().enumerate() {
            let cell = Vec2::new((i % 3) as f32, (i / 3) as f32);
            let position = Vec2::new(160.0, 160.0) + cell * 120.0;
            r.draw(
                &self.white,
                position,
                DrawParams::new().scale(Vec2::splat(6.0)).tint(Color::rgb(1.0, 0.2, 0.2)),
            );
            r.draw(
                &self.arrow,
                position,
                DrawParams::new()
                    .pivot(pivot)
                    .rotation(time * TAU * 0.25)
                    .scale(Vec2::splat(6.0)),
            );
        }

        // Flipped copies.
        for (i, flip) in [Flip::None, Flip::Horizontal, Flip::Vertical, Flip::Both]
            .into_iter()
            .enumerate()
        {
            r.draw(
                &self.arrow,
                Vec2::new(width - 120.0, 100.0 + i as f32 * 80.0),
                DrawParams::new().flip(flip).scale(Vec2::splat(8.0)),
            );
        }

        // Top-left quarter of the checkerboard, semi-transparent.
        r.draw_region(
            &self.checker,
            Rect::from_xywh(0.0, 0.0, 8.0, 8.0),
            Vec2::new(width - 120.0, height - 80.0),
            DrawParams::new()
                .scale(Vec2::splat(8.0))
                .tint(Color::rgba(0.4, 0.6, 1.0, 0.6)),
        );

        r.end_render()
    }
}

#[derive(Default)]
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    scene: Option<Scene>,
    started: Option<Instant>,
    frames: u64,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("pix sprites")
            .with_inner_size(winit::dpi::LogicalSize::new(1024.0, 640.0));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let setup = GpuContext::new(window.clone())
            .and_then(|gpu| Scene::new(&gpu).map(|scene| (gpu, scene)));
        match setup {
            Ok((gpu, scene)) => {
                self.gpu = Some(gpu);
                self.scene = Some(scene);
                self.started = Some(Instant::now());
            }
            Err(e) => {
                log::error!("Renderer setup failed: {e}");
                event_loop.exit();
                return;
            }
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(gpu), Some(scene)) = (self.gpu.as_ref(), self.scene.as_mut()) else {
                    return;
                };
                let time = self.started.map(|t| t.elapsed().as_secs_f32()).unwrap_or(0.0);

                match gpu.begin_frame(ClearColor::default()) {
                    Ok(frame) => {
                        let stats = scene.draw(frame.target(), time);
                        frame.present();
                        self.frames += 1;
                        if self.frames % 300 == 0 {
                            log::info!(
                                "frame {}: {} sprites, {} flushes, {} texture binds",
                                self.frames,
                                stats.sprites,
                                stats.flushes,
                                stats.texture_binds
                            );
                        }
                    }
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu.reconfigure();
                    }
                    Err(e) => log::warn!("Skipping frame: {e}"),
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let event_loop = EventLoop::new()?;
    let mut app = App::default();
    event_loop.run_app(&mut app)?;
    Ok(())
}
