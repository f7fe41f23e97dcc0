//! Spins a checkerboard-textured cube under the default two-light rig.
//!
//! Run with `RUST_LOG=debug` to watch the load queue and frame skips.

use glint::*;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// An 8x8 checkerboard at 256x256, generated so the demo needs no asset
/// files on disk.
fn checkerboard() -> SourcePixels {
    const SIZE: u32 = 256;
    const CELL: u32 = 32;
    let mut pixels = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let light = ((x / CELL) + (y / CELL)) % 2 == 0;
            let value = if light { 230 } else { 60 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    SourcePixels {
        pixels,
        width: SIZE,
        height: SIZE,
    }
}

fn checkerboard_cube() -> SourceAsset {
    let mut mesh = SourceMesh::cube();
    mesh.submeshes[0].material = Some(SourceMaterial {
        base_color: Some(checkerboard()),
    });
    SourceAsset::from_mesh(mesh)
}

struct State {
    window: Arc<Window>,
    gpu: GpuContext,
    surface: SurfaceContext,
    renderer: ForwardRenderer,
    loads: LoadQueue,
}

impl State {
    fn surface_info(&self) -> SurfaceInfo {
        SurfaceInfo {
            format: self.surface.config.format,
            width: self.surface.width(),
            height: self.surface.height(),
        }
    }
}

#[derive(Default)]
struct App {
    started: Option<Instant>,
    state: Option<State>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window = Arc::new(
            event_loop
                .create_window(Window::default_attributes().with_title("glint — spinning model"))
                .expect("failed to create window"),
        );
        let (gpu, surface) = GpuContext::for_window(window.clone()).expect("GPU init failed");

        let mut renderer =
            ForwardRenderer::new(&gpu, surface.config.format).expect("renderer init failed");
        renderer.camera = PerspectiveCamera::new().at(0.0, 0.0, 1.75);
        renderer.configure(&gpu, &SurfaceInfo {
            format: surface.config.format,
            width: surface.width(),
            height: surface.height(),
        });

        let loads = LoadQueue::new();
        loads.spawn(&gpu, checkerboard_cube());

        self.started = Some(Instant::now());
        self.state = Some(State {
            window,
            gpu,
            surface,
            renderer,
            loads,
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.surface.resize(&state.gpu, size.width, size.height);
                let info = state.surface_info();
                state.renderer.configure(&state.gpu, &info);
            }
            WindowEvent::RedrawRequested => {
                while let Some(result) = state.loads.poll() {
                    match result {
                        Ok(loaded) => state.renderer.scene.push(Entity::from(loaded)),
                        Err(err) => log::error!("dropping failed load: {err}"),
                    }
                }

                let elapsed = self
                    .started
                    .map(|t| t.elapsed().as_secs_f32())
                    .unwrap_or_default();
                let spin = Mat4::from_rotation_y(elapsed);
                for entity in &mut state.renderer.scene.entities {
                    entity.transform = spin;
                }

                let drawable = state.surface.acquire();
                let view = drawable
                    .as_ref()
                    .map(|d| d.texture.create_view(&wgpu::TextureViewDescriptor::default()));
                let outcome = state.renderer.draw(&state.gpu, FrameContext {
                    target: view.as_ref().map(|color| FrameTarget {
                        color,
                        width: state.surface.width(),
                        height: state.surface.height(),
                    }),
                });

                if let Some(drawable) = drawable {
                    drawable.present();
                }
                if outcome == FrameOutcome::Skipped {
                    log::debug!("frame skipped");
                }
                state.window.request_redraw();
            }
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    let event_loop = EventLoop::new().expect("failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run_app(&mut App::default())
        .expect("event loop error");
}
