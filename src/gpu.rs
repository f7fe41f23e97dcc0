//! GPU device acquisition and surface plumbing.
//!
//! [`GpuContext`] is the explicit device handle passed by reference into
//! every component that allocates GPU resources. There is no process-wide
//! default device: whoever constructs the context decides where it goes and
//! sees every failure at the call site.
//!
//! Surface ownership lives in [`SurfaceContext`], kept separate from the
//! device so that headless use (asset loading, offscreen work) never touches
//! windowing at all.

use std::sync::Arc;
use thiserror::Error;
use winit::window::Window;

/// Startup failures while acquiring GPU access. All of these are fatal to
/// whatever was being initialized; there is no runtime fallback device.
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create logical device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to create window surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
}

/// The logical GPU device and its submission queue.
///
/// Both handles are internally reference-counted by wgpu, so cloning them
/// (e.g. into a loader worker thread) shares the same device.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquires a device with no surface attached.
    pub fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let (gpu, _adapter) = Self::request(&instance, None)?;
        Ok(gpu)
    }

    /// Acquires a device compatible with the given window and configures a
    /// surface for it.
    pub fn for_window(window: Arc<Window>) -> Result<(Self, SurfaceContext), GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;
        let (gpu, adapter) = Self::request(&instance, Some(&surface))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);

        Ok((gpu, SurfaceContext { surface, config }))
    }

    fn request(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<(Self, wgpu::Adapter), GpuError> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface,
            force_fallback_adapter: false,
        }))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("glint device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        Ok((Self { device, queue }, adapter))
    }
}

/// A configured window surface owned by the presentation layer.
pub struct SurfaceContext {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl SurfaceContext {
    /// Reconfigures the surface after a window resize. Zero-sized dimensions
    /// are ignored (they occur transiently during minimize).
    pub fn resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&gpu.device, &self.config);
        }
    }

    /// Tries to acquire the next drawable.
    ///
    /// Returns `None` when no drawable is available this tick (outdated or
    /// timed-out swapchain). The caller skips the frame; the next tick
    /// retries implicitly.
    pub fn acquire(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(err) => {
                log::warn!("surface has no drawable this frame: {err}");
                None
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn aspect(&self) -> f64 {
        self.config.width as f64 / self.config.height as f64
    }
}
