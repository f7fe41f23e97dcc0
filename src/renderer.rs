//! The forward renderer: one pipeline, one pass, one draw per submesh.
//!
//! # Lifecycle
//!
//! [`ForwardRenderer::new`] compiles the lit-model pipeline, depth state,
//! and shared sampler exactly once; any failure there is fatal to startup.
//! After that, each call to [`draw`](RenderDelegate::draw) runs the frame
//! state machine:
//!
//! ```text
//! Idle → Encoding → Submitted
//! ```
//!
//! `Idle → Encoding` happens when the caller supplies a drawable target for
//! the frame; with no target the frame is skipped silently — no error, no
//! retry, the next tick tries again. `Encoding → Submitted` happens once
//! every draw for every entity has been issued and the command buffer is
//! handed to the queue. Submission is asynchronous: `draw` returns when
//! commands are handed off, not when they execute. At most one encoder is
//! open at a time, and per-frame failures never escape the renderer.
//!
//! # Uniform strategy
//!
//! Frame and lighting constants are written once per frame into dedicated
//! buffers. Instance and material constants are sub-allocated from growable
//! arenas at 256-byte-aligned slots (one slot per draw) and selected with
//! dynamic bind-group offsets, so the whole frame's constants are uploaded
//! in two writes no matter how many draws it contains.

use crate::camera::PerspectiveCamera;
use crate::constants::{
    BASE_COLOR_SAMPLER_BINDING, BASE_COLOR_TEXTURE_BINDING, FRAME_CONSTANTS_BINDING,
    FRAME_CONSTANTS_GROUP, FrameConstants, INSTANCE_CONSTANTS_BINDING, INSTANCE_CONSTANTS_GROUP,
    InstanceConstants, LIGHTING_CONSTANTS_BINDING, LIGHTING_CONSTANTS_GROUP, LightingConstants,
    MATERIAL_CONSTANTS_BINDING, MATERIAL_GROUP, MaterialConstants,
};
use crate::gpu::GpuContext;
use crate::lighting::LightRig;
use crate::mesh::Vertex;
use crate::plan::FramePlan;
use crate::scene::Scene;
use crate::texture::Texture;
use thiserror::Error;

/// Alignment of instance/material slots within the uniform arenas. Matches
/// wgpu's default `min_uniform_buffer_offset_alignment`.
const UNIFORM_STRIDE: u64 = 256;

/// Initial arena capacity in draw slots.
const INITIAL_DRAW_CAPACITY: usize = 16;

/// Startup failures while building the renderer. There is no runtime
/// fallback for a missing pipeline; callers abort on these.
#[derive(Error, Debug)]
pub enum RenderInitError {
    #[error("color target format {0:?} is not a display-referred sRGB format")]
    NonSrgbColorFormat(wgpu::TextureFormat),
}

/// Static facts about the surface the renderer will draw into.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceInfo {
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

/// The drawable target for one frame: a color view plus its dimensions.
/// The depth attachment is the renderer's own.
#[derive(Clone, Copy)]
pub struct FrameTarget<'a> {
    pub color: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl FrameTarget<'_> {
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

/// Everything the presentation layer hands the renderer for one frame.
/// `target: None` means no drawable was available this tick.
#[derive(Default)]
pub struct FrameContext<'a> {
    pub target: Option<FrameTarget<'a>>,
}

/// What became of a frame. Purely informational; skipped frames are not
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No drawable target; nothing was encoded.
    Skipped,
    /// Commands were handed to the queue.
    Submitted { draw_calls: u32 },
}

/// The dual-method contract between the presentation layer and a renderer:
/// `configure` once per surface change, `draw` once per display refresh.
pub trait RenderDelegate {
    fn configure(&mut self, gpu: &GpuContext, surface: &SurfaceInfo);
    fn draw(&mut self, gpu: &GpuContext, frame: FrameContext<'_>) -> FrameOutcome;
}

struct UniformArena {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl UniformArena {
    fn new(gpu: &GpuContext, label: &str, capacity: usize) -> Self {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity as u64 * UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer, capacity }
    }
}

/// Renders a scene of lit, textured models in a single forward pass.
pub struct ForwardRenderer {
    /// Shared camera, read once per frame. Mutate between frames only.
    pub camera: PerspectiveCamera,
    /// The light set uploaded each frame.
    pub lights: LightRig,
    /// Entities to draw, in order.
    pub scene: Scene,
    /// Background color for the pass clear.
    pub clear_color: wgpu::Color,

    color_format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    white_texture: Texture,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    lighting_buffer: wgpu::Buffer,
    lighting_bind_group: wgpu::BindGroup,

    instance_arena: UniformArena,
    instance_bind_group: wgpu::BindGroup,
    instance_layout: wgpu::BindGroupLayout,
    material_arena: UniformArena,
    material_layout: wgpu::BindGroupLayout,

    depth: Option<(wgpu::Texture, wgpu::TextureView)>,
    depth_size: (u32, u32),
}

impl ForwardRenderer {
    /// Builds the pipeline, depth configuration, sampler, and uniform
    /// arenas. Called once; everything created here lives for the renderer's
    /// lifetime.
    pub fn new(
        gpu: &GpuContext,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self, RenderInitError> {
        if !color_format.is_srgb() {
            return Err(RenderInitError::NonSrgbColorFormat(color_format));
        }

        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lit model shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/lit_model.wgsl").into()),
        });

        let uniform_entry = |binding: u32,
                             visibility: wgpu::ShaderStages,
                             dynamic: bool,
                             size: u64| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        };

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame constants layout"),
            entries: &[uniform_entry(
                FRAME_CONSTANTS_BINDING,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                false,
                std::mem::size_of::<FrameConstants>() as u64,
            )],
        });

        let instance_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("instance constants layout"),
            entries: &[uniform_entry(
                INSTANCE_CONSTANTS_BINDING,
                wgpu::ShaderStages::VERTEX,
                true,
                std::mem::size_of::<InstanceConstants>() as u64,
            )],
        });

        let lighting_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lighting constants layout"),
            entries: &[uniform_entry(
                LIGHTING_CONSTANTS_BINDING,
                wgpu::ShaderStages::FRAGMENT,
                false,
                std::mem::size_of::<LightingConstants>() as u64,
            )],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material layout"),
            entries: &[
                uniform_entry(
                    MATERIAL_CONSTANTS_BINDING,
                    wgpu::ShaderStages::FRAGMENT,
                    true,
                    std::mem::size_of::<MaterialConstants>() as u64,
                ),
                wgpu::BindGroupLayoutEntry {
                    binding: BASE_COLOR_TEXTURE_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: BASE_COLOR_SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit model pipeline layout"),
            bind_group_layouts: &[
                &frame_layout,
                &instance_layout,
                &lighting_layout,
                &material_layout,
            ],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lit model pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("lit_model_vertex"),
                buffers: &[Vertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("lit_model_fragment"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // One sampler shared by every material.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shared material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white_texture = Texture::white_pixel(gpu);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame constants"),
            size: std::mem::size_of::<FrameConstants>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame constants bind group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: FRAME_CONSTANTS_BINDING,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let lighting_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lighting constants"),
            size: std::mem::size_of::<LightingConstants>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lighting_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lighting constants bind group"),
            layout: &lighting_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: LIGHTING_CONSTANTS_BINDING,
                resource: lighting_buffer.as_entire_binding(),
            }],
        });

        let instance_arena = UniformArena::new(gpu, "instance arena", INITIAL_DRAW_CAPACITY);
        let instance_bind_group =
            Self::instance_bind_group(gpu, &instance_layout, &instance_arena.buffer);
        let material_arena = UniformArena::new(gpu, "material arena", INITIAL_DRAW_CAPACITY);

        Ok(Self {
            camera: PerspectiveCamera::default(),
            lights: LightRig::default(),
            scene: Scene::new(),
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.5,
                b: 1.0,
                a: 1.0,
            },
            color_format,
            pipeline,
            sampler,
            white_texture,
            frame_buffer,
            frame_bind_group,
            lighting_buffer,
            lighting_bind_group,
            instance_arena,
            instance_bind_group,
            instance_layout,
            material_arena,
            material_layout,
            depth: None,
            depth_size: (0, 0),
        })
    }

    fn instance_bind_group(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("instance constants bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: INSTANCE_CONSTANTS_BINDING,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<InstanceConstants>() as u64),
                }),
            }],
        })
    }

    fn material_bind_group(
        &self,
        gpu: &GpuContext,
        texture_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material bind group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: MATERIAL_CONSTANTS_BINDING,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.material_arena.buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(
                            std::mem::size_of::<MaterialConstants>() as u64
                        ),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: BASE_COLOR_TEXTURE_BINDING,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: BASE_COLOR_SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    fn ensure_depth(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        if self.depth.is_some() && self.depth_size == (width, height) {
            return;
        }
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth buffer"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some((texture, view));
        self.depth_size = (width, height);
    }

    fn ensure_draw_capacity(&mut self, gpu: &GpuContext, draws: usize) {
        if draws <= self.instance_arena.capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        self.instance_arena = UniformArena::new(gpu, "instance arena", capacity);
        self.instance_bind_group =
            Self::instance_bind_group(gpu, &self.instance_layout, &self.instance_arena.buffer);
        self.material_arena = UniformArena::new(gpu, "material arena", capacity);
    }
}

impl RenderDelegate for ForwardRenderer {
    /// Adapts to the surface: warns on a format the pipeline was not
    /// compiled for and sizes the depth buffer to match.
    fn configure(&mut self, gpu: &GpuContext, surface: &SurfaceInfo) {
        if surface.format != self.color_format {
            log::warn!(
                "surface format {:?} differs from pipeline color format {:?}",
                surface.format,
                self.color_format
            );
        }
        self.ensure_depth(gpu, surface.width, surface.height);
    }

    fn draw(&mut self, gpu: &GpuContext, frame: FrameContext<'_>) -> FrameOutcome {
        // Idle → Encoding requires a drawable target; otherwise drop the
        // frame and let the next tick retry implicitly.
        let Some(target) = frame.target else {
            log::trace!("no drawable target; skipping frame");
            return FrameOutcome::Skipped;
        };

        self.ensure_depth(gpu, target.width, target.height);
        let plan = FramePlan::build(&self.scene, &self.camera, &self.lights, target.aspect());
        self.ensure_draw_capacity(gpu, plan.draws.len());

        gpu.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&plan.frame));
        gpu.queue
            .write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&plan.lighting));

        if !plan.draws.is_empty() {
            let stride = UNIFORM_STRIDE as usize;
            let mut instance_bytes = vec![0u8; plan.draws.len() * stride];
            let mut material_bytes = vec![0u8; plan.draws.len() * stride];
            for (slot, draw) in plan.draws.iter().enumerate() {
                let offset = slot * stride;
                let instance = bytemuck::bytes_of(&draw.instance);
                instance_bytes[offset..offset + instance.len()].copy_from_slice(instance);
                let material = bytemuck::bytes_of(&draw.material);
                material_bytes[offset..offset + material.len()].copy_from_slice(material);
            }
            gpu.queue
                .write_buffer(&self.instance_arena.buffer, 0, &instance_bytes);
            gpu.queue
                .write_buffer(&self.material_arena.buffer, 0, &material_bytes);
        }

        // ensure_depth above guarantees this is populated.
        let Some((_, depth_view)) = self.depth.as_ref() else {
            return FrameOutcome::Skipped;
        };

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lit model frame"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lit model pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(FRAME_CONSTANTS_GROUP, &self.frame_bind_group, &[]);
            pass.set_bind_group(LIGHTING_CONSTANTS_GROUP, &self.lighting_bind_group, &[]);

            for (slot, draw) in plan.draws.iter().enumerate() {
                let Some(model) = self.scene.entities[draw.entity].model.as_ref() else {
                    continue;
                };

                for (stream, buffer) in model.mesh.vertex_buffers.iter().enumerate() {
                    pass.set_vertex_buffer(stream as u32, buffer.slice(..));
                }

                let offset = (slot as u64 * UNIFORM_STRIDE) as u32;
                pass.set_bind_group(INSTANCE_CONSTANTS_GROUP, &self.instance_bind_group, &[
                    offset,
                ]);

                let texture_view = model.materials[draw.material_index]
                    .base_color_texture
                    .as_ref()
                    .map(|t| &t.view)
                    .unwrap_or(&self.white_texture.view);
                let material_bind_group = self.material_bind_group(gpu, texture_view);
                pass.set_bind_group(MATERIAL_GROUP, &material_bind_group, &[offset]);

                pass.set_index_buffer(
                    model.mesh.index_buffer.slice(draw.index_offset..),
                    draw.index_format,
                );
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));

        let draw_calls = plan.draws.len() as u32;
        log::trace!("frame submitted: {draw_calls} draw calls");
        FrameOutcome::Submitted { draw_calls }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stride_covers_every_block() {
        assert!(std::mem::size_of::<InstanceConstants>() as u64 <= UNIFORM_STRIDE);
        assert!(std::mem::size_of::<MaterialConstants>() as u64 <= UNIFORM_STRIDE);
    }

    #[test]
    fn arena_growth_is_power_of_two() {
        assert_eq!(17usize.next_power_of_two(), 32);
        assert_eq!(INITIAL_DRAW_CAPACITY.next_power_of_two(), INITIAL_DRAW_CAPACITY);
    }
}
