//! # Glint
//!
//! **A small forward renderer for lit, textured models on wgpu.**
//!
//! Decode a mesh asset into GPU buffers, point a perspective camera at it,
//! and draw it with per-fragment Blinn-Phong lighting — one pipeline, one
//! pass, one draw call per submesh.
//!
//! ## Quick Start
//!
//! ```no_run
//! use glint::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gpu = GpuContext::new()?;
//!
//!     let mut renderer = ForwardRenderer::new(&gpu, wgpu::TextureFormat::Bgra8UnormSrgb)?;
//!     renderer.camera = PerspectiveCamera::new().at(0.0, 0.0, 1.75);
//!
//!     let asset = SourceAsset::from_mesh(SourceMesh::cube());
//!     let loaded = load_model(&gpu, &asset)?;
//!     renderer.scene.push(Entity::from(loaded));
//!
//!     // Per display refresh, hand the renderer a drawable:
//!     // renderer.draw(&gpu, FrameContext { target: Some(...) });
//!     Ok(())
//! }
//! ```
//!
//! ## Shape of the crate
//!
//! - **Assets in, buffers out** — [`SourceAsset`] is the CPU-side decoded
//!   form; [`load_model`] (or a background [`LoadQueue`]) turns it into a
//!   [`Model`] of device buffers and mipmapped sRGB textures.
//! - **Stable shader contract** — constant-block layouts and binding
//!   numbers live in [`constants`] and never change between frames.
//! - **Renderer as delegate** — the windowing layer owns the surface and
//!   calls [`RenderDelegate::configure`] / [`RenderDelegate::draw`]; the
//!   renderer owns everything else.

mod asset;
mod camera;
pub mod constants;
mod gpu;
mod lighting;
mod loader;
mod math;
mod mesh;
mod model;
mod plan;
mod renderer;
mod scene;
mod texture;

pub use asset::{PixelsError, SourceAsset, SourceMaterial, SourceMesh, SourcePixels, SourceSubmesh};
pub use camera::PerspectiveCamera;
pub use gpu::{GpuContext, GpuError, SurfaceContext};
pub use lighting::{LIGHT_SLOT_COUNT, Light, LightRig};
pub use loader::{LoadError, LoadQueue, LoadedModel, load_model};
pub use math::{adjugate, normal_matrix, upper_left_3x3};
pub use mesh::{Mesh, Submesh, Vertex};
pub use model::{Material, Model};
pub use renderer::{
    ForwardRenderer, FrameContext, FrameOutcome, FrameTarget, RenderDelegate, RenderInitError,
    SurfaceInfo,
};
pub use scene::{Entity, Scene};
pub use texture::Texture;

// Re-export glam math types for convenience
pub use glam::{DQuat, DVec3, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

// Callers build surfaces and frame targets against the same wgpu.
pub use wgpu;
