//! Asset-to-GPU loading.
//!
//! This is the only place GPU memory is allocated for asset content: the
//! loader takes a [`SourceAsset`], uploads the first mesh's geometry, builds
//! one material per submesh (with an sRGB-reinterpreted, mipmapped texture
//! when the submesh declares one), and hands back a shared [`Model`].
//!
//! [`LoadQueue`] is the asynchronous seam: loads run on a worker thread and
//! publish their result over a channel, so the render thread installs
//! completed models between frames and never observes a half-built one.

use crate::asset::{SourceAsset, SourceMesh};
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Submesh};
use crate::model::{Material, Model};
use crate::texture::Texture;
use glam::Mat4;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use thiserror::Error;

/// Per-asset load failures. These surface to the loader's caller; the
/// affected entity simply keeps no model and is skipped at render time.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The source asset contained no mesh objects at all.
    #[error("asset contains no meshes")]
    NoMeshesInAsset,
}

/// A load result: the shared model plus the world transform the asset
/// declared for it (identity when it declared none).
#[derive(Debug)]
pub struct LoadedModel {
    pub model: Arc<Model>,
    pub transform: Mat4,
}

/// Picks the mesh to load out of an asset.
///
/// Only the first mesh is used even when the asset carries several; one
/// model per asset is a deliberate simplification.
pub(crate) fn select_mesh(asset: &SourceAsset) -> Result<&SourceMesh, LoadError> {
    asset.meshes.first().ok_or(LoadError::NoMeshesInAsset)
}

/// Uploads an asset's first mesh and materials to the GPU.
pub fn load_model(gpu: &GpuContext, asset: &SourceAsset) -> Result<LoadedModel, LoadError> {
    let source = select_mesh(asset)?;

    let materials: Vec<Material> = source
        .submeshes
        .iter()
        .map(|submesh| {
            let base_color_texture = submesh
                .material
                .as_ref()
                .and_then(|m| m.base_color.as_ref())
                .map(|p| Texture::from_rgba8(gpu, &p.pixels, p.width, p.height));
            Material {
                base_color_texture,
                ..Material::default()
            }
        })
        .collect();

    let submeshes: Vec<Submesh> = source
        .submeshes
        .iter()
        .map(|submesh| Submesh {
            index_count: submesh.indices.len() as u32,
            index_format: wgpu::IndexFormat::Uint32,
            index_offset: submesh.indices.start as u64 * std::mem::size_of::<u32>() as u64,
        })
        .collect();

    let mesh = Mesh::new(gpu, &source.vertices, &source.indices, submeshes);

    log::debug!(
        "loaded model: {} vertices, {} indices, {} submeshes",
        source.vertices.len(),
        source.indices.len(),
        source.submeshes.len()
    );

    Ok(LoadedModel {
        model: Arc::new(Model { mesh, materials }),
        transform: source.transform.unwrap_or(Mat4::IDENTITY),
    })
}

/// A single-writer completion queue for background loads.
///
/// Workers upload through their own clones of the device/queue handles
/// (wgpu shares the underlying device); results arrive in submission order.
/// There is no cancellation: a request runs to completion or failure.
pub struct LoadQueue {
    sender: Sender<Result<LoadedModel, LoadError>>,
    receiver: Receiver<Result<LoadedModel, LoadError>>,
}

impl LoadQueue {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Starts a load on a worker thread. The result shows up in [`poll`]
    /// once the upload is complete.
    ///
    /// [`poll`]: Self::poll
    pub fn spawn(&self, gpu: &GpuContext, asset: SourceAsset) {
        let sender = self.sender.clone();
        let device = gpu.device.clone();
        let queue = gpu.queue.clone();
        std::thread::spawn(move || {
            let worker = GpuContext { device, queue };
            let result = load_model(&worker, &asset);
            if let Err(err) = &result {
                log::warn!("model load failed: {err}");
            }
            // Receiver dropped means nobody wants the model anymore.
            let _ = sender.send(result);
        });
    }

    /// Takes the next completed load, if any. Non-blocking; call between
    /// frames from the thread that owns the scene.
    pub fn poll(&self) -> Option<Result<LoadedModel, LoadError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Default for LoadQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_asset_fails_with_no_meshes() {
        let asset = SourceAsset::default();
        assert_eq!(select_mesh(&asset).unwrap_err(), LoadError::NoMeshesInAsset);
    }

    #[test]
    fn first_mesh_wins_when_asset_has_several() {
        let mut first = SourceMesh::cube();
        first.indices.truncate(6);
        first.submeshes[0].indices = 0..6;
        let asset = SourceAsset {
            meshes: vec![first, SourceMesh::cube()],
        };
        let selected = select_mesh(&asset).unwrap();
        assert_eq!(selected.indices.len(), 6);
    }

    #[test]
    fn empty_queue_polls_none() {
        let queue = LoadQueue::new();
        assert!(queue.poll().is_none());
    }
}
