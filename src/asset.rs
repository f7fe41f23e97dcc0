//! The intermediate asset representation handed over by an asset-import
//! collaborator.
//!
//! This crate does not parse model file formats. An importer (external to
//! the renderer) produces a [`SourceAsset`] — plain vectors of vertices,
//! indices, submesh ranges, and raw pixels — and the loader turns it into a
//! GPU-resident [`Model`](crate::Model). The types here are the whole
//! contract between the two.

use crate::mesh::Vertex;
use glam::Mat4;
use std::ops::Range;
use thiserror::Error;

/// Pixel decode failures while building a [`SourcePixels`].
#[derive(Error, Debug)]
pub enum PixelsError {
    #[error("could not decode image data: {0}")]
    Decode(#[from] image::ImageError),
}

/// Raw RGBA8 pixel data with dimensions and no color-space metadata.
///
/// The importer that produced this lost the color space along the way; the
/// loader reinterprets the pixels as sRGB-encoded when it uploads them.
#[derive(Clone, Debug)]
pub struct SourcePixels {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl SourcePixels {
    /// Decodes an encoded image (PNG, JPEG, ...) into raw RGBA8.
    pub fn decode(bytes: &[u8]) -> Result<Self, PixelsError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            pixels: img.into_raw(),
            width,
            height,
        })
    }
}

/// Material description attached to a source submesh. Every field is
/// optional; an absent base-color texture yields an untextured material.
#[derive(Clone, Debug, Default)]
pub struct SourceMaterial {
    pub base_color: Option<SourcePixels>,
}

/// A submesh: an index range drawn with one material.
#[derive(Clone, Debug)]
pub struct SourceSubmesh {
    /// Range into the owning mesh's index list.
    pub indices: Range<u32>,
    pub material: Option<SourceMaterial>,
}

/// One mesh object inside an asset.
#[derive(Clone, Debug)]
pub struct SourceMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub submeshes: Vec<SourceSubmesh>,
    /// The asset's global transform for this mesh, if it declared one.
    pub transform: Option<Mat4>,
}

/// A parsed asset: zero or more meshes.
#[derive(Clone, Debug, Default)]
pub struct SourceAsset {
    pub meshes: Vec<SourceMesh>,
}

impl SourceMesh {
    /// A unit cube with one submesh and per-face normals/UVs. Handy as a
    /// fixture and as the demo's fallback when no asset is supplied.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            // Front face (Z+)
            Vertex::new([-0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
            Vertex::new([ 0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 0.0]),
            Vertex::new([ 0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
            Vertex::new([-0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 1.0]),
            // Back face (Z-)
            Vertex::new([ 0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
            Vertex::new([-0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 0.0]),
            Vertex::new([-0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
            Vertex::new([ 0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 1.0]),
            // Top face (Y+)
            Vertex::new([-0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [0.0, 0.0]),
            Vertex::new([ 0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
            Vertex::new([ 0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [1.0, 1.0]),
            Vertex::new([-0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
            // Bottom face (Y-)
            Vertex::new([-0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [0.0, 0.0]),
            Vertex::new([ 0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
            Vertex::new([ 0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [1.0, 1.0]),
            Vertex::new([-0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
            // Right face (X+)
            Vertex::new([ 0.5, -0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 0.0]),
            Vertex::new([ 0.5, -0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex::new([ 0.5,  0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex::new([ 0.5,  0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
            // Left face (X-)
            Vertex::new([-0.5, -0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 0.0]),
            Vertex::new([-0.5, -0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex::new([-0.5,  0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex::new([-0.5,  0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 1.0]),
        ];

        #[rustfmt::skip]
        let indices: Vec<u32> = vec![
            0,  1,  2,  2,  3,  0,  // front
            4,  5,  6,  6,  7,  4,  // back
            8,  9,  10, 10, 11, 8,  // top
            12, 13, 14, 14, 15, 12, // bottom
            16, 17, 18, 18, 19, 16, // right
            20, 21, 22, 22, 23, 20, // left
        ];

        let index_count = indices.len() as u32;
        Self {
            vertices,
            indices,
            submeshes: vec![SourceSubmesh {
                indices: 0..index_count,
                material: Some(SourceMaterial::default()),
            }],
            transform: None,
        }
    }
}

impl SourceAsset {
    /// Wraps a single mesh into an asset.
    pub fn from_mesh(mesh: SourceMesh) -> Self {
        Self { meshes: vec![mesh] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_fixture_is_one_submesh_of_36_indices() {
        let cube = SourceMesh::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.submeshes.len(), 1);
        assert_eq!(cube.submeshes[0].indices, 0..36);
    }
}
