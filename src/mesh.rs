//! GPU-resident mesh geometry: the fixed vertex format, submesh ranges, and
//! the buffers they live in.
//!
//! # Vertex Layout
//!
//! Every mesh uses the same interleaved 32-byte vertex (offsets and shader
//! locations are a contract with the pipeline's input layout and must not be
//! reordered):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |

use crate::gpu::GpuContext;

/// A mesh vertex: position, normal, texture coordinate.
///
/// `#[repr(C)]` pins the field order to the GPU layout above; `Pod` allows
/// the whole slice to be uploaded as bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// The wgpu vertex buffer layout for this format. Stride 32, per-vertex
    /// stepping, attributes at locations 0/1/2.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A contiguous index range within a mesh, drawn with one material.
///
/// The pipeline fixes the primitive type to triangle lists, so unlike the
/// index format and offset it is not carried per submesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Submesh {
    /// Number of indices to draw.
    pub index_count: u32,
    /// Element type of the indices.
    pub index_format: wgpu::IndexFormat,
    /// Byte offset of this range within the mesh's index buffer.
    pub index_offset: u64,
}

/// Geometry uploaded to the GPU: vertex buffers, one index buffer, and the
/// submesh ranges that partition it.
///
/// Buffers are sized exactly to the data they were created from and are
/// immutable afterwards. The fixed vertex format fits in a single stream,
/// but the buffer list stays a sequence because the draw path binds streams
/// by position.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffers: Vec<wgpu::Buffer>,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) submeshes: Vec<Submesh>,
}

impl Mesh {
    /// Uploads vertex and index data, partitioned into the given submeshes.
    pub fn new(
        gpu: &GpuContext,
        vertices: &[Vertex],
        indices: &[u32],
        submeshes: Vec<Submesh>,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh vertex buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh index buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffers: vec![vertex_buffer],
            index_buffer,
            submeshes,
        }
    }

    /// Uploads geometry as a single submesh spanning all indices.
    pub fn single_submesh(gpu: &GpuContext, vertices: &[Vertex], indices: &[u32]) -> Self {
        let submesh = Submesh {
            index_count: indices.len() as u32,
            index_format: wgpu::IndexFormat::Uint32,
            index_offset: 0,
        };
        Self::new(gpu, vertices, indices, vec![submesh])
    }

    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn vertex_is_32_bytes_with_mandated_attribute_order() {
        assert_eq!(size_of::<Vertex>(), 32);
        assert_eq!(offset_of!(Vertex, position), 0);
        assert_eq!(offset_of!(Vertex, normal), 12);
        assert_eq!(offset_of!(Vertex, uv), 24);
    }

    #[test]
    fn layout_matches_struct() {
        assert_eq!(Vertex::LAYOUT.array_stride, 32);
        let offsets: Vec<u64> = Vertex::LAYOUT.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
        let locations: Vec<u32> = Vertex::LAYOUT
            .attributes
            .iter()
            .map(|a| a.shader_location)
            .collect();
        assert_eq!(locations, vec![0, 1, 2]);
    }
}
