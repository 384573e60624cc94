//! Meshes
//!
//! One vertex buffer and one 32-bit index buffer per mesh. Sub-meshes are
//! index ranges, each drawn with its own material.

use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use super::material::Material;
use crate::core::Bounds;
use crate::errors::{EmberError, Result};
use crate::gfx::{BufferHandle, GpuObject, ReleaseQueue, RenderDevice, VertexAttribute, VertexLayout};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

const _: () = assert!(size_of::<Vertex>() == 32);

impl Vertex {
    #[must_use]
    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: size_of::<Self>() as u64,
            attributes: vec![
                VertexAttribute {
                    location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                },
                VertexAttribute {
                    location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                },
                VertexAttribute {
                    location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 24,
                },
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubMesh {
    pub index_offset: u32,
    pub index_count: u32,
    pub material: Rc<Material>,
    pub bounds: Bounds,
}

#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: BufferHandle,
    vertex_buffer_address: u64,
    index_buffer: BufferHandle,
    vertex_count: u32,
    index_count: u32,
    sub_meshes: Vec<SubMesh>,
    release: ReleaseQueue,
}

impl Mesh {
    /// Uploads `vertices` and `indices`. Every sub-mesh range must lie inside
    /// `indices`.
    pub fn new(
        device: &mut RenderDevice,
        label: &str,
        vertices: &[Vertex],
        indices: &[u32],
        sub_meshes: Vec<SubMesh>,
    ) -> Result<Self> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(EmberError::InvalidDescriptor(format!("mesh '{label}' has no geometry")));
        }
        for (i, sub_mesh) in sub_meshes.iter().enumerate() {
            let end = u64::from(sub_mesh.index_offset) + u64::from(sub_mesh.index_count);
            if end > indices.len() as u64 {
                return Err(EmberError::InvalidDescriptor(format!(
                    "sub-mesh {i} of '{label}' reads indices up to {end} of {}",
                    indices.len()
                )));
            }
        }

        let vertex_buffer = device.create_buffer_init(
            &format!("{label} Vertices"),
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::STORAGE,
            bytemuck::cast_slice(vertices),
        )?;
        let index_buffer = match device.create_buffer_init(
            &format!("{label} Indices"),
            wgpu::BufferUsages::INDEX,
            bytemuck::cast_slice(indices),
        ) {
            Ok(buffer) => buffer,
            Err(err) => {
                device.gfx_mut().destroy_buffer(vertex_buffer);
                return Err(err);
            }
        };

        Ok(Self {
            vertex_buffer,
            vertex_buffer_address: device.gfx().gpu_address(vertex_buffer, 0),
            index_buffer,
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
            sub_meshes,
            release: device.release_queue().clone(),
        })
    }

    #[must_use]
    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    /// Device address of the first vertex, for vertex pulling.
    #[must_use]
    pub fn vertex_buffer_address(&self) -> u64 {
        self.vertex_buffer_address
    }

    #[must_use]
    pub fn index_buffer(&self) -> BufferHandle {
        self.index_buffer
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[must_use]
    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        self.release.push(GpuObject::Buffer(self.vertex_buffer));
        self.release.push(GpuObject::Buffer(self.index_buffer));
    }
}
