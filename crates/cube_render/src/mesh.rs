//! The demo's only mesh: a unit cube with one flat color ramp per face.
//!
//! Faces do not share vertices so each face can carry its own colors, which
//! gives 4 vertices and 2 triangles per face.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::next_object_id;
use crate::vertex::CubeVertex;

const fn v(position: [f32; 3], color: [u8; 4]) -> CubeVertex {
    CubeVertex::new(position, color)
}

#[rustfmt::skip]
pub const CUBE_VERTICES: [CubeVertex; 24] = [
    //  X     Y     Z        R    G    B    A
    // front
    v([-1.0, -1.0,  1.0], [255,   0,   0, 255]),
    v([ 1.0, -1.0,  1.0], [192,   0,   0, 255]),
    v([-1.0,  1.0,  1.0], [192,   0,   0, 255]),
    v([ 1.0,  1.0,  1.0], [128,   0,   0, 255]),
    // back
    v([ 1.0, -1.0, -1.0], [  0, 255, 255, 255]),
    v([-1.0, -1.0, -1.0], [  0, 192, 192, 255]),
    v([ 1.0,  1.0, -1.0], [  0, 192, 192, 255]),
    v([-1.0,  1.0, -1.0], [  0, 128, 128, 255]),
    // left
    v([-1.0, -1.0, -1.0], [  0, 255,   0, 255]),
    v([-1.0, -1.0,  1.0], [  0, 192,   0, 255]),
    v([-1.0,  1.0, -1.0], [  0, 192,   0, 255]),
    v([-1.0,  1.0,  1.0], [  0, 128,   0, 255]),
    // right
    v([ 1.0, -1.0,  1.0], [255,   0, 255, 255]),
    v([ 1.0, -1.0, -1.0], [192,   0, 192, 255]),
    v([ 1.0,  1.0,  1.0], [192,   0, 192, 255]),
    v([ 1.0,  1.0, -1.0], [128,   0, 128, 255]),
    // top
    v([-1.0,  1.0,  1.0], [  0,   0, 255, 255]),
    v([ 1.0,  1.0,  1.0], [  0,   0, 192, 255]),
    v([-1.0,  1.0, -1.0], [  0,   0, 192, 255]),
    v([ 1.0,  1.0, -1.0], [  0,   0, 128, 255]),
    // bottom
    v([ 1.0, -1.0,  1.0], [255, 255,   0, 255]),
    v([-1.0, -1.0,  1.0], [192, 192,   0, 255]),
    v([ 1.0, -1.0, -1.0], [192, 192,   0, 255]),
    v([-1.0, -1.0, -1.0], [128, 128,   0, 255]),
];

#[rustfmt::skip]
pub const CUBE_INDICES: [u16; 36] = [
     0,  1,  2,   2,  1,  3, // front
     4,  5,  6,   6,  5,  7, // back
     8,  9, 10,  10,  9, 11, // left
    12, 13, 14,  14, 13, 15, // right
    16, 17, 18,  18, 17, 19, // top
    20, 21, 22,  22, 21, 23, // bottom
];

struct MeshBuffers {
    vertex_id: u32,
    index_id: u32,
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
}

/// GPU-side cube plus its local model transform.
///
/// Vertex and index buffers live in one `Option` so they are either both
/// allocated or both gone.
pub struct CubeMesh {
    buffers: Option<MeshBuffers>,
    pub model: Mat4,
}

impl CubeMesh {
    pub fn create(device: &wgpu::Device) -> Self {
        let vertex_id = next_object_id();
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&CUBE_VERTICES);
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });
        log::info!(
            "Cube: created buffer {} for {} bytes of vertex data",
            vertex_id,
            vertex_bytes.len()
        );

        let index_id = next_object_id();
        let index_bytes: &[u8] = bytemuck::cast_slice(&CUBE_INDICES);
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Index Buffer"),
            contents: index_bytes,
            usage: wgpu::BufferUsages::INDEX,
        });
        log::info!(
            "Cube: created buffer {} for {} bytes of element data",
            index_id,
            index_bytes.len()
        );

        Self {
            buffers: Some(MeshBuffers {
                vertex_id,
                index_id,
                vertex,
                index,
            }),
            model: Mat4::IDENTITY,
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.buffers.is_some()
    }

    /// Releases the GPU buffers. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            log::info!(
                "Cube: deleting buffers {} {}",
                buffers.vertex_id,
                buffers.index_id
            );
            buffers.vertex.destroy();
            buffers.index.destroy();
        }
    }

    /// Records the indexed draw of the whole cube. Does nothing once destroyed.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(buffers) = self.buffers.as_ref() else {
            return;
        };
        pass.set_vertex_buffer(0, buffers.vertex.slice(..));
        pass.set_index_buffer(buffers.index.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..CUBE_INDICES.len() as u32, 0, 0..1);
    }
}

impl Drop for CubeMesh {
    fn drop(&mut self) {
        self.destroy();
    }
}
