//! # Cube Vertices
//!
//! Geometry of the textured cube drawn for every instance. Each face has its own four vertices so
//! that every face maps the full texture; [`crate::INDICES`] splits each face into two triangles.

/// A cube vertex: object-space position and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    position: [f32; 3],
    uv: [f32; 2],
}

impl Vertex {
    const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }

    pub fn position(&self) -> [f32; 3] {
        self.position
    }

    /// Attributes of the per-vertex stream: position at location 0, texture coordinates at
    /// location 1.
    pub fn vertex_attributes() -> Vec<wgpu::VertexAttribute> {
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2].to_vec()
    }

    pub fn description(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

/// The unit cube spanning `[-1, 1]` on every axis, four vertices per face.
#[rustfmt::skip]
pub const VERTICES: [Vertex; 24] = [
    // +Z
    Vertex::new([-1.0, -1.0,  1.0], [0.0, 1.0]),
    Vertex::new([ 1.0, -1.0,  1.0], [1.0, 1.0]),
    Vertex::new([ 1.0,  1.0,  1.0], [1.0, 0.0]),
    Vertex::new([-1.0,  1.0,  1.0], [0.0, 0.0]),
    // -Z
    Vertex::new([ 1.0, -1.0, -1.0], [0.0, 1.0]),
    Vertex::new([-1.0, -1.0, -1.0], [1.0, 1.0]),
    Vertex::new([-1.0,  1.0, -1.0], [1.0, 0.0]),
    Vertex::new([ 1.0,  1.0, -1.0], [0.0, 0.0]),
    // +X
    Vertex::new([ 1.0, -1.0,  1.0], [0.0, 1.0]),
    Vertex::new([ 1.0, -1.0, -1.0], [1.0, 1.0]),
    Vertex::new([ 1.0,  1.0, -1.0], [1.0, 0.0]),
    Vertex::new([ 1.0,  1.0,  1.0], [0.0, 0.0]),
    // -X
    Vertex::new([-1.0, -1.0, -1.0], [0.0, 1.0]),
    Vertex::new([-1.0, -1.0,  1.0], [1.0, 1.0]),
    Vertex::new([-1.0,  1.0,  1.0], [1.0, 0.0]),
    Vertex::new([-1.0,  1.0, -1.0], [0.0, 0.0]),
    // +Y
    Vertex::new([-1.0,  1.0,  1.0], [0.0, 1.0]),
    Vertex::new([ 1.0,  1.0,  1.0], [1.0, 1.0]),
    Vertex::new([ 1.0,  1.0, -1.0], [1.0, 0.0]),
    Vertex::new([-1.0,  1.0, -1.0], [0.0, 0.0]),
    // -Y
    Vertex::new([-1.0, -1.0, -1.0], [0.0, 1.0]),
    Vertex::new([ 1.0, -1.0, -1.0], [1.0, 1.0]),
    Vertex::new([ 1.0, -1.0,  1.0], [1.0, 0.0]),
    Vertex::new([-1.0, -1.0,  1.0], [0.0, 0.0]),
];
