/// Shader input slot for the vertex position.
pub const POSITION_LOCATION: u32 = 0;
/// Shader input slot for the vertex color.
pub const COLOR_LOCATION: u32 = 2;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    /// RGBA, normalized to [0, 1] when fetched by the shader.
    pub color: [u8; 4],
}

impl CubeVertex {
    pub const fn new(position: [f32; 3], color: [u8; 4]) -> Self {
        Self { position, color }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(CubeVertex, position) as wgpu::BufferAddress,
                    shader_location: POSITION_LOCATION,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // color
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(CubeVertex, color) as wgpu::BufferAddress,
                    shader_location: COLOR_LOCATION,
                    format: wgpu::VertexFormat::Unorm8x4,
                },
            ],
        }
    }
}
