pub mod camera;
pub mod error;
pub mod gpu_context;
pub mod mesh;
pub mod program_slot;
pub mod reflect;
pub mod shader;
pub mod vertex;

use std::sync::atomic::{AtomicU32, Ordering};

pub use camera::{projection, rotate_model, view};
pub use error::{GpuInitError, ShaderError};
pub use gpu_context::GpuContext;
pub use mesh::CubeMesh;
pub use program_slot::ProgramSlot;
pub use reflect::{UniformKind, UniformLocation};
pub use shader::{ShaderProgram, ShaderSources, ShaderStage, UniformValues};
pub use vertex::CubeVertex;

static NEXT_OBJECT_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique id used to name GPU objects in log output.
pub(crate) fn next_object_id() -> u32 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}
