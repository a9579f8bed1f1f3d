use std::path::PathBuf;

use thiserror::Error;

use crate::shader::ShaderStage;

/// Failure while acquiring the GPU context. Fatal for the application.
#[derive(Debug, Error)]
pub enum GpuInitError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("surface reports no supported formats or alpha modes for this adapter")]
    IncompatibleSurface,

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Failure while building a shader program. Recoverable: the caller keeps
/// whatever program it had before.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader file '{}' not found", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read shader file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile {stage} shader:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("failed to link program:\n{log}")]
    Link { log: String },
}
