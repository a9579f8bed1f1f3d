use cube_render::GpuInitError;
use thiserror::Error;

/// Startup failures. All of them are fatal.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to initialize GPU: {0}")]
    Gpu(#[from] GpuInitError),
}
