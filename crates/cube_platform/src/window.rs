use std::sync::Arc;
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub const APP_TITLE: &str = "Hello, cube!";

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: APP_TITLE.to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Creates the main window. Sizes are physical pixels so the framebuffer
/// matches the requested viewport on every platform.
pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, OsError> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height));

    log::info!("creating window \"{}\" ({}x{})", config.title, config.width, config.height);
    let window = event_loop.create_window(attrs)?;
    Ok(Arc::new(window))
}
