//! Hello, cube! -- a spinning cube with hot-swappable shader programs.
//!
//! winit drives the event loop via `ApplicationHandler` with `ControlFlow::Poll`,
//! so a redraw is requested every time the loop goes idle. Each
//! `RedrawRequested` runs one frame (see `ApplicationState::frame`):
//!
//!   1. Sample the clock and refresh the rolling frame statistics
//!   2. Spin the cube by the elapsed time
//!   3. Upload the uniforms the bound program declares and draw
//!
//! Keys `0`-`9` rebuild the program from the matching shader slot. A failed
//! build logs the compiler output and keeps the current program. `Escape`
//! or closing the window ends the loop.

mod controls;
mod error;
mod frame_loop;
mod state;

use std::path::Path;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use controls::{map_key, STARTUP_SHADERS};
use cube_core::logging::{init_logging, LoggingConfig};
use cube_platform::window::PlatformConfig;
use error::InitError;
use state::ApplicationState;

struct App {
    state: ApplicationState,
    init_error: Option<InitError>,
}

impl App {
    fn new() -> Self {
        Self {
            state: ApplicationState::new(PlatformConfig::default()),
            init_error: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_initialized() {
            return;
        }
        if let Err(err) = self.state.initialize(event_loop) {
            self.state.destroy();
            self.init_error = Some(err);
            event_loop.exit();
            return;
        }

        let ok = self.state.set_shader_program(
            Path::new(STARTUP_SHADERS.vertex),
            Path::new(STARTUP_SHADERS.fragment),
        );
        if !ok {
            log::warn!("something wrong with our shaders, rendering without a program");
        }
        log::info!("entering main loop");
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.state.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = &mut self.state;

        match event {
            WindowEvent::CloseRequested => state.frame_loop.request_close(),

            WindowEvent::Resized(size) => state.resize(size.width, size.height),

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        state.handle_key(key, event.state == ElementState::Pressed);
                    }
                }
            }

            WindowEvent::Focused(false) => state.focus_lost(),

            WindowEvent::RedrawRequested => state.frame(),

            _ => {}
        }

        if !state.frame_loop.is_running() {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.state.report_summary();
        self.state.destroy();
    }
}

fn run() -> Result<(), InitError> {
    init_logging(LoggingConfig::default());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    match app.init_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn main() {
    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
