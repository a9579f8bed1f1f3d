//! Everything the running demo owns: window, GPU context, cube mesh, the
//! bound shader program, and the frame loop.
//!
//! Resources are acquired in `initialize` and released in `destroy`, which is
//! safe to call any number of times and from any partially initialized state.

use std::path::Path;
use std::sync::Arc;

use glam::Mat4;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use cube_core::input::Key;
use cube_core::time::Clock;
use cube_platform::window::{create_window, PlatformConfig};
use cube_render::gpu_context::CLEAR_COLOR;
use cube_render::{
    projection, rotate_model, view, CubeMesh, GpuContext, ProgramSlot, ShaderProgram,
    UniformValues,
};

use crate::controls::{Action, SHADER_SLOTS};
use crate::error::InitError;
use crate::frame_loop::{title_with_stats, FrameLoop};

pub struct ApplicationState {
    config: PlatformConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    mesh: Option<CubeMesh>,
    program: ProgramSlot<ShaderProgram>,
    clock: Clock,
    pub frame_loop: FrameLoop,
    width: u32,
    height: u32,
    projection: Mat4,
    view: Mat4,
}

impl ApplicationState {
    pub fn new(config: PlatformConfig) -> Self {
        let (width, height) = (config.width, config.height);
        Self {
            config,
            window: None,
            gpu: None,
            mesh: None,
            program: ProgramSlot::empty(),
            clock: Clock::start(),
            frame_loop: FrameLoop::new(0.0),
            width,
            height,
            projection: projection(width, height),
            view: view(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.window.is_some()
    }

    /// Creates the window, the GPU context, and the cube's buffers, then
    /// restarts the clock so the first frame measures from here.
    pub fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), InitError> {
        let window = create_window(event_loop, &self.config)?;
        let size = window.inner_size();
        self.width = size.width;
        self.height = size.height;
        self.window = Some(window.clone());

        let gpu = GpuContext::new(window)?;
        self.mesh = Some(CubeMesh::create(&gpu.device));
        self.gpu = Some(gpu);

        self.clock = Clock::start();
        self.frame_loop = FrameLoop::new(self.clock.now());
        Ok(())
    }

    /// Builds a program from `vertex_path` and `fragment_path` and binds it.
    /// On failure the previously bound program stays in place.
    pub fn set_shader_program(&mut self, vertex_path: &Path, fragment_path: &Path) -> bool {
        let Some(gpu) = self.gpu.as_ref() else {
            log::warn!("no GPU context, cannot load shaders");
            return false;
        };
        log::info!(
            "loading shaders {} + {}",
            vertex_path.display(),
            fragment_path.display()
        );
        match self
            .program
            .replace_with(|| ShaderProgram::from_files(gpu, vertex_path, fragment_path))
        {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to build program: {err}");
                if let Some(program) = self.program.current() {
                    log::warn!("keeping program {}", program.id());
                }
                false
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        log::info!("new framebuffer size: {width}x{height}");
        self.width = width;
        self.height = height;
    }

    pub fn handle_key(&mut self, key: Key, pressed: bool) {
        match self.frame_loop.key_event(key, pressed) {
            Some(Action::LoadShader(slot)) => {
                let pair = SHADER_SLOTS[slot];
                self.set_shader_program(Path::new(pair.vertex), Path::new(pair.fragment));
            }
            Some(Action::Quit) => log::info!("{key} pressed, closing"),
            None => {}
        }
    }

    pub fn focus_lost(&mut self) {
        self.frame_loop.focus_lost();
    }

    pub fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// One iteration of the frame loop. Minimized windows skip rendering but
    /// keep the clock running.
    pub fn frame(&mut self) {
        if !self.frame_loop.is_running() || self.width == 0 || self.height == 0 {
            return;
        }

        let now = self.clock.now();
        if let Some(stats) = self.frame_loop.begin_frame(now) {
            if let Some(window) = &self.window {
                window.set_title(&title_with_stats(&stats));
            }
        }
        self.render();
        self.frame_loop.end_frame();
    }

    fn render(&mut self) {
        self.projection = projection(self.width, self.height);
        self.view = view();

        let (Some(gpu), Some(mesh)) = (self.gpu.as_mut(), self.mesh.as_mut()) else {
            return;
        };
        mesh.model = rotate_model(mesh.model, self.frame_loop.timer.time_delta);
        let model_view = self.view * mesh.model;

        gpu.resize(self.width, self.height);
        let Some((output, target)) = gpu.begin_frame() else {
            return;
        };
        gpu.begin_error_check();

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cube Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Cube Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            // Without a program the frame is just the clear color.
            if let Some(program) = self.program.current() {
                program.write_uniforms(
                    &gpu.queue,
                    &UniformValues {
                        projection: self.projection,
                        model_view,
                        time: self.frame_loop.timer.time_cur as f32,
                    },
                );
                program.bind(&mut pass);
                mesh.draw(&mut pass);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        gpu.end_error_check("display function");
        output.present();
    }

    pub fn report_summary(&self) {
        if self.window.is_none() {
            return;
        }
        let summary = self.frame_loop.summary();
        log::info!(
            "left main loop\n{} frames rendered in {:.3} seconds == {:.1}fps",
            summary.frames,
            summary.seconds,
            summary.avg_fps()
        );
    }

    /// Releases everything in reverse order of acquisition.
    pub fn destroy(&mut self) {
        let released = release_in_order(
            &mut self.mesh,
            &mut self.program,
            &mut self.gpu,
            &mut self.window,
        );
        for resource in released {
            log::info!("{} released", resource.label());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    Mesh,
    Program,
    Gpu,
    Window,
}

impl Resource {
    fn label(self) -> &'static str {
        match self {
            Self::Mesh => "cube mesh",
            Self::Program => "shader program",
            Self::Gpu => "GPU context",
            Self::Window => "window",
        }
    }
}

/// Drops whatever each slot holds: mesh and program first, then the GPU
/// context, then the window. Empty slots are skipped. Returns what was
/// released, in order.
fn release_in_order<M, P, G, W>(
    mesh: &mut Option<M>,
    program: &mut ProgramSlot<P>,
    gpu: &mut Option<G>,
    window: &mut Option<W>,
) -> Vec<Resource> {
    let mut released = Vec::new();
    if mesh.take().is_some() {
        released.push(Resource::Mesh);
    }
    if program.clear() {
        released.push(Resource::Program);
    }
    if gpu.take().is_some() {
        released.push(Resource::Gpu);
    }
    if window.take().is_some() {
        released.push(Resource::Window);
    }
    released
}

impl Drop for ApplicationState {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::frame_loop::LoopState;

    type DropLog = Rc<RefCell<Vec<&'static str>>>;

    struct Tracked {
        name: &'static str,
        log: DropLog,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    fn tracked(name: &'static str, log: &DropLog) -> Tracked {
        Tracked {
            name,
            log: Rc::clone(log),
        }
    }

    #[test]
    fn new_acquires_nothing() {
        let state = ApplicationState::new(PlatformConfig::default());
        assert!(!state.is_initialized());
        assert!(state.gpu.is_none());
        assert!(state.mesh.is_none());
        assert!(!state.program.is_bound());
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut state = ApplicationState::new(PlatformConfig::default());
        state.destroy();
        state.destroy();
        assert!(!state.is_initialized());
    }

    #[test]
    fn partial_initialization_releases_in_reverse_order() {
        let log = DropLog::default();
        // Failed after the GPU context came up but before the mesh was made,
        // with a program still bound from an earlier session.
        let mut mesh: Option<Tracked> = None;
        let mut program = ProgramSlot::empty();
        program
            .replace_with(|| Ok::<_, ()>(tracked("program", &log)))
            .unwrap();
        let mut gpu = Some(tracked("gpu", &log));
        let mut window = Some(tracked("window", &log));

        let released = release_in_order(&mut mesh, &mut program, &mut gpu, &mut window);
        assert_eq!(
            released,
            vec![Resource::Program, Resource::Gpu, Resource::Window]
        );
        assert_eq!(*log.borrow(), vec!["program", "gpu", "window"]);

        let again = release_in_order(&mut mesh, &mut program, &mut gpu, &mut window);
        assert!(again.is_empty());
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn mesh_goes_before_program() {
        let log = DropLog::default();
        let mut mesh = Some(tracked("mesh", &log));
        let mut program = ProgramSlot::empty();
        program
            .replace_with(|| Ok::<_, ()>(tracked("program", &log)))
            .unwrap();
        let mut gpu: Option<Tracked> = None;
        let mut window: Option<Tracked> = None;

        release_in_order(&mut mesh, &mut program, &mut gpu, &mut window);
        assert_eq!(*log.borrow(), vec!["mesh", "program"]);
    }

    #[test]
    fn shader_load_without_gpu_fails() {
        let mut state = ApplicationState::new(PlatformConfig::default());
        let pair = SHADER_SLOTS[1];
        assert!(!state.set_shader_program(Path::new(pair.vertex), Path::new(pair.fragment)));
        assert!(!state.program.is_bound());
    }

    #[test]
    fn resize_only_records_viewport() {
        let mut state = ApplicationState::new(PlatformConfig::default());
        state.resize(1024, 768);
        assert_eq!((state.width, state.height), (1024, 768));
        state.resize(0, 0);
        // Zero viewport: the frame is skipped and no time is counted.
        state.frame();
        assert_eq!(state.frame_loop.summary().frames, 0);
    }

    #[test]
    fn escape_closes_and_stops_frames() {
        let mut state = ApplicationState::new(PlatformConfig::default());
        state.handle_key(Key::Escape, true);
        assert_eq!(state.frame_loop.state(), LoopState::Closing);
        state.frame();
        assert_eq!(state.frame_loop.summary().frames, 0);
    }

    #[test]
    fn frames_count_without_gpu() {
        let mut state = ApplicationState::new(PlatformConfig::default());
        state.frame();
        state.frame();
        assert_eq!(state.frame_loop.summary().frames, 2);
    }
}
