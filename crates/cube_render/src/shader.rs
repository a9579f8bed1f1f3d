//! Shader program construction.
//!
//! A program is built from one vertex and one fragment WGSL file:
//!
//!   1. both files are read into memory
//!   2. each stage is compiled on its own inside a validation error scope
//!   3. the uniforms declared by the compiled stages are merged into one bind
//!      group layout
//!   4. the stages are linked into a render pipeline, again inside an error scope
//!
//! Stage modules are transient. They are released as soon as the link attempt
//! finishes, whatever its outcome. Every GPU object created or released along
//! the way is logged with its id.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::Mat4;

use crate::error::ShaderError;
use crate::gpu_context::{GpuContext, DEPTH_FORMAT};
use crate::next_object_id;
use crate::reflect::{
    parse_module, reflect_uniforms, UniformDecl, UniformKind, UniformLayout, UniformLocation,
};
use crate::vertex::CubeVertex;

/// Upper bound for compiler/linker diagnostics kept in a `ShaderError`.
pub const MAX_INFO_LOG_LEN: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            Self::Vertex => "vs_main",
            Self::Fragment => "fs_main",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Cuts `log` down to `MAX_INFO_LOG_LEN` bytes on a char boundary.
pub fn truncate_info_log(mut log: String) -> String {
    if log.len() > MAX_INFO_LOG_LEN {
        let mut cut = MAX_INFO_LOG_LEN;
        while !log.is_char_boundary(cut) {
            cut -= 1;
        }
        log.truncate(cut);
    }
    log
}

/// Source text of both stages of a program.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex_path: PathBuf,
    pub vertex: String,
    pub fragment_path: PathBuf,
    pub fragment: String,
}

impl ShaderSources {
    pub fn load(vertex_path: &Path, fragment_path: &Path) -> Result<Self, ShaderError> {
        let vertex = read_source(vertex_path)?;
        let fragment = read_source(fragment_path)?;
        Ok(Self {
            vertex_path: vertex_path.to_path_buf(),
            vertex,
            fragment_path: fragment_path.to_path_buf(),
            fragment,
        })
    }

    pub fn source(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    pub fn path(&self, stage: ShaderStage) -> &Path {
        match stage {
            ShaderStage::Vertex => &self.vertex_path,
            ShaderStage::Fragment => &self.fragment_path,
        }
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    log::info!("loading shader file '{}'", path.display());
    fs::read_to_string(path).map_err(|source| {
        log::warn!("failed to open shader file '{}'", path.display());
        if source.kind() == io::ErrorKind::NotFound {
            ShaderError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ShaderError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Compiled stage, released (and logged) on drop.
struct StageModule {
    id: u32,
    stage: ShaderStage,
    module: wgpu::ShaderModule,
}

impl Drop for StageModule {
    fn drop(&mut self) {
        log::info!("destroying {} shader module {}", self.stage, self.id);
    }
}

fn compile_stage(
    device: &wgpu::Device,
    sources: &ShaderSources,
    stage: ShaderStage,
) -> Result<StageModule, ShaderError> {
    let id = next_object_id();
    let label = format!("{} ({})", sources.path(stage).display(), stage);
    log::info!("created {stage} shader module {id}");
    log::info!("compiling shader module {id}");

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(sources.source(stage).into()),
    });
    let module = StageModule { id, stage, module };

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        log::warn!("failed to compile {stage} shader module {id}");
        return Err(ShaderError::Compile {
            stage,
            log: truncate_info_log(err.to_string()),
        });
    }
    Ok(module)
}

/// Uniform declarations of a stage that already compiled.
fn stage_uniforms(
    sources: &ShaderSources,
    stage: ShaderStage,
) -> Result<Vec<UniformDecl>, ShaderError> {
    let module = parse_module(sources.source(stage)).map_err(|log| ShaderError::Compile {
        stage,
        log: truncate_info_log(log),
    })?;
    reflect_uniforms(&module).map_err(|log| {
        log::warn!("failed to link program: {log}");
        ShaderError::Link { log }
    })
}

/// Values fed to a program's uniforms for one draw.
#[derive(Debug, Clone, Copy)]
pub struct UniformValues {
    pub projection: Mat4,
    pub model_view: Mat4,
    /// Seconds since start.
    pub time: f32,
}

/// A linked vertex + fragment pipeline and the buffers behind its uniforms.
pub struct ShaderProgram {
    id: u32,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffers: Vec<(UniformKind, wgpu::Buffer)>,
    layout: UniformLayout,
}

impl ShaderProgram {
    pub fn from_files(
        gpu: &GpuContext,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self, ShaderError> {
        let sources = ShaderSources::load(vertex_path, fragment_path)?;
        Self::build(gpu, &sources)
    }

    pub fn build(gpu: &GpuContext, sources: &ShaderSources) -> Result<Self, ShaderError> {
        let device = &gpu.device;

        let vertex = compile_stage(device, sources, ShaderStage::Vertex)?;
        let fragment = compile_stage(device, sources, ShaderStage::Fragment)?;

        let vertex_decls = stage_uniforms(sources, ShaderStage::Vertex)?;
        let fragment_decls = stage_uniforms(sources, ShaderStage::Fragment)?;

        let layout = UniformLayout::resolve(&vertex_decls, &fragment_decls).map_err(|log| {
            log::warn!("failed to link program: {log}");
            ShaderError::Link { log }
        })?;

        let program = Self::link(gpu, &vertex, &fragment, layout);
        // The pipeline keeps what it needs; the stage modules go now.
        drop(vertex);
        drop(fragment);
        let program = program?;

        for kind in UniformKind::ALL {
            match program.location(kind) {
                Some(location) => log::info!(
                    "program {}: location for \"{}\" uniform: {}",
                    program.id,
                    kind.name(),
                    location
                ),
                None => log::info!(
                    "program {}: location for \"{}\" uniform: absent",
                    program.id,
                    kind.name()
                ),
            }
        }
        Ok(program)
    }

    fn link(
        gpu: &GpuContext,
        vertex: &StageModule,
        fragment: &StageModule,
        layout: UniformLayout,
    ) -> Result<Self, ShaderError> {
        let device = &gpu.device;
        let id = next_object_id();
        log::info!("created program {id}");

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = layout
            .bindings()
            .iter()
            .map(|b| wgpu::BindGroupLayoutEntry {
                binding: b.location.0,
                visibility: b.visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();

        log::info!("linking program {id}");
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Program Uniform Layout"),
            entries: &layout_entries,
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Program Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Program Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex.module,
                entry_point: Some(ShaderStage::Vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &[CubeVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment.module,
                entry_point: Some(ShaderStage::Fragment.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // No culling: the "cut" shader shows the cube's inside.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            log::warn!("failed to link program {id}");
            log::info!("deleting program {id}");
            return Err(ShaderError::Link {
                log: truncate_info_log(err.to_string()),
            });
        }

        let uniform_buffers: Vec<(UniformKind, wgpu::Buffer)> = layout
            .bindings()
            .iter()
            .map(|b| {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(b.kind.name()),
                    size: b.kind.buffer_size(),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                (b.kind, buffer)
            })
            .collect();
        let bind_group_entries: Vec<wgpu::BindGroupEntry> = layout
            .bindings()
            .iter()
            .zip(&uniform_buffers)
            .map(|(b, (_, buffer))| wgpu::BindGroupEntry {
                binding: b.location.0,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Program Uniforms"),
            layout: &bind_group_layout,
            entries: &bind_group_entries,
        });

        Ok(Self {
            id,
            pipeline,
            bind_group,
            uniform_buffers,
            layout,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Location of `kind`, or `None` when the program does not declare it.
    pub fn location(&self, kind: UniformKind) -> Option<UniformLocation> {
        self.layout.location(kind)
    }

    /// Uploads the uniforms this program declares. `cameraPosition` is
    /// resolved but left at its initial zero value.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, values: &UniformValues) {
        for (kind, buffer) in &self.uniform_buffers {
            match kind {
                UniformKind::Projection => queue.write_buffer(
                    buffer,
                    0,
                    bytemuck::cast_slice(&values.projection.to_cols_array()),
                ),
                UniformKind::ModelView => queue.write_buffer(
                    buffer,
                    0,
                    bytemuck::cast_slice(&values.model_view.to_cols_array()),
                ),
                UniformKind::Time => {
                    queue.write_buffer(buffer, 0, bytemuck::bytes_of(&values.time))
                }
                UniformKind::CameraPosition => {}
            }
        }
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        log::info!("deleting program {}", self.id);
        for (_, buffer) in &self.uniform_buffers {
            buffer.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "cube_shader_test_{}_{}_{}.wgsl",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn load_reads_both_stages() {
        let vs = temp_file_path("vs");
        let fs_path = temp_file_path("fs");
        fs::write(&vs, "// vertex").expect("failed to write temp vertex shader");
        fs::write(&fs_path, "// fragment").expect("failed to write temp fragment shader");

        let sources = ShaderSources::load(&vs, &fs_path).expect("sources should load");
        assert_eq!(sources.source(ShaderStage::Vertex), "// vertex");
        assert_eq!(sources.source(ShaderStage::Fragment), "// fragment");
        assert_eq!(sources.path(ShaderStage::Vertex), vs.as_path());

        let _ = fs::remove_file(vs);
        let _ = fs::remove_file(fs_path);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let vs = temp_file_path("present");
        fs::write(&vs, "// vertex").expect("failed to write temp vertex shader");
        let missing = temp_file_path("missing");

        match ShaderSources::load(&vs, &missing) {
            Err(ShaderError::FileNotFound { path }) => assert_eq!(path, missing),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
        let _ = fs::remove_file(vs);
    }

    #[test]
    fn unreadable_path_is_io_error() {
        // A directory exists but cannot be read as a file.
        let dir = std::env::temp_dir();
        match ShaderSources::load(&dir, &dir) {
            Err(ShaderError::Io { path, .. }) => assert_eq!(path, dir),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn short_logs_are_untouched() {
        assert_eq!(truncate_info_log("error: x".to_string()), "error: x");
    }

    #[test]
    fn oversized_logs_are_truncated_on_char_boundary() {
        let long = "é".repeat(MAX_INFO_LOG_LEN);
        let cut = truncate_info_log(long);
        assert!(cut.len() <= MAX_INFO_LOG_LEN);
        assert!(cut.len() >= MAX_INFO_LOG_LEN - 1);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    fn sources(vertex: &str, fragment: &str) -> ShaderSources {
        ShaderSources {
            vertex_path: PathBuf::from("test.vs.wgsl"),
            vertex: vertex.to_string(),
            fragment_path: PathBuf::from("test.fs.wgsl"),
            fragment: fragment.to_string(),
        }
    }

    #[test]
    fn stage_uniforms_follow_the_parsed_module() {
        let src = sources(
            "@group(0) @binding(2) var <uniform> time: f32;",
            "/* /* */ @group(0) @binding(3) var<uniform> cameraPosition: vec3<f32>; */",
        );
        let vs = stage_uniforms(&src, ShaderStage::Vertex).unwrap();
        assert_eq!(vs.len(), 1);
        assert_eq!((vs[0].name.as_str(), vs[0].binding), ("time", 2));
        assert!(stage_uniforms(&src, ShaderStage::Fragment).unwrap().is_empty());
    }

    #[test]
    fn malformed_stage_reports_the_compiler_diagnostic() {
        let src = sources("", "@fragment fn fs_main( -> @location(0) vec4<f32> {}");
        match stage_uniforms(&src, ShaderStage::Fragment) {
            Err(ShaderError::Compile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("error"), "{log}");
            }
            other => panic!("expected Compile error, got {other:?}"),
        }
    }

    #[test]
    fn stage_names_and_entry_points() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.entry_point(), "fs_main");
    }
}
