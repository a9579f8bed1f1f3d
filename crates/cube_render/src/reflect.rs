//! Uniform discovery for WGSL shader stages.
//!
//! Shaders declare each uniform the frame loop feeds as its own binding in
//! group 0:
//!
//! ```wgsl
//! @group(0) @binding(0) var<uniform> projection: mat4x4<f32>;
//! @group(0) @binding(1) var<uniform> modelView: mat4x4<f32>;
//! ```
//!
//! Declarations are read from the module naga builds out of the source, so
//! they see exactly what the shader compiler sees. The binding index is the
//! uniform's location. A uniform a program does not declare resolves to
//! `None` and is never written.

use std::collections::HashMap;
use std::fmt;

use wgpu::naga;

/// Uniforms the renderer knows how to supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Projection,
    ModelView,
    Time,
    CameraPosition,
}

impl UniformKind {
    pub const ALL: [UniformKind; 4] = [
        UniformKind::Projection,
        UniformKind::ModelView,
        UniformKind::Time,
        UniformKind::CameraPosition,
    ];

    /// Identifier used in shader source.
    pub fn name(self) -> &'static str {
        match self {
            Self::Projection => "projection",
            Self::ModelView => "modelView",
            Self::Time => "time",
            Self::CameraPosition => "cameraPosition",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn accepts_type(self, ty: &str) -> bool {
        match self {
            Self::Projection | Self::ModelView => ty == "mat4x4<f32>",
            Self::Time => ty == "f32",
            Self::CameraPosition => matches!(ty, "vec3<f32>" | "vec4<f32>"),
        }
    }

    fn expected_type(self) -> &'static str {
        match self {
            Self::Projection | Self::ModelView => "mat4x4<f32>",
            Self::Time => "f32",
            Self::CameraPosition => "vec3<f32> or vec4<f32>",
        }
    }

    /// Size of the backing uniform buffer in bytes.
    pub fn buffer_size(self) -> u64 {
        match self {
            Self::Projection | Self::ModelView => 64,
            Self::Time | Self::CameraPosition => 16,
        }
    }
}

/// Binding index of a uniform inside bind group 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

impl fmt::Display for UniformLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One `var<uniform>` declaration found in a shader stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    /// Canonical WGSL spelling of the type, e.g. `mat4x4<f32>`.
    pub ty: String,
}

/// Parses WGSL into a naga module. Errors carry the compiler's annotated
/// diagnostic.
pub fn parse_module(source: &str) -> Result<naga::Module, String> {
    naga::front::wgsl::parse_str(source).map_err(|err| err.emit_to_string(source))
}

/// Lists the uniform declarations of `module`, in source order.
pub fn reflect_uniforms(module: &naga::Module) -> Result<Vec<UniformDecl>, String> {
    let mut decls = Vec::new();
    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        let name = var.name.clone().unwrap_or_default();
        let binding = var
            .binding
            .as_ref()
            .ok_or_else(|| format!("uniform '{name}' has no @group/@binding attributes"))?;
        decls.push(UniformDecl {
            name,
            group: binding.group,
            binding: binding.binding,
            ty: type_name(module, var.ty),
        });
    }
    Ok(decls)
}

fn type_name(module: &naga::Module, ty: naga::Handle<naga::Type>) -> String {
    let ty = &module.types[ty];
    match ty.inner {
        naga::TypeInner::Scalar(scalar) => scalar_name(scalar),
        naga::TypeInner::Vector { size, scalar } => {
            format!("vec{}<{}>", size as u8, scalar_name(scalar))
        }
        naga::TypeInner::Matrix {
            columns,
            rows,
            scalar,
        } => format!(
            "mat{}x{}<{}>",
            columns as u8,
            rows as u8,
            scalar_name(scalar)
        ),
        _ => ty.name.clone().unwrap_or_else(|| format!("{:?}", ty.inner)),
    }
}

fn scalar_name(scalar: naga::Scalar) -> String {
    use naga::ScalarKind;
    match (scalar.kind, scalar.width) {
        (ScalarKind::Float, 2) => "f16".to_string(),
        (ScalarKind::Float, 4) => "f32".to_string(),
        (ScalarKind::Float, 8) => "f64".to_string(),
        (ScalarKind::Sint, 4) => "i32".to_string(),
        (ScalarKind::Uint, 4) => "u32".to_string(),
        (ScalarKind::Bool, _) => "bool".to_string(),
        (kind, width) => format!("{kind:?}{}", u32::from(width) * 8),
    }
}

/// A resolved uniform and the stages that read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformBinding {
    pub kind: UniformKind,
    pub location: UniformLocation,
    pub visibility: wgpu::ShaderStages,
}

/// Uniform interface of a linked program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformLayout {
    bindings: Vec<UniformBinding>,
}

impl UniformLayout {
    /// Merges the declarations of both stages.
    ///
    /// Errors describe the mismatch in the style of a linker log.
    pub fn resolve(vertex: &[UniformDecl], fragment: &[UniformDecl]) -> Result<Self, String> {
        let mut bindings: Vec<UniformBinding> = Vec::new();
        let mut types: HashMap<UniformKind, &str> = HashMap::new();

        let stages = [
            (wgpu::ShaderStages::VERTEX, vertex),
            (wgpu::ShaderStages::FRAGMENT, fragment),
        ];
        for (stage, decls) in stages {
            for decl in decls {
                if decl.group != 0 {
                    return Err(format!(
                        "uniform '{}' is in group {}, only group 0 is supported",
                        decl.name, decl.group
                    ));
                }
                let kind = UniformKind::from_name(&decl.name)
                    .ok_or_else(|| format!("unsupported uniform '{}'", decl.name))?;
                if !kind.accepts_type(&decl.ty) {
                    return Err(format!(
                        "uniform '{}' has type {}, expected {}",
                        decl.name,
                        decl.ty,
                        kind.expected_type()
                    ));
                }
                let location = UniformLocation(decl.binding);

                if let Some(existing) = bindings.iter_mut().find(|b| b.kind == kind) {
                    if existing.location != location || types.get(&kind) != Some(&decl.ty.as_str()) {
                        return Err(format!(
                            "uniform '{}' is declared differently in the vertex and fragment stages",
                            decl.name
                        ));
                    }
                    existing.visibility |= stage;
                    continue;
                }
                if let Some(other) = bindings.iter().find(|b| b.location == location) {
                    return Err(format!(
                        "uniforms '{}' and '{}' both use binding {}",
                        other.kind.name(),
                        decl.name,
                        location
                    ));
                }

                types.insert(kind, decl.ty.as_str());
                bindings.push(UniformBinding {
                    kind,
                    location,
                    visibility: stage,
                });
            }
        }

        bindings.sort_by_key(|b| b.location.0);
        Ok(Self { bindings })
    }

    pub fn location(&self, kind: UniformKind) -> Option<UniformLocation> {
        self.bindings
            .iter()
            .find(|b| b.kind == kind)
            .map(|b| b.location)
    }

    pub fn bindings(&self) -> &[UniformBinding] {
        &self.bindings
    }
}
