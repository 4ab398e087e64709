//! GLSL ES 1.00 source assembly for geometry-processor programs.
//!
//! A [`ProgramBuilder`] owns one builder per stage plus the uniform and varying registries, hands
//! them to a [`GlGeometryProcessor`] through [`EmitArgs`], and stitches the declarations and
//! bodies into complete vertex and fragment sources.

use std::fmt::Write as _;

use smallvec::SmallVec;

use crate::gpu::geometry_processor::{GeometryProcessor, GlGeometryProcessor};

/// GLSL type of a shader variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderVarType {
    /// `float`
    Float,
    /// `vec2`
    Float2,
    /// `vec4`
    Float4,
    /// `mat3`
    Float3x3,
}

impl ShaderVarType {
    /// GLSL spelling.
    pub fn glsl(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Float2 => "vec2",
            Self::Float4 => "vec4",
            Self::Float3x3 => "mat3",
        }
    }
}

/// A named, typed shader variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderVar {
    name: String,
    ty: ShaderVarType,
}

impl ShaderVar {
    /// A variable named `name`.
    pub fn new(name: impl Into<String>, ty: ShaderVarType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Variable name as written in source.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn declaration(&self, qualifier: &str) -> String {
        format!("{qualifier} {} {};", self.ty.glsl(), self.name)
    }
}

/// Shader stages a uniform is visible in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderFlags {
    /// Declared in the vertex shader.
    pub vertex: bool,
    /// Declared in the fragment shader.
    pub fragment: bool,
}

impl ShaderFlags {
    /// Vertex stage only.
    pub const VERTEX: Self = Self {
        vertex: true,
        fragment: false,
    };
    /// Fragment stage only.
    pub const FRAGMENT: Self = Self {
        vertex: false,
        fragment: true,
    };
}

/// Index of a uniform within its [`UniformHandler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformHandle(pub(crate) usize);

#[derive(Debug, Default)]
pub(crate) struct UniformHandler {
    uniforms: Vec<(ShaderFlags, ShaderVar)>,
}

impl UniformHandler {
    /// Register a uniform and return its handle and mangled source name.
    ///
    /// Names are prefixed with `u`; a repeated name gets a numeric suffix.
    pub(crate) fn add_uniform(
        &mut self,
        visibility: ShaderFlags,
        ty: ShaderVarType,
        name: &str,
    ) -> (UniformHandle, String) {
        let base = format!("u{name}");
        let mut mangled = base.clone();
        let mut suffix = 0;
        while self.uniforms.iter().any(|(_, v)| v.name == mangled) {
            suffix += 1;
            mangled = format!("{base}_{suffix}");
        }
        let handle = UniformHandle(self.uniforms.len());
        self.uniforms
            .push((visibility, ShaderVar::new(mangled.clone(), ty)));
        (handle, mangled)
    }

    fn declarations(&self, fragment: bool) -> String {
        let mut out = String::new();
        for (flags, var) in &self.uniforms {
            let visible = if fragment {
                flags.fragment
            } else {
                flags.vertex
            };
            if visible {
                out.push_str(&var.declaration("uniform"));
                out.push('\n');
            }
        }
        out
    }

    fn into_names(self) -> Vec<String> {
        self.uniforms.into_iter().map(|(_, v)| v.name).collect()
    }
}

/// Source names of one varying on either side of the rasterizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Varying {
    /// Name written by the vertex shader.
    pub vs_out: String,
    /// Name read by the fragment shader.
    pub fs_in: String,
}

#[derive(Debug, Default)]
pub(crate) struct VaryingHandler {
    attributes: SmallVec<[ShaderVar; 4]>,
    varyings: SmallVec<[ShaderVar; 4]>,
}

impl VaryingHandler {
    /// Declare every vertex attribute of `gp`.
    pub(crate) fn emit_attributes(&mut self, gp: &dyn GeometryProcessor) {
        for attribute in gp.attributes() {
            if !self.attributes.iter().any(|a| a.name == attribute.name) {
                self.attributes.push(attribute.clone());
            }
        }
    }

    pub(crate) fn add_varying(&mut self, name: &str, ty: ShaderVarType) -> Varying {
        let name = format!("v{name}");
        self.varyings.push(ShaderVar::new(name.clone(), ty));
        Varying {
            vs_out: name.clone(),
            fs_in: name,
        }
    }

    fn attribute_declarations(&self) -> String {
        let mut out = String::new();
        for attribute in &self.attributes {
            out.push_str(&attribute.declaration("attribute"));
            out.push('\n');
        }
        out
    }

    fn varying_declarations(&self) -> String {
        let mut out = String::new();
        for varying in &self.varyings {
            out.push_str(&varying.declaration("varying"));
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Default)]
pub(crate) struct ShaderBuilder {
    code: String,
}

impl ShaderBuilder {
    /// Append one statement to `main`.
    pub(crate) fn code_append(&mut self, code: &str) {
        self.code.push_str("    ");
        self.code.push_str(code);
        self.code.push('\n');
    }

    fn code(&self) -> &str {
        &self.code
    }
}

#[derive(Debug)]
pub(crate) struct VertexShaderBuilder {
    builder: ShaderBuilder,
    rt_adjust_name: String,
}

impl VertexShaderBuilder {
    fn new(rt_adjust_name: String) -> Self {
        Self {
            builder: ShaderBuilder::default(),
            rt_adjust_name,
        }
    }

    pub(crate) fn code_append(&mut self, code: &str) {
        self.builder.code_append(code);
    }

    /// Map the pixel-space `vec2` named `position` into clip space.
    pub(crate) fn emit_normalized_position(&mut self, position: &str) {
        let rt = &self.rt_adjust_name;
        self.builder.code_append(&format!(
            "gl_Position = vec4({position} * {rt}.xz + {rt}.yw, 0.0, 1.0);"
        ));
    }
}

/// Everything a [`GlGeometryProcessor`] needs to emit its code.
pub(crate) struct EmitArgs<'a> {
    pub(crate) vert_builder: &'a mut VertexShaderBuilder,
    pub(crate) frag_builder: &'a mut ShaderBuilder,
    pub(crate) varying_handler: &'a mut VaryingHandler,
    pub(crate) uniform_handler: &'a mut UniformHandler,
    pub(crate) output_color: &'a str,
    pub(crate) output_coverage: &'a str,
}

/// Complete program sources plus the uniform names in [`UniformHandle`] order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltProgram {
    /// Vertex shader source.
    pub vertex: String,
    /// Fragment shader source.
    pub fragment: String,
    /// Uniform source names, indexed by [`UniformHandle`].
    pub uniforms: Vec<String>,
    /// Handle of the render-target adjust uniform.
    pub rt_adjust: UniformHandle,
}

const OUTPUT_COLOR: &str = "outputColor";
const OUTPUT_COVERAGE: &str = "outputCoverage";

pub(crate) struct ProgramBuilder;

impl ProgramBuilder {
    /// Run `gl_gp`'s emission for `gp` and assemble both stages.
    #[tracing::instrument(skip_all, fields(gp = gp.name()))]
    pub(crate) fn build<G: GlGeometryProcessor>(gl_gp: &mut G, gp: &G::Processor) -> BuiltProgram {
        let mut uniform_handler = UniformHandler::default();
        let (rt_adjust, rt_adjust_name) =
            uniform_handler.add_uniform(ShaderFlags::VERTEX, ShaderVarType::Float4, "RTAdjust");
        let mut varying_handler = VaryingHandler::default();
        let mut vert_builder = VertexShaderBuilder::new(rt_adjust_name);
        let mut frag_builder = ShaderBuilder::default();
        frag_builder.code_append(&format!("vec4 {OUTPUT_COLOR};"));
        frag_builder.code_append(&format!("vec4 {OUTPUT_COVERAGE};"));

        gl_gp.emit_code(
            gp,
            &mut EmitArgs {
                vert_builder: &mut vert_builder,
                frag_builder: &mut frag_builder,
                varying_handler: &mut varying_handler,
                uniform_handler: &mut uniform_handler,
                output_color: OUTPUT_COLOR,
                output_coverage: OUTPUT_COVERAGE,
            },
        );
        frag_builder.code_append(&format!(
            "gl_FragColor = {OUTPUT_COLOR} * {OUTPUT_COVERAGE};"
        ));

        let mut vertex = String::from("#version 100\n\n");
        vertex.push_str(&varying_handler.attribute_declarations());
        vertex.push_str(&uniform_handler.declarations(false));
        vertex.push_str(&varying_handler.varying_declarations());
        let _ = write!(
            vertex,
            "\nvoid main() {{\n{}}}\n",
            vert_builder.builder.code()
        );

        let mut fragment = String::from("#version 100\n\nprecision mediump float;\n");
        fragment.push_str(&uniform_handler.declarations(true));
        fragment.push_str(&varying_handler.varying_declarations());
        let _ = write!(fragment, "\nvoid main() {{\n{}}}\n", frag_builder.code());

        BuiltProgram {
            vertex,
            fragment,
            uniforms: uniform_handler.into_names(),
            rt_adjust,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/shader_builder.rs"]
mod tests;
