use std::rc::Rc;

use crate::{
    foundation::core::{Affine, Color, mat3_from_affine},
    gpu::{
        gl::{GlFunctions, GlInterface},
        shader_builder::{EmitArgs, ShaderFlags, ShaderVar, ShaderVarType, UniformHandle},
    },
};

/// Vertex layout and identity of a geometry stage.
pub(crate) trait GeometryProcessor {
    fn name(&self) -> &'static str;
    fn attributes(&self) -> &[ShaderVar];
}

/// GL-side half of a geometry stage: emits shader code once, then feeds uniforms per draw.
pub(crate) trait GlGeometryProcessor {
    type Processor: GeometryProcessor;

    fn emit_code(&mut self, gp: &Self::Processor, args: &mut EmitArgs<'_>);

    fn set_data(&mut self, pdm: &dyn ProgramDataManager, gp: &Self::Processor);
}

/// Sink for uniform values of a linked program.
pub(crate) trait ProgramDataManager {
    /// Upload a `vec4`.
    fn set4f(&self, handle: UniformHandle, x: f32, y: f32, z: f32, w: f32);
    /// Upload a `mat3` expanded from `matrix`.
    fn set_matrix(&self, handle: UniformHandle, matrix: Affine);
}

/// [`ProgramDataManager`] writing straight to GL. Locations are resolved once after link.
pub(crate) struct GlProgramDataManager {
    functions: Rc<dyn GlFunctions>,
    locations: Vec<i32>,
}

impl GlProgramDataManager {
    pub(crate) fn new(gl: &GlInterface, program: u32, uniform_names: &[String]) -> Self {
        let locations = uniform_names
            .iter()
            .map(|name| gl.functions.get_uniform_location(program, name))
            .collect();
        Self {
            functions: gl.functions.clone(),
            locations,
        }
    }

    fn location(&self, handle: UniformHandle) -> Option<i32> {
        self.locations.get(handle.0).copied().filter(|l| *l >= 0)
    }
}

impl ProgramDataManager for GlProgramDataManager {
    fn set4f(&self, handle: UniformHandle, x: f32, y: f32, z: f32, w: f32) {
        if let Some(location) = self.location(handle) {
            self.functions.uniform4f(location, x, y, z, w);
        }
    }

    fn set_matrix(&self, handle: UniformHandle, matrix: Affine) {
        if let Some(location) = self.location(handle) {
            self.functions
                .uniform_matrix3fv(location, &mat3_from_affine(matrix));
        }
    }
}

/// Transform + solid color + per-vertex coverage.
#[derive(Clone, Debug, PartialEq)]
pub struct DefaultGeometryProcessor {
    /// Premultiplied output color.
    pub color: Color,
    /// Maps `aPosition` into render-target pixels.
    pub view_matrix: Affine,
    // `aPosition`, `inCoverage`
    attributes: [ShaderVar; 2],
}

impl DefaultGeometryProcessor {
    /// A processor drawing `color` through `view_matrix`.
    pub fn new(color: Color, view_matrix: Affine) -> Self {
        Self {
            color,
            view_matrix,
            attributes: [
                ShaderVar::new("aPosition", ShaderVarType::Float2),
                ShaderVar::new("inCoverage", ShaderVarType::Float),
            ],
        }
    }

    fn position(&self) -> &ShaderVar {
        &self.attributes[0]
    }

    fn coverage(&self) -> &ShaderVar {
        &self.attributes[1]
    }
}

impl GeometryProcessor for DefaultGeometryProcessor {
    fn name(&self) -> &'static str {
        "DefaultGeometryProcessor"
    }

    fn attributes(&self) -> &[ShaderVar] {
        &self.attributes
    }
}

#[derive(Debug, Default)]
pub(crate) struct GlDefaultGeometryProcessor {
    matrix_uniform: Option<UniformHandle>,
    color_uniform: Option<UniformHandle>,
    // Last uploaded values; the program may be shared with other draws.
    color_prev: Option<Color>,
    view_matrix_prev: Option<Affine>,
}

impl GlGeometryProcessor for GlDefaultGeometryProcessor {
    type Processor = DefaultGeometryProcessor;

    fn emit_code(&mut self, gp: &DefaultGeometryProcessor, args: &mut EmitArgs<'_>) {
        args.varying_handler.emit_attributes(gp);

        let (matrix, matrix_name) = args.uniform_handler.add_uniform(
            ShaderFlags::VERTEX,
            ShaderVarType::Float3x3,
            "Matrix",
        );
        self.matrix_uniform = Some(matrix);
        let position = "position";
        args.vert_builder.code_append(&format!(
            "vec2 {position} = ({matrix_name} * vec3({}, 1.0)).xy;",
            gp.position().name()
        ));

        let coverage = args
            .varying_handler
            .add_varying("Coverage", ShaderVarType::Float);
        args.vert_builder
            .code_append(&format!("{} = {};", coverage.vs_out, gp.coverage().name()));
        args.frag_builder.code_append(&format!(
            "{} = vec4({});",
            args.output_coverage, coverage.fs_in
        ));

        let (color, color_name) = args.uniform_handler.add_uniform(
            ShaderFlags::FRAGMENT,
            ShaderVarType::Float4,
            "Color",
        );
        self.color_uniform = Some(color);
        args.frag_builder
            .code_append(&format!("{} = {color_name};", args.output_color));

        args.vert_builder.emit_normalized_position(position);
    }

    fn set_data(&mut self, pdm: &dyn ProgramDataManager, gp: &DefaultGeometryProcessor) {
        if let Some(handle) = self.color_uniform
            && self.color_prev != Some(gp.color)
        {
            self.color_prev = Some(gp.color);
            let [r, g, b, a] = gp.color.to_array();
            pdm.set4f(handle, r, g, b, a);
        }
        if let Some(handle) = self.matrix_uniform
            && self.view_matrix_prev != Some(gp.view_matrix)
        {
            self.view_matrix_prev = Some(gp.view_matrix);
            pdm.set_matrix(handle, gp.view_matrix);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/geometry_processor.rs"]
mod tests;
