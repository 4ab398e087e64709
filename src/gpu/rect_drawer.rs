use std::rc::Rc;

use crate::{
    filters::{program::FilterProgram, vertices::FilterTarget},
    foundation::{
        core::{Affine, Color, Rect},
        error::{WavyteError, WavyteResult},
    },
    gpu::{
        buffer::GlBuffer,
        context::Context,
        geometry_processor::{
            DefaultGeometryProcessor, GlDefaultGeometryProcessor, GlGeometryProcessor,
            GlProgramDataManager, ProgramDataManager,
        },
        gl::{check_gl_error, consts},
        shader_builder::{ProgramBuilder, UniformHandle},
    },
};

static QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

// x, y, coverage
const FLOATS_PER_VERTEX: usize = 3;

/// Fills axis-aligned rectangles with a solid color through the default geometry processor.
pub struct RectDrawer {
    program: Rc<FilterProgram>,
    index_buffer: Rc<GlBuffer>,
    gl_gp: GlDefaultGeometryProcessor,
    pdm: GlProgramDataManager,
    rt_adjust: UniformHandle,
    position_location: u32,
    coverage_location: u32,
}

impl RectDrawer {
    /// Build the program and acquire the shared quad index buffer.
    #[tracing::instrument(skip_all)]
    pub fn make(context: &Context) -> WavyteResult<Self> {
        let gp = DefaultGeometryProcessor::new(Color::default(), Affine::IDENTITY);
        let mut gl_gp = GlDefaultGeometryProcessor::default();
        let built = ProgramBuilder::build(&mut gl_gp, &gp);
        let program = FilterProgram::make(context, &built.vertex, &built.fragment)?;

        let f = &context.gl().functions;
        let attrib = |name: &str| {
            u32::try_from(f.get_attrib_location(program.program(), name))
                .map_err(|_| WavyteError::gpu(format!("attribute {name} not found")))
        };
        let position_location = attrib("aPosition")?;
        let coverage_location = attrib("inCoverage")?;
        let pdm = GlProgramDataManager::new(context.gl(), program.program(), &built.uniforms);
        let index_buffer = GlBuffer::make(context, Some(&QUAD_INDICES[..]), QUAD_INDICES.len())?;

        Ok(Self {
            program,
            index_buffer,
            gl_gp,
            pdm,
            rt_adjust: built.rt_adjust,
            position_location,
            coverage_location,
        })
    }

    /// Fill `rect`, mapped through `view_matrix`, into `target`.
    ///
    /// `rect` is in pixels with a top-left origin. Rectangles landing entirely outside the
    /// target are skipped without touching GL.
    pub fn draw(
        &mut self,
        context: &Context,
        target: &FilterTarget,
        rect: Rect,
        color: Color,
        view_matrix: Affine,
    ) -> WavyteResult<()> {
        let bounds = Rect::new(0.0, 0.0, f64::from(target.width), f64::from(target.height));
        let device = view_matrix.transform_rect_bbox(rect);
        if device.intersect(bounds).area() <= 0.0 {
            tracing::debug!(?rect, "rect outside target, skipped");
            return Ok(());
        }
        if self.program.program() == 0 {
            return Err(WavyteError::resource("rect drawer program was released"));
        }

        let gl = context.gl();
        let f = &gl.functions;
        f.use_program(self.program.program());
        f.disable(consts::SCISSOR_TEST);
        f.enable(consts::BLEND);
        f.blend_equation(consts::FUNC_ADD);
        f.blend_func(consts::ONE, consts::ONE_MINUS_SRC_ALPHA);
        f.bind_framebuffer(consts::FRAMEBUFFER, target.framebuffer_id);
        f.viewport(0, 0, target.width, target.height);

        self.pdm.set4f(
            self.rt_adjust,
            2.0 / target.width as f32,
            -1.0,
            -2.0 / target.height as f32,
            1.0,
        );
        self.gl_gp.set_data(
            &self.pdm,
            &DefaultGeometryProcessor::new(color, view_matrix),
        );

        let (l, t, r, b) = (rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32);
        let vertices = [l, t, 1.0, l, b, 1.0, r, t, 1.0, r, b, 1.0];
        let vertex_array = self.program.vertex_array();
        if vertex_array > 0 {
            f.bind_vertex_array(vertex_array);
        }
        f.bind_buffer(consts::ARRAY_BUFFER, self.program.vertex_buffer());
        f.buffer_data_f32(consts::ARRAY_BUFFER, &vertices, consts::STREAM_DRAW);
        let stride = (FLOATS_PER_VERTEX * size_of::<f32>()) as i32;
        f.vertex_attrib_pointer(self.position_location, 2, consts::FLOAT, false, stride, 0);
        f.enable_vertex_attrib_array(self.position_location);
        f.vertex_attrib_pointer(
            self.coverage_location,
            1,
            consts::FLOAT,
            false,
            stride,
            (2 * size_of::<f32>()) as i32,
        );
        f.enable_vertex_attrib_array(self.coverage_location);

        f.bind_buffer(consts::ELEMENT_ARRAY_BUFFER, self.index_buffer.buffer_id());
        f.draw_elements(
            consts::TRIANGLES,
            self.index_buffer.length() as i32,
            consts::UNSIGNED_SHORT,
            0,
        );
        if vertex_array > 0 {
            f.bind_vertex_array(0);
        }
        f.bind_buffer(consts::ARRAY_BUFFER, 0);
        f.bind_buffer(consts::ELEMENT_ARRAY_BUFFER, 0);

        if !check_gl_error(gl) {
            return Err(WavyteError::gpu("rect draw raised a gl error"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RectDrawer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RectDrawer")
            .field("program", &self.program)
            .field("index_buffer", &self.index_buffer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/rect_drawer.rs"]
mod tests;
