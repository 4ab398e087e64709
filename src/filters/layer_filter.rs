use std::{borrow::Cow, rc::Rc};

use crate::{
    filters::{
        descriptor::{Effect, EffectType, LayerStyle, LayerStyleType},
        program::FilterProgram,
        variants::{
            bulge::BulgeFilter, corner_pin::CornerPinFilter,
            displacement_map::DisplacementMapFilter, drop_shadow::DropShadowFilter,
            gauss_blur::GaussBlurFilter, glow::GlowFilter,
            levels_individual::LevelsIndividualFilter, mosaic::MosaicFilter,
            motion_tile::MotionTileFilter, radial_blur::RadialBlurFilter,
        },
        vertices::{FilterSource, FilterTarget, compute_vertices, to_gl_vertices},
    },
    foundation::{
        core::{FrameIndex, Point, Rect, Vec2},
        error::{WavyteError, WavyteResult},
    },
    gpu::{
        context::Context,
        gl::{GlInterface, active_texture, check_gl_error, consts},
    },
};

/// Pass-through vertex stage shared by every filter.
pub const VERTEX_SHADER: &str = r#"#version 100
attribute vec2 aPosition;
attribute vec2 aTextureCoord;
uniform mat3 uVertexMatrix;
uniform mat3 uTextureMatrix;
varying vec2 vertexColor;
void main() {
    vec3 position = uVertexMatrix * vec3(aPosition, 1.0);
    gl_Position = vec4(position.xy, 0.0, 1.0);
    vec3 colorPosition = uTextureMatrix * vec3(aTextureCoord, 1.0);
    vertexColor = colorPosition.xy;
}
"#;

/// Fragment stage that copies the source texture.
pub const FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
varying vec2 vertexColor;
uniform sampler2D sTexture;
void main() {
    gl_FragColor = texture2D(sTexture, vertexColor);
}
"#;

/// Per-variant behaviour plugged into a [`LayerFilter`].
///
/// Every method but [`FilterHooks::name`] has a default matching a plain texture copy.
pub trait FilterHooks {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Vertex shader source. Must keep the attribute and matrix names of [`VERTEX_SHADER`].
    fn vertex_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(VERTEX_SHADER)
    }

    /// Fragment shader source. Reads `vertexColor` and samples `sTexture`.
    ///
    /// May be generated per instance; filters producing identical text share one program.
    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    /// Resolve variant uniforms after link.
    fn prepare_program(&mut self, _gl: &GlInterface, _program: u32) {}

    /// Upload variant uniforms before each draw. The program is current.
    fn update_params(&self, _gl: &GlInterface, _content_bounds: Rect, _filter_scale: Vec2) {}

    /// Quad geometry, see [`compute_vertices`].
    fn compute_vertices(&self, content: Rect, transformed: Rect, scale: Vec2) -> [Point; 8] {
        compute_vertices(content, transformed, scale)
    }

    /// Whether the draw should run with multisampling enabled.
    fn needs_msaa(&self) -> bool {
        false
    }

    /// Secondary texture for variants that read one.
    fn set_map_source(&mut self, _source: Option<FilterSource>) {}
}

/// Lifecycle of a [`LayerFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterPhase {
    /// No usable program.
    #[default]
    Uninitialized,
    /// Program ready, no bounds recorded since.
    Initialized,
    /// Bounds recorded for the next draw.
    Updated,
    /// Last draw was issued.
    Drawn,
}

#[derive(Clone, Copy, Debug)]
struct BaseLocations {
    position: u32,
    texture_coord: u32,
    vertex_matrix: i32,
    texture_matrix: i32,
}

/// A filter variant plus the program, bounds and draw protocol shared by all variants.
pub struct LayerFilter {
    hooks: Box<dyn FilterHooks>,
    program: Option<Rc<FilterProgram>>,
    locations: Option<BaseLocations>,
    phase: FilterPhase,
    frame: FrameIndex,
    content_bounds: Rect,
    transformed_bounds: Rect,
    filter_scale: Vec2,
}

impl LayerFilter {
    /// Wrap custom hooks.
    pub fn new(hooks: Box<dyn FilterHooks>) -> Self {
        Self {
            hooks,
            program: None,
            locations: None,
            phase: FilterPhase::Uninitialized,
            frame: FrameIndex::default(),
            content_bounds: Rect::ZERO,
            transformed_bounds: Rect::ZERO,
            filter_scale: Vec2::new(1.0, 1.0),
        }
    }

    /// The filter implementing `effect`, or `None` for kinds without a GPU filter.
    pub fn from_effect(effect: &Effect) -> Option<Self> {
        let hooks: Box<dyn FilterHooks> = match effect.effect_type() {
            EffectType::CornerPin => Box::new(CornerPinFilter::new(effect.params_or_default())),
            EffectType::Bulge => Box::new(BulgeFilter::new(effect.params_or_default())),
            EffectType::MotionTile => Box::new(MotionTileFilter::new(effect.params_or_default())),
            EffectType::Glow => Box::new(GlowFilter::new(effect.params_or_default())),
            EffectType::LevelsIndividual => {
                Box::new(LevelsIndividualFilter::new(effect.params_or_default()))
            }
            EffectType::FastBlur => Box::new(GaussBlurFilter::new(effect.params_or_default())),
            EffectType::DisplacementMap => {
                Box::new(DisplacementMapFilter::new(effect.params_or_default()))
            }
            EffectType::RadialBlur => Box::new(RadialBlurFilter::new(effect.params_or_default())),
            EffectType::Mosaic => Box::new(MosaicFilter::new(effect.params_or_default())),
            kind @ (EffectType::BrightnessContrast
            | EffectType::HueSaturation
            | EffectType::Unknown) => {
                tracing::debug!(?kind, "no gpu filter for effect");
                return None;
            }
        };
        Some(Self::new(hooks))
    }

    /// The filter implementing `style`, or `None` for kinds without a GPU filter.
    pub fn from_layer_style(style: &LayerStyle) -> Option<Self> {
        let hooks: Box<dyn FilterHooks> = match style.style_type() {
            LayerStyleType::DropShadow => {
                Box::new(DropShadowFilter::new(style.params_or_default()))
            }
            kind @ (LayerStyleType::Stroke
            | LayerStyleType::OuterGlow
            | LayerStyleType::GradientOverlay
            | LayerStyleType::Unknown) => {
                tracing::debug!(?kind, "no gpu filter for layer style");
                return None;
            }
        };
        Some(Self::new(hooks))
    }

    /// Variant name.
    pub fn name(&self) -> &'static str {
        self.hooks.name()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    /// Frame recorded by the last [`LayerFilter::update`].
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Whether the variant draws with multisampling.
    pub fn needs_msaa(&self) -> bool {
        self.hooks.needs_msaa()
    }

    /// Forward a secondary texture to the variant.
    pub fn set_map_source(&mut self, source: Option<FilterSource>) {
        self.hooks.set_map_source(source);
    }

    /// Compile the program and resolve locations.
    ///
    /// On failure the filter holds no program and stays [`FilterPhase::Uninitialized`]; calling
    /// again retries from scratch.
    #[tracing::instrument(skip_all, fields(filter = self.hooks.name()))]
    pub fn initialize(&mut self, context: &Context) -> WavyteResult<()> {
        let gl = context.gl();
        // Stale errors from earlier work would fail the check below.
        check_gl_error(gl);
        self.program = None;
        self.locations = None;
        self.phase = FilterPhase::Uninitialized;

        let program = FilterProgram::make_shared(
            context,
            &self.hooks.vertex_shader(),
            &self.hooks.fragment_shader(),
        )?;
        let id = program.program();
        let f = &gl.functions;
        let position = f.get_attrib_location(id, "aPosition");
        let texture_coord = f.get_attrib_location(id, "aTextureCoord");
        let vertex_matrix = f.get_uniform_location(id, "uVertexMatrix");
        let texture_matrix = f.get_uniform_location(id, "uTextureMatrix");
        self.hooks.prepare_program(gl, id);
        if !check_gl_error(gl) {
            return Err(WavyteError::gpu("gl error while preparing filter program"));
        }
        let (Ok(position), Ok(texture_coord)) =
            (u32::try_from(position), u32::try_from(texture_coord))
        else {
            return Err(WavyteError::gpu(
                "filter program lacks aPosition or aTextureCoord",
            ));
        };

        self.program = Some(program);
        self.locations = Some(BaseLocations {
            position,
            texture_coord,
            vertex_matrix,
            texture_matrix,
        });
        self.phase = FilterPhase::Initialized;
        tracing::debug!(program = id, "filter initialized");
        Ok(())
    }

    /// Record the bounds and scale used by the next draw.
    pub fn update(
        &mut self,
        frame: FrameIndex,
        content_bounds: Rect,
        transformed_bounds: Rect,
        filter_scale: Vec2,
    ) {
        self.frame = frame;
        self.content_bounds = content_bounds;
        self.transformed_bounds = transformed_bounds;
        self.filter_scale = filter_scale;
        if self.phase != FilterPhase::Uninitialized {
            self.phase = FilterPhase::Updated;
        }
    }

    /// Render `source` into `target` with the recorded bounds.
    ///
    /// Never fails: with a missing source, target or program nothing reaches GL and the problem
    /// is logged.
    pub fn draw(
        &mut self,
        context: &Context,
        source: Option<&FilterSource>,
        target: Option<&FilterTarget>,
    ) {
        let (Some(source), Some(target), Some(program), Some(locations)) =
            (source, target, self.program.as_ref(), self.locations)
        else {
            tracing::error!(
                filter = self.hooks.name(),
                "can not draw filter: source, target or program is missing"
            );
            return;
        };
        if program.program() == 0 {
            tracing::error!(
                filter = self.hooks.name(),
                "can not draw filter: program released"
            );
            return;
        }
        if source.width <= 0 || source.height <= 0 || target.width <= 0 || target.height <= 0 {
            tracing::error!(
                filter = self.hooks.name(),
                ?source,
                ?target,
                "can not draw filter: empty source or target"
            );
            return;
        }

        let gl = context.gl();
        let f = &gl.functions;
        let msaa = self.hooks.needs_msaa() && gl.caps.multisample_disable_support;
        if msaa {
            f.enable(consts::MULTISAMPLE);
        }
        f.use_program(program.program());
        f.disable(consts::SCISSOR_TEST);
        f.enable(consts::BLEND);
        f.blend_equation(consts::FUNC_ADD);
        f.blend_func(consts::ONE, consts::ONE_MINUS_SRC_ALPHA);
        f.bind_framebuffer(consts::FRAMEBUFFER, target.framebuffer_id);
        f.viewport(0, 0, target.width, target.height);

        active_texture(gl, consts::TEXTURE0, consts::TEXTURE_2D, source.texture_id);
        f.uniform_matrix3fv(locations.vertex_matrix, &target.vertex_matrix);
        f.uniform_matrix3fv(locations.texture_matrix, &source.texture_matrix);
        self.hooks
            .update_params(gl, self.content_bounds, self.filter_scale);
        let points = self.hooks.compute_vertices(
            self.content_bounds,
            self.transformed_bounds,
            self.filter_scale,
        );
        let vertices = to_gl_vertices(target, source, self.content_bounds, &points);
        bind_vertices(gl, program, locations, &vertices);
        f.draw_arrays(consts::TRIANGLE_STRIP, 0, 4);
        if program.vertex_array() > 0 {
            f.bind_vertex_array(0);
        }
        if msaa {
            f.disable(consts::MULTISAMPLE);
        }
        check_gl_error(gl);
        self.phase = FilterPhase::Drawn;
    }
}

const VERTEX_STRIDE: i32 = (4 * size_of::<f32>()) as i32;

fn bind_vertices(
    gl: &GlInterface,
    program: &FilterProgram,
    locations: BaseLocations,
    vertices: &[f32; 16],
) {
    let f = &gl.functions;
    if program.vertex_array() > 0 {
        f.bind_vertex_array(program.vertex_array());
    }
    f.bind_buffer(consts::ARRAY_BUFFER, program.vertex_buffer());
    f.buffer_data_f32(consts::ARRAY_BUFFER, vertices, consts::STREAM_DRAW);
    f.vertex_attrib_pointer(
        locations.position,
        2,
        consts::FLOAT,
        false,
        VERTEX_STRIDE,
        0,
    );
    f.enable_vertex_attrib_array(locations.position);
    f.vertex_attrib_pointer(
        locations.texture_coord,
        2,
        consts::FLOAT,
        false,
        VERTEX_STRIDE,
        (2 * size_of::<f32>()) as i32,
    );
    f.enable_vertex_attrib_array(locations.texture_coord);
    f.bind_buffer(consts::ARRAY_BUFFER, 0);
}

impl std::fmt::Debug for LayerFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerFilter")
            .field("name", &self.hooks.name())
            .field("phase", &self.phase)
            .field("frame", &self.frame)
            .field("content_bounds", &self.content_bounds)
            .field("transformed_bounds", &self.transformed_bounds)
            .field("filter_scale", &self.filter_scale)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/layer_filter.rs"]
mod tests;
