use std::borrow::Cow;

use crate::{
    filters::{
        layer_filter::FilterHooks,
        variants::{bool_uniform, scaled_size, texel_units, uniform},
        vertices::compute_vertices_for_motion_blur_and_bulge,
    },
    foundation::core::{Point, Rect, Vec2},
    gpu::gl::GlInterface,
};

const FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
varying vec2 vertexColor;
uniform sampler2D sTexture;
uniform vec2 uStep;
uniform float uRepeatEdge;
vec4 tap(vec2 coord) {
    if (uRepeatEdge > 0.5) {
        return texture2D(sTexture, clamp(coord, 0.0, 1.0));
    }
    if (coord.x < 0.0 || coord.x > 1.0 || coord.y < 0.0 || coord.y > 1.0) {
        return vec4(0.0);
    }
    return texture2D(sTexture, coord);
}
void main() {
    float weights[5];
    weights[0] = 0.0545;
    weights[1] = 0.2442;
    weights[2] = 0.4026;
    weights[3] = 0.2442;
    weights[4] = 0.0545;
    vec4 color = vec4(0.0);
    for (int x = 0; x < 5; x++) {
        for (int y = 0; y < 5; y++) {
            vec2 offset = vec2(float(x - 2), float(y - 2)) * uStep;
            color += tap(vertexColor + offset) * weights[x] * weights[y];
        }
    }
    gl_FragColor = color;
}
"#;

/// Axes the blur runs along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurDimensions {
    /// Both axes.
    #[default]
    Both,
    /// X only.
    Horizontal,
    /// Y only.
    Vertical,
}

/// Fast blur settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GaussBlurParams {
    /// Blur radius in content pixels.
    pub blurriness: f64,
    /// Axes to blur.
    pub blur_dimensions: BlurDimensions,
    /// Clamp samples at the edge instead of fading to transparent.
    pub repeat_edge_pixels: bool,
}

impl Default for GaussBlurParams {
    fn default() -> Self {
        Self {
            blurriness: 10.0,
            blur_dimensions: BlurDimensions::Both,
            repeat_edge_pixels: false,
        }
    }
}

/// Single-pass 5x5 Gaussian blur backing the fast blur effect.
#[derive(Debug)]
pub struct GaussBlurFilter {
    params: GaussBlurParams,
    step: i32,
    repeat_edge: i32,
}

impl GaussBlurFilter {
    pub(crate) fn new(params: GaussBlurParams) -> Self {
        Self {
            params,
            step: -1,
            repeat_edge: -1,
        }
    }
}

impl FilterHooks for GaussBlurFilter {
    fn name(&self) -> &'static str {
        "GaussBlur"
    }

    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    fn prepare_program(&mut self, gl: &GlInterface, program: u32) {
        self.step = uniform(gl, program, "uStep");
        self.repeat_edge = uniform(gl, program, "uRepeatEdge");
    }

    fn update_params(&self, gl: &GlInterface, content_bounds: Rect, filter_scale: Vec2) {
        let reach = self.params.blurriness.max(0.0) / 2.0;
        let (rx, ry) = match self.params.blur_dimensions {
            BlurDimensions::Both => (reach, reach),
            BlurDimensions::Horizontal => (reach, 0.0),
            BlurDimensions::Vertical => (0.0, reach),
        };
        let [sx, sy] = texel_units(
            Vec2::new(rx * filter_scale.x, ry * filter_scale.y),
            scaled_size(content_bounds, filter_scale),
        );
        let f = &gl.functions;
        f.uniform2f(self.step, sx, sy);
        f.uniform1f(
            self.repeat_edge,
            bool_uniform(self.params.repeat_edge_pixels),
        );
    }

    // The blur bleeds past the content unless edges repeat.
    fn compute_vertices(&self, content: Rect, transformed: Rect, _scale: Vec2) -> [Point; 8] {
        compute_vertices_for_motion_blur_and_bulge(content, transformed)
    }
}
