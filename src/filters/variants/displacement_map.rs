use std::borrow::Cow;

use crate::{
    filters::{
        layer_filter::FilterHooks,
        variants::{bool_uniform, scaled_size, texel_units, uniform},
        vertices::FilterSource,
    },
    foundation::core::{Rect, Vec2},
    gpu::gl::{GlInterface, active_texture, consts},
};

const FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
varying vec2 vertexColor;
uniform sampler2D sTexture;
uniform sampler2D uMapTexture;
uniform vec4 uHorizontalSelector;
uniform vec4 uVerticalSelector;
uniform vec2 uMaxDisplacement;
uniform float uWrapPixels;
void main() {
    vec4 map = texture2D(uMapTexture, vertexColor);
    vec2 amount = vec2(dot(map, uHorizontalSelector), dot(map, uVerticalSelector));
    vec2 coord = vertexColor + (amount - 0.5) * 2.0 * uMaxDisplacement;
    if (uWrapPixels > 0.5) {
        coord = fract(coord);
    } else if (coord.x < 0.0 || coord.x > 1.0 || coord.y < 0.0 || coord.y > 1.0) {
        gl_FragColor = vec4(0.0);
        return;
    }
    gl_FragColor = texture2D(sTexture, coord);
}
"#;

/// Map channel driving one displacement axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplacementChannel {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Alpha.
    Alpha,
    /// Rec. 601 luma.
    Luminance,
    /// No displacement on this axis.
    Off,
}

impl DisplacementChannel {
    fn selector(self) -> [f32; 4] {
        match self {
            Self::Red => [1.0, 0.0, 0.0, 0.0],
            Self::Green => [0.0, 1.0, 0.0, 0.0],
            Self::Blue => [0.0, 0.0, 1.0, 0.0],
            Self::Alpha => [0.0, 0.0, 0.0, 1.0],
            Self::Luminance => [0.299, 0.587, 0.114, 0.0],
            Self::Off => [0.0; 4],
        }
    }
}

/// Displacement settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DisplacementMapParams {
    /// Channel driving horizontal displacement.
    pub use_for_horizontal: DisplacementChannel,
    /// Largest horizontal shift in content pixels.
    pub max_horizontal: f64,
    /// Channel driving vertical displacement.
    pub use_for_vertical: DisplacementChannel,
    /// Largest vertical shift in content pixels.
    pub max_vertical: f64,
    /// Wrap displaced samples around the edges.
    pub wrap_pixels_around: bool,
}

impl Default for DisplacementMapParams {
    fn default() -> Self {
        Self {
            use_for_horizontal: DisplacementChannel::Red,
            max_horizontal: 5.0,
            use_for_vertical: DisplacementChannel::Green,
            max_vertical: 5.0,
            wrap_pixels_around: false,
        }
    }
}

/// Shifts pixels by the channels of a map layer.
///
/// The map binds to texture unit 1. Without a map the source doubles as its own map.
#[derive(Debug)]
pub struct DisplacementMapFilter {
    params: DisplacementMapParams,
    map: Option<FilterSource>,
    map_texture: i32,
    horizontal_selector: i32,
    vertical_selector: i32,
    max_displacement: i32,
    wrap_pixels: i32,
}

impl DisplacementMapFilter {
    pub(crate) fn new(params: DisplacementMapParams) -> Self {
        Self {
            params,
            map: None,
            map_texture: -1,
            horizontal_selector: -1,
            vertical_selector: -1,
            max_displacement: -1,
            wrap_pixels: -1,
        }
    }
}

impl FilterHooks for DisplacementMapFilter {
    fn name(&self) -> &'static str {
        "DisplacementMap"
    }

    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    fn prepare_program(&mut self, gl: &GlInterface, program: u32) {
        self.map_texture = uniform(gl, program, "uMapTexture");
        self.horizontal_selector = uniform(gl, program, "uHorizontalSelector");
        self.vertical_selector = uniform(gl, program, "uVerticalSelector");
        self.max_displacement = uniform(gl, program, "uMaxDisplacement");
        self.wrap_pixels = uniform(gl, program, "uWrapPixels");
    }

    fn update_params(&self, gl: &GlInterface, content_bounds: Rect, filter_scale: Vec2) {
        let f = &gl.functions;
        match &self.map {
            Some(map) => {
                active_texture(gl, consts::TEXTURE1, consts::TEXTURE_2D, map.texture_id);
                f.uniform1i(self.map_texture, 1);
            }
            None => f.uniform1i(self.map_texture, 0),
        }

        let p = &self.params;
        let [hx, hy, hz, hw] = p.use_for_horizontal.selector();
        let [vx, vy, vz, vw] = p.use_for_vertical.selector();
        f.uniform4f(self.horizontal_selector, hx, hy, hz, hw);
        f.uniform4f(self.vertical_selector, vx, vy, vz, vw);

        let axis_max = |channel: DisplacementChannel, max: f64| {
            if channel == DisplacementChannel::Off {
                0.0
            } else {
                max
            }
        };
        let [mx, my] = texel_units(
            Vec2::new(
                axis_max(p.use_for_horizontal, p.max_horizontal) * filter_scale.x,
                axis_max(p.use_for_vertical, p.max_vertical) * filter_scale.y,
            ),
            scaled_size(content_bounds, filter_scale),
        );
        f.uniform2f(self.max_displacement, mx, my);
        f.uniform1f(self.wrap_pixels, bool_uniform(p.wrap_pixels_around));
    }

    fn set_map_source(&mut self, source: Option<FilterSource>) {
        self.map = source;
    }
}
