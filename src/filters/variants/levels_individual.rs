use std::borrow::Cow;

use crate::{
    filters::{layer_filter::FilterHooks, variants::uniform},
    foundation::core::{Rect, Vec2},
    gpu::gl::GlInterface,
};

const FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
varying vec2 vertexColor;
uniform sampler2D sTexture;
// rgb: per channel, a: composite
uniform vec4 uInputBlack;
uniform vec4 uInputWhite;
uniform vec4 uGamma;
uniform vec4 uOutputBlack;
uniform vec4 uOutputWhite;
vec3 levels(vec3 x, vec3 inBlack, vec3 inWhite, vec3 gamma, vec3 outBlack, vec3 outWhite) {
    vec3 t = clamp((x - inBlack) / max(inWhite - inBlack, vec3(0.0001)), 0.0, 1.0);
    return mix(outBlack, outWhite, pow(t, vec3(1.0) / gamma));
}
void main() {
    vec4 color = texture2D(sTexture, vertexColor);
    if (color.a <= 0.0) {
        gl_FragColor = color;
        return;
    }
    vec3 rgb = color.rgb / color.a;
    rgb = levels(rgb, vec3(uInputBlack.a), vec3(uInputWhite.a), vec3(uGamma.a),
                 vec3(uOutputBlack.a), vec3(uOutputWhite.a));
    rgb = levels(rgb, uInputBlack.rgb, uInputWhite.rgb, uGamma.rgb, uOutputBlack.rgb,
                 uOutputWhite.rgb);
    gl_FragColor = vec4(rgb * color.a, color.a);
}
"#;

/// Levels of one channel, in 8-bit units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChannelLevels {
    /// Input level mapped to the output black.
    pub input_black: f64,
    /// Input level mapped to the output white.
    pub input_white: f64,
    /// Midtone exponent.
    pub gamma: f64,
    /// Lowest output level.
    pub output_black: f64,
    /// Highest output level.
    pub output_white: f64,
}

impl Default for ChannelLevels {
    fn default() -> Self {
        Self {
            input_black: 0.0,
            input_white: 255.0,
            gamma: 1.0,
            output_black: 0.0,
            output_white: 255.0,
        }
    }
}

/// Composite levels applied first, then each color channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LevelsIndividualParams {
    /// Applied to all three channels.
    pub rgb: ChannelLevels,
    /// Red channel.
    pub red: ChannelLevels,
    /// Green channel.
    pub green: ChannelLevels,
    /// Blue channel.
    pub blue: ChannelLevels,
}

fn pack(channels: [ChannelLevels; 4], field: impl Fn(&ChannelLevels) -> f64) -> [f32; 4] {
    channels.map(|c| field(&c) as f32)
}

#[derive(Debug)]
pub struct LevelsIndividualFilter {
    params: LevelsIndividualParams,
    // input black, input white, gamma, output black, output white
    locations: [i32; 5],
}

impl LevelsIndividualFilter {
    pub(crate) fn new(params: LevelsIndividualParams) -> Self {
        Self {
            params,
            locations: [-1; 5],
        }
    }
}

impl FilterHooks for LevelsIndividualFilter {
    fn name(&self) -> &'static str {
        "LevelsIndividual"
    }

    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    fn prepare_program(&mut self, gl: &GlInterface, program: u32) {
        let names = [
            "uInputBlack",
            "uInputWhite",
            "uGamma",
            "uOutputBlack",
            "uOutputWhite",
        ];
        for (location, name) in self.locations.iter_mut().zip(names) {
            *location = uniform(gl, program, name);
        }
    }

    fn update_params(&self, gl: &GlInterface, _content_bounds: Rect, _filter_scale: Vec2) {
        let p = &self.params;
        let channels = [p.red, p.green, p.blue, p.rgb];
        let values = [
            pack(channels, |c| c.input_black / 255.0),
            pack(channels, |c| c.input_white / 255.0),
            pack(channels, |c| c.gamma.max(0.01)),
            pack(channels, |c| c.output_black / 255.0),
            pack(channels, |c| c.output_white / 255.0),
        ];
        for (location, [x, y, z, w]) in self.locations.iter().zip(values) {
            gl.functions.uniform4f(*location, x, y, z, w);
        }
    }
}
