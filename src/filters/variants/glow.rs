use std::borrow::Cow;

use crate::{
    filters::{
        layer_filter::FilterHooks,
        variants::{scaled_size, texel_units, uniform},
    },
    foundation::core::{Rect, Vec2},
    gpu::gl::GlInterface,
};

const FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
varying vec2 vertexColor;
uniform sampler2D sTexture;
uniform vec2 uStep;
uniform float uThreshold;
uniform float uIntensity;
vec4 bright(vec2 coord) {
    vec4 color = texture2D(sTexture, coord);
    float luma = dot(color.rgb, vec3(0.299, 0.587, 0.114));
    return color * step(uThreshold, luma);
}
void main() {
    vec4 source = texture2D(sTexture, vertexColor);
    vec4 bloom = vec4(0.0);
    for (int x = -2; x <= 2; x++) {
        for (int y = -2; y <= 2; y++) {
            bloom += bright(vertexColor + vec2(float(x), float(y)) * uStep);
        }
    }
    bloom /= 25.0;
    gl_FragColor = clamp(source + bloom * uIntensity, 0.0, 1.0);
}
"#;

/// Glow settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlowParams {
    /// Luma above which pixels bloom, in `[0, 1]`.
    pub threshold: f64,
    /// Bloom reach in content pixels.
    pub radius: f64,
    /// Bloom gain.
    pub intensity: f64,
}

impl Default for GlowParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            radius: 10.0,
            intensity: 1.0,
        }
    }
}

#[derive(Debug)]
pub struct GlowFilter {
    params: GlowParams,
    step: i32,
    threshold: i32,
    intensity: i32,
}

impl GlowFilter {
    pub(crate) fn new(params: GlowParams) -> Self {
        Self {
            params,
            step: -1,
            threshold: -1,
            intensity: -1,
        }
    }
}

impl FilterHooks for GlowFilter {
    fn name(&self) -> &'static str {
        "Glow"
    }

    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    fn prepare_program(&mut self, gl: &GlInterface, program: u32) {
        self.step = uniform(gl, program, "uStep");
        self.threshold = uniform(gl, program, "uThreshold");
        self.intensity = uniform(gl, program, "uIntensity");
    }

    fn update_params(&self, gl: &GlInterface, content_bounds: Rect, filter_scale: Vec2) {
        let f = &gl.functions;
        // Five taps per axis cover the radius.
        let reach = self.params.radius.max(0.0) / 2.0;
        let [sx, sy] = texel_units(
            Vec2::new(reach * filter_scale.x, reach * filter_scale.y),
            scaled_size(content_bounds, filter_scale),
        );
        f.uniform2f(self.step, sx, sy);
        f.uniform1f(self.threshold, self.params.threshold.clamp(0.0, 1.0) as f32);
        f.uniform1f(self.intensity, self.params.intensity.max(0.0) as f32);
    }
}
