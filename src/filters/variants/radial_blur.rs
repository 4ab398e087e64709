use std::borrow::Cow;

use crate::{
    filters::{
        layer_filter::FilterHooks,
        variants::{scaled_size, texel_units, uniform},
    },
    foundation::core::{Point, Rect, Vec2},
    gpu::gl::GlInterface,
};

const FRAGMENT_SHADER: &str = r#"#version 100
precision highp float;
varying vec2 vertexColor;
uniform sampler2D sTexture;
uniform vec2 uCenter;
uniform vec2 uAspect;
uniform float uAmount;
uniform float uSpin;
void main() {
    vec2 offset = (vertexColor - uCenter) * uAspect;
    vec4 color = vec4(0.0);
    for (int i = 0; i < 16; i++) {
        float t = (float(i) / 15.0 - 0.5) * uAmount;
        vec2 p;
        if (uSpin > 0.5) {
            float c = cos(t);
            float s = sin(t);
            p = vec2(offset.x * c - offset.y * s, offset.x * s + offset.y * c);
        } else {
            p = offset * (1.0 + t);
        }
        color += texture2D(sTexture, uCenter + p / uAspect);
    }
    gl_FragColor = color / 16.0;
}
"#;

/// Radial blur shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadialBlurMode {
    /// Rotate around the center.
    #[default]
    Spin,
    /// Streak toward the center.
    Zoom,
}

/// Radial blur settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RadialBlurParams {
    /// Strength in `[0, 100]`. Spin maps 100 to a quarter turn.
    pub amount: f64,
    /// Center relative to the content origin; the content center when unset.
    pub center: Option<Point>,
    /// Blur shape.
    pub mode: RadialBlurMode,
}

impl Default for RadialBlurParams {
    fn default() -> Self {
        Self {
            amount: 10.0,
            center: None,
            mode: RadialBlurMode::Spin,
        }
    }
}

#[derive(Debug)]
pub struct RadialBlurFilter {
    params: RadialBlurParams,
    center: i32,
    aspect: i32,
    amount: i32,
    spin: i32,
}

impl RadialBlurFilter {
    pub(crate) fn new(params: RadialBlurParams) -> Self {
        Self {
            params,
            center: -1,
            aspect: -1,
            amount: -1,
            spin: -1,
        }
    }
}

impl FilterHooks for RadialBlurFilter {
    fn name(&self) -> &'static str {
        "RadialBlur"
    }

    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    fn prepare_program(&mut self, gl: &GlInterface, program: u32) {
        self.center = uniform(gl, program, "uCenter");
        self.aspect = uniform(gl, program, "uAspect");
        self.amount = uniform(gl, program, "uAmount");
        self.spin = uniform(gl, program, "uSpin");
    }

    fn update_params(&self, gl: &GlInterface, content_bounds: Rect, filter_scale: Vec2) {
        let f = &gl.functions;
        let size = scaled_size(content_bounds, filter_scale);
        let half = content_bounds.size().to_vec2() / 2.0;
        let center = self.params.center.unwrap_or(half.to_point());
        let [cx, cy] = texel_units(
            Vec2::new(center.x * filter_scale.x, center.y * filter_scale.y),
            size,
        );
        f.uniform2f(self.center, cx, cy);
        // Rotation happens in pixel space so circles stay round.
        let aspect = if size.y > 0.0 { size.x / size.y } else { 1.0 };
        f.uniform2f(self.aspect, aspect as f32, 1.0);

        let amount = self.params.amount.clamp(0.0, 100.0) / 100.0;
        let (amount, spin) = match self.params.mode {
            RadialBlurMode::Spin => (amount * std::f64::consts::FRAC_PI_2, 1.0),
            RadialBlurMode::Zoom => (amount, 0.0),
        };
        f.uniform1f(self.amount, amount as f32);
        f.uniform1f(self.spin, spin);
    }
}
