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
precision highp float;
varying vec2 vertexColor;
uniform sampler2D sTexture;
uniform vec2 uCenter;
uniform vec2 uRadius;
uniform float uHeight;
uniform float uPinning;
void main() {
    vec2 offset = (vertexColor - uCenter) / uRadius;
    float dist = length(offset);
    vec2 coord = vertexColor;
    if (dist < 1.0) {
        float amount = 1.0 - smoothstep(0.0, 1.0, dist);
        coord = uCenter + (vertexColor - uCenter) * (1.0 - 0.5 * uHeight * amount);
    }
    if (uPinning > 0.5) {
        coord = clamp(coord, 0.0, 1.0);
    }
    if (coord.x < 0.0 || coord.x > 1.0 || coord.y < 0.0 || coord.y > 1.0) {
        gl_FragColor = vec4(0.0);
    } else {
        gl_FragColor = texture2D(sTexture, coord);
    }
}
"#;

/// Bulge parameters in content pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BulgeParams {
    /// Horizontal radius.
    pub horizontal_radius: f64,
    /// Vertical radius.
    pub vertical_radius: f64,
    /// Center relative to the content origin; the content center when unset.
    pub center: Option<Point>,
    /// Strength in `[-4, 4]`. Negative values pinch.
    pub height: f64,
    /// Keep edge pixels in place.
    pub pinning: bool,
}

impl Default for BulgeParams {
    fn default() -> Self {
        Self {
            horizontal_radius: 50.0,
            vertical_radius: 50.0,
            center: None,
            height: 1.0,
            pinning: false,
        }
    }
}

#[derive(Debug)]
pub struct BulgeFilter {
    params: BulgeParams,
    center: i32,
    radius: i32,
    height: i32,
    pinning: i32,
}

impl BulgeFilter {
    pub(crate) fn new(params: BulgeParams) -> Self {
        Self {
            params,
            center: -1,
            radius: -1,
            height: -1,
            pinning: -1,
        }
    }
}

impl FilterHooks for BulgeFilter {
    fn name(&self) -> &'static str {
        "Bulge"
    }

    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    fn prepare_program(&mut self, gl: &GlInterface, program: u32) {
        self.center = uniform(gl, program, "uCenter");
        self.radius = uniform(gl, program, "uRadius");
        self.height = uniform(gl, program, "uHeight");
        self.pinning = uniform(gl, program, "uPinning");
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
        let [rx, ry] = texel_units(
            Vec2::new(
                self.params.horizontal_radius * filter_scale.x,
                self.params.vertical_radius * filter_scale.y,
            ),
            size,
        );
        f.uniform2f(self.center, cx, cy);
        f.uniform2f(self.radius, rx.max(f32::EPSILON), ry.max(f32::EPSILON));
        f.uniform1f(self.height, self.params.height.clamp(-4.0, 4.0) as f32);
        f.uniform1f(self.pinning, bool_uniform(self.params.pinning));
    }

    fn compute_vertices(&self, content: Rect, transformed: Rect, _scale: Vec2) -> [Point; 8] {
        compute_vertices_for_motion_blur_and_bulge(content, transformed)
    }
}
