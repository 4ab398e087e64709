use std::borrow::Cow;

use crate::{
    filters::{
        layer_filter::FilterHooks,
        variants::{scaled_size, texel_units, uniform},
        vertices::compute_vertices_for_motion_blur_and_bulge,
    },
    foundation::core::{Color, Point, Rect, Vec2},
    gpu::gl::GlInterface,
};

const FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
varying vec2 vertexColor;
uniform sampler2D sTexture;
uniform vec4 uShadowColor;
uniform vec2 uOffset;
uniform vec2 uStep;
float coverage(vec2 coord) {
    if (coord.x < 0.0 || coord.x > 1.0 || coord.y < 0.0 || coord.y > 1.0) {
        return 0.0;
    }
    return texture2D(sTexture, coord).a;
}
void main() {
    vec4 source = vec4(0.0);
    if (vertexColor.x >= 0.0 && vertexColor.x <= 1.0 && vertexColor.y >= 0.0 && vertexColor.y <= 1.0) {
        source = texture2D(sTexture, vertexColor);
    }
    float alpha = 0.0;
    for (int x = -1; x <= 1; x++) {
        for (int y = -1; y <= 1; y++) {
            alpha += coverage(vertexColor - uOffset + vec2(float(x), float(y)) * uStep);
        }
    }
    vec4 shadow = uShadowColor * (alpha / 9.0);
    gl_FragColor = source + shadow * (1.0 - source.a);
}
"#;

/// Drop shadow settings. Angle is the light direction in degrees, counter-clockwise from +x.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DropShadowParams {
    /// Shadow color; alpha is ignored in favour of `opacity`.
    pub color: Color,
    /// Shadow opacity in `[0, 1]`.
    pub opacity: f64,
    /// Light angle in degrees.
    pub angle: f64,
    /// Shadow offset in content pixels.
    pub distance: f64,
    /// Blur size in content pixels.
    pub size: f64,
}

impl Default for DropShadowParams {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            opacity: 0.75,
            angle: 120.0,
            distance: 5.0,
            size: 5.0,
        }
    }
}

/// Composites the layer over an offset, softened copy of its alpha.
#[derive(Debug)]
pub struct DropShadowFilter {
    params: DropShadowParams,
    shadow_color: i32,
    offset: i32,
    step: i32,
}

impl DropShadowFilter {
    pub(crate) fn new(params: DropShadowParams) -> Self {
        Self {
            params,
            shadow_color: -1,
            offset: -1,
            step: -1,
        }
    }

    /// Shadow displacement in content pixels, y down.
    pub(crate) fn offset(&self) -> Vec2 {
        let radians = self.params.angle.to_radians();
        Vec2::new(
            -radians.cos() * self.params.distance,
            radians.sin() * self.params.distance,
        )
    }
}

impl FilterHooks for DropShadowFilter {
    fn name(&self) -> &'static str {
        "DropShadow"
    }

    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    fn prepare_program(&mut self, gl: &GlInterface, program: u32) {
        self.shadow_color = uniform(gl, program, "uShadowColor");
        self.offset = uniform(gl, program, "uOffset");
        self.step = uniform(gl, program, "uStep");
    }

    fn update_params(&self, gl: &GlInterface, content_bounds: Rect, filter_scale: Vec2) {
        let f = &gl.functions;
        let size = scaled_size(content_bounds, filter_scale);
        let alpha = self.params.opacity.clamp(0.0, 1.0) as f32;
        let c = self.params.color;
        f.uniform4f(
            self.shadow_color,
            c.red * alpha,
            c.green * alpha,
            c.blue * alpha,
            alpha,
        );
        let offset = self.offset();
        let [ox, oy] = texel_units(
            Vec2::new(offset.x * filter_scale.x, offset.y * filter_scale.y),
            size,
        );
        f.uniform2f(self.offset, ox, oy);
        let reach = self.params.size.max(0.0) / 2.0;
        let [sx, sy] = texel_units(
            Vec2::new(reach * filter_scale.x, reach * filter_scale.y),
            size,
        );
        f.uniform2f(self.step, sx, sy);
    }

    // The shadow extends past the content.
    fn compute_vertices(&self, content: Rect, transformed: Rect, _scale: Vec2) -> [Point; 8] {
        compute_vertices_for_motion_blur_and_bulge(content, transformed)
    }
}
