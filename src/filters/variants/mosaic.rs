use std::borrow::Cow;

use crate::{
    filters::{
        layer_filter::FilterHooks,
        variants::{bool_uniform, uniform},
    },
    foundation::core::{Rect, Vec2},
    gpu::gl::GlInterface,
};

const FRAGMENT_SHADER: &str = r#"#version 100
precision mediump float;
varying vec2 vertexColor;
uniform sampler2D sTexture;
uniform vec2 uBlockSize;
uniform float uSharpColors;
void main() {
    vec2 origin = floor(vertexColor / uBlockSize) * uBlockSize;
    if (uSharpColors > 0.5) {
        gl_FragColor = texture2D(sTexture, origin + 0.5 * uBlockSize);
        return;
    }
    vec4 color = vec4(0.0);
    for (int x = 0; x < 4; x++) {
        for (int y = 0; y < 4; y++) {
            vec2 offset = (vec2(float(x), float(y)) + 0.5) / 4.0 * uBlockSize;
            color += texture2D(sTexture, origin + offset);
        }
    }
    gl_FragColor = color / 16.0;
}
"#;

/// Mosaic grid.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MosaicParams {
    /// Blocks across the content width.
    pub horizontal_blocks: u32,
    /// Blocks across the content height.
    pub vertical_blocks: u32,
    /// Use each block's center color instead of its average.
    pub sharp_colors: bool,
}

impl Default for MosaicParams {
    fn default() -> Self {
        Self {
            horizontal_blocks: 10,
            vertical_blocks: 10,
            sharp_colors: false,
        }
    }
}

#[derive(Debug)]
pub struct MosaicFilter {
    params: MosaicParams,
    block_size: i32,
    sharp_colors: i32,
}

impl MosaicFilter {
    pub(crate) fn new(params: MosaicParams) -> Self {
        Self {
            params,
            block_size: -1,
            sharp_colors: -1,
        }
    }
}

impl FilterHooks for MosaicFilter {
    fn name(&self) -> &'static str {
        "Mosaic"
    }

    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    fn prepare_program(&mut self, gl: &GlInterface, program: u32) {
        self.block_size = uniform(gl, program, "uBlockSize");
        self.sharp_colors = uniform(gl, program, "uSharpColors");
    }

    fn update_params(&self, gl: &GlInterface, _content_bounds: Rect, _filter_scale: Vec2) {
        let f = &gl.functions;
        f.uniform2f(
            self.block_size,
            1.0 / self.params.horizontal_blocks.max(1) as f32,
            1.0 / self.params.vertical_blocks.max(1) as f32,
        );
        f.uniform1f(self.sharp_colors, bool_uniform(self.params.sharp_colors));
    }
}
