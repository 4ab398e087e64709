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
uniform vec2 uTileCenter;
uniform vec2 uTileSize;
uniform float uPhase;
uniform float uHorizontalPhaseShift;
uniform float uMirrorEdges;
void main() {
    vec2 coord = (vertexColor - uTileCenter) / uTileSize + vec2(0.5);
    if (uHorizontalPhaseShift > 0.5) {
        coord.x += uPhase * floor(coord.y);
    } else {
        coord.y += uPhase * floor(coord.x);
    }
    vec2 tile = fract(coord);
    if (uMirrorEdges > 0.5) {
        vec2 odd = mod(floor(coord), 2.0);
        tile = mix(tile, vec2(1.0) - tile, odd);
    }
    gl_FragColor = texture2D(sTexture, tile);
}
"#;

/// Tile layout. Sizes are percentages of the content size, phase is in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MotionTileParams {
    /// Tile center relative to the content origin; the content center when unset.
    pub tile_center: Option<Point>,
    /// Tile width in percent.
    pub tile_width: f64,
    /// Tile height in percent.
    pub tile_height: f64,
    /// Flip every other tile.
    pub mirror_edges: bool,
    /// Offset between rows or columns, in degrees (360 = one tile).
    pub phase: f64,
    /// Shift rows instead of columns.
    pub horizontal_phase_shift: bool,
}

impl Default for MotionTileParams {
    fn default() -> Self {
        Self {
            tile_center: None,
            tile_width: 100.0,
            tile_height: 100.0,
            mirror_edges: false,
            phase: 0.0,
            horizontal_phase_shift: false,
        }
    }
}

/// Repeats the layer across its output bounds.
#[derive(Debug)]
pub struct MotionTileFilter {
    params: MotionTileParams,
    tile_center: i32,
    tile_size: i32,
    phase: i32,
    horizontal_phase_shift: i32,
    mirror_edges: i32,
}

impl MotionTileFilter {
    pub(crate) fn new(params: MotionTileParams) -> Self {
        Self {
            params,
            tile_center: -1,
            tile_size: -1,
            phase: -1,
            horizontal_phase_shift: -1,
            mirror_edges: -1,
        }
    }
}

impl FilterHooks for MotionTileFilter {
    fn name(&self) -> &'static str {
        "MotionTile"
    }

    fn fragment_shader(&self) -> Cow<'static, str> {
        Cow::Borrowed(FRAGMENT_SHADER)
    }

    fn prepare_program(&mut self, gl: &GlInterface, program: u32) {
        self.tile_center = uniform(gl, program, "uTileCenter");
        self.tile_size = uniform(gl, program, "uTileSize");
        self.phase = uniform(gl, program, "uPhase");
        self.horizontal_phase_shift = uniform(gl, program, "uHorizontalPhaseShift");
        self.mirror_edges = uniform(gl, program, "uMirrorEdges");
    }

    fn update_params(&self, gl: &GlInterface, content_bounds: Rect, filter_scale: Vec2) {
        let f = &gl.functions;
        let size = scaled_size(content_bounds, filter_scale);
        let half = content_bounds.size().to_vec2() / 2.0;
        let center = self.params.tile_center.unwrap_or(half.to_point());
        let [cx, cy] = texel_units(
            Vec2::new(center.x * filter_scale.x, center.y * filter_scale.y),
            size,
        );
        f.uniform2f(self.tile_center, cx, cy);
        f.uniform2f(
            self.tile_size,
            (self.params.tile_width / 100.0).max(0.01) as f32,
            (self.params.tile_height / 100.0).max(0.01) as f32,
        );
        f.uniform1f(self.phase, (self.params.phase / 360.0) as f32);
        f.uniform1f(
            self.horizontal_phase_shift,
            bool_uniform(self.params.horizontal_phase_shift),
        );
        f.uniform1f(self.mirror_edges, bool_uniform(self.params.mirror_edges));
    }

    fn compute_vertices(&self, content: Rect, transformed: Rect, _scale: Vec2) -> [Point; 8] {
        compute_vertices_for_motion_blur_and_bulge(content, transformed)
    }
}
