//! Concrete filters behind [`crate::LayerFilter`].

pub(crate) mod bulge;
pub(crate) mod corner_pin;
pub(crate) mod displacement_map;
pub(crate) mod drop_shadow;
pub(crate) mod gauss_blur;
pub(crate) mod glow;
pub(crate) mod levels_individual;
pub(crate) mod mosaic;
pub(crate) mod motion_tile;
pub(crate) mod radial_blur;

use crate::{
    foundation::core::{Rect, Vec2},
    gpu::gl::GlInterface,
};

/// Uniform location of `name`, `-1` when absent.
pub(crate) fn uniform(gl: &GlInterface, program: u32, name: &str) -> i32 {
    gl.functions.get_uniform_location(program, name)
}

/// `1.0` or `0.0` for a boolean uniform.
pub(crate) fn bool_uniform(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

/// Content size in source-texture pixels.
pub(crate) fn scaled_size(content_bounds: Rect, filter_scale: Vec2) -> Vec2 {
    Vec2::new(
        content_bounds.width() * filter_scale.x,
        content_bounds.height() * filter_scale.y,
    )
}

/// `pixels` converted into normalized texture units along each axis. Zero-sized axes map to 0.
pub(crate) fn texel_units(pixels: Vec2, size: Vec2) -> [f32; 2] {
    let axis = |p: f64, s: f64| if s > 0.0 { (p / s) as f32 } else { 0.0 };
    [axis(pixels.x, size.x), axis(pixels.y, size.y)]
}

#[cfg(test)]
#[path = "../../../tests/unit/filters/variants/mod.rs"]
mod tests;
