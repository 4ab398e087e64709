//! Quad geometry for filter draws.
//!
//! Vertices are produced as interleaved `(position, texcoord)` pairs in bottom-left,
//! bottom-right, top-left, top-right order, matching a 4-vertex triangle strip. Positions are in
//! layer space; texcoords are in content pixels. [`to_gl_vertex_point`] and
//! [`to_gl_texture_point`] map them into normalized device and texture space.

use crate::foundation::core::{MAT3_IDENTITY, Mat3, Point, Rect, Vec2};

/// The texture a filter reads from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSource {
    /// GL texture name.
    pub texture_id: u32,
    /// Texture width in pixels.
    pub width: i32,
    /// Texture height in pixels.
    pub height: i32,
    /// Content-to-texture pixel scale.
    pub scale: Vec2,
    /// Applied to texture coordinates in the vertex shader.
    pub texture_matrix: Mat3,
}

impl FilterSource {
    /// A source at unit scale with an identity texture matrix.
    pub fn new(texture_id: u32, width: i32, height: i32) -> Self {
        Self {
            texture_id,
            width,
            height,
            scale: Vec2::new(1.0, 1.0),
            texture_matrix: MAT3_IDENTITY,
        }
    }
}

/// The framebuffer a filter draws into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterTarget {
    /// GL framebuffer name.
    pub framebuffer_id: u32,
    /// Viewport width in pixels.
    pub width: i32,
    /// Viewport height in pixels.
    pub height: i32,
    /// Applied to positions in the vertex shader.
    pub vertex_matrix: Mat3,
}

impl FilterTarget {
    /// A target with an identity vertex matrix.
    pub fn new(framebuffer_id: u32, width: i32, height: i32) -> Self {
        Self {
            framebuffer_id,
            width,
            height,
            vertex_matrix: MAT3_IDENTITY,
        }
    }
}

/// Standard quad: positions at the corners of `transformed`, texcoords spanning the full
/// content size.
pub fn compute_vertices(content: Rect, transformed: Rect, _scale: Vec2) -> [Point; 8] {
    let (w, h) = (content.width(), content.height());
    [
        Point::new(transformed.x0, transformed.y1),
        Point::new(0.0, h),
        Point::new(transformed.x1, transformed.y1),
        Point::new(w, h),
        Point::new(transformed.x0, transformed.y0),
        Point::new(0.0, 0.0),
        Point::new(transformed.x1, transformed.y0),
        Point::new(w, 0.0),
    ]
}

/// Quad for filters whose output spreads beyond their input.
///
/// Positions sit at the corners of `output`; texcoords are offset by the output origin relative
/// to the input so content stays registered. Equal bounds give the standard quad.
pub fn compute_vertices_for_motion_blur_and_bulge(input: Rect, output: Rect) -> [Point; 8] {
    let dx = output.x0 - input.x0;
    let dy = output.y0 - input.y0;
    let (w, h) = (output.width(), output.height());
    [
        Point::new(output.x0, output.y1),
        Point::new(dx, h + dy),
        Point::new(output.x1, output.y1),
        Point::new(w + dx, h + dy),
        Point::new(output.x0, output.y0),
        Point::new(dx, dy),
        Point::new(output.x1, output.y0),
        Point::new(w + dx, dy),
    ]
}

/// Map a layer-space position into normalized device coordinates of `target`.
pub fn to_gl_vertex_point(
    target: &FilterTarget,
    source: &FilterSource,
    content_bounds: Rect,
    p: Point,
) -> Point {
    let x = (p.x - content_bounds.x0) * source.scale.x;
    let y = (p.y - content_bounds.y0) * source.scale.y;
    Point::new(
        2.0 * x / f64::from(target.width) - 1.0,
        2.0 * y / f64::from(target.height) - 1.0,
    )
}

/// Map a content-pixel texcoord into normalized texture coordinates of `source`.
pub fn to_gl_texture_point(source: &FilterSource, p: Point) -> Point {
    Point::new(
        p.x * source.scale.x / f64::from(source.width),
        p.y * source.scale.y / f64::from(source.height),
    )
}

/// Interleaved `f32` vertex data ready for upload.
pub(crate) fn to_gl_vertices(
    target: &FilterTarget,
    source: &FilterSource,
    content_bounds: Rect,
    points: &[Point; 8],
) -> [f32; 16] {
    let mut out = [0.0; 16];
    for (i, pair) in points.chunks_exact(2).enumerate() {
        let vertex = to_gl_vertex_point(target, source, content_bounds, pair[0]);
        let texture = to_gl_texture_point(source, pair[1]);
        out[i * 4..i * 4 + 4].copy_from_slice(&[
            vertex.x as f32,
            vertex.y as f32,
            texture.x as f32,
            texture.y as f32,
        ]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/filters/vertices.rs"]
mod tests;
