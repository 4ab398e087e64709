pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index in composition timeline space.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Premultiplied RGBA color with `f32` channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub red: f32,
    /// Green channel.
    pub green: f32,
    /// Blue channel.
    pub blue: f32,
    /// Alpha channel.
    pub alpha: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Construct from raw channel values.
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied `f32` channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let a = f32::from(a) / 255.0;
        Self {
            red: f32::from(r) / 255.0 * a,
            green: f32::from(g) / 255.0 * a,
            blue: f32::from(b) / 255.0 * a,
            alpha: a,
        }
    }

    /// Channels in `[r, g, b, a]` order.
    pub fn to_array(self) -> [f32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Column-major 3x3 matrix as consumed by `uniformMatrix3fv`.
pub type Mat3 = [f32; 9];

/// Identity [`Mat3`].
pub const MAT3_IDENTITY: Mat3 = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Expand a 2D affine transform into a column-major [`Mat3`].
///
/// `kurbo` stores `[a, b, c, d, e, f]` mapping `x' = a*x + c*y + e`, `y' = b*x + d*y + f`, so the
/// columns are `(a, b, 0)`, `(c, d, 0)` and `(e, f, 1)`.
pub fn mat3_from_affine(m: Affine) -> Mat3 {
    let [a, b, c, d, e, f] = m.as_coeffs();
    [
        a as f32, b as f32, 0.0, c as f32, d as f32, 0.0, e as f32, f as f32, 1.0,
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
