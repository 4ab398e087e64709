use crate::{
    filters::layer_filter::FilterHooks,
    foundation::core::{Point, Rect, Vec2},
};

/// Pin positions relative to the content origin. Unset corners stay at the content corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CornerPinParams {
    /// Target of the content's top-left corner.
    pub upper_left: Option<Point>,
    /// Target of the content's top-right corner.
    pub upper_right: Option<Point>,
    /// Target of the content's bottom-left corner.
    pub lower_left: Option<Point>,
    /// Target of the content's bottom-right corner.
    pub lower_right: Option<Point>,
}

/// Maps the content quad onto four arbitrary points.
#[derive(Debug)]
pub struct CornerPinFilter {
    params: CornerPinParams,
}

impl CornerPinFilter {
    pub(crate) fn new(params: CornerPinParams) -> Self {
        Self { params }
    }
}

impl FilterHooks for CornerPinFilter {
    fn name(&self) -> &'static str {
        "CornerPin"
    }

    // Texcoords stay on the full content; positions follow the pins.
    fn compute_vertices(&self, content: Rect, _transformed: Rect, _scale: Vec2) -> [Point; 8] {
        let (w, h) = (content.width(), content.height());
        let origin = content.origin().to_vec2();
        let pin = |p: Option<Point>, fallback: Point| p.unwrap_or(fallback) + origin;
        [
            pin(self.params.lower_left, Point::new(0.0, h)),
            Point::new(0.0, h),
            pin(self.params.lower_right, Point::new(w, h)),
            Point::new(w, h),
            pin(self.params.upper_left, Point::new(0.0, 0.0)),
            Point::new(0.0, 0.0),
            pin(self.params.upper_right, Point::new(w, 0.0)),
            Point::new(w, 0.0),
        ]
    }

    // Pinned edges are rarely axis aligned.
    fn needs_msaa(&self) -> bool {
        true
    }
}
