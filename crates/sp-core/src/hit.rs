//! Hit-testing
//!
//! Proximity tests in world space. Polylines and polygons are never hit; only
//! points, lines and circles can be picked.

use glam::DVec2;

use crate::geometry::{Geometry, GeometryObject};
use crate::model::GeometryModel;

/// Default pick tolerance in centimeters
pub const DEFAULT_TOLERANCE_CM: f64 = 5.0;

/// Distance from a point to a segment, using the clamped projection
pub fn distance_to_segment(point: DVec2, start: DVec2, end: DVec2) -> f64 {
    let seg = end - start;
    let len_sq = seg.length_squared();
    if len_sq < f64::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(start + seg * t)
}

/// Per-shape proximity test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTester {
    tolerance: f64,
}

impl Default for HitTester {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE_CM,
        }
    }
}

impl HitTester {
    /// Tester with a custom tolerance. Negative or non-finite values fall back
    /// to the default.
    pub fn new(tolerance: f64) -> Self {
        if tolerance.is_finite() && tolerance >= 0.0 {
            Self { tolerance }
        } else {
            Self::default()
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns true if `point` is close enough to `object`
    ///
    /// - Point: within the tolerance (inclusive)
    /// - Line: strictly closer than `tolerance + strokeWidth / 2` to the segment
    /// - Circle: within `radius + tolerance` of the center, interior included
    pub fn hit_test(&self, object: &GeometryObject, point: DVec2) -> bool {
        match &object.geometry {
            Geometry::Point { position } => position.distance(point) <= self.tolerance,
            Geometry::Line { start, end } => {
                let threshold = self.tolerance + object.style.stroke_width / 2.0;
                distance_to_segment(point, *start, *end) < threshold
            }
            Geometry::Circle { center, radius } => center.distance(point) <= radius + self.tolerance,
            Geometry::Polyline { .. } | Geometry::Polygon { .. } => false,
        }
    }

    /// The topmost (most recently added) object hit by `point`
    pub fn pick<'a>(&self, model: &'a GeometryModel, point: DVec2) -> Option<&'a GeometryObject> {
        model.iter_topmost().find(|o| self.hit_test(o, point))
    }
}
