//! Geometric entities
//!
//! Defines the shape variants a site plan is made of, their styling, and the
//! planar math (shoelace area, path length) shared by tools and measurements.
//! All coordinates are centimeters in world space.

use std::collections::BTreeMap;
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Open, string-keyed metadata attached to an object.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Opaque unique identifier of a geometry object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A shape in world space
///
/// Serialized adjacently tagged, so an object reads as
/// `{"type": "line", "geometry": {"start": [0, 0], "end": [10, 0]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "geometry", rename_all = "lowercase")]
pub enum Geometry {
    /// A single location
    Point {
        /// Position in world coordinates
        position: DVec2,
    },

    /// A straight segment
    Line {
        /// First endpoint
        start: DVec2,
        /// Second endpoint
        end: DVec2,
    },

    /// A full circle
    Circle {
        /// Center point
        center: DVec2,
        /// Radius, never negative
        radius: f64,
    },

    /// An open chain of at least two vertices
    Polyline {
        /// Ordered vertices
        points: Vec<DVec2>,
    },

    /// A closed ring of at least three vertices (the closing edge is implicit)
    Polygon {
        /// Ordered vertices
        points: Vec<DVec2>,
    },
}

impl Geometry {
    /// Get the type name of this geometry
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::Line { .. } => "Line",
            Geometry::Circle { .. } => "Circle",
            Geometry::Polyline { .. } => "Polyline",
            Geometry::Polygon { .. } => "Polygon",
        }
    }

    /// The reference position used when dragging: the point position, line
    /// start, circle center, or first vertex.
    pub fn anchor(&self) -> DVec2 {
        match self {
            Geometry::Point { position } => *position,
            Geometry::Line { start, .. } => *start,
            Geometry::Circle { center, .. } => *center,
            Geometry::Polyline { points } | Geometry::Polygon { points } => {
                points.first().copied().unwrap_or(DVec2::ZERO)
            }
        }
    }

    /// Return a copy moved by `delta`
    pub fn translated(&self, delta: DVec2) -> Self {
        match self {
            Geometry::Point { position } => Geometry::Point {
                position: *position + delta,
            },
            Geometry::Line { start, end } => Geometry::Line {
                start: *start + delta,
                end: *end + delta,
            },
            Geometry::Circle { center, radius } => Geometry::Circle {
                center: *center + delta,
                radius: *radius,
            },
            Geometry::Polyline { points } => Geometry::Polyline {
                points: points.iter().map(|p| *p + delta).collect(),
            },
            Geometry::Polygon { points } => Geometry::Polygon {
                points: points.iter().map(|p| *p + delta).collect(),
            },
        }
    }

    /// Check the shape rules: minimum vertex counts, a finite non-negative
    /// radius and finite coordinates. Returns the first violation.
    pub fn check(&self) -> Result<(), &'static str> {
        match self {
            Geometry::Circle { radius, .. } if !radius.is_finite() || *radius < 0.0 => {
                return Err("circle radius must be finite and non-negative");
            }
            Geometry::Polyline { points } if points.len() < 2 => {
                return Err("polyline needs at least 2 points");
            }
            Geometry::Polygon { points } if points.len() < 3 => {
                return Err("polygon needs at least 3 points");
            }
            _ => {}
        }
        if self.points().iter().all(|p| p.is_finite()) {
            Ok(())
        } else {
            Err("coordinates must be finite")
        }
    }

    /// All defining points, in order
    pub fn points(&self) -> Vec<DVec2> {
        match self {
            Geometry::Point { position } => vec![*position],
            Geometry::Line { start, end } => vec![*start, *end],
            Geometry::Circle { center, .. } => vec![*center],
            Geometry::Polyline { points } | Geometry::Polygon { points } => points.clone(),
        }
    }
}

/// Visual style of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Stroke color (CSS color string)
    pub stroke: String,
    /// Stroke width in world centimeters
    pub stroke_width: f64,
    /// Fill color, if filled
    #[serde(default)]
    pub fill: Option<String>,
    /// Opacity in `[0, 1]`
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: "#1f2933".to_string(),
            stroke_width: 2.0,
            fill: None,
            opacity: 1.0,
        }
    }
}

/// A stored object: geometry plus identity, layer, style and metadata
///
/// Treated as an immutable value. Edits build a new object and put it back
/// under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryObject {
    /// Unique identifier
    pub id: ObjectId,
    /// Layer this object is drawn on
    pub layer_id: String,
    /// Shape
    #[serde(flatten)]
    pub geometry: Geometry,
    /// Style
    #[serde(default)]
    pub style: Style,
    /// Free-form metadata (perimeter, area, ...)
    #[serde(default)]
    pub metadata: Metadata,
}

impl GeometryObject {
    /// Create a new object with a fresh id and empty metadata
    pub fn new(layer_id: impl Into<String>, geometry: Geometry, style: Style) -> Self {
        Self {
            id: ObjectId::new(),
            layer_id: layer_id.into(),
            geometry,
            style,
            metadata: Metadata::new(),
        }
    }

    /// Builder-style metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Same object (id, layer, style, metadata) with different geometry
    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self {
            geometry,
            ..self.clone()
        }
    }
}

// ============== Planar math ==============

/// Signed shoelace area of a closed ring (positive when counter-clockwise in
/// a y-up frame). The closing edge back to vertex 0 is included.
pub fn signed_area(points: &[DVec2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Unsigned shoelace area of a closed ring
pub fn polygon_area(points: &[DVec2]) -> f64 {
    signed_area(points).abs()
}

/// Length of an open chain
pub fn path_length(points: &[DVec2]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Length of a closed ring, including the closing edge
pub fn perimeter(points: &[DVec2]) -> f64 {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => path_length(points) + last.distance(*first),
        _ => 0.0,
    }
}
