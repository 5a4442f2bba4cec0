//! Tool kinds

use serde::{Deserialize, Serialize};

use crate::tool::CursorHint;

/// Interaction mode of a drafting session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    /// Pick and drag objects
    #[default]
    Select,
    /// Place a point
    Point,
    /// Draw a line from two clicks
    Line,
    /// Draw a circle from center and radius
    Circle,
    /// Draw an open chain of vertices
    Polyline,
    /// Draw a closed ring of vertices
    Polygon,
    /// Measure a straight distance
    Distance,
    /// Measure the length along a path
    PathMeasure,
    /// Measure an enclosed area
    Area,
}

impl ToolKind {
    /// Every tool, in toolbar order
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Select,
        ToolKind::Point,
        ToolKind::Line,
        ToolKind::Circle,
        ToolKind::Polyline,
        ToolKind::Polygon,
        ToolKind::Distance,
        ToolKind::PathMeasure,
        ToolKind::Area,
    ];

    /// Get the display name of the tool
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Point => "Point",
            ToolKind::Line => "Line",
            ToolKind::Circle => "Circle",
            ToolKind::Polyline => "Polyline",
            ToolKind::Polygon => "Polygon",
            ToolKind::Distance => "Distance",
            ToolKind::PathMeasure => "Path Length",
            ToolKind::Area => "Area",
        }
    }

    /// Get a short label for the tool (for toolbar buttons)
    pub fn short_label(&self) -> &'static str {
        match self {
            ToolKind::Select => "⬚",
            ToolKind::Point => "•",
            ToolKind::Line => "╱",
            ToolKind::Circle => "○",
            ToolKind::Polyline => "⌇",
            ToolKind::Polygon => "⬠",
            ToolKind::Distance => "↔",
            ToolKind::PathMeasure => "⤳",
            ToolKind::Area => "▨",
        }
    }

    /// Check if this tool creates geometry objects
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            ToolKind::Point
                | ToolKind::Line
                | ToolKind::Circle
                | ToolKind::Polyline
                | ToolKind::Polygon
        )
    }

    /// Check if this tool creates measurements
    pub fn is_measurement(&self) -> bool {
        matches!(
            self,
            ToolKind::Distance | ToolKind::PathMeasure | ToolKind::Area
        )
    }

    /// Cursor shown while this tool is idle
    pub fn cursor_hint(&self) -> CursorHint {
        match self {
            ToolKind::Select => CursorHint::Default,
            _ => CursorHint::Crosshair,
        }
    }
}
