//! Non-authoritative output for the renderer

use glam::DVec2;
use serde::Serialize;
use sp_core::MeasurementKind;

/// Construction in progress, drawn as a rubber band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Preview {
    /// Line from start point (awaiting end point)
    Line { start: DVec2, end: DVec2 },
    /// Circle with center (awaiting radius click)
    Circle { center: DVec2, radius: f64 },
    /// Open chain with a rubber band to the cursor
    Polyline {
        points: Vec<DVec2>,
        cursor: Option<DVec2>,
    },
    /// Closed ring with a rubber band to the cursor
    Polygon {
        points: Vec<DVec2>,
        cursor: Option<DVec2>,
    },
    /// Measurement being taken, with the live value
    Measurement {
        kind: MeasurementKind,
        points: Vec<DVec2>,
        cursor: Option<DVec2>,
        value: f64,
    },
}

/// Marker at the snapped location
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnapIndicator {
    /// Snapped world point
    pub point: DVec2,
    /// Zoom at the time of the event, so the marker keeps a constant pixel size
    pub zoom: f64,
}
