//! Vertex-chain tools
//!
//! Polyline, polygon, path-length and area all accumulate clicked vertices
//! until a double-click or Enter completes them. They differ only in how many
//! vertices they need and what they commit.

use glam::DVec2;
use serde_json::json;
use sp_core::{
    Geometry, Measurement, MeasurementKind, Metadata, path_length, perimeter, polygon_area,
};
use tracing::debug;

use crate::input::{Key, PointerInput};
use crate::kind::ToolKind;
use crate::preview::Preview;
use crate::tool::{
    CursorHint, DoubleClickHandler, KeyHandler, Rejection, Tool, ToolContext, ToolResponse,
};

/// What a completed chain turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    Polyline,
    Polygon,
    PathMeasure,
    Area,
}

impl ChainKind {
    /// Minimum vertices needed to complete
    pub fn min_points(&self) -> usize {
        match self {
            ChainKind::Polyline | ChainKind::PathMeasure => 2,
            ChainKind::Polygon | ChainKind::Area => 3,
        }
    }

    /// Whether the chain closes back to its first vertex
    pub fn is_closed(&self) -> bool {
        matches!(self, ChainKind::Polygon | ChainKind::Area)
    }

    pub fn tool_kind(&self) -> ToolKind {
        match self {
            ChainKind::Polyline => ToolKind::Polyline,
            ChainKind::Polygon => ToolKind::Polygon,
            ChainKind::PathMeasure => ToolKind::PathMeasure,
            ChainKind::Area => ToolKind::Area,
        }
    }
}

/// Ordered vertex list plus the rubber-band cursor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexChain {
    points: Vec<DVec2>,
    cursor: Option<DVec2>,
}

impl VertexChain {
    pub fn push(&mut self, point: DVec2) {
        self.points.push(point);
    }

    pub fn set_cursor(&mut self, point: DVec2) {
        self.cursor = Some(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.cursor = None;
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn cursor(&self) -> Option<DVec2> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vertices with consecutive duplicates collapsed (and, for a closed
    /// chain, a last vertex equal to the first dropped). Fails without
    /// touching the chain if fewer than `min` remain.
    pub fn finish(&self, min: usize, closed: bool) -> Result<Vec<DVec2>, Rejection> {
        let mut points = self.points.clone();
        points.dedup();
        if closed && points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < min {
            return Err(Rejection::TooFewPoints {
                required: min,
                got: points.len(),
            });
        }
        Ok(points)
    }
}

/// A tool that builds a chain of vertices
#[derive(Debug)]
pub struct ChainTool {
    kind: ChainKind,
    chain: VertexChain,
}

impl ChainTool {
    pub fn new(kind: ChainKind) -> Self {
        Self {
            kind,
            chain: VertexChain::default(),
        }
    }

    pub fn polyline() -> Self {
        Self::new(ChainKind::Polyline)
    }

    pub fn polygon() -> Self {
        Self::new(ChainKind::Polygon)
    }

    pub fn path_measure() -> Self {
        Self::new(ChainKind::PathMeasure)
    }

    pub fn area() -> Self {
        Self::new(ChainKind::Area)
    }

    pub fn chain(&self) -> &VertexChain {
        &self.chain
    }

    /// Commit the chain if it has enough vertices. Soft-rejects otherwise and
    /// keeps every vertex.
    fn complete(&mut self, ctx: &mut ToolContext<'_>) -> ToolResponse {
        let points = match self.chain.finish(self.kind.min_points(), self.kind.is_closed()) {
            Ok(points) => points,
            Err(rejection) => {
                debug!("{} completion rejected: {}", self.kind.tool_kind().name(), rejection);
                return ToolResponse::Rejected(rejection);
            }
        };

        let response = match self.kind {
            ChainKind::Polyline => {
                let mut metadata = Metadata::new();
                metadata.insert("length".into(), json!(path_length(&points)));
                ctx.commit_object(Geometry::Polyline { points }, metadata)
            }
            ChainKind::Polygon => {
                let mut metadata = Metadata::new();
                metadata.insert("perimeter".into(), json!(perimeter(&points)));
                metadata.insert("area".into(), json!(polygon_area(&points)));
                ctx.commit_object(Geometry::Polygon { points }, metadata)
            }
            ChainKind::PathMeasure => match Measurement::path(points) {
                Ok(m) => ctx.commit_measurement(m),
                Err(_) => ToolResponse::Rejected(self.too_few()),
            },
            ChainKind::Area => match Measurement::area(points) {
                Ok(m) => ctx.commit_measurement(m),
                Err(_) => ToolResponse::Rejected(self.too_few()),
            },
        };

        if response.is_committed() {
            self.chain.clear();
        }
        response
    }

    fn too_few(&self) -> Rejection {
        Rejection::TooFewPoints {
            required: self.kind.min_points(),
            got: self.chain.len(),
        }
    }
}

impl Tool for ChainTool {
    fn kind(&self) -> ToolKind {
        self.kind.tool_kind()
    }

    fn on_activate(&mut self) {
        self.chain.clear();
    }

    fn on_deactivate(&mut self) {
        self.chain.clear();
    }

    fn on_pointer_move(&mut self, input: &PointerInput, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        if self.chain.is_empty() {
            return ToolResponse::Ignored;
        }
        self.chain.set_cursor(input.point());
        ToolResponse::Updated
    }

    fn on_click(&mut self, input: &PointerInput, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        self.chain.push(input.point());
        self.chain.set_cursor(input.point());
        ToolResponse::Updated
    }

    fn preview(&self) -> Option<Preview> {
        if self.chain.is_empty() {
            return None;
        }
        let points = self.chain.points().to_vec();
        let cursor = self.chain.cursor();
        let preview = match self.kind {
            ChainKind::Polyline => Preview::Polyline { points, cursor },
            ChainKind::Polygon => Preview::Polygon { points, cursor },
            ChainKind::PathMeasure | ChainKind::Area => {
                let mut live = points.clone();
                live.extend(cursor);
                let (kind, value) = if self.kind == ChainKind::Area {
                    (MeasurementKind::Area, polygon_area(&live))
                } else {
                    (MeasurementKind::Path, path_length(&live))
                };
                Preview::Measurement {
                    kind,
                    points,
                    cursor,
                    value,
                }
            }
        };
        Some(preview)
    }

    fn cursor_hint(&self) -> CursorHint {
        CursorHint::Crosshair
    }

    fn double_click_handler(&mut self) -> Option<&mut dyn DoubleClickHandler> {
        Some(self)
    }

    fn key_handler(&mut self) -> Option<&mut dyn KeyHandler> {
        Some(self)
    }
}

impl DoubleClickHandler for ChainTool {
    fn on_double_click(&mut self, _input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse {
        self.complete(ctx)
    }
}

impl KeyHandler for ChainTool {
    fn on_key_down(&mut self, key: Key, ctx: &mut ToolContext<'_>) -> ToolResponse {
        match key {
            Key::Enter => self.complete(ctx),
            Key::Escape if !self.chain.is_empty() => {
                self.chain.clear();
                ToolResponse::Updated
            }
            _ => ToolResponse::Ignored,
        }
    }
}
