//! Point tool: every click places a point

use sp_core::{Geometry, Metadata};

use crate::input::PointerInput;
use crate::kind::ToolKind;
use crate::preview::Preview;
use crate::tool::{CursorHint, Tool, ToolContext, ToolResponse};

/// Stateless point placement
#[derive(Debug, Default)]
pub struct PointTool;

impl PointTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for PointTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Point
    }

    fn on_activate(&mut self) {}

    fn on_deactivate(&mut self) {}

    fn on_pointer_move(&mut self, _input: &PointerInput, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        ToolResponse::Ignored
    }

    fn on_click(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse {
        ctx.commit_object(
            Geometry::Point {
                position: input.point(),
            },
            Metadata::new(),
        )
    }

    fn preview(&self) -> Option<Preview> {
        None
    }

    fn cursor_hint(&self) -> CursorHint {
        CursorHint::Crosshair
    }
}
