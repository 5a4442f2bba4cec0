//! Line tool

use glam::DVec2;
use sp_core::{Geometry, Metadata};
use tracing::debug;

use crate::input::{Key, PointerInput};
use crate::kind::ToolKind;
use crate::preview::Preview;
use crate::tool::{CursorHint, KeyHandler, Rejection, Tool, ToolContext, ToolResponse};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum LineState {
    #[default]
    WaitingForStart,
    WaitingForEnd { start: DVec2, cursor: DVec2 },
}

/// Two clicks make a line
#[derive(Debug, Default)]
pub struct LineTool {
    state: LineState,
}

impl LineTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.state = LineState::WaitingForStart;
    }
}

impl Tool for LineTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Line
    }

    fn on_activate(&mut self) {
        self.reset();
    }

    fn on_deactivate(&mut self) {
        self.reset();
    }

    fn on_pointer_move(&mut self, input: &PointerInput, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        match &mut self.state {
            LineState::WaitingForEnd { cursor, .. } => {
                *cursor = input.point();
                ToolResponse::Updated
            }
            LineState::WaitingForStart => ToolResponse::Ignored,
        }
    }

    fn on_click(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse {
        let point = input.point();
        match self.state {
            LineState::WaitingForStart => {
                self.state = LineState::WaitingForEnd {
                    start: point,
                    cursor: point,
                };
                ToolResponse::Updated
            }
            LineState::WaitingForEnd { start, .. } => {
                if start == point {
                    debug!("Line rejected: zero length at {:?}", point);
                    return ToolResponse::Rejected(Rejection::ZeroLength);
                }
                let response = ctx.commit_object(Geometry::Line { start, end: point }, Metadata::new());
                if response.is_committed() {
                    self.reset();
                }
                response
            }
        }
    }

    fn preview(&self) -> Option<Preview> {
        match self.state {
            LineState::WaitingForEnd { start, cursor } => Some(Preview::Line { start, end: cursor }),
            LineState::WaitingForStart => None,
        }
    }

    fn cursor_hint(&self) -> CursorHint {
        CursorHint::Crosshair
    }

    fn key_handler(&mut self) -> Option<&mut dyn KeyHandler> {
        Some(self)
    }
}

impl KeyHandler for LineTool {
    fn on_key_down(&mut self, key: Key, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        match (key, self.state) {
            (Key::Escape, LineState::WaitingForEnd { .. }) => {
                self.reset();
                ToolResponse::Updated
            }
            _ => ToolResponse::Ignored,
        }
    }
}
