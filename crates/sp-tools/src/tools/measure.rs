//! Distance measurement tool

use glam::DVec2;
use sp_core::{Measurement, MeasurementKind};

use crate::input::{Key, PointerInput};
use crate::kind::ToolKind;
use crate::preview::Preview;
use crate::tool::{CursorHint, KeyHandler, Rejection, Tool, ToolContext, ToolResponse};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum MeasureState {
    #[default]
    Idle,
    FirstPointSet { first: DVec2, cursor: DVec2 },
}

/// Two clicks record a straight distance
#[derive(Debug, Default)]
pub struct MeasureTool {
    state: MeasureState,
}

impl MeasureTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for MeasureTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Distance
    }

    fn on_activate(&mut self) {
        self.state = MeasureState::Idle;
    }

    fn on_deactivate(&mut self) {
        self.state = MeasureState::Idle;
    }

    fn on_pointer_move(&mut self, input: &PointerInput, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        match &mut self.state {
            MeasureState::FirstPointSet { cursor, .. } => {
                *cursor = input.point();
                ToolResponse::Updated
            }
            MeasureState::Idle => ToolResponse::Ignored,
        }
    }

    fn on_click(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse {
        let point = input.point();
        match self.state {
            MeasureState::Idle => {
                self.state = MeasureState::FirstPointSet {
                    first: point,
                    cursor: point,
                };
                ToolResponse::Updated
            }
            MeasureState::FirstPointSet { first, .. } => {
                if first == point {
                    return ToolResponse::Rejected(Rejection::ZeroLength);
                }
                let response = ctx.commit_measurement(Measurement::distance(first, point));
                if response.is_committed() {
                    self.state = MeasureState::Idle;
                }
                response
            }
        }
    }

    fn preview(&self) -> Option<Preview> {
        match self.state {
            MeasureState::FirstPointSet { first, cursor } => Some(Preview::Measurement {
                kind: MeasurementKind::Distance,
                points: vec![first],
                cursor: Some(cursor),
                value: first.distance(cursor),
            }),
            MeasureState::Idle => None,
        }
    }

    fn cursor_hint(&self) -> CursorHint {
        CursorHint::Crosshair
    }

    fn key_handler(&mut self) -> Option<&mut dyn KeyHandler> {
        Some(self)
    }
}

impl KeyHandler for MeasureTool {
    fn on_key_down(&mut self, key: Key, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        if key == Key::Escape && self.state != MeasureState::Idle {
            self.state = MeasureState::Idle;
            return ToolResponse::Updated;
        }
        ToolResponse::Ignored
    }
}
