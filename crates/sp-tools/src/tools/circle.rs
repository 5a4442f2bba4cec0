//! Circle tool: center, then a point on the rim

use glam::DVec2;
use sp_core::{Geometry, Metadata};
use tracing::debug;

use crate::input::{Key, PointerInput};
use crate::kind::ToolKind;
use crate::preview::Preview;
use crate::tool::{CursorHint, KeyHandler, Rejection, Tool, ToolContext, ToolResponse};

/// Circles smaller than this are refused
pub const MIN_RADIUS_CM: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum CircleState {
    #[default]
    WaitingForCenter,
    WaitingForRadius { center: DVec2, cursor: DVec2 },
}

#[derive(Debug, Default)]
pub struct CircleTool {
    state: CircleState,
}

impl CircleTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.state = CircleState::WaitingForCenter;
    }
}

impl Tool for CircleTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Circle
    }

    fn on_activate(&mut self) {
        self.reset();
    }

    fn on_deactivate(&mut self) {
        self.reset();
    }

    fn on_pointer_move(&mut self, input: &PointerInput, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        if let CircleState::WaitingForRadius { cursor, .. } = &mut self.state {
            *cursor = input.point();
            return ToolResponse::Updated;
        }
        ToolResponse::Ignored
    }

    fn on_click(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse {
        let point = input.point();
        match self.state {
            CircleState::WaitingForCenter => {
                self.state = CircleState::WaitingForRadius {
                    center: point,
                    cursor: point,
                };
                ToolResponse::Updated
            }
            CircleState::WaitingForRadius { center, .. } => {
                let radius = center.distance(point);
                if radius < MIN_RADIUS_CM {
                    debug!("Circle rejected: radius {:.3} cm", radius);
                    return ToolResponse::Rejected(Rejection::RadiusTooSmall {
                        radius,
                        min: MIN_RADIUS_CM,
                    });
                }
                let response = ctx.commit_object(Geometry::Circle { center, radius }, Metadata::new());
                if response.is_committed() {
                    self.reset();
                }
                response
            }
        }
    }

    fn preview(&self) -> Option<Preview> {
        match self.state {
            CircleState::WaitingForRadius { center, cursor } => Some(Preview::Circle {
                center,
                radius: center.distance(cursor),
            }),
            CircleState::WaitingForCenter => None,
        }
    }

    fn cursor_hint(&self) -> CursorHint {
        CursorHint::Crosshair
    }

    fn key_handler(&mut self) -> Option<&mut dyn KeyHandler> {
        Some(self)
    }
}

impl KeyHandler for CircleTool {
    fn on_key_down(&mut self, key: Key, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        if key == Key::Escape && self.state != CircleState::WaitingForCenter {
            self.reset();
            return ToolResponse::Updated;
        }
        ToolResponse::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{Fixture, at};
    use approx::assert_relative_eq;

    #[test]
    fn test_center_then_radius() {
        let mut fx = Fixture::new();
        let mut tool = CircleTool::new();
        tool.on_click(&at(500.0, 400.0), &mut fx.ctx());
        assert!(tool.on_click(&at(500.0, 550.0), &mut fx.ctx()).is_committed());

        match &fx.model.iter().next().unwrap().geometry {
            Geometry::Circle { center, radius } => {
                assert_eq!(*center, DVec2::new(500.0, 400.0));
                assert_relative_eq!(*radius, 150.0);
            }
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn test_small_radius_rejected_state_kept() {
        let mut fx = Fixture::new();
        let mut tool = CircleTool::new();
        tool.on_click(&at(0.0, 0.0), &mut fx.ctx());

        let response = tool.on_click(&at(0.5, 0.5), &mut fx.ctx());
        assert!(response.is_rejected());
        assert!(fx.model.is_empty());

        // still waiting for the radius
        assert!(tool.on_click(&at(0.0, 30.0), &mut fx.ctx()).is_committed());
    }

    #[test]
    fn test_preview_radius_follows_cursor() {
        let mut fx = Fixture::new();
        let mut tool = CircleTool::new();
        tool.on_click(&at(0.0, 0.0), &mut fx.ctx());
        tool.on_pointer_move(&at(3.0, 4.0), &mut fx.ctx());
        assert_eq!(
            tool.preview(),
            Some(Preview::Circle {
                center: DVec2::ZERO,
                radius: 5.0
            })
        );
    }

    #[test]
    fn test_escape_resets() {
        let mut fx = Fixture::new();
        let mut tool = CircleTool::new();
        tool.on_click(&at(0.0, 0.0), &mut fx.ctx());
        tool.on_key_down(Key::Escape, &mut fx.ctx());
        assert!(tool.preview().is_none());
    }
}
