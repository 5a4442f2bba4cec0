//! Select tool: pick, drag and delete single objects

use glam::DVec2;
use sp_core::{GeometryObject, ObjectId};
use tracing::{debug, info};

use crate::input::{Key, PointerInput};
use crate::kind::ToolKind;
use crate::preview::Preview;
use crate::tool::{Commit, CursorHint, KeyHandler, Tool, ToolContext, ToolResponse};

/// Drag in progress
#[derive(Debug, Clone)]
struct DragState {
    /// Snapped world point at pointer-down
    start: DVec2,
    /// Object as it was when the drag started
    original: GeometryObject,
    moved: bool,
}

#[derive(Debug, Default)]
pub struct SelectTool {
    drag: Option<DragState>,
    /// Swallow the click the host sends after a drag that moved something
    suppress_click: bool,
    hovering_selection: bool,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn reset(&mut self) {
        self.drag = None;
        self.suppress_click = false;
        self.hovering_selection = false;
    }

    fn selection_hit<'a>(ctx: &'a ToolContext<'_>, input: &PointerInput) -> Option<&'a GeometryObject> {
        ctx.selection
            .resolve(ctx.model)
            .filter(|object| ctx.hit_tester.hit_test(object, input.world))
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn on_activate(&mut self) {
        self.reset();
    }

    fn on_deactivate(&mut self) {
        self.reset();
    }

    fn on_pointer_down(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse {
        self.suppress_click = false;
        let Some(object) = Self::selection_hit(ctx, input) else {
            return ToolResponse::Ignored;
        };
        if ctx.layers.is_locked(&object.layer_id) {
            debug!("Drag refused, layer '{}' is locked", object.layer_id);
            return ToolResponse::Ignored;
        }

        debug!("Drag start {} at {:?}", object.id, object.geometry.anchor());
        self.drag = Some(DragState {
            start: input.point(),
            original: object.clone(),
            moved: false,
        });
        ToolResponse::Updated
    }

    fn on_pointer_move(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse {
        let Some(drag) = &mut self.drag else {
            self.hovering_selection = Self::selection_hit(ctx, input).is_some();
            return ToolResponse::Ignored;
        };

        let delta = input.point() - drag.start;
        let original = &drag.original;
        let moved = original.with_geometry(original.geometry.translated(delta));
        if !ctx.model.replace(moved) {
            debug!("Dragged object {} disappeared", original.id);
            self.drag = None;
            return ToolResponse::Ignored;
        }
        drag.moved |= delta != DVec2::ZERO;
        ToolResponse::Updated
    }

    fn on_pointer_up(&mut self, _input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse {
        let Some(drag) = self.drag.take() else {
            return ToolResponse::Ignored;
        };
        if !drag.moved {
            return ToolResponse::Ignored;
        }

        self.suppress_click = true;
        let id = drag.original.id;
        if let Some(object) = ctx.model.get(&id) {
            info!(
                "Moved {} {} to {:?}",
                object.geometry.kind_name(),
                id,
                object.geometry.anchor()
            );
        }
        ToolResponse::Committed(Commit::Moved(id))
    }

    fn on_click(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse {
        if std::mem::take(&mut self.suppress_click) {
            return ToolResponse::Ignored;
        }

        let picked: Option<ObjectId> = ctx.hit_tester.pick(ctx.model, input.world).map(|o| o.id.clone());
        match picked {
            Some(id) => ctx.selection.select(id),
            None => ctx.selection.deselect(),
        }
        ToolResponse::Updated
    }

    fn preview(&self) -> Option<Preview> {
        None
    }

    fn cursor_hint(&self) -> CursorHint {
        if self.drag.is_some() {
            CursorHint::Move
        } else if self.hovering_selection {
            CursorHint::Pointer
        } else {
            CursorHint::Default
        }
    }

    fn uses_snap(&self) -> bool {
        self.drag.is_some()
    }

    fn key_handler(&mut self) -> Option<&mut dyn KeyHandler> {
        Some(self)
    }
}

impl KeyHandler for SelectTool {
    fn on_key_down(&mut self, key: Key, ctx: &mut ToolContext<'_>) -> ToolResponse {
        match key {
            Key::Delete | Key::Backspace => {
                let Some(id) = ctx.selection.resolve(ctx.model).map(|o| o.id.clone()) else {
                    return ToolResponse::Ignored;
                };
                self.drag = None;
                ctx.model.remove(&id);
                ctx.selection.deselect();
                info!("Deleted {}", id);
                ToolResponse::Committed(Commit::Deleted(id))
            }
            Key::Escape => {
                // abandon a drag by putting the object back
                if let Some(drag) = self.drag.take() {
                    ctx.model.replace(drag.original);
                }
                ctx.selection.deselect();
                ToolResponse::Updated
            }
            _ => ToolResponse::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{Fixture, at};
    use sp_core::{Geometry, Style};

    fn add_point(fx: &mut Fixture, x: f64, y: f64) -> ObjectId {
        let object = GeometryObject::new(
            "property",
            Geometry::Point {
                position: DVec2::new(x, y),
            },
            Style::default(),
        );
        let id = object.id.clone();
        fx.model.insert(object);
        id
    }

    #[test]
    fn test_click_selects_topmost() {
        let mut fx = Fixture::new();
        let _below = add_point(&mut fx, 0.0, 0.0);
        let above = add_point(&mut fx, 1.0, 0.0);
        let mut tool = SelectTool::new();

        tool.on_click(&at(0.5, 0.0), &mut fx.ctx());
        assert_eq!(fx.selection.selected(), Some(&above));

        tool.on_click(&at(500.0, 0.0), &mut fx.ctx());
        assert!(fx.selection.is_empty());
    }

    #[test]
    fn test_drag_replaces_object() {
        let mut fx = Fixture::new();
        let id = add_point(&mut fx, 100.0, 100.0);
        fx.selection.select(id.clone());
        let mut tool = SelectTool::new();

        assert_eq!(tool.on_pointer_down(&at(100.0, 100.0), &mut fx.ctx()), ToolResponse::Updated);
        assert_eq!(tool.cursor_hint(), CursorHint::Move);
        tool.on_pointer_move(&at(120.0, 90.0), &mut fx.ctx());
        tool.on_pointer_move(&at(150.0, 80.0), &mut fx.ctx());
        let response = tool.on_pointer_up(&at(150.0, 80.0), &mut fx.ctx());
        assert_eq!(response, ToolResponse::Committed(Commit::Moved(id.clone())));

        let moved = fx.model.get(&id).unwrap();
        assert_eq!(moved.geometry.anchor(), DVec2::new(150.0, 80.0));
        assert_eq!(fx.model.len(), 1);

        // the click that follows the drag does not change the selection
        assert_eq!(tool.on_click(&at(150.0, 80.0), &mut fx.ctx()), ToolResponse::Ignored);
        assert_eq!(fx.selection.selected(), Some(&id));
    }

    #[test]
    fn test_press_without_motion_then_click_picks() {
        let mut fx = Fixture::new();
        let a = add_point(&mut fx, 0.0, 0.0);
        let b = add_point(&mut fx, 300.0, 0.0);
        fx.selection.select(a.clone());
        let mut tool = SelectTool::new();

        assert_eq!(tool.on_pointer_down(&at(300.0, 0.0), &mut fx.ctx()), ToolResponse::Ignored);
        assert_eq!(tool.on_pointer_up(&at(300.0, 0.0), &mut fx.ctx()), ToolResponse::Ignored);
        tool.on_click(&at(300.0, 0.0), &mut fx.ctx());
        assert_eq!(fx.selection.selected(), Some(&b));
    }

    #[test]
    fn test_locked_layer_blocks_drag() {
        let mut fx = Fixture::new();
        let id = add_point(&mut fx, 0.0, 0.0);
        fx.selection.select(id);
        fx.layers.set_locked("property", true).unwrap();
        let mut tool = SelectTool::new();

        assert_eq!(tool.on_pointer_down(&at(0.0, 0.0), &mut fx.ctx()), ToolResponse::Ignored);
        assert!(!tool.is_dragging());
    }

    #[test]
    fn test_delete_selected() {
        let mut fx = Fixture::new();
        let id = add_point(&mut fx, 0.0, 0.0);
        let mut tool = SelectTool::new();
        tool.on_click(&at(0.0, 0.0), &mut fx.ctx());

        let response = tool.on_key_down(Key::Delete, &mut fx.ctx());
        assert_eq!(response, ToolResponse::Committed(Commit::Deleted(id)));
        assert!(fx.model.is_empty());
        assert!(fx.selection.is_empty());
        assert_eq!(tool.on_key_down(Key::Backspace, &mut fx.ctx()), ToolResponse::Ignored);
    }

    #[test]
    fn test_escape_abandons_drag() {
        let mut fx = Fixture::new();
        let id = add_point(&mut fx, 0.0, 0.0);
        fx.selection.select(id.clone());
        let mut tool = SelectTool::new();

        tool.on_pointer_down(&at(0.0, 0.0), &mut fx.ctx());
        tool.on_pointer_move(&at(40.0, 0.0), &mut fx.ctx());
        tool.on_key_down(Key::Escape, &mut fx.ctx());

        assert_eq!(fx.model.get(&id).unwrap().geometry.anchor(), DVec2::ZERO);
        assert!(!tool.is_dragging());
    }
}
