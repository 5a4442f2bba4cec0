//! Drafting session
//!
//! Owns every piece of interaction state and routes screen-space events to
//! the active tool. Events are handled one at a time, to completion.

use glam::DVec2;
use sp_core::{
    BASE_LAYER_ID, DocumentError, EditorConfig, GeometryModel, HitTester, Layer, LayerError,
    LayerRegistry, MeasurementStore, ProjectDocument, ProjectMetadata, Selection, SnapEngine,
    SnapError, Style, ViewportTransform, serialize_project,
};
use tracing::{debug, info, warn};

use crate::input::{Key, PointerInput};
use crate::kind::ToolKind;
use crate::preview::{Preview, SnapIndicator};
use crate::render::RenderSnapshot;
use crate::tool::{CursorHint, Tool, ToolContext, ToolResponse};
use crate::tools::create_tool;

/// One interactive drafting session
pub struct DraftingSession {
    model: GeometryModel,
    layers: LayerRegistry,
    measurements: MeasurementStore,
    selection: Selection,
    snap: SnapEngine,
    viewport: ViewportTransform,
    hit_tester: HitTester,
    style: Style,
    tool: Box<dyn Tool>,
    snap_indicator: Option<SnapIndicator>,
    project_id: Option<String>,
    metadata: Option<ProjectMetadata>,
}

impl DraftingSession {
    /// Create a session with seeded layers and the select tool active
    pub fn new(config: &EditorConfig) -> Self {
        let snap = SnapEngine::new(config.snap.enabled, config.snap.grid_spacing, config.snap.mode)
            .unwrap_or_else(|e| {
                warn!("{}; using default snap settings", e);
                SnapEngine::default()
            });

        let mut layers = LayerRegistry::new();
        if let Err(e) = layers.set_active(&config.initial_active_layer) {
            warn!("Initial active layer not set: {}", e);
        }

        let mut tool = create_tool(ToolKind::Select);
        tool.on_activate();

        Self {
            model: GeometryModel::new(),
            layers,
            measurements: MeasurementStore::new(),
            selection: Selection::new(),
            snap,
            viewport: ViewportTransform::new(),
            hit_tester: HitTester::new(config.hit_tolerance_cm),
            style: config.default_style.clone(),
            tool,
            snap_indicator: None,
            project_id: None,
            metadata: None,
        }
    }

    // ============== Accessors ==============

    pub fn model(&self) -> &GeometryModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut GeometryModel {
        &mut self.model
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerRegistry {
        &mut self.layers
    }

    pub fn measurements(&self) -> &MeasurementStore {
        &self.measurements
    }

    pub fn measurements_mut(&mut self) -> &mut MeasurementStore {
        &mut self.measurements
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn snap(&self) -> &SnapEngine {
        &self.snap
    }

    pub fn snap_mut(&mut self) -> &mut SnapEngine {
        &mut self.snap
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.tool.kind()
    }

    pub fn cursor_hint(&self) -> CursorHint {
        self.tool.cursor_hint()
    }

    pub fn preview(&self) -> Option<Preview> {
        self.tool.preview()
    }

    pub fn snap_indicator(&self) -> Option<SnapIndicator> {
        self.snap_indicator
    }

    // ============== Settings ==============

    /// Switch tools. The old tool's construction is discarded, the selection
    /// and the snap indicator are cleared.
    pub fn set_tool(&mut self, kind: ToolKind) {
        self.tool.on_deactivate();
        if !self.selection.is_empty() {
            self.selection.deselect();
        }
        self.snap_indicator = None;

        let mut tool = create_tool(kind);
        tool.on_activate();
        self.tool = tool;
        info!("Tool: {}", kind.name());
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap.set_enabled(enabled);
    }

    pub fn set_grid_spacing(&mut self, spacing: f64) -> Result<(), SnapError> {
        self.snap.set_grid_spacing(spacing)
    }

    pub fn set_active_layer(&mut self, id: &str) -> Result<(), LayerError> {
        self.layers.set_active(id)
    }

    /// Remove a layer. Objects still on it move to the base layer, which is
    /// created if needed, so nothing is left on a layer that does not exist.
    pub fn remove_layer(&mut self, id: &str) -> Result<Layer, LayerError> {
        let removed = self.layers.remove_layer(id)?;
        if self.model.objects_on_layer(id).next().is_some() {
            self.layers.ensure_layer(BASE_LAYER_ID);
            let moved = self.model.reassign_layer(id, BASE_LAYER_ID);
            info!("Moved {} objects from removed layer {} to {}", moved, id, BASE_LAYER_ID);
        }
        Ok(removed)
    }

    // ============== Pointer and keyboard ==============

    pub fn pointer_down(&mut self, screen: DVec2) -> ToolResponse {
        self.dispatch(screen, |tool, input, ctx| tool.on_pointer_down(input, ctx))
    }

    pub fn pointer_move(&mut self, screen: DVec2) -> ToolResponse {
        self.dispatch(screen, |tool, input, ctx| tool.on_pointer_move(input, ctx))
    }

    pub fn pointer_up(&mut self, screen: DVec2) -> ToolResponse {
        self.dispatch(screen, |tool, input, ctx| tool.on_pointer_up(input, ctx))
    }

    pub fn click(&mut self, screen: DVec2) -> ToolResponse {
        self.dispatch(screen, |tool, input, ctx| tool.on_click(input, ctx))
    }

    pub fn double_click(&mut self, screen: DVec2) -> ToolResponse {
        self.dispatch(screen, |tool, input, ctx| match tool.double_click_handler() {
            Some(handler) => handler.on_double_click(input, ctx),
            None => ToolResponse::Ignored,
        })
    }

    pub fn key_down(&mut self, key: Key) -> ToolResponse {
        let mut ctx = ToolContext {
            model: &mut self.model,
            layers: &mut self.layers,
            measurements: &mut self.measurements,
            selection: &mut self.selection,
            hit_tester: &self.hit_tester,
            style: &self.style,
        };
        let response = match self.tool.key_handler() {
            Some(handler) => handler.on_key_down(key, &mut ctx),
            None => ToolResponse::Ignored,
        };
        if key == Key::Escape {
            self.snap_indicator = None;
        }
        response
    }

    fn dispatch(
        &mut self,
        screen: DVec2,
        handler: impl FnOnce(&mut dyn Tool, &PointerInput, &mut ToolContext<'_>) -> ToolResponse,
    ) -> ToolResponse {
        let world = self.viewport.screen_to_world(screen);
        let input = PointerInput::new(world, self.snap.snap(world));
        let mut ctx = ToolContext {
            model: &mut self.model,
            layers: &mut self.layers,
            measurements: &mut self.measurements,
            selection: &mut self.selection,
            hit_tester: &self.hit_tester,
            style: &self.style,
        };
        let response = handler(self.tool.as_mut(), &input, &mut ctx);

        self.snap_indicator = (input.snap.snapped && self.tool.uses_snap()).then(|| SnapIndicator {
            point: input.snap.point,
            zoom: self.viewport.zoom(),
        });
        if let ToolResponse::Rejected(rejection) = &response {
            debug!("{} rejected: {}", self.tool.kind().name(), rejection);
        }
        response
    }

    // ============== Viewport ==============

    /// Pan by a screen-space delta
    pub fn pan(&mut self, delta: DVec2) {
        self.viewport.pan(delta);
    }

    /// Zoom around a screen position
    pub fn zoom_at(&mut self, screen: DVec2, factor: f64) {
        self.viewport.zoom_at(screen, factor);
        if let Some(indicator) = &mut self.snap_indicator {
            indicator.zoom = self.viewport.zoom();
        }
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    // ============== Rendering and persistence ==============

    /// Build the renderer view. A stale selection is dropped first.
    pub fn render_snapshot(&mut self) -> RenderSnapshot {
        self.selection.reconcile(&self.model);
        RenderSnapshot::build(
            self.viewport.state(),
            &self.layers,
            &self.model,
            &self.measurements,
            self.tool.preview(),
            self.snap_indicator,
            self.selection.selected().cloned(),
        )
    }

    /// Capture the project as a document
    pub fn to_document(&self, name: &str) -> ProjectDocument {
        let metadata = match &self.metadata {
            Some(existing) => {
                let mut metadata = existing.clone();
                metadata.name = name.to_string();
                metadata.touch();
                metadata
            }
            None => ProjectMetadata::new(name),
        };
        serialize_project(
            self.project_id.as_deref(),
            metadata,
            &self.model,
            &self.layers,
            &self.measurements,
        )
    }

    /// Replace the project with a loaded document
    pub fn load_document(&mut self, document: ProjectDocument) -> Result<(), DocumentError> {
        let project_id = document.project_id.clone();
        let metadata = document.metadata.clone();
        document.apply(&mut self.model, &mut self.layers, &mut self.measurements)?;

        self.project_id = Some(project_id);
        self.metadata = Some(metadata);
        if !self.selection.is_empty() {
            self.selection.deselect();
        }
        self.tool.on_deactivate();
        self.tool.on_activate();
        self.snap_indicator = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sp_core::{Geometry, MeasurementKind, ObjectId};

    fn session() -> DraftingSession {
        DraftingSession::new(&EditorConfig::default())
    }

    fn p(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn test_line_then_distance() {
        let mut s = session();
        s.set_tool(ToolKind::Line);
        s.click(p(0.0, 0.0));
        assert!(s.click(p(2000.0, 0.0)).is_committed());

        let line = s.model().iter().next().unwrap();
        assert_eq!(
            line.geometry,
            Geometry::Line {
                start: p(0.0, 0.0),
                end: p(2000.0, 0.0)
            }
        );

        s.set_tool(ToolKind::Distance);
        s.click(p(0.0, 0.0));
        assert!(s.click(p(2000.0, 0.0)).is_committed());
        let m = s.measurements().iter().next().unwrap();
        assert_eq!(m.kind, MeasurementKind::Distance);
        assert_relative_eq!(m.value, 2000.0);
    }

    #[test]
    fn test_circle_center_and_rim() {
        let mut s = session();
        s.set_tool(ToolKind::Circle);
        s.click(p(500.0, 400.0));
        s.click(p(500.0, 550.0));

        match &s.model().iter().next().unwrap().geometry {
            Geometry::Circle { center, radius } => {
                assert_eq!(*center, p(500.0, 400.0));
                assert_relative_eq!(*radius, 150.0);
            }
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn test_square_polygon_metadata() {
        let mut s = session();
        s.set_tool(ToolKind::Polygon);
        for point in [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0)] {
            s.click(point);
        }
        assert!(s.key_down(Key::Enter).is_committed());

        let polygon = s.model().iter().next().unwrap();
        assert_eq!(polygon.layer_id, "property");
        assert_relative_eq!(polygon.metadata["area"].as_f64().unwrap(), 10_000.0);
        assert_relative_eq!(polygon.metadata["perimeter"].as_f64().unwrap(), 400.0);
    }

    #[test]
    fn test_removing_active_layer() {
        let mut s = session();
        s.set_active_layer("buildings").unwrap();
        s.remove_layer("buildings").unwrap();
        let active = s.layers().active_layer_id().unwrap().to_string();
        assert!(s.layers().contains(&active));

        let ids: Vec<String> = s.layers().all_layers().iter().map(|l| l.id.clone()).collect();
        for id in ids {
            s.remove_layer(&id).unwrap();
        }
        assert_eq!(s.layers().active_layer_id(), None);
    }

    #[test]
    fn test_removed_layer_objects_move_to_base_layer() {
        let mut s = session();
        s.set_active_layer("buildings").unwrap();
        s.set_tool(ToolKind::Point);
        s.click(p(100.0, 100.0));
        let id = s.model().iter().next().unwrap().id.clone();

        s.remove_layer("buildings").unwrap();
        assert_eq!(s.model().get(&id).unwrap().layer_id, BASE_LAYER_ID);
        assert!(s.layers().contains(BASE_LAYER_ID));

        let snapshot = s.render_snapshot();
        assert_eq!(snapshot.objects().count(), 1);

        s.set_tool(ToolKind::Select);
        s.click(p(100.0, 100.0));
        assert_eq!(s.selection().selected(), Some(&id));
    }

    #[test]
    fn test_removing_empty_layer_creates_no_base_layer() {
        let mut s = session();
        s.remove_layer("utilities").unwrap();
        assert!(!s.layers().contains(BASE_LAYER_ID));
        assert!(matches!(
            s.remove_layer(BASE_LAYER_ID),
            Err(LayerError::ProtectedLayer(_))
        ));
    }

    #[test]
    fn test_drag_point_by_offset() {
        let mut s = session();
        s.set_tool(ToolKind::Point);
        s.click(p(100.0, 100.0));
        let original = s.model().iter().next().unwrap().clone();

        s.set_tool(ToolKind::Select);
        s.click(p(100.0, 100.0));
        assert_eq!(s.selection().selected(), Some(&original.id));

        s.pointer_down(p(100.0, 100.0));
        s.pointer_move(p(130.0, 90.0));
        s.pointer_move(p(150.0, 80.0));
        s.pointer_up(p(150.0, 80.0));
        s.click(p(150.0, 80.0));

        assert_eq!(s.model().len(), 1);
        let moved = s.model().get(&original.id).unwrap();
        assert_eq!(moved.geometry.anchor(), original.geometry.anchor() + p(50.0, -20.0));
        assert_eq!(moved.style, original.style);
        assert_eq!(s.selection().selected(), Some(&original.id));
    }

    #[test]
    fn test_snapped_placement_and_indicator() {
        let mut s = session();
        s.set_tool(ToolKind::Point);
        s.pointer_move(p(12.0, 17.0));
        let indicator = s.snap_indicator().unwrap();
        assert_eq!(indicator.point, p(10.0, 20.0));
        assert_eq!(indicator.zoom, 1.0);

        s.click(p(12.0, 17.0));
        assert_eq!(
            s.model().iter().next().unwrap().geometry,
            Geometry::Point {
                position: p(10.0, 20.0)
            }
        );

        s.pointer_move(p(30.0, 40.0));
        assert!(s.snap_indicator().is_none());
    }

    #[test]
    fn test_select_tool_shows_no_indicator_when_idle() {
        let mut s = session();
        s.pointer_move(p(12.0, 17.0));
        assert!(s.snap_indicator().is_none());
    }

    #[test]
    fn test_screen_events_use_viewport() {
        let mut s = session();
        s.set_snap_enabled(false);
        s.zoom_at(p(0.0, 0.0), 2.0);
        s.pan(p(100.0, 50.0));
        s.set_tool(ToolKind::Point);
        s.click(p(300.0, 250.0));

        assert_eq!(
            s.model().iter().next().unwrap().geometry,
            Geometry::Point {
                position: p(100.0, 100.0)
            }
        );
        s.reset_view();
        assert_eq!(s.viewport().zoom(), 1.0);
    }

    #[test]
    fn test_tool_switch_discards_construction_and_selection() {
        let mut s = session();
        s.set_tool(ToolKind::Point);
        s.click(p(0.0, 0.0));
        s.set_tool(ToolKind::Select);
        s.click(p(0.0, 0.0));
        assert!(!s.selection().is_empty());

        s.set_tool(ToolKind::Polyline);
        assert!(s.selection().is_empty());
        s.click(p(0.0, 0.0));
        s.click(p(50.0, 0.0));
        assert!(s.preview().is_some());

        s.set_tool(ToolKind::Line);
        assert!(s.preview().is_none());
        assert_eq!(s.model().len(), 1);
    }

    #[test]
    fn test_double_click_completes_polyline() {
        let mut s = session();
        s.set_tool(ToolKind::Polyline);
        s.click(p(0.0, 0.0));
        s.click(p(100.0, 0.0));
        s.click(p(100.0, 0.0));
        assert!(s.double_click(p(100.0, 0.0)).is_committed());
        assert_relative_eq!(
            s.model().iter().next().unwrap().metadata["length"].as_f64().unwrap(),
            100.0
        );

        s.set_tool(ToolKind::Point);
        assert_eq!(s.double_click(p(0.0, 0.0)), ToolResponse::Ignored);
    }

    #[test]
    fn test_render_snapshot_reconciles_stale_selection() {
        let mut s = session();
        s.set_tool(ToolKind::Point);
        s.click(p(0.0, 0.0));
        s.set_tool(ToolKind::Select);
        s.click(p(0.0, 0.0));
        let id: ObjectId = s.selection().selected().cloned().unwrap();

        s.model_mut().remove(&id);
        let snapshot = s.render_snapshot();
        assert!(snapshot.selected.is_none());
        assert!(s.selection().is_empty());
    }

    #[test]
    fn test_document_round_trip() {
        let mut s = session();
        s.set_tool(ToolKind::Circle);
        s.click(p(0.0, 0.0));
        s.click(p(0.0, 100.0));
        s.set_tool(ToolKind::Area);
        for point in [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0)] {
            s.click(point);
        }
        s.key_down(Key::Enter);

        let doc = s.to_document("Backyard");
        let json = doc.to_json_pretty().unwrap();

        let mut other = session();
        other
            .load_document(sp_core::deserialize_project(&json).unwrap())
            .unwrap();
        assert_eq!(other.model().len(), 1);
        assert_eq!(other.measurements().len(), 1);
        assert_eq!(other.to_document("Backyard").project_id, doc.project_id);
    }
}
