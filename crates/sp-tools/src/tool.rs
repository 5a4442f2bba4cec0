//! The tool capability and the context tools act on

use std::fmt;

use sp_core::{
    BASE_LAYER_ID, Geometry, GeometryModel, GeometryObject, HitTester, LayerRegistry,
    MEASUREMENT_LAYER_ID, Measurement, MeasurementId, MeasurementStore, Metadata, ObjectId,
    Selection, Style,
};
use tracing::{info, warn};

use crate::input::{Key, PointerInput};
use crate::kind::ToolKind;
use crate::preview::Preview;

/// Cursor the host should display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Crosshair,
    /// Dragging an object
    Move,
    /// Hovering a draggable selection
    Pointer,
}

/// What a committed action produced
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    /// A new geometry object
    Object(ObjectId),
    /// A new measurement
    Measurement(MeasurementId),
    /// An object was dragged to a new position
    Moved(ObjectId),
    /// An object was deleted
    Deleted(ObjectId),
}

/// Why a tool refused to commit. The tool keeps its state.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Circle radius under the minimum
    RadiusTooSmall { radius: f64, min: f64 },
    /// Both endpoints coincide
    ZeroLength,
    /// Completion requested with too few vertices
    TooFewPoints { required: usize, got: usize },
    /// The target layer is locked
    LayerLocked(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::RadiusTooSmall { radius, min } => {
                write!(f, "radius {:.2} cm is below {:.2} cm", radius, min)
            }
            Rejection::ZeroLength => write!(f, "zero-length segment"),
            Rejection::TooFewPoints { required, got } => {
                write!(f, "needs {} points, got {}", required, got)
            }
            Rejection::LayerLocked(id) => write!(f, "layer '{}' is locked", id),
        }
    }
}

/// Outcome of handling one event
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    /// The event meant nothing to the tool
    Ignored,
    /// Transient state or preview changed
    Updated,
    /// Something was written to the model or measurement store
    Committed(Commit),
    /// A commit was refused
    Rejected(Rejection),
}

impl ToolResponse {
    pub fn is_committed(&self) -> bool {
        matches!(self, ToolResponse::Committed(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ToolResponse::Rejected(_))
    }
}

/// Mutable access to the session state a tool may touch
pub struct ToolContext<'a> {
    pub model: &'a mut GeometryModel,
    pub layers: &'a mut LayerRegistry,
    pub measurements: &'a mut MeasurementStore,
    pub selection: &'a mut Selection,
    pub hit_tester: &'a HitTester,
    /// Style for new objects
    pub style: &'a Style,
}

impl ToolContext<'_> {
    /// Layer new objects go to. Falls back to the protected base layer,
    /// creating it, when no layer is active.
    pub fn target_layer(&mut self) -> String {
        if let Some(id) = self.layers.active_layer_id() {
            return id.to_string();
        }
        // a layer added to a registry without an active layer becomes active
        self.layers.ensure_layer(BASE_LAYER_ID);
        BASE_LAYER_ID.to_string()
    }

    /// Store a new object on the target layer
    pub fn commit_object(&mut self, geometry: Geometry, metadata: Metadata) -> ToolResponse {
        let layer_id = self.target_layer();
        if self.layers.is_locked(&layer_id) {
            warn!("Commit refused, layer '{}' is locked", layer_id);
            return ToolResponse::Rejected(Rejection::LayerLocked(layer_id));
        }

        let mut object = GeometryObject::new(layer_id, geometry, self.style.clone());
        object.metadata = metadata;
        let id = object.id.clone();
        info!(
            "Committed {} {} on layer '{}'",
            object.geometry.kind_name(),
            id,
            object.layer_id
        );
        self.model.insert(object);
        ToolResponse::Committed(Commit::Object(id))
    }

    /// Store a new measurement
    pub fn commit_measurement(&mut self, measurement: Measurement) -> ToolResponse {
        if self.layers.is_locked(MEASUREMENT_LAYER_ID) {
            warn!("Measurement refused, layer '{}' is locked", MEASUREMENT_LAYER_ID);
            return ToolResponse::Rejected(Rejection::LayerLocked(MEASUREMENT_LAYER_ID.to_string()));
        }
        info!("Measured {}: {}", measurement.kind, measurement.label());
        let id = self.measurements.add(measurement);
        ToolResponse::Committed(Commit::Measurement(id))
    }
}

/// Optional double-click capability
pub trait DoubleClickHandler {
    fn on_double_click(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse;
}

/// Optional keyboard capability
pub trait KeyHandler {
    fn on_key_down(&mut self, key: Key, ctx: &mut ToolContext<'_>) -> ToolResponse;
}

/// An interaction mode
///
/// Exactly one tool is active in a session. Switching tools deactivates the
/// previous one, which discards any construction in progress.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Called when the tool becomes active
    fn on_activate(&mut self);

    /// Called when the tool is replaced; drops transient state
    fn on_deactivate(&mut self);

    fn on_pointer_down(&mut self, _input: &PointerInput, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        ToolResponse::Ignored
    }

    fn on_pointer_move(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse;

    fn on_pointer_up(&mut self, _input: &PointerInput, _ctx: &mut ToolContext<'_>) -> ToolResponse {
        ToolResponse::Ignored
    }

    fn on_click(&mut self, input: &PointerInput, ctx: &mut ToolContext<'_>) -> ToolResponse;

    /// Current rubber band, if any
    fn preview(&self) -> Option<Preview>;

    fn cursor_hint(&self) -> CursorHint;

    /// True while the tool places or drags points, so snapped positions get
    /// an indicator
    fn uses_snap(&self) -> bool {
        true
    }

    fn double_click_handler(&mut self) -> Option<&mut dyn DoubleClickHandler> {
        None
    }

    fn key_handler(&mut self) -> Option<&mut dyn KeyHandler> {
        None
    }
}
