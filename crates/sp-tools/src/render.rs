//! Renderer-facing snapshot
//!
//! Everything an external renderer needs to draw one frame, in draw order.

use serde::Serialize;
use sp_core::{
    GeometryModel, GeometryObject, Layer, LayerRegistry, MEASUREMENT_LAYER_ID, Measurement,
    MeasurementStore, ObjectId, ViewportState,
};

use crate::preview::{Preview, SnapIndicator};

/// One visible layer with its content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSnapshot {
    pub layer: Layer,
    pub objects: Vec<GeometryObject>,
    /// Only filled for the measurement layer
    pub measurements: Vec<Measurement>,
}

/// A frame's worth of state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub viewport: ViewportState,
    /// Visible layers, lowest order first
    pub layers: Vec<LayerSnapshot>,
    pub preview: Option<Preview>,
    pub snap_indicator: Option<SnapIndicator>,
    pub selected: Option<ObjectId>,
}

impl RenderSnapshot {
    pub fn build(
        viewport: ViewportState,
        layers: &LayerRegistry,
        model: &GeometryModel,
        measurements: &MeasurementStore,
        preview: Option<Preview>,
        snap_indicator: Option<SnapIndicator>,
        selected: Option<ObjectId>,
    ) -> Self {
        let layers = layers
            .visible_layers()
            .into_iter()
            .map(|layer| LayerSnapshot {
                objects: model.objects_on_layer(&layer.id).cloned().collect(),
                measurements: if layer.id == MEASUREMENT_LAYER_ID {
                    measurements.iter().cloned().collect()
                } else {
                    Vec::new()
                },
                layer: layer.clone(),
            })
            .collect();

        Self {
            viewport,
            layers,
            preview,
            snap_indicator,
            selected,
        }
    }

    /// Every measurement that will be drawn
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.layers.iter().flat_map(|l| l.measurements.iter())
    }

    /// Every object that will be drawn, in draw order
    pub fn objects(&self) -> impl Iterator<Item = &GeometryObject> {
        self.layers.iter().flat_map(|l| l.objects.iter())
    }
}
