//! Shared fixture for tool unit tests

use glam::DVec2;
use sp_core::{GeometryModel, HitTester, LayerRegistry, MeasurementStore, Selection, Style};

use crate::input::PointerInput;
use crate::tool::ToolContext;

pub(crate) struct Fixture {
    pub model: GeometryModel,
    pub layers: LayerRegistry,
    pub measurements: MeasurementStore,
    pub selection: Selection,
    pub hit_tester: HitTester,
    pub style: Style,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            model: GeometryModel::new(),
            layers: LayerRegistry::new(),
            measurements: MeasurementStore::new(),
            selection: Selection::new(),
            hit_tester: HitTester::default(),
            style: Style::default(),
        }
    }

    pub fn ctx(&mut self) -> ToolContext<'_> {
        ToolContext {
            model: &mut self.model,
            layers: &mut self.layers,
            measurements: &mut self.measurements,
            selection: &mut self.selection,
            hit_tester: &self.hit_tester,
            style: &self.style,
        }
    }
}

/// Unsnapped pointer input at a world position
pub(crate) fn at(x: f64, y: f64) -> PointerInput {
    PointerInput::raw(DVec2::new(x, y))
}
