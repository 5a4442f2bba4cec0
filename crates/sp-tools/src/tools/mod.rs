//! Tool implementations

mod chain;
mod circle;
mod line;
mod measure;
mod point;
mod select;

#[cfg(test)]
pub(crate) mod testing;

pub use chain::{ChainKind, ChainTool, VertexChain};
pub use circle::{CircleTool, MIN_RADIUS_CM};
pub use line::LineTool;
pub use measure::MeasureTool;
pub use point::PointTool;
pub use select::SelectTool;

use crate::kind::ToolKind;
use crate::tool::Tool;

/// Create a fresh, inactive tool of the given kind
pub fn create_tool(kind: ToolKind) -> Box<dyn Tool> {
    match kind {
        ToolKind::Select => Box::new(SelectTool::new()),
        ToolKind::Point => Box::new(PointTool::new()),
        ToolKind::Line => Box::new(LineTool::new()),
        ToolKind::Circle => Box::new(CircleTool::new()),
        ToolKind::Polyline => Box::new(ChainTool::polyline()),
        ToolKind::Polygon => Box::new(ChainTool::polygon()),
        ToolKind::Distance => Box::new(MeasureTool::new()),
        ToolKind::PathMeasure => Box::new(ChainTool::path_measure()),
        ToolKind::Area => Box::new(ChainTool::area()),
    }
}
