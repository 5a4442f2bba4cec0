//! Site Plan Tools
//!
//! Interaction layer of the drafting engine: one state machine per drawing or
//! measuring mode, the [`Tool`] capability they share, and the
//! [`DraftingSession`] that owns all state and feeds screen-space events
//! through the viewport and snap engine into the active tool.

pub mod input;
pub mod kind;
pub mod preview;
pub mod render;
pub mod session;
pub mod tool;
pub mod tools;

pub use input::{Key, PointerInput};
pub use kind::ToolKind;
pub use preview::{Preview, SnapIndicator};
pub use render::{LayerSnapshot, RenderSnapshot};
pub use session::DraftingSession;
pub use tool::{
    Commit, CursorHint, DoubleClickHandler, KeyHandler, Rejection, Tool, ToolContext, ToolResponse,
};
pub use tools::create_tool;
