//! Replay scripts
//!
//! A script is a RON list of input events in screen pixels, e.g.
//!
//! ```ron
//! [
//!     Tool(Line),
//!     Click(0.0, 0.0),
//!     Click(2000.0, 0.0),
//!     Key("Escape"),
//! ]
//! ```

use glam::DVec2;
use serde::{Deserialize, Serialize};
use sp_core::{LayerError, SnapError};
use sp_tools::{Commit, DraftingSession, Key, ToolKind, ToolResponse};
use thiserror::Error;
use tracing::{debug, info};

/// Script errors
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to parse script: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Event {index}: {source}")]
    Layer {
        index: usize,
        #[source]
        source: LayerError,
    },

    #[error("Event {index}: {source}")]
    Snap {
        index: usize,
        #[source]
        source: SnapError,
    },
}

/// One scripted input event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEvent {
    Tool(ToolKind),
    Down(f64, f64),
    Move(f64, f64),
    Up(f64, f64),
    Click(f64, f64),
    DoubleClick(f64, f64),
    /// Key name such as `"Enter"` or `"Escape"`
    Key(String),
    Pan(f64, f64),
    Zoom(f64, f64, f64),
    Snap(bool),
    Grid(f64),
    ActiveLayer(String),
    /// Remove a layer; its objects move to the base layer
    RemoveLayer(String),
}

/// Counts of what a replay did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub committed: usize,
    pub rejected: usize,
}

/// Parse a RON event list
pub fn parse_script(source: &str) -> Result<Vec<ReplayEvent>, ScriptError> {
    Ok(ron::from_str(source)?)
}

/// Feed events through a session, stopping at the first invariant violation
pub fn replay(session: &mut DraftingSession, events: &[ReplayEvent]) -> Result<ReplaySummary, ScriptError> {
    let mut summary = ReplaySummary::default();

    for (index, event) in events.iter().enumerate() {
        debug!("Event {}: {:?}", index, event);
        let response = match event {
            ReplayEvent::Tool(kind) => {
                session.set_tool(*kind);
                ToolResponse::Updated
            }
            ReplayEvent::Down(x, y) => session.pointer_down(DVec2::new(*x, *y)),
            ReplayEvent::Move(x, y) => session.pointer_move(DVec2::new(*x, *y)),
            ReplayEvent::Up(x, y) => session.pointer_up(DVec2::new(*x, *y)),
            ReplayEvent::Click(x, y) => session.click(DVec2::new(*x, *y)),
            ReplayEvent::DoubleClick(x, y) => session.double_click(DVec2::new(*x, *y)),
            ReplayEvent::Key(name) => session.key_down(Key::from_name(name)),
            ReplayEvent::Pan(dx, dy) => {
                session.pan(DVec2::new(*dx, *dy));
                ToolResponse::Updated
            }
            ReplayEvent::Zoom(x, y, factor) => {
                session.zoom_at(DVec2::new(*x, *y), *factor);
                ToolResponse::Updated
            }
            ReplayEvent::Snap(enabled) => {
                session.set_snap_enabled(*enabled);
                ToolResponse::Updated
            }
            ReplayEvent::Grid(spacing) => {
                session
                    .set_grid_spacing(*spacing)
                    .map_err(|source| ScriptError::Snap { index, source })?;
                ToolResponse::Updated
            }
            ReplayEvent::ActiveLayer(id) => {
                session
                    .set_active_layer(id)
                    .map_err(|source| ScriptError::Layer { index, source })?;
                ToolResponse::Updated
            }
            ReplayEvent::RemoveLayer(id) => {
                session
                    .remove_layer(id)
                    .map_err(|source| ScriptError::Layer { index, source })?;
                ToolResponse::Updated
            }
        };

        summary.events += 1;
        match &response {
            ToolResponse::Committed(commit) => {
                summary.committed += 1;
                info!("[{}] {}: {}", index, session.tool_kind().name(), describe(commit));
            }
            ToolResponse::Rejected(rejection) => {
                summary.rejected += 1;
                info!("[{}] {} rejected: {}", index, session.tool_kind().name(), rejection);
            }
            ToolResponse::Ignored | ToolResponse::Updated => {}
        }
    }

    Ok(summary)
}

fn describe(commit: &Commit) -> String {
    match commit {
        Commit::Object(id) => format!("created object {}", id),
        Commit::Measurement(id) => format!("recorded measurement {}", id),
        Commit::Moved(id) => format!("moved object {}", id),
        Commit::Deleted(id) => format!("deleted object {}", id),
    }
}
