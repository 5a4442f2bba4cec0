//! Snapping engine
//!
//! Quantizes a raw world point to a precise candidate. Grid snapping rounds
//! each axis with `f64::round`, which breaks `.5` ties away from zero.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::notify::{ListenerId, Observers};

/// Snap errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapError {
    #[error("Grid spacing must be a positive finite number, got {0}")]
    InvalidGridSpacing(f64),
}

/// Snapping policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapMode {
    /// Pass points through
    None,
    /// Round to the nearest grid intersection
    #[default]
    Grid,
}

/// What a snapped point was snapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapKind {
    Grid,
}

impl SnapKind {
    pub fn name(&self) -> &'static str {
        match self {
            SnapKind::Grid => "Grid",
        }
    }
}

/// Result of snapping a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Candidate point (equal to the input when nothing snapped)
    pub point: DVec2,
    /// True if `point` differs from the input
    pub snapped: bool,
    pub kind: Option<SnapKind>,
}

impl SnapResult {
    /// Unsnapped passthrough
    pub fn passthrough(point: DVec2) -> Self {
        Self {
            point,
            snapped: false,
            kind: None,
        }
    }
}

/// Change notifications fired by [`SnapEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum SnapEvent {
    EnabledChanged(bool),
    GridSpacingChanged(f64),
    ModeChanged(SnapMode),
}

/// Stateful snapping policy
#[derive(Debug)]
pub struct SnapEngine {
    enabled: bool,
    grid_spacing: f64,
    mode: SnapMode,
    observers: Observers<SnapEvent>,
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self {
            enabled: true,
            grid_spacing: DEFAULT_GRID_SPACING,
            mode: SnapMode::Grid,
            observers: Observers::new(),
        }
    }
}

/// Default grid spacing in centimeters
pub const DEFAULT_GRID_SPACING: f64 = 10.0;

impl SnapEngine {
    /// Build an engine. Fails on an invalid grid spacing.
    pub fn new(enabled: bool, grid_spacing: f64, mode: SnapMode) -> Result<Self, SnapError> {
        validate_spacing(grid_spacing)?;
        Ok(Self {
            enabled,
            grid_spacing,
            mode,
            observers: Observers::new(),
        })
    }

    /// Snap a world point according to the current policy
    pub fn snap(&self, point: DVec2) -> SnapResult {
        if !self.enabled || !point.is_finite() {
            return SnapResult::passthrough(point);
        }
        match self.mode {
            SnapMode::None => SnapResult::passthrough(point),
            SnapMode::Grid => {
                let g = self.grid_spacing;
                let candidate = DVec2::new((point.x / g).round() * g, (point.y / g).round() * g);
                let snapped = candidate != point;
                SnapResult {
                    point: candidate,
                    snapped,
                    kind: snapped.then_some(SnapKind::Grid),
                }
            }
        }
    }

    // ============== Settings ==============

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn grid_spacing(&self) -> f64 {
        self.grid_spacing
    }

    pub fn mode(&self) -> SnapMode {
        self.mode
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        debug!("Snap enabled: {}", enabled);
        self.observers.notify(&SnapEvent::EnabledChanged(enabled));
    }

    /// Toggle snapping, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    pub fn set_grid_spacing(&mut self, spacing: f64) -> Result<(), SnapError> {
        validate_spacing(spacing)?;
        self.grid_spacing = spacing;
        debug!("Grid spacing: {} cm", spacing);
        self.observers.notify(&SnapEvent::GridSpacingChanged(spacing));
        Ok(())
    }

    pub fn set_mode(&mut self, mode: SnapMode) {
        self.mode = mode;
        self.observers.notify(&SnapEvent::ModeChanged(mode));
    }

    /// Subscribe to change events
    pub fn on_change(&mut self, listener: impl FnMut(&SnapEvent) + 'static) -> ListenerId {
        self.observers.subscribe(listener)
    }

    /// Drop a subscription
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }
}

fn validate_spacing(spacing: f64) -> Result<(), SnapError> {
    if spacing.is_finite() && spacing > 0.0 {
        Ok(())
    } else {
        Err(SnapError::InvalidGridSpacing(spacing))
    }
}
