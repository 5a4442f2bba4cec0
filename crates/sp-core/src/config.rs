//! Editor configuration types
//!
//! Plain serde data. Loading from disk belongs to the binary.

use serde::{Deserialize, Serialize};

use crate::geometry::Style;
use crate::hit::DEFAULT_TOLERANCE_CM;
use crate::snap::{DEFAULT_GRID_SPACING, SnapMode};

/// Snapping preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapConfig {
    /// Snap placed points
    pub enabled: bool,
    /// Grid spacing in centimeters
    pub grid_spacing: f64,
    /// Snap policy
    pub mode: SnapMode,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            grid_spacing: DEFAULT_GRID_SPACING,
            mode: SnapMode::Grid,
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    /// Snap settings
    #[serde(default)]
    pub snap: SnapConfig,
    /// Pick tolerance in centimeters
    #[serde(default = "default_tolerance")]
    pub hit_tolerance_cm: f64,
    /// Style given to newly drawn objects
    #[serde(default)]
    pub default_style: Style,
    /// Layer that is active when a session starts
    #[serde(default = "default_active_layer")]
    pub initial_active_layer: String,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_CM
}

fn default_active_layer() -> String {
    "property".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            snap: SnapConfig::default(),
            hit_tolerance_cm: default_tolerance(),
            default_style: Style::default(),
            initial_active_layer: default_active_layer(),
        }
    }
}

impl EditorConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}
