//! Input events as seen by tools

use glam::DVec2;
use serde::{Deserialize, Serialize};
use sp_core::SnapResult;

/// Keys the tools react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Enter,
    Delete,
    Backspace,
    /// Anything else
    Other,
}

impl Key {
    /// Map a key name (`"Escape"`, `"Enter"`, ...) to a key; case-insensitive
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "escape" | "esc" => Key::Escape,
            "enter" | "return" => Key::Enter,
            "delete" | "del" => Key::Delete,
            "backspace" => Key::Backspace,
            _ => Key::Other,
        }
    }
}

/// A pointer position in world space, snapped once per event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// Raw world position (used for hit-testing)
    pub world: DVec2,
    /// Snap result for `world` (used for placement)
    pub snap: SnapResult,
}

impl PointerInput {
    pub fn new(world: DVec2, snap: SnapResult) -> Self {
        Self { world, snap }
    }

    /// Unsnapped input
    pub fn raw(world: DVec2) -> Self {
        Self {
            world,
            snap: SnapResult::passthrough(world),
        }
    }

    /// The point to place or drag to
    pub fn point(&self) -> DVec2 {
        self.snap.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Escape"), Key::Escape);
        assert_eq!(Key::from_name("ENTER"), Key::Enter);
        assert_eq!(Key::from_name("Backspace"), Key::Backspace);
        assert_eq!(Key::from_name("q"), Key::Other);
    }
}
