//! World/screen coordinate transform
//!
//! World space is centimeters; screen space is pixels of the drawing surface.
//! `screen = world * zoom + pan`.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smallest allowed zoom factor
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor
pub const MAX_ZOOM: f64 = 100.0;

/// Pan/zoom state of a viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    /// Horizontal pan in pixels
    pub pan_x: f64,
    /// Vertical pan in pixels
    pub pan_y: f64,
    /// Pixels per centimeter
    pub zoom: f64,
    /// Reserved; not applied by the pointer math
    pub rotation: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
            rotation: 0.0,
        }
    }
}

impl ViewportState {
    pub fn pan(&self) -> DVec2 {
        DVec2::new(self.pan_x, self.pan_y)
    }
}

/// Bidirectional world/screen mapping with anchored zoom
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportTransform {
    state: ViewportState,
}

impl ViewportTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an explicit state. A non-positive or non-finite zoom falls
    /// back to 1.
    pub fn from_state(mut state: ViewportState) -> Self {
        if !(state.zoom.is_finite() && state.zoom > 0.0) {
            state.zoom = 1.0;
        }
        state.zoom = state.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        Self { state }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    /// Convert a screen position (pixels) to world coordinates (cm)
    pub fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        (screen - self.state.pan()) / self.state.zoom
    }

    /// Convert world coordinates (cm) to a screen position (pixels)
    pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
        world * self.state.zoom + self.state.pan()
    }

    /// Shift the view by a screen-space delta
    pub fn pan(&mut self, delta: DVec2) {
        if !delta.is_finite() {
            return;
        }
        self.state.pan_x += delta.x;
        self.state.pan_y += delta.y;
    }

    /// Multiply zoom by `factor` keeping the world point under `anchor` fixed.
    /// Non-positive or non-finite factors are ignored.
    pub fn zoom_at(&mut self, anchor: DVec2, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) || !anchor.is_finite() {
            debug!("Ignored zoom factor {}", factor);
            return;
        }
        let world = self.screen_to_world(anchor);
        let zoom = (self.state.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let pan = anchor - world * zoom;

        self.state.zoom = zoom;
        self.state.pan_x = pan.x;
        self.state.pan_y = pan.y;
    }

    /// Back to identity: no pan, zoom 1
    pub fn reset(&mut self) {
        self.state = ViewportState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_vec_eq(a: DVec2, b: DVec2, eps: f64) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = eps);
        assert_abs_diff_eq!(a.y, b.y, epsilon = eps);
    }

    #[test]
    fn test_identity() {
        let vp = ViewportTransform::new();
        let p = DVec2::new(12.5, -7.0);
        assert_eq!(vp.screen_to_world(p), p);
        assert_eq!(vp.world_to_screen(p), p);
    }

    #[test]
    fn test_round_trip() {
        let mut vp = ViewportTransform::new();
        vp.pan(DVec2::new(123.4, -56.7));
        vp.zoom_at(DVec2::new(400.0, 300.0), 3.7);

        for (x, y) in [(0.0, 0.0), (1920.0, 1080.0), (-250.5, 13.25), (1e6, -1e6)] {
            let s = DVec2::new(x, y);
            let back = vp.world_to_screen(vp.screen_to_world(s));
            assert_vec_eq(back, s, 1e-9 * s.length().max(1.0));
        }
    }

    #[test]
    fn test_zoom_anchor_invariant() {
        let mut vp = ViewportTransform::new();
        vp.pan(DVec2::new(40.0, 25.0));
        let anchor = DVec2::new(640.0, 360.0);

        for factor in [2.0, 0.5, 1.25, 8.0] {
            let before = vp.screen_to_world(anchor);
            vp.zoom_at(anchor, factor);
            assert_vec_eq(vp.screen_to_world(anchor), before, 1e-9);
        }
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at(DVec2::ZERO, 1e6);
        assert_eq!(vp.zoom(), MAX_ZOOM);
        vp.zoom_at(DVec2::ZERO, 1e-9);
        assert_eq!(vp.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_invalid_zoom_factor_ignored() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at(DVec2::new(10.0, 10.0), 2.0);
        let before = vp.state();

        vp.zoom_at(DVec2::ZERO, 0.0);
        vp.zoom_at(DVec2::ZERO, -1.0);
        vp.zoom_at(DVec2::ZERO, f64::NAN);
        vp.zoom_at(DVec2::ZERO, f64::INFINITY);
        assert_eq!(vp.state(), before);
    }

    #[test]
    fn test_pan_in_pixels() {
        let mut vp = ViewportTransform::new();
        vp.zoom_at(DVec2::ZERO, 2.0);
        vp.pan(DVec2::new(10.0, -4.0));
        assert_eq!(vp.state().pan_x, 10.0);
        assert_eq!(vp.state().pan_y, -4.0);
        assert_vec_eq(vp.screen_to_world(DVec2::new(10.0, -4.0)), DVec2::ZERO, 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut vp = ViewportTransform::new();
        vp.pan(DVec2::new(5.0, 5.0));
        vp.zoom_at(DVec2::ZERO, 4.0);
        vp.reset();
        assert_eq!(vp.state(), ViewportState::default());
    }
}
