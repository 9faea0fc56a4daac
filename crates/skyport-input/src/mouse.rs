//! Pointer motion accumulated per frame for mouse look.

use glam::Vec2;

/// Frame-coherent pointer state.
///
/// While the cursor is captured, raw `DeviceEvent::MouseMotion` deltas drive
/// the look delta. Otherwise successive `CursorMoved` positions do. The first
/// cursor sample only seeds the position so that the camera does not jump
/// when the pointer first enters the window.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Option<Vec2>,
    delta: Vec2,
    captured: bool,
}

impl MouseState {
    /// Creates a new `MouseState` with no position and zero delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a `CursorMoved` event.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if !self.captured
            && let Some(prev) = self.position
        {
            self.delta += new_pos - prev;
        }
        self.position = Some(new_pos);
    }

    /// Process a `DeviceEvent::MouseMotion` raw delta (used when captured).
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.captured {
            self.delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Process a `CursorLeft` event. The next sample re-seeds the position.
    pub fn on_cursor_left(&mut self) {
        self.position = None;
    }

    /// Capture or release the cursor on `window`.
    ///
    /// Captured means hidden and locked (or confined where locking is not
    /// supported), with look input taken from raw motion.
    pub fn set_captured(&mut self, window: &winit::window::Window, captured: bool) {
        use winit::window::CursorGrabMode;
        self.captured = captured;
        if captured {
            if window.set_cursor_grab(CursorGrabMode::Locked).is_err()
                && let Err(e) = window.set_cursor_grab(CursorGrabMode::Confined)
            {
                tracing::warn!("Cursor grab unavailable, falling back to cursor deltas: {e}");
                self.captured = false;
            }
            window.set_cursor_visible(!self.captured);
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                tracing::debug!("Cursor release failed: {e}");
            }
            window.set_cursor_visible(true);
        }
    }

    /// Set captured flag without a window reference (for testing).
    #[cfg(test)]
    pub(crate) fn set_captured_flag(&mut self, captured: bool) {
        self.captured = captured;
    }

    /// Clears the accumulated delta. Call at end of frame.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
    }

    /// Pointer movement since the last clear, in physical pixels
    /// (+x right, +y down).
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Last known cursor position, if any sample has arrived.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Whether the cursor is currently captured for look input.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_only_seeds_position() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(512.0, 384.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
        assert_eq!(ms.position(), Some(Vec2::new(512.0, 384.0)));
    }

    #[test]
    fn test_delta_accumulates_between_clears() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(100.0, 200.0);
        ms.on_cursor_moved(110.0, 195.0);
        ms.on_cursor_moved(112.0, 190.0);
        assert_eq!(ms.delta(), Vec2::new(12.0, -10.0));
        ms.clear_transients();
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_raw_motion_ignored_when_not_captured() {
        let mut ms = MouseState::new();
        ms.on_raw_motion(5.0, 5.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_captured_uses_raw_motion_only() {
        let mut ms = MouseState::new();
        ms.set_captured_flag(true);
        ms.on_cursor_moved(10.0, 10.0);
        ms.on_cursor_moved(50.0, 50.0);
        ms.on_raw_motion(3.0, -2.0);
        assert!(ms.is_captured());
        assert_eq!(ms.delta(), Vec2::new(3.0, -2.0));
    }

    #[test]
    fn test_cursor_left_reseeds() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(10.0, 10.0);
        ms.on_cursor_left();
        ms.on_cursor_moved(300.0, 300.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
    }
}
