//! Frame-coherent keyboard state.
//!
//! [`KeyboardState`] collects winit key events between two frames. The action
//! resolver then asks two things per physical key: is it held right now, and
//! did it go down at some point during the frame (a tap that was already
//! released still counts).
//!
//! Physical key codes keep WASD in the same place on every keyboard layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

/// Minimal description of a key event for processing.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    /// The physical key involved.
    pub key: PhysicalKey,
    /// Whether the key was pressed or released.
    pub state: ElementState,
    /// Whether this is an OS auto-repeat event.
    pub repeat: bool,
}

/// Per-frame keyboard state keyed by physical (scan-code) keys.
///
/// 1. Forward every [`KeyEvent`] to [`process_event`](Self::process_event).
/// 2. Resolve actions.
/// 3. Call [`clear_transients`](Self::clear_transients) once the frame is done.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<PhysicalKey>,
    just_pressed: HashSet<PhysicalKey>,
    just_released: HashSet<PhysicalKey>,
}

impl KeyboardState {
    /// Creates a new `KeyboardState` with no keys pressed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a winit [`KeyEvent`].
    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Processes a [`RawKeyEvent`]. Repeat events are ignored so that holding
    /// a key never produces a second press.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                if self.pressed.insert(event.key) {
                    self.just_pressed.insert(event.key);
                }
            }
            ElementState::Released => {
                if self.pressed.remove(&event.key) {
                    self.just_released.insert(event.key);
                }
            }
        }
    }

    /// Releases every held key, e.g. when the window loses focus and the
    /// matching release events will never arrive.
    pub fn release_all(&mut self) {
        let held: Vec<PhysicalKey> = self.pressed.drain().collect();
        self.just_released.extend(held);
    }

    /// Returns `true` while the key is held down.
    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed.contains(&key)
    }

    /// Returns `true` if the key went down during the current frame.
    #[must_use]
    pub fn just_pressed(&self, key: PhysicalKey) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Returns `true` if the key went up during the current frame.
    #[must_use]
    pub fn just_released(&self, key: PhysicalKey) -> bool {
        self.just_released.contains(&key)
    }

    /// Held now, or tapped and released within this frame.
    #[must_use]
    pub fn is_down_this_frame(&self, key: PhysicalKey) -> bool {
        self.is_pressed(key) || self.just_pressed(key)
    }

    /// Clears the per-frame press and release sets.
    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    fn raw(code: KeyCode, state: ElementState, repeat: bool) -> RawKeyEvent {
        RawKeyEvent {
            key: PhysicalKey::Code(code),
            state,
            repeat,
        }
    }

    fn key(code: KeyCode) -> PhysicalKey {
        PhysicalKey::Code(code)
    }

    #[test]
    fn test_initial_state_no_keys_pressed() {
        let kb = KeyboardState::new();
        for code in [KeyCode::KeyW, KeyCode::KeyM, KeyCode::Escape] {
            assert!(!kb.is_pressed(key(code)));
            assert!(!kb.just_pressed(key(code)));
            assert!(!kb.just_released(key(code)));
        }
    }

    #[test]
    fn test_press_then_release() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyW, ElementState::Pressed, false));
        assert!(kb.is_pressed(key(KeyCode::KeyW)));
        assert!(kb.just_pressed(key(KeyCode::KeyW)));

        kb.process_raw(raw(KeyCode::KeyW, ElementState::Released, false));
        assert!(!kb.is_pressed(key(KeyCode::KeyW)));
        assert!(kb.just_released(key(KeyCode::KeyW)));
    }

    #[test]
    fn test_tap_within_frame_still_counts() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyM, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::KeyM, ElementState::Released, false));
        assert!(!kb.is_pressed(key(KeyCode::KeyM)));
        assert!(kb.is_down_this_frame(key(KeyCode::KeyM)));

        kb.clear_transients();
        assert!(!kb.is_down_this_frame(key(KeyCode::KeyM)));
    }

    #[test]
    fn test_just_pressed_true_for_one_frame_only() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyG, ElementState::Pressed, false));
        kb.clear_transients();
        assert!(!kb.just_pressed(key(KeyCode::KeyG)));
        assert!(kb.is_pressed(key(KeyCode::KeyG)));
    }

    #[test]
    fn test_repeat_events_ignored() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyC, ElementState::Pressed, false));
        kb.clear_transients();
        kb.process_raw(raw(KeyCode::KeyC, ElementState::Pressed, true));
        assert!(!kb.just_pressed(key(KeyCode::KeyC)));
        assert!(kb.is_pressed(key(KeyCode::KeyC)));
    }

    #[test]
    fn test_stray_release_is_not_reported() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyA, ElementState::Released, false));
        assert!(!kb.just_released(key(KeyCode::KeyA)));
    }

    #[test]
    fn test_release_all_clears_held_keys() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyW, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::KeyD, ElementState::Pressed, false));
        kb.release_all();
        assert!(!kb.is_pressed(key(KeyCode::KeyW)));
        assert!(!kb.is_pressed(key(KeyCode::KeyD)));
        assert!(kb.just_released(key(KeyCode::KeyD)));
    }
}
