//! Action mapping: viewer commands bound to physical keys.
//!
//! [`InputMap`] says which keys drive which [`Action`]. Once per frame
//! [`ActionResolver`] records which actions are held and which had a key go
//! down during the frame, and stores the result in [`ActionState`], so that
//! every edge event is known before any scene state is mutated.

use crate::keyboard::KeyboardState;
use crate::mouse::MouseState;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Serde helper module for [`KeyCode`], which has no serde impls.
mod keycode_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use winit::keyboard::KeyCode;

    /// Serialize a [`KeyCode`] as its debug string (e.g., `"KeyW"`).
    pub fn serialize<S: Serializer>(code: &KeyCode, s: S) -> Result<S::Ok, S::Error> {
        format!("{code:?}").serialize(s)
    }

    /// Deserialize a [`KeyCode`] from its debug string.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<KeyCode, D::Error> {
        let name = String::deserialize(d)?;
        super::parse_key_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
    }
}

/// Parse a key name as written by `KeyCode`'s `Debug` output (`"KeyW"`,
/// `"Digit3"`, `"Escape"`). Single letters are accepted as shorthand.
pub fn parse_key_name(name: &str) -> Option<KeyCode> {
    let name = name.trim();
    let letter = match name.len() {
        1 => Some(name),
        4 if name.starts_with("Key") => Some(&name[3..]),
        _ => None,
    };
    if let Some(letter) = letter {
        return letter_key(letter.chars().next()?.to_ascii_uppercase());
    }
    Some(match name {
        "Digit0" => KeyCode::Digit0,
        "Digit1" => KeyCode::Digit1,
        "Digit2" => KeyCode::Digit2,
        "Digit3" => KeyCode::Digit3,
        "Digit4" => KeyCode::Digit4,
        "Digit5" => KeyCode::Digit5,
        "Digit6" => KeyCode::Digit6,
        "Digit7" => KeyCode::Digit7,
        "Digit8" => KeyCode::Digit8,
        "Digit9" => KeyCode::Digit9,
        "Space" => KeyCode::Space,
        "Enter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "Tab" => KeyCode::Tab,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ShiftRight" => KeyCode::ShiftRight,
        "ControlLeft" => KeyCode::ControlLeft,
        "ControlRight" => KeyCode::ControlRight,
        "AltLeft" => KeyCode::AltLeft,
        "AltRight" => KeyCode::AltRight,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "F1" => KeyCode::F1,
        "F2" => KeyCode::F2,
        "F3" => KeyCode::F3,
        "F4" => KeyCode::F4,
        _ => return None,
    })
}

fn letter_key(c: char) -> Option<KeyCode> {
    Some(match c {
        'A' => KeyCode::KeyA,
        'B' => KeyCode::KeyB,
        'C' => KeyCode::KeyC,
        'D' => KeyCode::KeyD,
        'E' => KeyCode::KeyE,
        'F' => KeyCode::KeyF,
        'G' => KeyCode::KeyG,
        'H' => KeyCode::KeyH,
        'I' => KeyCode::KeyI,
        'J' => KeyCode::KeyJ,
        'K' => KeyCode::KeyK,
        'L' => KeyCode::KeyL,
        'M' => KeyCode::KeyM,
        'N' => KeyCode::KeyN,
        'O' => KeyCode::KeyO,
        'P' => KeyCode::KeyP,
        'Q' => KeyCode::KeyQ,
        'R' => KeyCode::KeyR,
        'S' => KeyCode::KeyS,
        'T' => KeyCode::KeyT,
        'U' => KeyCode::KeyU,
        'V' => KeyCode::KeyV,
        'W' => KeyCode::KeyW,
        'X' => KeyCode::KeyX,
        'Y' => KeyCode::KeyY,
        'Z' => KeyCode::KeyZ,
        _ => return None,
    })
}

/// How an action reacts to a key that stays down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Applied on every frame the key is down.
    Held,
    /// Applied once per physical press.
    Edge,
}

/// Viewer commands that can be bound to keys.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Walk along the horizontal projection of the view direction.
    MoveForward,
    /// Walk backwards.
    MoveBackward,
    /// Strafe left.
    MoveLeft,
    /// Strafe right.
    MoveRight,
    /// Swing the light counter-clockwise around Y.
    RotateLightLeft,
    /// Swing the light clockwise around Y.
    RotateLightRight,
    /// Lower the alien towards the ground.
    AlienDown,
    /// Raise the alien back into the ship.
    AlienUp,
    /// Slide the freighter towards -X.
    FreighterLeft,
    /// Slide the freighter towards +X.
    FreighterRight,
    /// Enable fog.
    FogOn,
    /// Disable fog.
    FogOff,
    /// Show or hide the combat jet.
    ToggleJet,
    /// Advance to the next shading mode.
    CycleShading,
    /// Start the scripted presentation flight.
    TogglePresentation,
    /// Close the viewer.
    Quit,
}

impl Action {
    /// Every action, in the order the orchestrator applies them.
    pub const ALL: [Action; 16] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::MoveLeft,
        Action::MoveRight,
        Action::RotateLightLeft,
        Action::RotateLightRight,
        Action::AlienDown,
        Action::AlienUp,
        Action::FreighterLeft,
        Action::FreighterRight,
        Action::FogOn,
        Action::FogOff,
        Action::ToggleJet,
        Action::CycleShading,
        Action::TogglePresentation,
        Action::Quit,
    ];

    /// Whether the action repeats while held or fires once per press.
    #[must_use]
    pub fn trigger(self) -> Trigger {
        match self {
            Action::ToggleJet
            | Action::CycleShading
            | Action::TogglePresentation
            | Action::Quit => Trigger::Edge,
            _ => Trigger::Held,
        }
    }

    /// Look an action up by its variant name (as used in `config.ron`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|action| format!("{action:?}") == name)
    }
}

/// A physical input source that can be bound to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputBinding {
    /// A keyboard key (physical scan code).
    Key(#[serde(with = "keycode_serde")] KeyCode),
}

impl InputBinding {
    fn is_down(&self, keyboard: &KeyboardState) -> bool {
        match self {
            InputBinding::Key(code) => keyboard.is_down_this_frame(PhysicalKey::Code(*code)),
        }
    }

    fn went_down(&self, keyboard: &KeyboardState) -> bool {
        match self {
            InputBinding::Key(code) => keyboard.just_pressed(PhysicalKey::Code(*code)),
        }
    }
}

/// Maps [`Action`]s to lists of [`InputBinding`]s (any bound key activates).
///
/// Serializable to RON for user-editable binding files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMap {
    /// The binding table.
    pub bindings: HashMap<Action, Vec<InputBinding>>,
}

impl Default for InputMap {
    fn default() -> Self {
        Self::default_viewer()
    }
}

impl InputMap {
    /// Create an empty input map with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// The standard viewer layout.
    ///
    /// | Keys | Actions |
    /// |---|---|
    /// | W A S D | move |
    /// | Q E | rotate light |
    /// | Z X | alien down / up |
    /// | U I | freighter left / right |
    /// | F V | fog on / off |
    /// | M G C | jet, shading, presentation |
    /// | Escape | quit |
    #[must_use]
    pub fn default_viewer() -> Self {
        let defaults = [
            (Action::MoveForward, KeyCode::KeyW),
            (Action::MoveBackward, KeyCode::KeyS),
            (Action::MoveLeft, KeyCode::KeyA),
            (Action::MoveRight, KeyCode::KeyD),
            (Action::RotateLightLeft, KeyCode::KeyQ),
            (Action::RotateLightRight, KeyCode::KeyE),
            (Action::AlienDown, KeyCode::KeyZ),
            (Action::AlienUp, KeyCode::KeyX),
            (Action::FreighterLeft, KeyCode::KeyU),
            (Action::FreighterRight, KeyCode::KeyI),
            (Action::FogOn, KeyCode::KeyF),
            (Action::FogOff, KeyCode::KeyV),
            (Action::ToggleJet, KeyCode::KeyM),
            (Action::CycleShading, KeyCode::KeyG),
            (Action::TogglePresentation, KeyCode::KeyC),
            (Action::Quit, KeyCode::Escape),
        ];
        let bindings = defaults
            .into_iter()
            .map(|(action, code)| (action, vec![InputBinding::Key(code)]))
            .collect();
        Self { bindings }
    }

    /// Apply `action name -> key name` overrides from the config. Entries
    /// naming an unknown action or key are skipped with a warning.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (action_name, key_name) in overrides {
            let Some(action) = Action::from_name(action_name) else {
                tracing::warn!("Ignoring binding for unknown action '{action_name}'");
                continue;
            };
            let Some(code) = parse_key_name(key_name) else {
                tracing::warn!("Ignoring binding {action_name} -> unknown key '{key_name}'");
                continue;
            };
            tracing::debug!("Rebinding {action:?} to {code:?}");
            self.set_bindings(action, vec![InputBinding::Key(code)]);
        }
        self
    }

    /// Set the bindings for an action, replacing any existing ones.
    pub fn set_bindings(&mut self, action: Action, bindings: Vec<InputBinding>) {
        self.bindings.insert(action, bindings);
    }

    /// Get the bindings for an action.
    #[must_use]
    pub fn get_bindings(&self, action: Action) -> &[InputBinding] {
        self.bindings.get(&action).map_or(&[], |v| v.as_slice())
    }

    /// Serialize to RON string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON string.
    ///
    /// # Errors
    /// Returns an error if the RON string is malformed.
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

/// Per-frame action state computed by [`ActionResolver`].
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    active: HashSet<Action>,
    pressed: HashSet<Action>,
    look_delta: Vec2,
}

impl ActionState {
    /// Create a new empty action state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any key bound to `action` is down this frame.
    #[must_use]
    pub fn is_active(&self, action: Action) -> bool {
        self.active.contains(&action)
    }

    /// Whether a key bound to `action` went down during this frame.
    ///
    /// Comes from physical presses, so a tap in one frame followed by a
    /// press in the next counts as two.
    #[must_use]
    pub fn just_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Whether the orchestrator should apply `action` this frame, given its
    /// [`Trigger`].
    #[must_use]
    pub fn fires(&self, action: Action) -> bool {
        match action.trigger() {
            Trigger::Held => self.is_active(action),
            Trigger::Edge => self.just_pressed(action),
        }
    }

    /// Actions that fire this frame, in [`Action::ALL`] order.
    pub fn fired(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|a| self.fires(*a))
    }

    /// Pointer delta for this frame (+x right, +y down).
    #[must_use]
    pub fn look_delta(&self) -> Vec2 {
        self.look_delta
    }
}

/// Reads keyboard and pointer state and populates [`ActionState`].
pub struct ActionResolver;

impl ActionResolver {
    /// Resolve all actions from the current input state.
    ///
    /// Call once per frame, after event collection and before any state is
    /// mutated.
    pub fn resolve(
        input_map: &InputMap,
        keyboard: &KeyboardState,
        mouse: &MouseState,
        state: &mut ActionState,
    ) {
        state.active.clear();
        state.pressed.clear();

        for (action, bindings) in &input_map.bindings {
            if bindings.iter().any(|b| b.is_down(keyboard)) {
                state.active.insert(*action);
            }
            if bindings.iter().any(|b| b.went_down(keyboard)) {
                state.pressed.insert(*action);
            }
        }
        state.look_delta = mouse.delta();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::RawKeyEvent;
    use winit::event::ElementState;

    fn press_key(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        });
    }

    fn release_key(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Released,
            repeat: false,
        });
    }

    /// One frame: resolve then clear transients, like the app loop does.
    fn frame(map: &InputMap, kb: &mut KeyboardState, state: &mut ActionState) {
        let mouse = MouseState::new();
        ActionResolver::resolve(map, kb, &mouse, state);
        kb.clear_transients();
    }

    #[test]
    fn test_default_map_binds_every_action() {
        let map = InputMap::default_viewer();
        for action in Action::ALL {
            assert_eq!(map.get_bindings(action).len(), 1, "{action:?} unbound");
        }
    }

    #[test]
    fn test_held_action_fires_every_frame() {
        let map = InputMap::default_viewer();
        let mut kb = KeyboardState::new();
        let mut state = ActionState::new();

        press_key(&mut kb, KeyCode::KeyW);
        for _ in 0..3 {
            frame(&map, &mut kb, &mut state);
            assert!(state.fires(Action::MoveForward));
        }
        release_key(&mut kb, KeyCode::KeyW);
        frame(&map, &mut kb, &mut state);
        assert!(!state.fires(Action::MoveForward));
    }

    #[test]
    fn test_edge_action_fires_once_per_press() {
        let map = InputMap::default_viewer();
        let mut kb = KeyboardState::new();
        let mut state = ActionState::new();

        press_key(&mut kb, KeyCode::KeyM);
        frame(&map, &mut kb, &mut state);
        assert!(state.fires(Action::ToggleJet));

        // Still held: no retrigger.
        frame(&map, &mut kb, &mut state);
        assert!(!state.fires(Action::ToggleJet));
        assert!(state.is_active(Action::ToggleJet));

        release_key(&mut kb, KeyCode::KeyM);
        frame(&map, &mut kb, &mut state);
        press_key(&mut kb, KeyCode::KeyM);
        frame(&map, &mut kb, &mut state);
        assert!(state.fires(Action::ToggleJet));
    }

    #[test]
    fn test_tap_inside_one_frame_fires_edge() {
        let map = InputMap::default_viewer();
        let mut kb = KeyboardState::new();
        let mut state = ActionState::new();

        press_key(&mut kb, KeyCode::KeyG);
        release_key(&mut kb, KeyCode::KeyG);
        frame(&map, &mut kb, &mut state);
        assert!(state.fires(Action::CycleShading));

        frame(&map, &mut kb, &mut state);
        assert!(!state.fires(Action::CycleShading));
    }

    #[test]
    fn test_double_tap_across_consecutive_frames_fires_twice() {
        let map = InputMap::default_viewer();
        let mut kb = KeyboardState::new();
        let mut state = ActionState::new();
        let mut fires = 0;

        press_key(&mut kb, KeyCode::KeyM);
        release_key(&mut kb, KeyCode::KeyM);
        frame(&map, &mut kb, &mut state);
        fires += state.fired().filter(|a| *a == Action::ToggleJet).count();

        press_key(&mut kb, KeyCode::KeyM);
        frame(&map, &mut kb, &mut state);
        fires += state.fired().filter(|a| *a == Action::ToggleJet).count();

        assert_eq!(fires, 2);

        // Holding afterwards adds nothing.
        frame(&map, &mut kb, &mut state);
        assert!(!state.fires(Action::ToggleJet));
    }

    #[test]
    fn test_fired_follows_declaration_order() {
        let map = InputMap::default_viewer();
        let mut kb = KeyboardState::new();
        let mut state = ActionState::new();

        press_key(&mut kb, KeyCode::Escape);
        press_key(&mut kb, KeyCode::KeyU);
        press_key(&mut kb, KeyCode::KeyW);
        frame(&map, &mut kb, &mut state);

        let fired: Vec<Action> = state.fired().collect();
        assert_eq!(
            fired,
            vec![Action::MoveForward, Action::FreighterLeft, Action::Quit]
        );
    }

    #[test]
    fn test_overrides_rebind_and_skip_unknown() {
        let mut overrides = HashMap::new();
        overrides.insert("ToggleJet".to_string(), "KeyJ".to_string());
        overrides.insert("Fly".to_string(), "KeyK".to_string());
        overrides.insert("Quit".to_string(), "NotAKey".to_string());

        let map = InputMap::default_viewer().with_overrides(&overrides);
        assert_eq!(
            map.get_bindings(Action::ToggleJet),
            &[InputBinding::Key(KeyCode::KeyJ)]
        );
        assert_eq!(
            map.get_bindings(Action::Quit),
            &[InputBinding::Key(KeyCode::Escape)]
        );
    }

    #[test]
    fn test_parse_key_name_forms() {
        assert_eq!(parse_key_name("KeyW"), Some(KeyCode::KeyW));
        assert_eq!(parse_key_name("w"), Some(KeyCode::KeyW));
        assert_eq!(parse_key_name("Escape"), Some(KeyCode::Escape));
        assert_eq!(parse_key_name("Digit7"), Some(KeyCode::Digit7));
        assert_eq!(parse_key_name("Keyboard"), None);
        assert_eq!(parse_key_name("?"), None);
    }

    #[test]
    fn test_action_names_roundtrip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(&format!("{action:?}")), Some(action));
        }
        assert_eq!(Action::from_name("Jump"), None);
    }

    #[test]
    fn test_input_map_ron_roundtrip() {
        let map = InputMap::default_viewer();
        let ron_str = map.to_ron().unwrap();
        assert!(ron_str.contains("\"KeyW\""));
        let parsed = InputMap::from_ron(&ron_str).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn test_look_delta_copied_from_mouse() {
        let map = InputMap::new();
        let kb = KeyboardState::new();
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(10.0, 10.0);
        mouse.on_cursor_moved(14.0, 7.0);
        let mut state = ActionState::new();
        ActionResolver::resolve(&map, &kb, &mouse, &mut state);
        assert_eq!(state.look_delta(), Vec2::new(4.0, -3.0));
    }
}
