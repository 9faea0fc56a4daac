//! Input abstraction: physical keyboard and pointer state mapped to viewer actions.

pub mod action_map;
pub mod keyboard;
pub mod mouse;

pub use action_map::{Action, ActionResolver, ActionState, InputBinding, InputMap, Trigger};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
