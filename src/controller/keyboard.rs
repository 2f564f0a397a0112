use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::common::PlayerSlot;
use crate::controller::{ControlSelection, Controller};
use crate::pipeline::{ControlState, JumpState, KickState, Movement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    D,
    W,
    Space,
    Left,
    Right,
    Up,
    Enter,
}

impl Key {
    /// Maps a toolkit key name (case-insensitive) such as `"space"` or `"Return"`.
    pub fn from_name(name: &str) -> Option<Key> {
        match name.to_ascii_lowercase().as_str() {
            "a" => Some(Key::A),
            "d" => Some(Key::D),
            "w" => Some(Key::W),
            "space" => Some(Key::Space),
            "left" => Some(Key::Left),
            "right" => Some(Key::Right),
            "up" => Some(Key::Up),
            "return" | "enter" => Some(Key::Enter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub left: Key,
    pub right: Key,
    pub jump: Key,
    pub kick: Key,
}

impl KeyBindings {
    pub fn for_player(player: PlayerSlot) -> Self {
        match player {
            PlayerSlot::One => Self {
                left: Key::A,
                right: Key::D,
                jump: Key::W,
                kick: Key::Space,
            },
            PlayerSlot::Two => Self {
                left: Key::Left,
                right: Key::Right,
                jump: Key::Up,
                kick: Key::Enter,
            },
        }
    }
}

/// Pressed-key set fed by the windowing toolkit's event handlers. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct KeyboardInput {
    pressed: Arc<Mutex<HashSet<Key>>>,
}

impl KeyboardInput {
    fn pressed(&self) -> std::sync::MutexGuard<'_, HashSet<Key>> {
        self.pressed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn key_down(&self, key: Key) {
        if self.pressed().insert(key) {
            debug!("Key pressed: {:?}", key);
        }
    }

    pub fn key_up(&self, key: Key) {
        self.pressed().remove(&key);
    }

    /// Named variants for toolkits that report key names. Unknown keys are ignored.
    pub fn key_down_named(&self, name: &str) {
        if let Some(key) = Key::from_name(name) {
            self.key_down(key);
        }
    }

    pub fn key_up_named(&self, name: &str) {
        if let Some(key) = Key::from_name(name) {
            self.key_up(key);
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed().contains(&key)
    }

    fn held(&self) -> HashSet<Key> {
        self.pressed().clone()
    }
}

/// Two players on one keyboard: A/D/W/Space and Left/Right/Up/Enter.
///
/// Unlike gestures, jump and kick are level signals here: active while the key is held.
pub struct KeyboardController {
    input: KeyboardInput,
    bindings: [KeyBindings; 2],
    state: ControlState,
}

impl KeyboardController {
    pub fn new() -> Self {
        Self::with_input(KeyboardInput::default())
    }

    pub fn with_input(input: KeyboardInput) -> Self {
        Self {
            input,
            bindings: PlayerSlot::ALL.map(KeyBindings::for_player),
            state: ControlState::rest(),
        }
    }

    pub fn input(&self) -> KeyboardInput {
        self.input.clone()
    }
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for KeyboardController {
    fn kind(&self) -> ControlSelection {
        ControlSelection::Keyboard
    }

    fn process_input(&mut self) -> ControlState {
        let held = self.input.held();
        for player in PlayerSlot::ALL {
            let bindings = self.bindings[player.index()];
            let controls = self.state.get_mut(player);
            controls.movement = match (held.contains(&bindings.left), held.contains(&bindings.right)) {
                (true, false) => Movement::Left,
                (false, true) => Movement::Right,
                // Neither or both.
                _ => Movement::None,
            };
            controls.jump = JumpState::from_active(held.contains(&bindings.jump));
            controls.kick = KickState::from_active(held.contains(&bindings.kick));
        }
        self.state
    }

    fn reset_states(&mut self) {
        self.state = ControlState::rest();
    }

    fn cleanup(&mut self) {}
}
