//! Keyboard state as an injected capability.
//!
//! The controller never reads a global key table. Whoever drives it passes something that
//! implements [`KeyState`]; inside a Bevy app that is the [`ButtonInput<KeyCode>`] resource.

use bevy_input::{keyboard::KeyCode, ButtonInput};

/// The keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    /// Either shift key. Selects first person look and fast keyboard motion.
    Shift,
    /// Move forward.
    W,
    /// Move left.
    A,
    /// Move backward.
    S,
    /// Move right.
    D,
    /// Turn left.
    Left,
    /// Turn right.
    Right,
    /// Look up.
    Up,
    /// Look down.
    Down,
}

impl NavKey {
    /// Keys that switch a primary button drag into first person look.
    pub const WASD: [NavKey; 4] = [NavKey::W, NavKey::A, NavKey::S, NavKey::D];
}

/// Answers "is this key currently held".
pub trait KeyState {
    /// Returns `true` while `key` is held down.
    fn is_pressed(&self, key: NavKey) -> bool;

    /// Returns `true` if any of `keys` is held down.
    fn any_pressed(&self, keys: &[NavKey]) -> bool {
        keys.iter().any(|key| self.is_pressed(*key))
    }
}

impl KeyState for ButtonInput<KeyCode> {
    fn is_pressed(&self, key: NavKey) -> bool {
        match key {
            NavKey::Shift => self.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
            NavKey::W => self.pressed(KeyCode::KeyW),
            NavKey::A => self.pressed(KeyCode::KeyA),
            NavKey::S => self.pressed(KeyCode::KeyS),
            NavKey::D => self.pressed(KeyCode::KeyD),
            NavKey::Left => self.pressed(KeyCode::ArrowLeft),
            NavKey::Right => self.pressed(KeyCode::ArrowRight),
            NavKey::Up => self.pressed(KeyCode::ArrowUp),
            NavKey::Down => self.pressed(KeyCode::ArrowDown),
        }
    }
}

/// A fixed set of held keys.
impl<const N: usize> KeyState for [NavKey; N] {
    fn is_pressed(&self, key: NavKey) -> bool {
        self.contains(&key)
    }
}

/// A keyboard with nothing held, for driving the controller without keyboard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKeys;

impl KeyState for NoKeys {
    fn is_pressed(&self, _key: NavKey) -> bool {
        false
    }
}
