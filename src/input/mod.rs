//! # Input Module
//!
//! Per-frame keyboard and mouse snapshots with held, pressed and released
//! queries. The runtime advances the state once at the top of every frame, so
//! edge queries compare two snapshots and never depend on who asked first.

use std::collections::HashSet;

pub use macroquad::input::KeyCode;

/// One key or a set of alternative keys.
///
/// A query over several keys is true if it holds for any of them, which lets
/// games bind arrows and WASD in one call.
///
/// # Examples
///
/// ```
/// use pixie::{InputState, KeyCode};
///
/// let mut input = InputState::new();
/// input.advance([KeyCode::A], (0.0, 0.0));
///
/// assert!(input.is_held([KeyCode::Left, KeyCode::A]));
/// assert!(input.is_pressed(KeyCode::A));
/// assert!(!input.is_held(vec![KeyCode::Right, KeyCode::D]));
/// ```
pub trait Keys {
    /// True if `test` holds for any key in the set.
    fn any_key(&self, test: impl FnMut(KeyCode) -> bool) -> bool;
}

impl Keys for KeyCode {
    fn any_key(&self, mut test: impl FnMut(KeyCode) -> bool) -> bool {
        test(*self)
    }
}

impl Keys for [KeyCode] {
    fn any_key(&self, test: impl FnMut(KeyCode) -> bool) -> bool {
        self.iter().copied().any(test)
    }
}

impl<const N: usize> Keys for [KeyCode; N] {
    fn any_key(&self, test: impl FnMut(KeyCode) -> bool) -> bool {
        self.as_slice().any_key(test)
    }
}

impl Keys for Vec<KeyCode> {
    fn any_key(&self, test: impl FnMut(KeyCode) -> bool) -> bool {
        self.as_slice().any_key(test)
    }
}

impl<K: Keys + ?Sized> Keys for &K {
    fn any_key(&self, test: impl FnMut(KeyCode) -> bool) -> bool {
        (**self).any_key(test)
    }
}

/// Keyboard and mouse state for the current and previous frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    previous: HashSet<KeyCode>,
    mouse: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new frame with the keys currently down and the mouse position
    /// in logical units.
    pub fn advance(&mut self, keys_down: impl IntoIterator<Item = KeyCode>, mouse: (f32, f32)) {
        self.previous = std::mem::take(&mut self.held);
        self.held.extend(keys_down);
        self.mouse = mouse;
    }

    /// True while any of `keys` is down.
    pub fn is_held(&self, keys: impl Keys) -> bool {
        keys.any_key(|key| self.held.contains(&key))
    }

    /// True on the first frame any of `keys` is down.
    ///
    /// Compares this frame's snapshot with the last one, so every query made
    /// during a frame gives the same answer, including repeated ones.
    pub fn is_pressed(&self, keys: impl Keys) -> bool {
        keys.any_key(|key| self.held.contains(&key) && !self.previous.contains(&key))
    }

    /// True on the first frame any of `keys` is up again.
    pub fn is_released(&self, keys: impl Keys) -> bool {
        keys.any_key(|key| !self.held.contains(&key) && self.previous.contains(&key))
    }

    /// Mouse position in logical units.
    pub fn mouse(&self) -> (f32, f32) {
        self.mouse
    }

    /// Keys down this frame.
    pub fn held_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.held.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_only_on_first_frame() {
        let mut input = InputState::new();
        input.advance([KeyCode::Space], (0.0, 0.0));
        assert!(input.is_pressed(KeyCode::Space));
        // repeated queries in one frame agree
        assert!(input.is_pressed(KeyCode::Space));

        input.advance([KeyCode::Space], (0.0, 0.0));
        assert!(input.is_held(KeyCode::Space));
        assert!(!input.is_pressed(KeyCode::Space));

        input.advance([], (0.0, 0.0));
        assert!(!input.is_held(KeyCode::Space));
        assert!(input.is_released(KeyCode::Space));

        input.advance([KeyCode::Space], (0.0, 0.0));
        assert!(input.is_pressed(KeyCode::Space));
    }

    #[test]
    fn test_unqueried_keys_still_advance() {
        let mut input = InputState::new();
        input.advance([KeyCode::Z], (0.0, 0.0));
        input.advance([KeyCode::Z], (0.0, 0.0));
        // never asked about Z on its first frame
        assert!(!input.is_pressed(KeyCode::Z));
    }

    #[test]
    fn test_any_of_several_keys() {
        let mut input = InputState::new();
        input.advance([KeyCode::Up], (0.0, 0.0));
        input.advance([KeyCode::Up, KeyCode::W], (0.0, 0.0));

        let up = [KeyCode::Up, KeyCode::W];
        assert!(input.is_held(up));
        assert!(input.is_pressed(up));
        assert!(!input.is_pressed(&[KeyCode::Up][..]));
        assert!(!input.is_held(Vec::<KeyCode>::new()));
    }

    #[test]
    fn test_mouse_position_tracks_snapshot() {
        let mut input = InputState::new();
        input.advance([], (12.5, 3.0));
        assert_eq!(input.mouse(), (12.5, 3.0));
    }
}
