//! Keyboard state with edge-triggered press detection.
//!
//! - **Level-triggered (held):** `is_held(key)` is true for as long as the key is
//!   physically down.
//!
//! - **Edge-triggered (just_pressed / just_released):** `key_down` reports `true`
//!   only on the transition from released to pressed, so auto-repeat events
//!   delivered while a key is held never fire an action twice. The transition sets
//!   are cleared by `end_frame()`.

use std::collections::HashSet;
use std::fmt;

/// Platform-independent key identifier. Only keys the demo binds are tracked;
/// the platform layer drops everything else before it reaches `InputState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Escape,
}

impl Key {
    pub const DIGITS: [Key; 10] = [
        Key::Digit0,
        Key::Digit1,
        Key::Digit2,
        Key::Digit3,
        Key::Digit4,
        Key::Digit5,
        Key::Digit6,
        Key::Digit7,
        Key::Digit8,
        Key::Digit9,
    ];

    /// Numeric value for digit keys.
    pub fn digit(self) -> Option<usize> {
        Self::DIGITS.iter().position(|&k| k == self)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.digit() {
            Some(n) => write!(f, "{n}"),
            None => write!(f, "{:?}", self),
        }
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key-down event. Returns `true` when this is a new press.
    pub fn key_down(&mut self, key: Key) -> bool {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
            true
        } else {
            false
        }
    }

    /// Records a key-up event. Returns `true` when the key was held.
    pub fn key_up(&mut self, key: Key) -> bool {
        if self.held.remove(&key) {
            self.just_released.insert(key);
            true
        } else {
            false
        }
    }

    /// Forgets every held key, e.g. when the window loses focus and release
    /// events will never arrive.
    pub fn release_all(&mut self) {
        for key in self.held.drain() {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        assert!(input.key_down(Key::Digit1));
        assert!(input.is_held(Key::Digit1));
        assert!(input.is_just_pressed(Key::Digit1));
    }

    #[test]
    fn test_key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::Escape);
        assert!(input.key_up(Key::Escape));
        assert!(!input.is_held(Key::Escape));
        assert!(input.is_just_released(Key::Escape));
    }

    #[test]
    fn test_held_key_reports_single_edge_across_polls() {
        let mut input = InputState::new();
        let mut edges = 0;
        for _ in 0..5 {
            if input.key_down(Key::Digit3) {
                edges += 1;
            }
            input.end_frame();
        }
        assert_eq!(edges, 1);
        assert!(input.is_held(Key::Digit3));
    }

    #[test]
    fn test_release_then_press_fires_again() {
        let mut input = InputState::new();
        assert!(input.key_down(Key::Digit2));
        input.key_up(Key::Digit2);
        assert!(input.key_down(Key::Digit2));
    }

    #[test]
    fn test_key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        assert!(!input.key_up(Key::Digit0));
        assert!(!input.is_just_released(Key::Digit0));
        assert!(!input.is_held(Key::Digit0));
    }

    #[test]
    fn test_end_frame_clears_transient_state() {
        let mut input = InputState::new();
        input.key_down(Key::Digit4);
        input.key_down(Key::Digit8);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::Digit4));
        assert!(!input.is_just_pressed(Key::Digit8));
        assert!(input.is_held(Key::Digit4));
        assert!(input.is_held(Key::Digit8));
    }

    #[test]
    fn test_release_all_unsticks_keys() {
        let mut input = InputState::new();
        input.key_down(Key::Digit7);
        input.end_frame();
        input.release_all();
        assert!(!input.is_held(Key::Digit7));
        assert!(input.is_just_released(Key::Digit7));
        assert!(input.key_down(Key::Digit7));
    }

    #[test]
    fn test_digit_values() {
        assert_eq!(Key::Digit0.digit(), Some(0));
        assert_eq!(Key::Digit9.digit(), Some(9));
        assert_eq!(Key::Escape.digit(), None);
        assert_eq!(Key::Digit5.to_string(), "5");
    }
}
