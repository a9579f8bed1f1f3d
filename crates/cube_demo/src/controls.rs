//! Key bindings and the shader slot table.

use std::path::{Path, PathBuf};

use cube_core::input::Key;
use winit::keyboard::KeyCode;

/// Vertex + fragment source files making up one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderPair {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

impl ShaderPair {
    const fn new(vertex: &'static str, fragment: &'static str) -> Self {
        Self { vertex, fragment }
    }

    /// Both paths, resolved against `root`.
    pub fn paths_under(&self, root: &Path) -> (PathBuf, PathBuf) {
        (root.join(self.vertex), root.join(self.fragment))
    }
}

/// Program loaded before the first frame.
pub const STARTUP_SHADERS: ShaderPair =
    ShaderPair::new("shaders/raymarch.vs.wgsl", "shaders/raymarch.fs.wgsl");

/// Programs bound to the digit keys. Slots 5-9 name a pair that is not
/// shipped, so pressing them exercises the failed-build path.
pub const SHADER_SLOTS: [ShaderPair; 10] = [
    /* 0 */ ShaderPair::new("shaders/minimal.vs.wgsl", "shaders/minimal.fs.wgsl"),
    /* 1 */ ShaderPair::new("shaders/color.vs.wgsl", "shaders/color.fs.wgsl"),
    /* 2 */ ShaderPair::new("shaders/cut.vs.wgsl", "shaders/cut.fs.wgsl"),
    /* 3 */ ShaderPair::new("shaders/wobble.vs.wgsl", "shaders/color.fs.wgsl"),
    /* 4 */ ShaderPair::new("shaders/experimental.vs.wgsl", "shaders/experimental.fs.wgsl"),
    /* 5 */ ShaderPair::new("shaders/yourshader.vs.wgsl", "shaders/yourshader.fs.wgsl"),
    /* 6 */ ShaderPair::new("shaders/yourshader.vs.wgsl", "shaders/yourshader.fs.wgsl"),
    /* 7 */ ShaderPair::new("shaders/yourshader.vs.wgsl", "shaders/yourshader.fs.wgsl"),
    /* 8 */ ShaderPair::new("shaders/yourshader.vs.wgsl", "shaders/yourshader.fs.wgsl"),
    /* 9 */ ShaderPair::new("shaders/yourshader.vs.wgsl", "shaders/yourshader.fs.wgsl"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Build the program in `SHADER_SLOTS[slot]` and bind it.
    LoadShader(usize),
    Quit,
}

pub fn action_for(key: Key) -> Option<Action> {
    match key {
        Key::Escape => Some(Action::Quit),
        other => other.digit().map(Action::LoadShader),
    }
}

pub fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::Digit0 => Some(Key::Digit0),
        KeyCode::Digit1 => Some(Key::Digit1),
        KeyCode::Digit2 => Some(Key::Digit2),
        KeyCode::Digit3 => Some(Key::Digit3),
        KeyCode::Digit4 => Some(Key::Digit4),
        KeyCode::Digit5 => Some(Key::Digit5),
        KeyCode::Digit6 => Some(Key::Digit6),
        KeyCode::Digit7 => Some(Key::Digit7),
        KeyCode::Digit8 => Some(Key::Digit8),
        KeyCode::Digit9 => Some(Key::Digit9),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_select_their_slot() {
        for (n, key) in Key::DIGITS.into_iter().enumerate() {
            assert_eq!(action_for(key), Some(Action::LoadShader(n)));
        }
    }

    #[test]
    fn escape_quits() {
        assert_eq!(action_for(Key::Escape), Some(Action::Quit));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(map_key(KeyCode::KeyA), None);
        assert_eq!(map_key(KeyCode::Numpad1), None);
        assert_eq!(map_key(KeyCode::Space), None);
    }

    #[test]
    fn top_row_digits_map_in_order() {
        let codes = [
            KeyCode::Digit0,
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
            KeyCode::Digit5,
            KeyCode::Digit6,
            KeyCode::Digit7,
            KeyCode::Digit8,
            KeyCode::Digit9,
        ];
        for (n, code) in codes.into_iter().enumerate() {
            assert_eq!(map_key(code).and_then(Key::digit), Some(n));
        }
    }

    #[test]
    fn placeholder_slots_share_one_pair() {
        let placeholder = SHADER_SLOTS[5];
        assert!(SHADER_SLOTS[5..].iter().all(|pair| *pair == placeholder));
        assert!(SHADER_SLOTS[..5].iter().all(|pair| *pair != placeholder));
    }
}
