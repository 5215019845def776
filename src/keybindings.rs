//! Keybinding system for remappable controls
//!
//! Allows players to customize game controls and save their preferences
//! alongside the rest of the settings file.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All possible actions that can be bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameAction {
    // Abilities
    CastSlot1,
    CastSlot2,
    CastSlot3,
    CastSlot4,

    // Camera
    CameraZoomIn,
    CameraZoomOut,

    // UI
    ToggleCombatLog,
}

impl GameAction {
    pub fn description(&self) -> &'static str {
        match self {
            GameAction::CastSlot1 => "Cast Skill 1",
            GameAction::CastSlot2 => "Cast Skill 2",
            GameAction::CastSlot3 => "Cast Skill 3",
            GameAction::CastSlot4 => "Cast Skill 4",
            GameAction::CameraZoomIn => "Camera Zoom In",
            GameAction::CameraZoomOut => "Camera Zoom Out",
            GameAction::ToggleCombatLog => "Toggle Combat Log",
        }
    }

    pub fn all() -> Vec<GameAction> {
        vec![
            GameAction::CastSlot1,
            GameAction::CastSlot2,
            GameAction::CastSlot3,
            GameAction::CastSlot4,
            GameAction::CameraZoomIn,
            GameAction::CameraZoomOut,
            GameAction::ToggleCombatLog,
        ]
    }

    fn default_key(&self) -> KeyCode {
        match self {
            GameAction::CastSlot1 => KeyCode::Digit1,
            GameAction::CastSlot2 => KeyCode::Digit2,
            GameAction::CastSlot3 => KeyCode::Digit3,
            GameAction::CastSlot4 => KeyCode::Digit4,
            GameAction::CameraZoomIn => KeyCode::Equal,
            GameAction::CameraZoomOut => KeyCode::Minus,
            GameAction::ToggleCombatLog => KeyCode::KeyL,
        }
    }
}

/// Serializable wrapper for KeyCode (stores as string)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SerializableKeyCode(String);

impl From<KeyCode> for SerializableKeyCode {
    fn from(key: KeyCode) -> Self {
        Self(format!("{:?}", key))
    }
}

impl From<&SerializableKeyCode> for KeyCode {
    fn from(sk: &SerializableKeyCode) -> Self {
        match sk.0.as_str() {
            "Digit1" => KeyCode::Digit1,
            "Digit2" => KeyCode::Digit2,
            "Digit3" => KeyCode::Digit3,
            "Digit4" => KeyCode::Digit4,
            "Digit5" => KeyCode::Digit5,
            "KeyQ" => KeyCode::KeyQ,
            "KeyW" => KeyCode::KeyW,
            "KeyE" => KeyCode::KeyE,
            "KeyR" => KeyCode::KeyR,
            "KeyF" => KeyCode::KeyF,
            "KeyL" => KeyCode::KeyL,
            "KeyZ" => KeyCode::KeyZ,
            "KeyX" => KeyCode::KeyX,
            "Equal" => KeyCode::Equal,
            "Minus" => KeyCode::Minus,
            "Space" => KeyCode::Space,
            "Tab" => KeyCode::Tab,
            // Unknown strings fall back to an unbound-ish key rather
            // than failing the whole settings load.
            _ => KeyCode::F24,
        }
    }
}

/// User-remappable key bindings, persisted with the settings file.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keybindings {
    bindings: HashMap<GameAction, SerializableKeyCode>,
}

impl Default for Keybindings {
    fn default() -> Self {
        let bindings = GameAction::all()
            .into_iter()
            .map(|action| (action, SerializableKeyCode::from(action.default_key())))
            .collect();
        Self { bindings }
    }
}

impl Keybindings {
    /// The key currently bound to an action, falling back to the default
    /// binding for actions missing from an older settings file.
    pub fn key_for(&self, action: GameAction) -> KeyCode {
        self.bindings
            .get(&action)
            .map(KeyCode::from)
            .unwrap_or_else(|| action.default_key())
    }

    pub fn rebind(&mut self, action: GameAction, key: KeyCode) {
        self.bindings.insert(action, SerializableKeyCode::from(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_action() {
        let bindings = Keybindings::default();
        for action in GameAction::all() {
            assert_eq!(bindings.key_for(action), action.default_key());
        }
    }

    #[test]
    fn rebind_round_trips_through_serialization() {
        let mut bindings = Keybindings::default();
        bindings.rebind(GameAction::CastSlot1, KeyCode::KeyQ);

        let ron = ron::to_string(&bindings).unwrap();
        let restored: Keybindings = ron::from_str(&ron).unwrap();
        assert_eq!(restored.key_for(GameAction::CastSlot1), KeyCode::KeyQ);
    }

    #[test]
    fn unknown_serialized_key_falls_back_safely() {
        let sk = SerializableKeyCode("NotARealKey".to_string());
        assert_eq!(KeyCode::from(&sk), KeyCode::F24);
    }
}
