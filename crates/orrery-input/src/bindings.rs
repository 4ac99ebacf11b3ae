//! Key bindings and per-frame input resolution.
//!
//! Discrete actions fire on key *release*, once per release event. Movement
//! keys are sampled as held state every frame.

use std::collections::HashMap;

use orrery_sim::{MovementInput, SceneCommand, ShadingMode};
use tracing::warn;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::keyboard::KeyboardState;
use crate::mouse::MouseState;

/// A discrete action bound to a key release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneAction {
    CycleCameraForward,
    CycleCameraBackward,
    AccelerateTime,
    DecelerateTime,
    /// Select a shading debug mode by index.
    ShadingMode(u32),
    ToggleShadows,
    Quit,
}

/// Key assignments for every action and movement direction.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    /// Actions fired when the key is released.
    pub on_release: Vec<(KeyCode, SceneAction)>,
    pub move_forward: KeyCode,
    pub move_back: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            on_release: vec![
                (KeyCode::KeyP, SceneAction::CycleCameraForward),
                (KeyCode::KeyO, SceneAction::CycleCameraBackward),
                (KeyCode::KeyL, SceneAction::AccelerateTime),
                (KeyCode::KeyK, SceneAction::DecelerateTime),
                (KeyCode::Digit1, SceneAction::ShadingMode(0)),
                (KeyCode::Digit2, SceneAction::ShadingMode(1)),
                (KeyCode::Digit3, SceneAction::ShadingMode(2)),
                (KeyCode::Digit4, SceneAction::ShadingMode(3)),
                (KeyCode::KeyF, SceneAction::ToggleShadows),
                (KeyCode::Escape, SceneAction::Quit),
            ],
            move_forward: KeyCode::KeyW,
            move_back: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
        }
    }
}

/// A key assigned to more than one role.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub key: KeyCode,
    /// Human-readable role names sharing the key.
    pub roles: Vec<String>,
}

impl KeyBindings {
    /// Action bound to `key`, if any. The first binding wins.
    #[must_use]
    pub fn action_for(&self, key: PhysicalKey) -> Option<SceneAction> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        self.on_release
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|(_, action)| *action)
    }

    /// Keys bound to more than one action or movement direction.
    #[must_use]
    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        let mut roles: HashMap<KeyCode, Vec<String>> = HashMap::new();
        for (key, action) in &self.on_release {
            roles.entry(*key).or_default().push(format!("{action:?}"));
        }
        for (key, name) in [
            (self.move_forward, "MoveForward"),
            (self.move_back, "MoveBack"),
            (self.move_left, "MoveLeft"),
            (self.move_right, "MoveRight"),
        ] {
            roles.entry(key).or_default().push(name.to_string());
        }

        let mut conflicts: Vec<Conflict> = roles
            .into_iter()
            .filter(|(_, roles)| roles.len() > 1)
            .map(|(key, roles)| Conflict { key, roles })
            .collect();
        conflicts.sort_by_key(|c| format!("{:?}", c.key));
        conflicts
    }

    /// Log every conflict; the bindings stay usable as they are.
    pub fn warn_conflicts(&self) {
        for conflict in self.detect_conflicts() {
            warn!(key = ?conflict.key, roles = ?conflict.roles, "Key bound to several roles");
        }
    }

    fn movement(&self, keyboard: &KeyboardState) -> MovementInput {
        let held = |code: KeyCode| keyboard.is_pressed(PhysicalKey::Code(code));
        MovementInput {
            forward: held(self.move_forward),
            back: held(self.move_back),
            left: held(self.move_left),
            right: held(self.move_right),
        }
    }
}

/// Everything the simulation needs from one frame of input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Commands in the order their events arrived.
    pub commands: Vec<SceneCommand>,
    pub movement: MovementInput,
    pub quit: bool,
}

/// Translate the accumulated input state into scene commands.
///
/// Key releases come first, in arrival order, then one drag command per
/// cursor move and one scroll command. Does not clear transients.
pub fn resolve_frame(
    bindings: &KeyBindings,
    keyboard: &KeyboardState,
    mouse: &MouseState,
) -> FrameInput {
    let mut frame = FrameInput {
        movement: bindings.movement(keyboard),
        ..FrameInput::default()
    };

    for &key in keyboard.releases() {
        let Some(action) = bindings.action_for(key) else {
            continue;
        };
        let command = match action {
            SceneAction::CycleCameraForward => SceneCommand::CycleCameraForward,
            SceneAction::CycleCameraBackward => SceneCommand::CycleCameraBackward,
            SceneAction::AccelerateTime => SceneCommand::AccelerateTime,
            SceneAction::DecelerateTime => SceneCommand::DecelerateTime,
            SceneAction::ToggleShadows => SceneCommand::ToggleShadows,
            SceneAction::ShadingMode(index) => match ShadingMode::from_index(index) {
                Some(mode) => SceneCommand::SetShadingMode(mode),
                None => {
                    warn!(index, "Unknown shading mode");
                    continue;
                }
            },
            SceneAction::Quit => {
                frame.quit = true;
                continue;
            }
        };
        frame.commands.push(command);
    }

    frame.commands.extend(
        mouse
            .drag_steps()
            .iter()
            .map(|step| SceneCommand::Drag {
                dx: step.x,
                dy: step.y,
            }),
    );
    if mouse.scroll() != 0.0 {
        frame.commands.push(SceneCommand::Scroll(mouse.scroll()));
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::RawKeyEvent;
    use winit::event::{ElementState, MouseButton, MouseScrollDelta};

    fn press(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        });
    }

    fn release(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Released,
            repeat: false,
        });
    }

    #[test]
    fn test_default_bindings_have_no_conflicts() {
        assert!(KeyBindings::default().detect_conflicts().is_empty());
    }

    #[test]
    fn test_conflict_detected() {
        let mut bindings = KeyBindings::default();
        bindings.on_release.push((KeyCode::KeyW, SceneAction::ToggleShadows));
        let conflicts = bindings.detect_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].key, KeyCode::KeyW);
        assert_eq!(conflicts[0].roles.len(), 2);
    }

    #[test]
    fn test_actions_fire_on_release_only() {
        let bindings = KeyBindings::default();
        let mut kb = KeyboardState::new();
        let mouse = MouseState::default();

        press(&mut kb, KeyCode::KeyP);
        assert!(resolve_frame(&bindings, &kb, &mouse).commands.is_empty());

        kb.clear_transients();
        release(&mut kb, KeyCode::KeyP);
        let frame = resolve_frame(&bindings, &kb, &mouse);
        assert_eq!(frame.commands, vec![SceneCommand::CycleCameraForward]);
    }

    #[test]
    fn test_release_order_preserved() {
        let bindings = KeyBindings::default();
        let mut kb = KeyboardState::new();
        for code in [KeyCode::KeyL, KeyCode::KeyK, KeyCode::KeyL, KeyCode::Digit3] {
            press(&mut kb, code);
            release(&mut kb, code);
        }
        let frame = resolve_frame(&bindings, &kb, &MouseState::default());
        assert_eq!(
            frame.commands,
            vec![
                SceneCommand::AccelerateTime,
                SceneCommand::DecelerateTime,
                SceneCommand::AccelerateTime,
                SceneCommand::SetShadingMode(ShadingMode::Diffuse),
            ]
        );
    }

    #[test]
    fn test_movement_from_held_keys() {
        let bindings = KeyBindings::default();
        let mut kb = KeyboardState::new();
        press(&mut kb, KeyCode::KeyW);
        press(&mut kb, KeyCode::KeyD);
        kb.clear_transients();
        let frame = resolve_frame(&bindings, &kb, &MouseState::default());
        assert!(frame.movement.forward && frame.movement.right);
        assert!(!frame.movement.back && !frame.movement.left);
        assert!(frame.commands.is_empty());
    }

    #[test]
    fn test_pointer_commands_follow_keys() {
        let bindings = KeyBindings::default();
        let mut kb = KeyboardState::new();
        let mut mouse = MouseState::default();
        press(&mut kb, KeyCode::KeyO);
        release(&mut kb, KeyCode::KeyO);
        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        mouse.on_cursor_moved(4.0, -2.0);
        mouse.on_cursor_moved(5.0, -2.0);
        mouse.on_scroll(MouseScrollDelta::LineDelta(0.0, -1.0));

        let frame = resolve_frame(&bindings, &kb, &mouse);
        assert_eq!(
            frame.commands,
            vec![
                SceneCommand::CycleCameraBackward,
                SceneCommand::Drag { dx: 4.0, dy: -2.0 },
                SceneCommand::Drag { dx: 1.0, dy: 0.0 },
                SceneCommand::Scroll(-1.0),
            ]
        );
    }

    #[test]
    fn test_escape_requests_quit() {
        let bindings = KeyBindings::default();
        let mut kb = KeyboardState::new();
        release(&mut kb, KeyCode::Escape);
        let frame = resolve_frame(&bindings, &kb, &MouseState::default());
        assert!(frame.quit);
        assert!(frame.commands.is_empty());
    }

    #[test]
    fn test_unknown_shading_index_ignored() {
        let bindings = KeyBindings {
            on_release: vec![(KeyCode::Digit9, SceneAction::ShadingMode(9))],
            ..KeyBindings::default()
        };
        let mut kb = KeyboardState::new();
        release(&mut kb, KeyCode::Digit9);
        assert!(resolve_frame(&bindings, &kb, &MouseState::default()).commands.is_empty());
    }
}
