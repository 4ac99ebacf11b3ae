//! Frame-coherent keyboard state tracker.
//!
//! Physical key codes are used throughout so the bindings sit in the same
//! place on every keyboard layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

/// Minimal description of a key event, constructible without a window.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    pub repeat: bool,
}

/// Held keys plus the releases seen since the last
/// [`clear_transients`](Self::clear_transients).
///
/// Releases are also kept in arrival order, so two taps of the same key
/// within one frame count as two events.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<PhysicalKey>,
    releases: Vec<PhysicalKey>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Repeat events are ignored. A release without a matching press (focus
    /// gained while the key was down) still counts as a release.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                self.pressed.insert(event.key);
            }
            ElementState::Released => {
                self.pressed.remove(&event.key);
                self.releases.push(event.key);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed.contains(&key)
    }

    /// Keys released this frame, oldest first.
    #[must_use]
    pub fn releases(&self) -> &[PhysicalKey] {
        &self.releases
    }

    /// Drop every held key, e.g. when the window loses focus and the
    /// matching releases will never arrive.
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    pub fn clear_transients(&mut self) {
        self.releases.clear();
    }
}
