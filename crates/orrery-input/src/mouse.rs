//! Pointer state: cursor position, drag motion and scroll.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of a high-resolution scroll treated as one line.
const PIXELS_PER_LINE: f64 = 40.0;

/// Frame-coherent pointer state.
///
/// While the drag button is held every cursor move is kept as its own step,
/// so the camera can clamp after each one the way a per-event handler would.
#[derive(Debug, Clone)]
pub struct MouseState {
    position: Vec2,
    drag_button: MouseButton,
    dragging: bool,
    drag_steps: Vec<Vec2>,
    scroll: f32,
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new(MouseButton::Left)
    }
}

impl MouseState {
    #[must_use]
    pub fn new(drag_button: MouseButton) -> Self {
        Self {
            position: Vec2::ZERO,
            drag_button,
            dragging: false,
            drag_steps: Vec::new(),
            scroll: 0.0,
        }
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        let step = new_pos - self.position;
        if self.dragging && step != Vec2::ZERO {
            self.drag_steps.push(step);
        }
        self.position = new_pos;
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button == self.drag_button {
            self.dragging = state == ElementState::Pressed;
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_x, y) => y,
            MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
        };
    }

    /// Leaving the window ends any drag; the release may never be delivered.
    pub fn on_cursor_left(&mut self) {
        self.dragging = false;
    }

    pub fn clear_transients(&mut self) {
        self.drag_steps.clear();
        self.scroll = 0.0;
    }

    /// Cursor moves made while dragging since the last clear, in pixels and
    /// arrival order.
    #[must_use]
    pub fn drag_steps(&self) -> &[Vec2] {
        &self.drag_steps
    }

    /// Scroll accumulated this frame in lines (positive = away from the user).
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }
}
