//! Keyboard and pointer input for the orrery viewer.
//!
//! Window events are folded into [`KeyboardState`] and [`MouseState`] while
//! the event loop runs; once per frame [`resolve_frame`] turns them into
//! scene commands and held movement keys, then the caller clears transients.

pub mod bindings;
pub mod keyboard;
pub mod mouse;

pub use bindings::{Conflict, FrameInput, KeyBindings, SceneAction, resolve_frame};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
