//! The orrery viewer: window, event loop and frame loop.
//!
//! [`run`] opens the window, builds the simulation from configuration and
//! drives one input, update and render step per redraw.

pub mod error;
pub mod frame_clock;
pub mod platform;
pub mod scene;
pub mod window;

pub use error::AppError;
pub use frame_clock::FrameClock;
pub use platform::{PlatformDirs, PlatformError};
pub use window::{OrreryApp, run, window_attributes_from_config};
