//! Platform abstraction layer
//!
//! Glue between a host (browser or native driver) and the simulation:
//! - Frame timing and visibility handling
//! - Keyboard/touch mapping to tick input
//! - The renderer seam

pub mod clock;
pub mod input;

pub use clock::{FrameClock, Renderer, run_frame};
pub use input::{Action, InputMapper, TouchRegion, action_for_key};
