//! Platform layer
//!
//! Terminal presentation and keyboard polling. Nothing in `sim` or
//! `renderer` depends on this module.

pub mod input;
pub mod terminal;

pub use input::{Command, KeyBindings, KeyboardInput};
pub use terminal::{TerminalPresenter, pixel_size};
