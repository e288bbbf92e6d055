//! Software rendering module
//!
//! A classic one-ray-per-column raycaster drawing into an RGB frame buffer.
//! Nothing here mutates simulation state.

pub mod frame;
pub mod palette;
pub mod raycast;
pub mod sky;
pub mod sprite;
pub mod viewport;

pub use frame::{Frame, Rect, Rgb};
pub use palette::Palette;
pub use raycast::{DepthBuffer, RayHit, RaycastConfig, cast_column, cast_ray};
pub use sky::{SkyConfig, SunConfig};
pub use sprite::{Billboard, PlayerStyle, SpriteConfig};
pub use viewport::{RenderConfig, render_split, render_view, split};
