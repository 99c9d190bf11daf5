//! Augmented reality drawing for F2B flight video.
//!
//! [`ArRenderer`] projects the sphere, its references and the enabled figures into
//! a frame with a solved camera pose. [`Track`] keeps the recent aircraft positions
//! and draws them as a trail that fades from red to green with age.
//!
//! Frames are `image::RgbImage` buffers drawn in place. All projection happens in
//! floating point; coordinates are truncated to pixels only by the draw calls.

pub mod color;
mod figures;
mod renderer;
mod track;
mod view;

pub use figures::*;
pub use renderer::*;
pub use track::*;
pub use view::*;
