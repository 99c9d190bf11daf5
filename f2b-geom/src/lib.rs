//! Pure geometry of the F2B flight sphere.
//!
//! Everything here is built from two primitives, a closed circle and a half circle
//! ([`curve`]), composed with a handful of rotations ([`transform`]) into the named
//! figures ([`figure`]) and the background references drawn on every frame
//! ([`reference`]). All outputs are world points in meters; nothing here knows
//! about cameras.

pub mod curve;
pub mod figure;
pub mod reference;
pub mod transform;

pub use curve::*;
pub use figure::*;
pub use reference::*;
pub use transform::*;
