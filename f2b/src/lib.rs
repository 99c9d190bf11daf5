//! # `f2b`
//!
//! Augmented reality for F2B control-line flight video.
//!
//! A [`Flight`] binds a video source to a camera calibration and the dimensions of the
//! flight sphere and its markers. A [`Processor`] takes that flight, locates the camera
//! from four clicked markers, then draws the sphere, the enabled figures and the
//! aircraft track onto every frame it is given. The processor is driven by
//! [`Command`]s sent over a channel and reports back with [`Event`]s, so it can live on
//! a worker thread separate from whatever presents the frames.
//!
//! The building blocks are re-exported for convenience:
//! * [`core`] - poses, keypoints and the sphere geometry
//! * [`camera`] - camera models and calibration files
//! * [`geom`] - curves, transforms and figure recipes
//! * [`locate`] - the locator and the 4-point pose solver
//! * [`draw`] - the AR renderer and the aircraft track

mod error;
mod flight;
mod processor;
mod settings;

pub use error::*;
pub use flight::*;
pub use processor::*;
pub use settings::*;

pub use f2b_core as core;
pub use f2b_draw as draw;
pub use f2b_geom as geom;
pub use f2b_locate as locate;
pub use f2b_pinhole as camera;
