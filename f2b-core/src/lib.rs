//! # F2B Core
//!
//! Common types shared by every crate of the F2B augmented-reality workspace.
//!
//! The world frame is anchored at the center of the marker circle on the ground:
//!
//! * Positive X axis points to the pilot's right (east)
//! * Positive Y axis points forwards, towards the front marker (north)
//! * Positive Z axis points up, along the polar axis of the flight sphere
//!
//! All distances are in meters and all user-facing angles are in degrees.
//!
//! A [`Pose`] maps world points into the camera frame, where the positive X axis
//! is right, the positive Y axis is down and the positive Z axis is forwards
//! from the optical center, the same convention used by OpenCV's `rvec`/`tvec`.

mod keypoint;
mod pose;
mod sphere;

pub use keypoint::*;
pub use nalgebra;
pub use pose::*;
pub use sphere::*;
