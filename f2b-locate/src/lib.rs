//! Locates the camera relative to the flight circle.
//!
//! The user clicks the four markers of [`f2b_core::Marker::ALL`] on a frame. The
//! [`Locator`] collects those clicks and, once all four exist, hands them to the
//! [`PoseSolver`], which runs [`LambdaTwist`] P3P over every triple and refines the
//! best candidate against all four points.

mod locator;
mod p3p;
mod solver;

pub use locator::*;
pub use p3p::*;
pub use solver::*;
