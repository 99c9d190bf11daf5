use core::f64::consts::{PI, TAU};
use f2b_core::nalgebra::Point2;

/// Number of segments used for every curve on the sphere.
pub const SEGMENTS: usize = 100;

/// Returns `segments + 1` points evenly spaced on a full circle, starting at `(radius, 0)`.
///
/// The last point repeats the first so the result can be drawn as a closed line strip.
/// A negative radius mirrors the circle through the origin.
///
/// ```
/// use f2b_geom::points_on_circle;
/// let points = points_on_circle(2.0, 4);
/// assert_eq!(points.len(), 5);
/// assert_eq!(points[0], points[4]);
/// ```
pub fn points_on_circle(radius: f64, segments: usize) -> Vec<Point2<f64>> {
    if segments == 0 {
        return vec![Point2::new(radius, 0.0)];
    }
    (0..=segments)
        .map(|i| {
            let angle = TAU * (i % segments) as f64 / segments as f64;
            Point2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}

/// Returns `segments + 1` points evenly spaced on a half circle, from `(radius, 0)`
/// to `(-radius, 0)` through `(0, radius)`.
pub fn points_on_half_circle(radius: f64, segments: usize) -> Vec<Point2<f64>> {
    if segments == 0 {
        return vec![Point2::new(radius, 0.0)];
    }
    (0..=segments)
        .map(|i| {
            let angle = PI * i as f64 / segments as f64;
            Point2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect()
}
