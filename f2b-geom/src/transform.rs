//! Rotations and point set transforms.
//!
//! Angles are accepted in degrees and converted to radians here, once.
//! Rotations are column matrices applied as `m * p`.

use f2b_core::nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector3};

/// Tilt of a loop out of the vertical plane, 22.5° about the X axis.
#[rustfmt::skip]
pub const LOOP_TILT: [[f64; 3]; 3] = [
    [1.0, 0.0,      0.0],
    [0.0, 0.92388, -0.38268],
    [0.0, 0.38268,  0.92388],
];

/// Tilt of a top loop, 67.5° about the X axis.
#[rustfmt::skip]
pub const TOP_LOOP_TILT: [[f64; 3]; 3] = [
    [1.0, 0.0,      0.0],
    [0.0, 0.38268, -0.92388],
    [0.0, 0.92388,  0.38268],
];

/// Builds a matrix from rows.
pub fn matrix(rows: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::from_fn(|r, c| rows[r][c])
}

/// Rotation about the polar (Z) axis that carries a figure to its clock position.
///
/// Positive angles turn the front of the sphere (+Y) towards the pilot's right (+X).
///
/// ```
/// use f2b_core::nalgebra::Point3;
/// use f2b_geom::yaw;
/// let p = yaw(90.0) * Point3::new(0.0, 1.0, 0.0);
/// assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
/// ```
pub fn yaw(angle_deg: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -angle_deg.to_radians()).into_inner()
}

/// Rotation about the X axis, raising the front of the sphere towards the top.
pub fn tilt(angle_deg: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle_deg.to_radians()).into_inner()
}

/// Applies `m` to every point.
pub fn rotate(points: &[Point3<f64>], m: &Matrix3<f64>) -> Vec<Point3<f64>> {
    points.iter().map(|p| Point3::from(m * p.coords)).collect()
}

/// Adds `offset` to every point.
pub fn translate(points: &[Point3<f64>], offset: &Vector3<f64>) -> Vec<Point3<f64>> {
    points.iter().map(|p| p + offset).collect()
}

/// Places planar points in the vertical XZ plane: `(x, y) -> (x, 0, y)`.
pub fn embed_xz(points: &[Point2<f64>]) -> Vec<Point3<f64>> {
    points.iter().map(|p| Point3::new(p.x, 0.0, p.y)).collect()
}

/// Places planar points in the vertical YZ plane: `(x, y) -> (0, x, y)`.
pub fn embed_yz(points: &[Point2<f64>]) -> Vec<Point3<f64>> {
    points.iter().map(|p| Point3::new(0.0, p.x, p.y)).collect()
}

/// Places planar points in a horizontal plane at `height`: `(x, y) -> (x, y, height)`.
pub fn embed_xy(points: &[Point2<f64>], height: f64) -> Vec<Point3<f64>> {
    points.iter().map(|p| Point3::new(p.x, p.y, height)).collect()
}
