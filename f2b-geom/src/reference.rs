//! Fixed reference points drawn in the world frame, regardless of where the sphere is moved.

use f2b_core::nalgebra::Point3;
use f2b_core::{SphereGeometry, COS_45};

/// Width of a marker, in meters.
pub const MARKER_WIDTH: f64 = 0.20;
/// Height of a marker, in meters.
pub const MARKER_HEIGHT_SIZE: f64 = 0.60;

/// Length of the X and Y axes drawn by [`axis_points`], in meters.
pub const AXIS_LENGTH_XY: f64 = 2.0;
/// Length of the Z axis drawn by [`axis_points`], in meters.
pub const AXIS_LENGTH_Z: f64 = 5.0;

/// The semantic group of a reference point, which decides its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceGroup {
    /// Points on the sphere centerline and on the equator.
    Centerline,
    /// Corners of an imaginary marker at the center of the circle.
    CenterMarker,
    /// Corners of the front, right and left markers.
    OuterMarkers,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    pub group: ReferenceGroup,
    pub point: Point3<f64>,
}

/// Corners of a marker standing at `(x, y)`, top right first.
fn marker_corners(x: f64, y: f64) -> [Point3<f64>; 4] {
    let (hx, hz) = (0.5 * MARKER_WIDTH, 0.5 * MARKER_HEIGHT_SIZE);
    [
        Point3::new(x + hx, y, hz),
        Point3::new(x - hx, y, hz),
        Point3::new(x - hx, y, -hz),
        Point3::new(x + hx, y, -hz),
    ]
}

/// The 25 reference points: 9 on the centerline and equator, 4 corners of the
/// center marker, then 4 corners each of the front, right and left markers.
pub fn reference_points(sphere: &SphereGeometry) -> Vec<ReferencePoint> {
    let r = sphere.flight_radius();
    let mr = sphere.marker_radius();
    let rcos45 = mr * COS_45;

    let centerline = [
        // sphere center, pilot's feet, top of sphere
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, -sphere.marker_height()),
        Point3::new(0.0, 0.0, r),
        // bases of right and left markers, then the antipodes
        Point3::new(rcos45, rcos45, 0.0),
        Point3::new(-rcos45, rcos45, 0.0),
        Point3::new(mr, 0.0, 0.0),
        Point3::new(-mr, 0.0, 0.0),
        Point3::new(0.0, -mr, 0.0),
        Point3::new(0.0, mr, 0.0),
    ];

    let with = |group: ReferenceGroup| move |point: Point3<f64>| ReferencePoint { group, point };
    centerline
        .into_iter()
        .map(with(ReferenceGroup::Centerline))
        .chain(marker_corners(0.0, 0.0).into_iter().map(with(ReferenceGroup::CenterMarker)))
        .chain(
            [(0.0, mr), (rcos45, rcos45), (-rcos45, rcos45)]
                .into_iter()
                .flat_map(|(x, y)| marker_corners(x, y))
                .map(with(ReferenceGroup::OuterMarkers)),
        )
        .collect()
}

/// The origin followed by the tips of the X, Y and Z axes.
pub fn axis_points() -> [Point3<f64>; 4] {
    [
        Point3::origin(),
        Point3::new(AXIS_LENGTH_XY, 0.0, 0.0),
        Point3::new(0.0, AXIS_LENGTH_XY, 0.0),
        Point3::new(0.0, 0.0, AXIS_LENGTH_Z),
    ]
}
