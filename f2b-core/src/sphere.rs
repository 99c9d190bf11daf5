use nalgebra::{Point3, Vector3};
use thiserror::Error;

/// `cos(45°)`, kept as the literal used by the judging geometry.
pub const COS_45: f64 = 0.70710678;

/// Default radius of the flight hemisphere, in meters.
pub const DEFAULT_FLIGHT_RADIUS: f64 = 21.0;
/// Default radius of the circle on which the markers stand, in meters.
pub const DEFAULT_MARKER_RADIUS: f64 = 25.0;
/// Default elevation of the marker circle above the center marker, in meters.
pub const DEFAULT_MARKER_HEIGHT: f64 = 1.5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{name} must be a positive finite length, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("marker height must be a non-negative finite length, got {0}")]
    NegativeHeight(f64),
    #[error("sphere offset must be finite, got {0:?}")]
    NonFiniteOffset([f64; 3]),
}

/// Dimensions of the flight sphere and of the marker circle used to locate the camera.
///
/// Set once when a flight is defined and immutable for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    flight_radius: f64,
    marker_radius: f64,
    marker_height: f64,
    sphere_offset: Vector3<f64>,
}

impl SphereGeometry {
    /// Validates and creates the geometry.
    ///
    /// Both radii must be positive, the marker height must be non-negative and every
    /// value must be finite.
    pub fn new(
        flight_radius: f64,
        marker_radius: f64,
        marker_height: f64,
        sphere_offset: Vector3<f64>,
    ) -> Result<Self, GeometryError> {
        for (name, value) in [
            ("flight radius", flight_radius),
            ("marker radius", marker_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeometryError::NonPositive { name, value });
            }
        }
        if !(marker_height.is_finite() && marker_height >= 0.0) {
            return Err(GeometryError::NegativeHeight(marker_height));
        }
        if sphere_offset.iter().any(|n| !n.is_finite()) {
            return Err(GeometryError::NonFiniteOffset([
                sphere_offset.x,
                sphere_offset.y,
                sphere_offset.z,
            ]));
        }
        Ok(Self {
            flight_radius,
            marker_radius,
            marker_height,
            sphere_offset,
        })
    }

    pub fn flight_radius(&self) -> f64 {
        self.flight_radius
    }

    pub fn marker_radius(&self) -> f64 {
        self.marker_radius
    }

    pub fn marker_height(&self) -> f64 {
        self.marker_height
    }

    /// XYZ offset of the AR flight sphere relative to the center of the marker circle.
    pub fn sphere_offset(&self) -> Vector3<f64> {
        self.sphere_offset
    }

    /// The object points used for pose estimation.
    pub fn object_points(&self) -> ObjectPoints {
        let rcos45 = self.marker_radius * COS_45;
        ObjectPoints([
            Point3::new(0.0, 0.0, -self.marker_height),
            Point3::new(0.0, self.marker_radius, 0.0),
            Point3::new(-rcos45, rcos45, 0.0),
            Point3::new(rcos45, rcos45, 0.0),
        ])
    }
}

impl Default for SphereGeometry {
    fn default() -> Self {
        Self {
            flight_radius: DEFAULT_FLIGHT_RADIUS,
            marker_radius: DEFAULT_MARKER_RADIUS,
            marker_height: DEFAULT_MARKER_HEIGHT,
            sphere_offset: Vector3::zeros(),
        }
    }
}

/// The reference markers the user identifies in the image, in locating order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    CircleCenter = 0,
    FrontMarker,
    LeftMarker,
    RightMarker,
}

impl Marker {
    /// All markers in the order in which they must be located.
    pub const ALL: [Marker; 4] = [
        Marker::CircleCenter,
        Marker::FrontMarker,
        Marker::LeftMarker,
        Marker::RightMarker,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Marker::CircleCenter => "circle center",
            Marker::FrontMarker => "front marker",
            Marker::LeftMarker => "left marker",
            Marker::RightMarker => "right marker",
        }
    }
}

/// Number of point correspondences needed to locate the camera.
pub const NUM_OBJECT_POINTS: usize = Marker::ALL.len();

/// The 3d positions of the [`Marker`]s, in the order of [`Marker::ALL`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPoints(pub [Point3<f64>; NUM_OBJECT_POINTS]);

impl ObjectPoints {
    pub fn get(&self, marker: Marker) -> Point3<f64> {
        self.0[marker as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Marker, Point3<f64>)> + '_ {
        Marker::ALL.iter().copied().zip(self.0.iter().copied())
    }
}
