use nalgebra::{IsometryMatrix3, Point3, Rotation3, Vector3};

/// The extrinsic parameters of a camera: the pose of the world relative to the camera.
///
/// This maps world points into camera points, changing an absolute position in the
/// flight field into a vector relative to the camera:
///
/// ```text
/// camera = R(rvec) * world + tvec
/// ```
///
/// The rotation is stored as a rotation vector (axis-angle, the angle in radians is the
/// norm of the vector) and the translation is in meters, the same units as the world model.
/// A pose is always replaced wholesale; it is never partially updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub rvec: Vector3<f64>,
    pub tvec: Vector3<f64>,
}

impl Pose {
    /// Creates a pose from a rotation vector and a translation vector.
    pub fn new(rvec: Vector3<f64>, tvec: Vector3<f64>) -> Self {
        Self { rvec, tvec }
    }

    /// Creates a pose with no change in position or orientation.
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Create the pose from rotation and translation.
    pub fn from_parts(translation: Vector3<f64>, rotation: Rotation3<f64>) -> Self {
        Self::new(rotation.scaled_axis(), translation)
    }

    /// Retrieve the rotation matrix.
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_scaled_axis(self.rvec)
    }

    /// Retrieve the isometry.
    pub fn isometry(&self) -> IsometryMatrix3<f64> {
        IsometryMatrix3::from_parts(self.tvec.into(), self.rotation())
    }

    /// Transforms a world point into the camera frame.
    pub fn transform(&self, world: &Point3<f64>) -> Point3<f64> {
        self.rotation() * world + self.tvec
    }

    /// The position of the camera's optical center in world coordinates.
    pub fn camera_center(&self) -> Point3<f64> {
        let rotation = self.rotation();
        Point3::from(-(rotation.inverse() * self.tvec))
    }

    /// Returns `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.rvec.iter().chain(self.tvec.iter()).all(|n| n.is_finite())
    }
}

impl From<IsometryMatrix3<f64>> for Pose {
    fn from(isometry: IsometryMatrix3<f64>) -> Self {
        Self::from_parts(isometry.translation.vector, isometry.rotation)
    }
}

impl From<Pose> for IsometryMatrix3<f64> {
    fn from(pose: Pose) -> Self {
        pose.isometry()
    }
}
