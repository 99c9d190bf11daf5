//! This crate plugs into `f2b-core` and provides the camera model used to draw the F2B
//! flight sphere: intrinsics, lens distortion and the projection of world points into
//! pixels. It can also go backwards from a pixel to a bearing, which is what the pose
//! solver needs.
//!
//! Two projections are available through [`Projection`]:
//!
//! * [`Projection::Rectified`] uses the rectified ("new") intrinsic matrix and no
//!   distortion. Video frames are undistorted upstream, so all AR drawing uses this.
//! * [`Projection::Raw`] uses the calibrated intrinsic matrix together with the true
//!   distortion coefficients, for raw frames straight off the sensor.

mod calibration;
mod camera;
mod distortion;

pub use calibration::*;
pub use camera::*;
pub use distortion::*;

use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use f2b_core::nalgebra::{Matrix3, Point2, Unit, Vector2, Vector3};
use f2b_core::KeyPoint;

/// A point in normalized image coordinates. This keypoint has been corrected
/// for distortion and normalized based on the camera intrinsic matrix.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
pub struct NormalizedKeyPoint(pub Point2<f64>);

impl NormalizedKeyPoint {
    /// Conceptually appends a `1.0` component to the normalized keypoint to get the
    /// point on the virtual image plane and returns the unit direction towards it.
    pub fn bearing(self) -> Unit<Vector3<f64>> {
        Unit::new_normalize(self.0.coords.push(1.0))
    }
}

/// This contains intrinsic camera parameters as per
/// [this Wikipedia page](https://en.wikipedia.org/wiki/Camera_resectioning#Intrinsic_parameters).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct CameraIntrinsics {
    pub focals: Vector2<f64>,
    pub principal_point: Point2<f64>,
    pub skew: f64,
}

impl CameraIntrinsics {
    /// Creates camera intrinsics that would create an identity intrinsic matrix.
    /// This would imply that the pixel positions have an origin at `0,0`,
    /// the pixel distance unit is the focal length, pixels are square,
    /// and there is no skew.
    pub fn identity() -> Self {
        Self {
            focals: Vector2::new(1.0, 1.0),
            skew: 0.0,
            principal_point: Point2::new(0.0, 0.0),
        }
    }

    pub fn focals(self, focals: Vector2<f64>) -> Self {
        Self { focals, ..self }
    }

    pub fn focal(self, focal: f64) -> Self {
        Self {
            focals: Vector2::new(focal, focal),
            ..self
        }
    }

    pub fn principal_point(self, principal_point: Point2<f64>) -> Self {
        Self {
            principal_point,
            ..self
        }
    }

    pub fn skew(self, skew: f64) -> Self {
        Self { skew, ..self }
    }

    /// Reads the intrinsics out of a 3x3 camera matrix.
    ///
    /// The bottom row must be `0 0 1`, the matrix must be upper triangular and the
    /// focal lengths must be positive.
    ///
    /// ```
    /// use f2b_core::nalgebra::Matrix3;
    /// use f2b_pinhole::CameraIntrinsics;
    /// let matrix = Matrix3::new(
    ///     1200.0, 0.0, 960.0,
    ///     0.0, 1190.0, 540.0,
    ///     0.0, 0.0, 1.0,
    /// );
    /// let intrinsics = CameraIntrinsics::from_matrix(&matrix).unwrap();
    /// assert_eq!(intrinsics.matrix(), matrix);
    /// ```
    pub fn from_matrix(matrix: &Matrix3<f64>) -> Result<Self, CameraModelError> {
        if matrix.iter().any(|n| !n.is_finite()) {
            return Err(CameraModelError::NonFinite("camera matrix"));
        }
        let bottom = [matrix[(2, 0)], matrix[(2, 1)], matrix[(2, 2)]];
        if bottom != [0.0, 0.0, 1.0] || matrix[(1, 0)] != 0.0 {
            return Err(CameraModelError::NotIntrinsic);
        }
        let focals = Vector2::new(matrix[(0, 0)], matrix[(1, 1)]);
        if focals.x <= 0.0 || focals.y <= 0.0 {
            return Err(CameraModelError::NonPositiveFocal(focals.x, focals.y));
        }
        Ok(Self::identity()
            .focals(focals)
            .principal_point(Point2::new(matrix[(0, 2)], matrix[(1, 2)]))
            .skew(matrix[(0, 1)]))
    }

    #[rustfmt::skip]
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.focals.x,  self.skew,      self.principal_point.x,
            0.0,            self.focals.y,  self.principal_point.y,
            0.0,            0.0,            1.0,
        )
    }

    /// Takes in a point from an image in pixel coordinates and
    /// converts it to a [`NormalizedKeyPoint`].
    ///
    /// ```
    /// use f2b_core::KeyPoint;
    /// use f2b_pinhole::CameraIntrinsics;
    /// use f2b_core::nalgebra::{Vector2, Point2};
    /// let intrinsics = CameraIntrinsics {
    ///     focals: Vector2::new(800.0, 900.0),
    ///     principal_point: Point2::new(500.0, 600.0),
    ///     skew: 1.7,
    /// };
    /// let kp = KeyPoint(Point2::new(471.0, 322.0));
    /// let nkp = intrinsics.calibrate(kp);
    /// let distance = (kp.to_homogeneous() - intrinsics.matrix() * nkp.to_homogeneous()).norm();
    /// assert!(distance < 0.1);
    /// ```
    pub fn calibrate(&self, point: KeyPoint) -> NormalizedKeyPoint {
        let centered = point.0 - self.principal_point;
        let y = centered.y / self.focals.y;
        let x = (centered.x - self.skew * y) / self.focals.x;
        NormalizedKeyPoint(Point2::new(x, y))
    }

    /// Converts a [`NormalizedKeyPoint`] back into pixel coordinates.
    ///
    /// ```
    /// use f2b_core::KeyPoint;
    /// use f2b_pinhole::CameraIntrinsics;
    /// use f2b_core::nalgebra::{Vector2, Point2};
    /// let intrinsics = CameraIntrinsics {
    ///     focals: Vector2::new(800.0, 900.0),
    ///     principal_point: Point2::new(500.0, 600.0),
    ///     skew: 1.7,
    /// };
    /// let kp = KeyPoint(Point2::new(471.0, 322.0));
    /// let ukp = intrinsics.uncalibrate(intrinsics.calibrate(kp));
    /// assert!((kp.0 - ukp.0).norm() < 1e-6);
    /// ```
    pub fn uncalibrate(&self, projection: NormalizedKeyPoint) -> KeyPoint {
        let y = projection.y * self.focals.y;
        let x = projection.x * self.focals.x + self.skew * projection.y;
        KeyPoint(Point2::new(x, y) + self.principal_point.coords)
    }
}
