use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::Point2;

/// A point on an image frame in pixel coordinates.
///
/// Keypoints are kept as floating point values for the whole pipeline and are only
/// truncated to integer pixels when they are finally drawn.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
pub struct KeyPoint(pub Point2<f64>);

impl KeyPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point2::new(x, y))
    }

    /// Returns `true` if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.0.x.is_finite() && self.0.y.is_finite()
    }

    /// Truncates the keypoint to integer pixel coordinates.
    pub fn truncated(&self) -> (i32, i32) {
        (self.0.x as i32, self.0.y as i32)
    }
}

impl From<(f64, f64)> for KeyPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<KeyPoint> for (f64, f64) {
    fn from(kp: KeyPoint) -> Self {
        (kp.0.x, kp.0.y)
    }
}
