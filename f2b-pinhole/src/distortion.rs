use crate::{CameraModelError, NormalizedKeyPoint};
use f2b_core::nalgebra::Point2;
use serde::{Deserialize, Serialize};

const UNDISTORT_ITERATIONS: usize = 20;
const UNDISTORT_EPSILON: f64 = 1e-12;

/// The lens family a calibration was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensModel {
    Pinhole,
    Fisheye,
}

impl Default for LensModel {
    fn default() -> Self {
        Self::Pinhole
    }
}

/// Lens distortion applied to normalized image coordinates.
///
/// `BrownConrady` holds the rational model coefficients in the order
/// `k1 k2 p1 p2 k3 k4 k5 k6`. Shorter calibrations fill the missing
/// coefficients with zero. `Fisheye` holds the equidistant model
/// coefficients `k1 k2 k3 k4`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distortion {
    None,
    BrownConrady([f64; 8]),
    Fisheye([f64; 4]),
}

impl Default for Distortion {
    fn default() -> Self {
        Self::None
    }
}

impl Distortion {
    /// Builds the distortion from a flat coefficient list.
    ///
    /// Pinhole lenses accept 0, 4, 5 or 8 coefficients, fisheye lenses exactly 4.
    /// An all-zero list is the same as no distortion.
    ///
    /// ```
    /// use f2b_pinhole::{Distortion, LensModel};
    /// let d = Distortion::from_coefficients(LensModel::Pinhole, &[0.1, -0.2, 0.0, 0.0, 0.05]).unwrap();
    /// assert_eq!(d, Distortion::BrownConrady([0.1, -0.2, 0.0, 0.0, 0.05, 0.0, 0.0, 0.0]));
    /// assert!(Distortion::from_coefficients(LensModel::Fisheye, &[0.1]).is_err());
    /// ```
    pub fn from_coefficients(lens: LensModel, coefficients: &[f64]) -> Result<Self, CameraModelError> {
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(CameraModelError::NonFinite("distortion coefficients"));
        }
        let all_zero = coefficients.iter().all(|&c| c == 0.0);
        match lens {
            LensModel::Pinhole => match coefficients.len() {
                0 => Ok(Self::None),
                4 | 5 | 8 if all_zero => Ok(Self::None),
                4 | 5 | 8 => {
                    let mut k = [0.0; 8];
                    k[..coefficients.len()].copy_from_slice(coefficients);
                    Ok(Self::BrownConrady(k))
                }
                n => Err(CameraModelError::DistortionLength { lens, len: n }),
            },
            LensModel::Fisheye => match coefficients.len() {
                4 if all_zero => Ok(Self::None),
                4 => {
                    let mut k = [0.0; 4];
                    k.copy_from_slice(coefficients);
                    Ok(Self::Fisheye(k))
                }
                n => Err(CameraModelError::DistortionLength { lens, len: n }),
            },
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Maps an ideal normalized point to where the lens actually puts it.
    pub fn distort(&self, point: NormalizedKeyPoint) -> NormalizedKeyPoint {
        let (x, y) = (point.x, point.y);
        match *self {
            Self::None => point,
            Self::BrownConrady(k) => {
                let r2 = x * x + y * y;
                let radial = rational_radial(&k, r2);
                let (dx, dy) = tangential(&k, x, y, r2);
                NormalizedKeyPoint(Point2::new(x * radial + dx, y * radial + dy))
            }
            Self::Fisheye(k) => {
                let r = (x * x + y * y).sqrt();
                if r < UNDISTORT_EPSILON {
                    return point;
                }
                let theta = r.atan();
                let scale = fisheye_theta_d(&k, theta) / r;
                NormalizedKeyPoint(Point2::new(x * scale, y * scale))
            }
        }
    }

    /// Inverts [`Distortion::distort`] by fixed point iteration (Brown-Conrady) or
    /// Newton iteration on the angle (fisheye).
    pub fn undistort(&self, point: NormalizedKeyPoint) -> NormalizedKeyPoint {
        let (xd, yd) = (point.x, point.y);
        match *self {
            Self::None => point,
            Self::BrownConrady(k) => {
                let (mut x, mut y) = (xd, yd);
                for _ in 0..UNDISTORT_ITERATIONS {
                    let r2 = x * x + y * y;
                    let radial = rational_radial(&k, r2);
                    if radial.abs() < UNDISTORT_EPSILON {
                        break;
                    }
                    let (dx, dy) = tangential(&k, x, y, r2);
                    let (nx, ny) = ((xd - dx) / radial, (yd - dy) / radial);
                    let step = (nx - x).abs() + (ny - y).abs();
                    x = nx;
                    y = ny;
                    if step < UNDISTORT_EPSILON {
                        break;
                    }
                }
                NormalizedKeyPoint(Point2::new(x, y))
            }
            Self::Fisheye(k) => {
                let theta_d = (xd * xd + yd * yd).sqrt();
                if theta_d < UNDISTORT_EPSILON {
                    return point;
                }
                let mut theta = theta_d;
                for _ in 0..UNDISTORT_ITERATIONS {
                    let t2 = theta * theta;
                    let f = fisheye_theta_d(&k, theta) - theta_d;
                    let df = 1.0
                        + 3.0 * k[0] * t2
                        + 5.0 * k[1] * t2 * t2
                        + 7.0 * k[2] * t2 * t2 * t2
                        + 9.0 * k[3] * t2 * t2 * t2 * t2;
                    if df.abs() < UNDISTORT_EPSILON {
                        break;
                    }
                    let step = f / df;
                    theta -= step;
                    if step.abs() < UNDISTORT_EPSILON {
                        break;
                    }
                }
                let scale = theta.tan() / theta_d;
                NormalizedKeyPoint(Point2::new(xd * scale, yd * scale))
            }
        }
    }
}

fn rational_radial(k: &[f64; 8], r2: f64) -> f64 {
    let r4 = r2 * r2;
    let r6 = r4 * r2;
    (1.0 + k[0] * r2 + k[1] * r4 + k[4] * r6) / (1.0 + k[5] * r2 + k[6] * r4 + k[7] * r6)
}

fn tangential(k: &[f64; 8], x: f64, y: f64, r2: f64) -> (f64, f64) {
    let (p1, p2) = (k[2], k[3]);
    (
        2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x),
        p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y,
    )
}

fn fisheye_theta_d(k: &[f64; 4], theta: f64) -> f64 {
    let t2 = theta * theta;
    theta * (1.0 + k[0] * t2 + k[1] * t2 * t2 + k[2] * t2 * t2 * t2 + k[3] * t2 * t2 * t2 * t2)
}
