use crate::{CameraIntrinsics, Distortion, LensModel, NormalizedKeyPoint};
use f2b_core::nalgebra::{Matrix3, Point2, Point3, Unit, Vector3};
use f2b_core::{KeyPoint, Pose};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraModelError {
    #[error("{name} must be 3x3, got {rows} rows with lengths {cols:?}")]
    MatrixShape {
        name: &'static str,
        rows: usize,
        cols: Vec<usize>,
    },
    #[error("camera matrix is not an intrinsic matrix (expected upper triangular with bottom row 0 0 1)")]
    NotIntrinsic,
    #[error("focal lengths must be positive, got fx={0} fy={1}")]
    NonPositiveFocal(f64, f64),
    #[error("{0} contains a non-finite value")]
    NonFinite(&'static str),
    #[error("{lens:?} lens does not accept {len} distortion coefficients")]
    DistortionLength { lens: LensModel, len: usize },
    #[error("failed to read calibration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse calibration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Selects which intrinsics and distortion a projection uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Rectified intrinsics with zero distortion, for frames that were undistorted upstream.
    Rectified,
    /// Calibrated intrinsics with the real lens distortion, for raw frames.
    Raw,
}

/// A calibrated camera: intrinsics, lens distortion and the optional rectified
/// intrinsics used once frames have been undistorted.
///
/// The model is immutable once built. Building it is the only place shapes are
/// checked, so every projection afterwards is total.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraModel {
    intrinsics: CameraIntrinsics,
    distortion: Distortion,
    rectified: Option<CameraIntrinsics>,
}

impl CameraModel {
    pub fn new(
        intrinsics: CameraIntrinsics,
        distortion: Distortion,
        rectified: Option<CameraIntrinsics>,
    ) -> Self {
        Self {
            intrinsics,
            distortion,
            rectified,
        }
    }

    /// Builds the model from the three numeric arrays a calibration routine produces.
    pub fn from_rows(
        camera_matrix: &[Vec<f64>],
        dist_coeffs: &[f64],
        new_camera_matrix: Option<&[Vec<f64>]>,
        lens: LensModel,
    ) -> Result<Self, CameraModelError> {
        let intrinsics = CameraIntrinsics::from_matrix(&matrix_from_rows("camera_matrix", camera_matrix)?)?;
        let distortion = Distortion::from_coefficients(lens, dist_coeffs)?;
        let rectified = new_camera_matrix
            .map(|rows| matrix_from_rows("new_camera_matrix", rows))
            .transpose()?
            .map(|m| CameraIntrinsics::from_matrix(&m))
            .transpose()?;
        Ok(Self::new(intrinsics, distortion, rectified))
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    pub fn distortion(&self) -> &Distortion {
        &self.distortion
    }

    /// The rectified intrinsics, falling back to the calibrated ones.
    pub fn rectified_intrinsics(&self) -> &CameraIntrinsics {
        self.rectified.as_ref().unwrap_or(&self.intrinsics)
    }

    fn parts(&self, projection: Projection) -> (&CameraIntrinsics, Distortion) {
        match projection {
            Projection::Rectified => (self.rectified_intrinsics(), Distortion::None),
            Projection::Raw => (&self.intrinsics, self.distortion),
        }
    }

    /// Projects a point already expressed in camera coordinates.
    ///
    /// Points on the camera plane produce non-finite pixels; the caller decides what
    /// to do with them.
    pub fn project_camera_point(&self, point: &Point3<f64>, projection: Projection) -> Point2<f64> {
        let (intrinsics, distortion) = self.parts(projection);
        let normalized = NormalizedKeyPoint(Point2::new(point.x / point.z, point.y / point.z));
        intrinsics.uncalibrate(distortion.distort(normalized)).0
    }

    /// Projects a single world point.
    pub fn project_point(&self, point: &Point3<f64>, pose: &Pose, projection: Projection) -> Point2<f64> {
        self.project_camera_point(&pose.transform(point), projection)
    }

    /// Projects world points into pixels.
    ///
    /// Coordinates stay in floating point; callers truncate at draw time.
    pub fn project(&self, points: &[Point3<f64>], pose: &Pose, projection: Projection) -> Vec<Point2<f64>> {
        points
            .iter()
            .map(|p| self.project_point(p, pose, projection))
            .collect()
    }

    /// Like [`CameraModel::project`], but each pixel comes with its camera space depth.
    pub fn project_depth(
        &self,
        points: &[Point3<f64>],
        pose: &Pose,
        projection: Projection,
    ) -> Vec<(Point2<f64>, f64)> {
        points
            .iter()
            .map(|p| {
                let camera = pose.transform(p);
                (self.project_camera_point(&camera, projection), camera.z)
            })
            .collect()
    }

    /// Converts a pixel into a unit bearing in camera coordinates, removing distortion.
    pub fn calibrate(&self, pixel: KeyPoint, projection: Projection) -> Unit<Vector3<f64>> {
        let (intrinsics, distortion) = self.parts(projection);
        distortion.undistort(intrinsics.calibrate(pixel)).bearing()
    }
}

fn matrix_from_rows(name: &'static str, rows: &[Vec<f64>]) -> Result<Matrix3<f64>, CameraModelError> {
    if rows.len() != 3 || rows.iter().any(|row| row.len() != 3) {
        return Err(CameraModelError::MatrixShape {
            name,
            rows: rows.len(),
            cols: rows.iter().map(Vec::len).collect(),
        });
    }
    Ok(Matrix3::from_fn(|r, c| rows[r][c]))
}
