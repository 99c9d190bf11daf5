use crate::{CameraModel, CameraModelError, LensModel};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The on-disk form of a camera calibration.
///
/// ```json
/// {
///     "camera_matrix": [[1200.0, 0.0, 960.0], [0.0, 1200.0, 540.0], [0.0, 0.0, 1.0]],
///     "dist_coeffs": [-0.12, 0.05, 0.0, 0.0, 0.0],
///     "new_camera_matrix": [[1100.0, 0.0, 960.0], [0.0, 1100.0, 540.0], [0.0, 0.0, 1.0]],
///     "lens": "pinhole"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationFile {
    pub camera_matrix: Vec<Vec<f64>>,
    #[serde(default)]
    pub dist_coeffs: Vec<f64>,
    #[serde(default)]
    pub new_camera_matrix: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub lens: LensModel,
}

impl CalibrationFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CameraModelError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let calibration: Self = serde_json::from_reader(BufReader::new(file))?;
        info!("loaded {:?} calibration from {}", calibration.lens, path.display());
        Ok(calibration)
    }

    /// Validates the arrays and builds the camera model.
    pub fn camera_model(&self) -> Result<CameraModel, CameraModelError> {
        CameraModel::from_rows(
            &self.camera_matrix,
            &self.dist_coeffs,
            self.new_camera_matrix.as_deref(),
            self.lens,
        )
    }
}

impl CameraModel {
    /// Loads and validates a calibration file in one step.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CameraModelError> {
        CalibrationFile::load(path)?.camera_model()
    }
}
