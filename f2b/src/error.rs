use f2b_core::{GeometryError, NUM_OBJECT_POINTS};
use f2b_pinhole::CameraModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlightError {
    #[error("a valid camera index is required for live video")]
    MissingCameraIndex,
    #[error("live video needs a positive frame rate, got {0:?}")]
    FrameRate(Option<f64>),
    #[error("a flight has at most {NUM_OBJECT_POINTS} locator points, got {0}")]
    TooManyPoints(usize),
    #[error("locator point {0} is not finite")]
    NonFinitePoint(usize),
    #[error("invalid flight geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("failed to access flight file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed flight file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Flight(#[from] FlightError),
    #[error("failed to load calibration: {0}")]
    Camera(#[from] CameraModelError),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}
