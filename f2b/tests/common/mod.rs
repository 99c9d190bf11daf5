#![allow(dead_code)]

use f2b::core::nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use f2b::core::Pose;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes a distortion-free calibration with f = 1400 px and the principal point at
/// the center of a 1920x1080 frame.
pub fn write_calibration(dir: &Path) -> PathBuf {
    let path = dir.join("calibration.json");
    fs::write(
        &path,
        r#"{
            "camera_matrix": [[1400.0, 0.0, 960.0], [0.0, 1400.0, 540.0], [0.0, 0.0, 1.0]],
            "dist_coeffs": []
        }"#,
    )
    .unwrap();
    path
}

pub fn write_video(dir: &Path) -> PathBuf {
    let path = dir.join("1-four_leaf_clover.mp4");
    fs::write(&path, b"not really a video").unwrap();
    path
}

/// A camera at `eye` looking at `target` with the world Z axis pointing up in the image.
pub fn look_at(eye: Point3<f64>, target: Point3<f64>) -> Pose {
    let forward = (target - eye).normalize();
    let right = forward.cross(&Vector3::z()).normalize();
    let down = forward.cross(&right);
    let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_rows(&[
        right.transpose(),
        down.transpose(),
        forward.transpose(),
    ]));
    let tvec = -(rotation * eye.coords);
    Pose::from_parts(tvec, rotation)
}

/// Where a camera behind the pilot, slightly to the right, sees the sphere from.
pub fn pilot_view() -> Pose {
    look_at(Point3::new(1.0, -35.0, 1.5), Point3::new(0.0, 4.0, 2.0))
}
