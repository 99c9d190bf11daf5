use f2b_core::nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector3};
use f2b_core::{KeyPoint, ObjectPoints, Pose, SphereGeometry};
use f2b_pinhole::{CameraIntrinsics, CameraModel, Distortion, Projection};

pub fn camera() -> CameraModel {
    let intrinsics = CameraIntrinsics::identity()
        .focal(1400.0)
        .principal_point(Point2::new(960.0, 540.0));
    CameraModel::new(intrinsics, Distortion::None, None)
}

pub fn sphere() -> SphereGeometry {
    SphereGeometry::new(21.336, 25.0, 1.51, Vector3::new(1.0, -0.7, 0.0)).unwrap()
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

pub fn project(camera: &CameraModel, object: &ObjectPoints, pose: &Pose) -> Vec<KeyPoint> {
    object
        .0
        .iter()
        .map(|p| KeyPoint(camera.project_point(p, pose, Projection::Rectified)))
        .collect()
}
