use approx::assert_relative_eq;
use f2b_core::nalgebra::{Matrix3, Point2, Point3, Vector2, Vector3};
use f2b_core::{KeyPoint, Pose};
use f2b_pinhole::{
    CalibrationFile, CameraIntrinsics, CameraModel, CameraModelError, Distortion, LensModel,
    NormalizedKeyPoint, Projection,
};
use std::io::Write;

fn intrinsics() -> CameraIntrinsics {
    CameraIntrinsics::identity()
        .focals(Vector2::new(1210.0, 1190.0))
        .principal_point(Point2::new(961.5, 538.0))
}

fn rows(m: [[f64; 3]; 3]) -> Vec<Vec<f64>> {
    m.iter().map(|r| r.to_vec()).collect()
}

#[test]
fn optical_axis_projects_to_principal_point() {
    let camera = CameraModel::new(intrinsics(), Distortion::None, None);
    let pixel = camera.project_point(&Point3::new(0.0, 0.0, 7.5), &Pose::identity(), Projection::Raw);
    assert_relative_eq!(pixel, Point2::new(961.5, 538.0), epsilon = 1e-9);

    let distorted = CameraModel::new(
        intrinsics(),
        Distortion::BrownConrady([-0.3, 0.1, 0.001, -0.002, 0.01, 0.0, 0.0, 0.0]),
        None,
    );
    let pixel = distorted.project_point(&Point3::new(0.0, 0.0, 3.0), &Pose::identity(), Projection::Raw);
    assert_relative_eq!(pixel, Point2::new(961.5, 538.0), epsilon = 1e-9);
}

#[test]
fn skewed_camera_matrix() {
    let matrix = Matrix3::new(1210.0, 2.5, 961.5, 0.0, 1190.0, 538.0, 0.0, 0.0, 1.0);
    let intrinsics = CameraIntrinsics::from_matrix(&matrix).unwrap();
    assert_eq!(intrinsics, self::intrinsics().skew(2.5));
    assert_eq!(intrinsics.matrix(), matrix);

    // skew shifts x by `skew * y` in normalized coordinates
    let pixel = intrinsics.uncalibrate(NormalizedKeyPoint(Point2::new(0.0, 0.1)));
    assert_relative_eq!(pixel.0, Point2::new(961.75, 657.0), epsilon = 1e-9);
}

#[test]
fn rectified_projection_ignores_distortion() {
    let rectified = CameraIntrinsics::identity()
        .focal(1000.0)
        .principal_point(Point2::new(960.0, 540.0));
    let camera = CameraModel::new(
        intrinsics(),
        Distortion::BrownConrady([-0.3, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        Some(rectified),
    );
    let point = Point3::new(1.0, -0.5, 4.0);
    let pixel = camera.project_point(&point, &Pose::identity(), Projection::Rectified);
    assert_relative_eq!(pixel, Point2::new(960.0 + 250.0, 540.0 - 125.0), epsilon = 1e-9);

    let fallback = CameraModel::new(intrinsics(), Distortion::None, None);
    assert_eq!(fallback.rectified_intrinsics(), fallback.intrinsics());
}

#[test]
fn project_keeps_order_and_depth() {
    let camera = CameraModel::new(intrinsics(), Distortion::None, None);
    let pose = Pose::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 10.0));
    let points = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, -12.0),
    ];
    let projected = camera.project(&points, &pose, Projection::Raw);
    assert_eq!(projected.len(), 3);
    assert_relative_eq!(projected[0], Point2::new(961.5, 538.0), epsilon = 1e-9);
    assert_relative_eq!(projected[1].x, 961.5 + 121.0, epsilon = 1e-9);

    let depths: Vec<f64> = camera
        .project_depth(&points, &pose, Projection::Raw)
        .into_iter()
        .map(|(_, z)| z)
        .collect();
    assert_eq!(depths, vec![10.0, 10.0, -2.0]);
}

#[test]
fn brown_conrady_undistort_inverts_distort() {
    let distortion = Distortion::BrownConrady([-0.28, 0.07, 0.0008, -0.0005, 0.0, 0.0, 0.0, 0.0]);
    for &(x, y) in &[(0.0, 0.0), (0.1, -0.2), (-0.35, 0.25), (0.4, 0.3)] {
        let ideal = NormalizedKeyPoint(Point2::new(x, y));
        let back = distortion.undistort(distortion.distort(ideal));
        assert_relative_eq!(back.0, ideal.0, epsilon = 1e-6);
    }
}

#[test]
fn fisheye_undistort_inverts_distort() {
    let distortion = Distortion::Fisheye([0.05, -0.01, 0.002, -0.0003]);
    for &(x, y) in &[(0.0, 0.0), (0.2, 0.1), (-0.6, 0.4), (0.9, -0.8)] {
        let ideal = NormalizedKeyPoint(Point2::new(x, y));
        let back = distortion.undistort(distortion.distort(ideal));
        assert_relative_eq!(back.0, ideal.0, epsilon = 1e-6);
    }
}

#[test]
fn calibrate_returns_bearing_through_pixel() {
    let camera = CameraModel::new(
        intrinsics(),
        Distortion::BrownConrady([-0.2, 0.04, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        None,
    );
    let pixel = KeyPoint::new(1300.0, 350.0);
    let bearing = camera.calibrate(pixel, Projection::Raw);
    assert_relative_eq!(bearing.norm(), 1.0, epsilon = 1e-12);
    let point = Point3::from(bearing.into_inner() * 20.0);
    let back = camera.project_point(&point, &Pose::identity(), Projection::Raw);
    assert_relative_eq!(back, pixel.0, epsilon = 1e-4);
}

#[test]
fn malformed_models_are_rejected() {
    let good = rows([[1000.0, 0.0, 960.0], [0.0, 1000.0, 540.0], [0.0, 0.0, 1.0]]);

    let short = vec![vec![1000.0, 0.0, 960.0], vec![0.0, 1000.0, 540.0]];
    assert!(matches!(
        CameraModel::from_rows(&short, &[], None, LensModel::Pinhole),
        Err(CameraModelError::MatrixShape { rows: 2, .. })
    ));

    let bottom = rows([[1000.0, 0.0, 960.0], [0.0, 1000.0, 540.0], [0.0, 1.0, 1.0]]);
    assert!(matches!(
        CameraModel::from_rows(&bottom, &[], None, LensModel::Pinhole),
        Err(CameraModelError::NotIntrinsic)
    ));

    let negative = rows([[-1000.0, 0.0, 960.0], [0.0, 1000.0, 540.0], [0.0, 0.0, 1.0]]);
    assert!(matches!(
        CameraModel::from_rows(&negative, &[], None, LensModel::Pinhole),
        Err(CameraModelError::NonPositiveFocal(..))
    ));

    assert!(matches!(
        CameraModel::from_rows(&good, &[0.1, 0.2, 0.3], None, LensModel::Pinhole),
        Err(CameraModelError::DistortionLength { len: 3, .. })
    ));
    assert!(matches!(
        CameraModel::from_rows(&good, &[0.1, 0.2, 0.3, 0.4, 0.5], None, LensModel::Fisheye),
        Err(CameraModelError::DistortionLength { len: 5, .. })
    ));
    assert!(matches!(
        CameraModel::from_rows(&good, &[f64::NAN, 0.0, 0.0, 0.0], None, LensModel::Pinhole),
        Err(CameraModelError::NonFinite(_))
    ));

    let bad_new = vec![vec![1.0; 3]; 4];
    assert!(matches!(
        CameraModel::from_rows(&good, &[], Some(bad_new.as_slice()), LensModel::Pinhole),
        Err(CameraModelError::MatrixShape { name: "new_camera_matrix", .. })
    ));

    assert!(CameraModel::from_rows(&good, &[0.1, 0.2, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0], None, LensModel::Pinhole).is_ok());
}

#[test]
fn calibration_file_loads_from_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "camera_matrix": [[1200.0, 0.0, 960.0], [0.0, 1180.0, 540.0], [0.0, 0.0, 1.0]],
            "dist_coeffs": [0.02, -0.01, 0.0, 0.0],
            "new_camera_matrix": [[1100.0, 0.0, 955.0], [0.0, 1100.0, 545.0], [0.0, 0.0, 1.0]],
            "lens": "fisheye"
        }}"#
    )
    .unwrap();

    let calibration = CalibrationFile::load(file.path()).unwrap();
    assert_eq!(calibration.lens, LensModel::Fisheye);
    let camera = calibration.camera_model().unwrap();
    assert_eq!(*camera.distortion(), Distortion::Fisheye([0.02, -0.01, 0.0, 0.0]));
    assert_relative_eq!(camera.rectified_intrinsics().principal_point, Point2::new(955.0, 545.0));
    assert_relative_eq!(camera.intrinsics().focals, Vector2::new(1200.0, 1180.0));
}

#[test]
fn missing_calibration_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CameraModel::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, CameraModelError::Io(_)));
}
