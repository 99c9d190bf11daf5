mod common;

use approx::assert_relative_eq;
use common::{camera, look_at, project, sphere};
use f2b_core::nalgebra::{Point3, UnitQuaternion, Vector3};
use f2b_core::{KeyPoint, Marker};
use f2b_locate::{LambdaTwist, PoseError, PoseSolver};
use rand::{rngs::SmallRng, Rng, SeedableRng};

#[test]
fn recovers_pose_from_exact_points() {
    let camera = camera();
    let object = sphere().object_points();
    let truth = look_at(Point3::new(2.0, -33.0, 1.4), Point3::new(0.0, 5.0, 2.0));
    let image = project(&camera, &object, &truth);

    let solution = PoseSolver::new().solve(&camera, &object, &image).unwrap();
    assert!(solution.rms_error < 1e-6);
    assert_relative_eq!(solution.pose.camera_center(), truth.camera_center(), epsilon = 1e-4);
    assert_relative_eq!(solution.pose.rotation(), truth.rotation(), epsilon = 1e-6);
}

#[test]
fn recovers_random_poses() {
    let camera = camera();
    let object = sphere().object_points();
    let mut rng = SmallRng::seed_from_u64(0);
    for _ in 0..50 {
        let eye = Point3::new(
            rng.gen_range(-6.0..6.0),
            rng.gen_range(-45.0..-30.0),
            rng.gen_range(0.5..2.5),
        );
        let target = Point3::new(
            rng.gen_range(-2.0..2.0),
            rng.gen_range(0.0..8.0),
            rng.gen_range(0.0..4.0),
        );
        let truth = look_at(eye, target);
        let image = project(&camera, &object, &truth);

        let solution = PoseSolver::new().solve(&camera, &object, &image).unwrap();
        assert!(solution.rms_error < 1e-4, "rms {}", solution.rms_error);
        assert_relative_eq!(solution.pose.camera_center(), eye, epsilon = 1e-3);
    }
}

#[test]
fn noisy_clicks_still_solve() {
    let camera = camera();
    let object = sphere().object_points();
    let truth = look_at(Point3::new(-1.0, -36.0, 1.7), Point3::new(0.0, 3.0, 1.0));
    let mut rng = SmallRng::seed_from_u64(7);
    let image: Vec<KeyPoint> = project(&camera, &object, &truth)
        .into_iter()
        .map(|kp| KeyPoint::new(kp.x + rng.gen_range(-1.5..1.5), kp.y + rng.gen_range(-1.5..1.5)))
        .collect();

    let solution = PoseSolver::new().solve(&camera, &object, &image).unwrap();
    assert!(solution.rms_error < 3.0);
    assert!((solution.pose.camera_center() - Point3::new(-1.0, -36.0, 1.7)).norm() < 5.0);
}

#[test]
fn p3p_returns_the_true_pose_among_candidates() {
    let object = sphere().object_points();
    let rotation = UnitQuaternion::from_euler_angles(0.1, -0.3, 0.2).to_rotation_matrix();
    let truth = f2b_core::Pose::from_parts(Vector3::new(0.5, 1.0, 40.0), rotation);
    let samples = [Marker::CircleCenter, Marker::FrontMarker, Marker::RightMarker].map(|m| {
        let world = object.get(m);
        (world, f2b_core::nalgebra::Unit::new_normalize(truth.transform(&world).coords))
    });
    let poses = LambdaTwist::new().solve(&samples);
    assert!(!poses.is_empty());
    assert!(poses
        .iter()
        .any(|p| (p.tvec - truth.tvec).norm() < 1e-6 && (p.rvec - truth.rvec).norm() < 1e-6));
}

#[test]
fn degenerate_inputs_are_reported() {
    let camera = camera();
    let object = sphere().object_points();
    let solver = PoseSolver::new();

    let line: Vec<KeyPoint> = (0..4).map(|i| KeyPoint::new(100.0 + 200.0 * i as f64, 300.0 + 50.0 * i as f64)).collect();
    assert_eq!(solver.solve(&camera, &object, &line), Err(PoseError::Collinear("image points")));

    let mut same = line.clone();
    same[3] = KeyPoint::new(same[1].x + 0.3, same[1].y);
    assert_eq!(
        solver.solve(&camera, &object, &same),
        Err(PoseError::CoincidentPoints(Marker::FrontMarker, Marker::RightMarker))
    );

    let mut nan = line.clone();
    nan[2] = KeyPoint::new(f64::NAN, 10.0);
    assert_eq!(solver.solve(&camera, &object, &nan), Err(PoseError::NonFinite(Marker::LeftMarker)));

    assert_eq!(solver.solve(&camera, &object, &line[..3]), Err(PoseError::PointCount(3)));
}

#[test]
fn strict_threshold_rejects_noisy_solution() {
    let camera = camera();
    let object = sphere().object_points();
    let truth = look_at(Point3::new(0.0, -35.0, 1.5), Point3::new(0.0, 0.0, 1.0));
    let mut image = project(&camera, &object, &truth);
    image[0] = KeyPoint::new(image[0].x + 12.0, image[0].y - 9.0);

    let result = PoseSolver::new().max_rms_error(1e-3).solve(&camera, &object, &image);
    assert!(matches!(result, Err(PoseError::ReprojectionError { .. })));
}
