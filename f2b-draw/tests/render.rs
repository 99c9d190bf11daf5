use f2b_core::nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector3};
use f2b_core::{Pose, SphereGeometry};
use f2b_draw::color::WHITE;
use f2b_draw::{ArRenderer, Layer, RenderDiagnostic, SphereView};
use f2b_geom::{level_circle, FigureId};
use f2b_pinhole::{CameraIntrinsics, CameraModel, Distortion, Projection};
use image::{Rgb, RgbImage};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn camera() -> CameraModel {
    let intrinsics = CameraIntrinsics::identity()
        .focal(1000.0)
        .principal_point(Point2::new(640.0, 360.0));
    CameraModel::new(intrinsics, Distortion::None, None)
}

fn pose() -> Pose {
    let eye = Point3::new(0.0, -35.0, 1.5);
    let forward = (Point3::new(0.0, 0.0, 5.0) - eye).normalize();
    let right = forward.cross(&Vector3::z()).normalize();
    let down = forward.cross(&right);
    let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_rows(&[
        right.transpose(),
        down.transpose(),
        forward.transpose(),
    ]));
    Pose::from_parts(-(rotation * eye.coords), rotation)
}

fn lit(frame: &RgbImage) -> usize {
    frame.pixels().filter(|p| **p != Rgb([0, 0, 0])).count()
}

#[test]
fn background_geometry_is_drawn() {
    let camera = camera();
    let pose = pose();
    let sphere = SphereGeometry::default();
    let mut frame = RgbImage::new(WIDTH, HEIGHT);

    let report = ArRenderer::new().render(&mut frame, &camera, &pose, &sphere, &SphereView::default());
    assert!(report.diagnostics.is_empty());
    assert!(report.figures_drawn.is_empty());
    assert!(lit(&frame) > 1000);

    // a point of the level circle away from the meridians and references
    let p = camera.project_point(&level_circle(sphere.flight_radius())[6], &pose, Projection::Rectified);
    assert_eq!(*frame.get_pixel(p.x as u32, p.y as u32), WHITE);
}

#[test]
fn enabled_figures_are_drawn_in_addition() {
    let camera = camera();
    let pose = pose();
    let sphere = SphereGeometry::default();
    let view = SphereView::default();

    let mut plain = RgbImage::new(WIDTH, HEIGHT);
    let mut renderer = ArRenderer::new();
    renderer.render(&mut plain, &camera, &pose, &sphere, &view);

    renderer.figures.toggle(FigureId::VerticalEight, true);
    renderer.figures.toggle(FigureId::Hourglass, true);
    renderer.start_end_points = true;
    renderer.diagnostics = true;
    let mut figures = RgbImage::new(WIDTH, HEIGHT);
    let report = renderer.render(&mut figures, &camera, &pose, &sphere, &view);
    assert_eq!(report.figures_drawn, vec![FigureId::VerticalEight, FigureId::Hourglass]);
    assert!(lit(&figures) > lit(&plain));
}

#[test]
fn moving_the_sphere_moves_the_drawing() {
    let camera = camera();
    let pose = pose();
    let sphere = SphereGeometry::default();
    let renderer = ArRenderer::new();

    let mut centered = RgbImage::new(WIDTH, HEIGHT);
    renderer.render(&mut centered, &camera, &pose, &sphere, &SphereView::default());
    let mut moved = RgbImage::new(WIDTH, HEIGHT);
    let view = SphereView::new(Vector3::new(2.0, 1.0, 0.0));
    renderer.render(&mut moved, &camera, &pose, &sphere, &view);
    assert_ne!(centered, moved);
}

#[test]
fn non_finite_pose_skips_layers_without_drawing() {
    let camera = camera();
    let pose = Pose::new(Vector3::zeros(), Vector3::new(0.0, 0.0, f64::NAN));
    let sphere = SphereGeometry::default();
    let mut renderer = ArRenderer::new();
    renderer.axis = true;
    renderer.figures.toggle(FigureId::InsideLoop, true);
    let mut frame = RgbImage::new(WIDTH, HEIGHT);

    let report = renderer.render(&mut frame, &camera, &pose, &sphere, &SphereView::default());
    assert_eq!(lit(&frame), 0);
    for layer in [
        Layer::LevelCircle,
        Layer::Meridians,
        Layer::Axis,
        Layer::Latitude45,
        Layer::References,
        Layer::Figure(FigureId::InsideLoop),
    ] {
        assert!(report.diagnostics.contains(&RenderDiagnostic::NonFinite(layer)), "{:?}", layer);
    }
    assert!(report.figures_drawn.is_empty());
}

#[test]
fn points_behind_the_camera_are_not_drawn() {
    let camera = camera();
    // looking straight up from below the ground: everything is behind or beside
    let pose = Pose::from_parts(
        Vector3::new(0.0, 0.0, -100.0),
        Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI),
    );
    let sphere = SphereGeometry::default();
    let mut frame = RgbImage::new(WIDTH, HEIGHT);
    let report = ArRenderer::new().render(&mut frame, &camera, &pose, &sphere, &SphereView::default());
    assert!(report.diagnostics.is_empty());
    assert_eq!(lit(&frame), 0);
}
