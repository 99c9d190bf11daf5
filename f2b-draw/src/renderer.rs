use crate::color::{figure_color, gray, BLUE, CYAN, GREEN, RED, WHITE};
use crate::{FigureSet, SphereView};
use f2b_core::nalgebra::{Point2, Point3};
use f2b_core::{Pose, SphereGeometry};
use f2b_geom::{
    axis_points, latitude_45, level_circle, meridian_fan, reference_points, translate, FigureId,
    Recipe, ReferenceGroup,
};
use f2b_pinhole::{CameraModel, Projection};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_filled_circle_mut, draw_line_segment_mut};
use itertools::Itertools;
use log::{trace, warn};

/// Radius of the dots marking where a figure starts and ends, in pixels.
pub const START_END_RADIUS: i32 = 3;
/// Segments reaching further than this many frame sizes outside the frame are not drawn.
const GUARD_FRAMES: f64 = 4.0;

/// How far from the origin, in pixels, a point may lie and still be drawn on `frame`.
pub(crate) fn guard_extent(frame: &RgbImage) -> f64 {
    GUARD_FRAMES * f64::from(frame.width().max(frame.height()))
}

pub(crate) fn in_guard(p: &Point2<f64>, guard: f64) -> bool {
    p.x.abs() <= guard && p.y.abs() <= guard
}

/// One layer of the AR overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    LevelCircle,
    Meridians,
    Axis,
    Latitude45,
    References,
    Figure(FigureId),
}

/// Something that went wrong while drawing one frame. Drawing carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDiagnostic {
    /// The layer produced non-finite coordinates and was skipped this frame.
    NonFinite(Layer),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub figures_drawn: Vec<FigureId>,
    pub diagnostics: Vec<RenderDiagnostic>,
}

/// Draws the AR geometry onto frames.
///
/// The renderer owns the drawing state that commands change between frames:
/// enabled figures, diagnostics, start/end points and the pose axes.
#[derive(Debug, Clone)]
pub struct ArRenderer {
    pub figures: FigureSet,
    pub diagnostics: bool,
    pub start_end_points: bool,
    pub axis: bool,
    pub projection: Projection,
    recipes: [(FigureId, Recipe); FigureId::ALL.len()],
}

impl Default for ArRenderer {
    fn default() -> Self {
        Self {
            figures: FigureSet::new(),
            diagnostics: false,
            start_end_points: false,
            axis: false,
            projection: Projection::Rectified,
            recipes: FigureId::ALL.map(|id| (id, id.recipe())),
        }
    }
}

/// Projects paths and draws them on one frame.
struct Canvas<'a> {
    frame: &'a mut RgbImage,
    camera: &'a CameraModel,
    pose: &'a Pose,
    projection: Projection,
    guard: f64,
}

impl Canvas<'_> {
    /// Projects a path. Points behind the camera become `None`. Returns `None` if
    /// any point is not finite.
    fn project(&self, points: &[Point3<f64>]) -> Option<Vec<Option<Point2<f64>>>> {
        if points.iter().any(|p| p.iter().any(|n| !n.is_finite())) {
            return None;
        }
        let projected = self.camera.project_depth(points, self.pose, self.projection);
        let broken = |(p, z): &(Point2<f64>, f64)| {
            !z.is_finite() || (*z > 0.0 && !(p.x.is_finite() && p.y.is_finite()))
        };
        if projected.iter().any(broken) {
            return None;
        }
        Some(
            projected
                .into_iter()
                .map(|(p, z)| if z > 0.0 { Some(p) } else { None })
                .collect(),
        )
    }

    fn in_guard(&self, p: &Point2<f64>) -> bool {
        in_guard(p, self.guard)
    }

    /// Projects every path of one layer and draws them, each in its own color. Nothing
    /// is drawn unless all of the paths projected.
    fn layer(&mut self, paths: &[(Vec<Point3<f64>>, Rgb<u8>)]) -> Option<Vec<Vec<Option<Point2<f64>>>>> {
        let projected = paths
            .iter()
            .map(|(points, _)| self.project(points))
            .collect::<Option<Vec<_>>>()?;
        for ((_, color), path) in paths.iter().zip(&projected) {
            self.polyline(path, *color);
        }
        Some(projected)
    }

    fn polyline(&mut self, projected: &[Option<Point2<f64>>], color: Rgb<u8>) {
        for (a, b) in projected.iter().tuple_windows() {
            if let (Some(a), Some(b)) = (a, b) {
                if self.in_guard(a) && self.in_guard(b) {
                    draw_line_segment_mut(&mut *self.frame, truncate(a), truncate(b), color);
                }
            }
        }
    }

    fn dot(&mut self, p: &Point2<f64>, radius: i32, color: Rgb<u8>) {
        if self.in_guard(p) {
            draw_filled_circle_mut(&mut *self.frame, (p.x as i32, p.y as i32), radius, color);
        }
    }

    fn cross(&mut self, p: &Point2<f64>, color: Rgb<u8>) {
        if self.in_guard(p) {
            draw_cross_mut(&mut *self.frame, color, p.x as i32, p.y as i32);
        }
    }
}

fn skip(report: &mut RenderReport, layer: Layer) {
    warn!("skipping {:?}: non-finite coordinates", layer);
    report.diagnostics.push(RenderDiagnostic::NonFinite(layer));
}

fn truncate(p: &Point2<f64>) -> (f32, f32) {
    (p.x as i32 as f32, p.y as i32 as f32)
}

impl ArRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the whole overlay onto `frame`: level circle, meridian fan, optional axis,
    /// 45° ring, reference points and finally every enabled figure.
    pub fn render(
        &self,
        frame: &mut RgbImage,
        camera: &CameraModel,
        pose: &Pose,
        sphere: &SphereGeometry,
        view: &SphereView,
    ) -> RenderReport {
        let guard = guard_extent(frame);
        let mut canvas = Canvas {
            frame,
            camera,
            pose,
            projection: self.projection,
            guard,
        };
        let mut report = RenderReport::default();
        let r = sphere.flight_radius();

        if canvas.layer(&[(translate(&level_circle(r), &view.center), WHITE)]).is_none() {
            skip(&mut report, Layer::LevelCircle);
        }

        let meridians: Vec<_> = meridian_fan(view.rotation_deg, r)
            .into_iter()
            .map(|meridian| (translate(&meridian.points, &view.center), gray(meridian.brightness)))
            .collect();
        if canvas.layer(&meridians).is_none() {
            skip(&mut report, Layer::Meridians);
        }

        if self.axis {
            let [origin, x, y, z] = axis_points();
            let axes = [(x, BLUE), (y, GREEN), (z, RED)].map(|(tip, color)| (vec![origin, tip], color));
            if canvas.layer(&axes).is_none() {
                skip(&mut report, Layer::Axis);
            }
        }

        if canvas.layer(&[(translate(&latitude_45(r), &view.center), WHITE)]).is_none() {
            skip(&mut report, Layer::Latitude45);
        }

        let references = reference_points(sphere);
        let world: Vec<Point3<f64>> = references.iter().map(|rp| rp.point).collect();
        match canvas.project(&world) {
            Some(projected) => {
                for (rp, p) in references.iter().zip(projected) {
                    let color = match rp.group {
                        ReferenceGroup::Centerline => RED,
                        ReferenceGroup::CenterMarker => CYAN,
                        ReferenceGroup::OuterMarkers => GREEN,
                    };
                    if let Some(p) = p {
                        canvas.dot(&p, 1, color);
                    }
                }
            }
            None => skip(&mut report, Layer::References),
        }

        for &(id, recipe) in &self.recipes {
            if !self.figures.is_enabled(id) {
                continue;
            }
            let figure = recipe(view.rotation_deg, r);
            if !figure.is_finite() {
                skip(&mut report, Layer::Figure(id));
                continue;
            }
            let color = figure_color(id);
            let paths: Vec<_> = figure
                .paths
                .iter()
                .map(|path| (translate(path, &view.center), color))
                .collect();
            let projected_paths = match canvas.layer(&paths) {
                Some(projected) => projected,
                None => {
                    skip(&mut report, Layer::Figure(id));
                    continue;
                }
            };
            if self.start_end_points {
                for projected in &projected_paths {
                    if let Some(Some(first)) = projected.first() {
                        canvas.dot(first, START_END_RADIUS, GREEN);
                    }
                    if let Some(Some(last)) = projected.last() {
                        canvas.dot(last, START_END_RADIUS, RED);
                    }
                }
            }
            if self.diagnostics {
                if let Some(anchors) = canvas.project(&translate(&figure.anchors, &view.center)) {
                    for anchor in anchors.iter().flatten() {
                        canvas.cross(anchor, color);
                    }
                }
            }
            report.figures_drawn.push(id);
        }

        trace!(
            "rendered {} figures, {} diagnostics",
            report.figures_drawn.len(),
            report.diagnostics.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use f2b_core::nalgebra::{Rotation3, Vector3};
    use f2b_pinhole::{CameraIntrinsics, Distortion};

    fn camera() -> CameraModel {
        let intrinsics = CameraIntrinsics::identity()
            .focal(1000.0)
            .principal_point(Point2::new(640.0, 360.0));
        CameraModel::new(intrinsics, Distortion::None, None)
    }

    #[test]
    fn layer_is_drawn_only_if_every_path_projects() {
        let camera = camera();
        // ten meters in front of the origin, looking down +z
        let pose = Pose::from_parts(Vector3::new(0.0, 0.0, 10.0), Rotation3::identity());
        let good = (vec![Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)], WHITE);
        let bad = (vec![Point3::new(0.0, -1.0, 0.0), Point3::new(0.0, f64::NAN, 0.0)], WHITE);
        let mut frame = RgbImage::new(1280, 720);
        let guard = guard_extent(&frame);
        let mut canvas = Canvas {
            frame: &mut frame,
            camera: &camera,
            pose: &pose,
            projection: Projection::Rectified,
            guard,
        };

        assert!(canvas.layer(&[good.clone(), bad.clone()]).is_none());
        assert!(canvas.layer(&[bad, good.clone()]).is_none());
        assert!(canvas.frame.pixels().all(|p| *p == Rgb([0, 0, 0])));

        let projected = canvas.layer(&[good]).unwrap();
        assert_eq!(projected.len(), 1);
        assert_eq!(*canvas.frame.get_pixel(640, 360), WHITE);
    }

    #[test]
    fn guard_scales_with_the_frame() {
        let frame = RgbImage::new(1280, 720);
        let guard = guard_extent(&frame);
        assert_eq!(guard, 5120.0);
        assert!(in_guard(&Point2::new(-5120.0, 5120.0), guard));
        assert!(!in_guard(&Point2::new(0.0, 5121.0), guard));
    }
}
