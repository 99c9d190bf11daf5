use crate::p3p::{Correspondence, LambdaTwist};
use f2b_core::nalgebra::{Matrix6, Point3, SMatrix, SVector, Vector3, Vector6};
use f2b_core::{KeyPoint, Marker, ObjectPoints, Pose, NUM_OBJECT_POINTS};
use f2b_pinhole::{CameraModel, Projection};
use float_ord::FloatOrd;
use itertools::Itertools;
use log::{debug, trace};
use thiserror::Error;

/// Image points closer than this, in pixels, are treated as the same point.
pub const MIN_PIXEL_SEPARATION: f64 = 1.0;

const NUM_RESIDUALS: usize = 2 * NUM_OBJECT_POINTS;
type Residuals = SVector<f64, NUM_RESIDUALS>;
type Jacobian = SMatrix<f64, NUM_RESIDUALS, 6>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoseError {
    #[error("expected {NUM_OBJECT_POINTS} locator points, got {0}")]
    PointCount(usize),
    #[error("the {} point is not finite", .0.name())]
    NonFinite(Marker),
    #[error("the {} and the {} are the same point", .0.name(), .1.name())]
    CoincidentPoints(Marker, Marker),
    #[error("all {0} lie on one line")]
    Collinear(&'static str),
    #[error("no camera pose explains the locator points")]
    NoSolution,
    #[error("reprojection error of {rms:.2} px exceeds {max:.2} px")]
    ReprojectionError { rms: f64, max: f64 },
}

/// A solved pose and how well it explains the locator points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSolution {
    pub pose: Pose,
    /// Root mean square reprojection error over the four points, in pixels.
    pub rms_error: f64,
}

/// Solves the camera pose from the four marker correspondences.
///
/// Every triple of correspondences is solved with P3P, the candidate that best
/// reprojects all four points wins, and it is then refined with Levenberg-Marquardt
/// on the reprojection error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSolver {
    /// Solutions reprojecting worse than this, in pixels RMS, are rejected.
    pub max_rms_error: f64,
    pub refine_iterations: usize,
    /// Image space the locator points were clicked in.
    pub projection: Projection,
    pub p3p: LambdaTwist,
}

impl Default for PoseSolver {
    fn default() -> Self {
        Self {
            max_rms_error: 20.0,
            refine_iterations: 10,
            projection: Projection::Rectified,
            p3p: LambdaTwist::default(),
        }
    }
}

impl PoseSolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_rms_error(self, max_rms_error: f64) -> Self {
        Self {
            max_rms_error,
            ..self
        }
    }

    #[must_use]
    pub fn refine_iterations(self, refine_iterations: usize) -> Self {
        Self {
            refine_iterations,
            ..self
        }
    }

    #[must_use]
    pub fn projection(self, projection: Projection) -> Self {
        Self { projection, ..self }
    }

    pub fn solve(
        &self,
        camera: &CameraModel,
        object: &ObjectPoints,
        image: &[KeyPoint],
    ) -> Result<PoseSolution, PoseError> {
        if image.len() != NUM_OBJECT_POINTS {
            return Err(PoseError::PointCount(image.len()));
        }
        check_degenerate(object, image)?;

        let world = object.0;
        let correspondences: Vec<Correspondence> = world
            .iter()
            .zip(image)
            .map(|(&w, &kp)| (w, camera.calibrate(kp, self.projection)))
            .collect();

        let cost = |pose: &Pose| self.residuals(camera, &world, image, pose).norm_squared();
        let best = (0..NUM_OBJECT_POINTS)
            .tuple_combinations()
            .flat_map(|(a, b, c)| {
                self.p3p
                    .solve(&[correspondences[a], correspondences[b], correspondences[c]])
            })
            .filter(|pose| pose.is_finite() && in_front(pose, &world))
            .map(|pose| (cost(&pose), pose))
            .filter(|(cost, _)| cost.is_finite())
            .min_by_key(|&(cost, _)| FloatOrd(cost))
            .map(|(_, pose)| pose)
            .ok_or(PoseError::NoSolution)?;

        let pose = self.refine(camera, &world, image, best);
        if !in_front(&pose, &world) {
            return Err(PoseError::NoSolution);
        }
        let rms_error = (cost(&pose) / NUM_OBJECT_POINTS as f64).sqrt();
        debug!("solved pose with {:.3} px rms reprojection error", rms_error);
        if !(rms_error <= self.max_rms_error) {
            return Err(PoseError::ReprojectionError {
                rms: rms_error,
                max: self.max_rms_error,
            });
        }
        Ok(PoseSolution { pose, rms_error })
    }

    fn residuals(
        &self,
        camera: &CameraModel,
        world: &[Point3<f64>; NUM_OBJECT_POINTS],
        image: &[KeyPoint],
        pose: &Pose,
    ) -> Residuals {
        let mut r = Residuals::zeros();
        for (i, (w, kp)) in world.iter().zip(image).enumerate() {
            let projected = camera.project_point(w, pose, self.projection);
            r[2 * i] = projected.x - kp.x;
            r[2 * i + 1] = projected.y - kp.y;
        }
        r
    }

    /// Levenberg-Marquardt over `[rvec; tvec]` with a central difference Jacobian.
    /// Steps that do not lower the cost are rejected.
    fn refine(
        &self,
        camera: &CameraModel,
        world: &[Point3<f64>; NUM_OBJECT_POINTS],
        image: &[KeyPoint],
        initial: Pose,
    ) -> Pose {
        let to_pose = |p: &Vector6<f64>| {
            Pose::new(
                Vector3::new(p[0], p[1], p[2]),
                Vector3::new(p[3], p[4], p[5]),
            )
        };
        let residuals = |p: &Vector6<f64>| self.residuals(camera, world, image, &to_pose(p));

        let mut params = Vector6::new(
            initial.rvec.x,
            initial.rvec.y,
            initial.rvec.z,
            initial.tvec.x,
            initial.tvec.y,
            initial.tvec.z,
        );
        let mut r = residuals(&params);
        let mut cost = r.norm_squared();
        let mut damping = 1e-3;

        for iteration in 0..self.refine_iterations {
            if cost < 1e-18 {
                break;
            }
            let mut jacobian = Jacobian::zeros();
            for k in 0..6 {
                let h = 1e-6 * params[k].abs().max(1.0);
                let mut forward = params;
                let mut backward = params;
                forward[k] += h;
                backward[k] -= h;
                let column = (residuals(&forward) - residuals(&backward)) / (2.0 * h);
                jacobian.set_column(k, &column);
            }
            let normal: Matrix6<f64> = jacobian.transpose() * jacobian;
            let gradient = jacobian.transpose() * r;

            let mut improved = false;
            for _ in 0..10 {
                let damped = normal + Matrix6::from_diagonal(&normal.diagonal()) * damping;
                let step = match damped.cholesky() {
                    Some(cholesky) => cholesky.solve(&(-gradient)),
                    None => {
                        damping *= 10.0;
                        continue;
                    }
                };
                let candidate = params + step;
                let candidate_r = residuals(&candidate);
                let candidate_cost = candidate_r.norm_squared();
                if candidate_cost.is_finite() && candidate_cost < cost {
                    params = candidate;
                    r = candidate_r;
                    cost = candidate_cost;
                    damping = (damping * 0.1).max(1e-12);
                    improved = true;
                    break;
                }
                damping *= 10.0;
            }
            trace!("refine iteration {} cost {:e}", iteration, cost);
            if !improved {
                break;
            }
        }
        to_pose(&params)
    }
}

fn in_front(pose: &Pose, world: &[Point3<f64>]) -> bool {
    world.iter().all(|w| pose.transform(w).z > 0.0)
}

fn check_degenerate(object: &ObjectPoints, image: &[KeyPoint]) -> Result<(), PoseError> {
    for (marker, kp) in Marker::ALL.iter().zip(image) {
        if !kp.is_finite() {
            return Err(PoseError::NonFinite(*marker));
        }
    }
    for ((ma, a), (mb, b)) in Marker::ALL.iter().zip(image).tuple_combinations() {
        if (a.0 - b.0).norm() < MIN_PIXEL_SEPARATION {
            return Err(PoseError::CoincidentPoints(*ma, *mb));
        }
    }
    let image_points: Vec<Point3<f64>> = image.iter().map(|kp| Point3::new(kp.x, kp.y, 0.0)).collect();
    if collinear(&image_points, MIN_PIXEL_SEPARATION) {
        return Err(PoseError::Collinear("image points"));
    }
    let scale = object.0.iter().map(|p| p.coords.norm()).fold(0.0, f64::max);
    if collinear(&object.0, 1e-9 * scale.max(1.0)) {
        return Err(PoseError::Collinear("object points"));
    }
    Ok(())
}

/// Whether every point is within `tolerance` of the line through the two points
/// furthest apart.
fn collinear(points: &[Point3<f64>], tolerance: f64) -> bool {
    let farthest = points
        .iter()
        .tuple_combinations()
        .max_by_key(|(a, b)| FloatOrd((*a - *b).norm_squared()));
    let (a, b) = match farthest {
        Some(pair) => pair,
        None => return true,
    };
    let direction = match (b - a).try_normalize(f64::EPSILON) {
        Some(d) => d,
        None => return true,
    };
    points
        .iter()
        .all(|p| (p - a).cross(&direction).norm() < tolerance)
}
