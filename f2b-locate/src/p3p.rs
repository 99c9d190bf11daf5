//! Minimal three point pose solver.
//!
//! Implements "Lambda Twist: An Accurate Fast Robust Perspective Three Point (P3P)
//! Solver", Persson, M. and Nordberg, K. ECCV 2018.

// Copyright (c) 2018 Michael Persson
// Adapted to openMVG by Romain Janvier and Pierre Moulon
// Adapted to Rust by Matthieu Pizenberg

use arrayvec::ArrayVec;
use f2b_core::nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};
use f2b_core::Pose;

type Mat3 = Matrix3<f64>;
type Vec3 = Vector3<f64>;

/// One world point and the unit bearing it is seen along.
pub type Correspondence = (Point3<f64>, Unit<Vector3<f64>>);

/// Settings of the P3P solver.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LambdaTwist {
    /// Gauss-Newton iterations spent refining the depths of each solution.
    pub gauss_newton_iterations: usize,
    /// Iterations spent converging on a proper rotation matrix.
    pub rotation_convergence_iterations: usize,
    pub rotation_convergence_epsilon: f64,
}

impl Default for LambdaTwist {
    fn default() -> Self {
        Self {
            gauss_newton_iterations: 5,
            rotation_convergence_iterations: 100,
            rotation_convergence_epsilon: 1e-12,
        }
    }
}

impl LambdaTwist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns 0 to 4 poses solving `lambda_i * y_i = R * x_i + t` for the three
    /// correspondences, where `x_i` are world points and `y_i` unit bearings.
    pub fn solve(&self, samples: &[Correspondence; 3]) -> ArrayVec<Pose, 4> {
        let [(w1, y1), (w2, y2), (w3, y3)] = *samples;
        let (y1, y2, y3) = (y1.into_inner(), y2.into_inner(), y3.into_inner());

        let d12 = w1 - w2;
        let d13 = w1 - w3;
        let d23 = w2 - w3;
        let d12xd13 = d12.cross(&d13);

        // squared distances between world points
        let a12 = d12.norm_squared();
        let a13 = d13.norm_squared();
        let a23 = d23.norm_squared();

        // cosines between bearings
        let c12 = y1.dot(&y2);
        let c23 = y2.dot(&y3);
        let c31 = y3.dot(&y1);
        let blob = c12 * c23 * c31 - 1.0;

        let s12_sqr = 1.0 - c12 * c12;
        let s23_sqr = 1.0 - c23 * c23;
        let s31_sqr = 1.0 - c31 * c31;

        let b12 = -2.0 * c12;
        let b13 = -2.0 * c31;
        let b23 = -2.0 * c23;

        // Cubic coefficients, equation (10) of the paper.
        let p3 = a13 * (a23 * s31_sqr - a13 * s23_sqr);
        let p2 = 2.0 * blob * a23 * a13
            + a13 * (2.0 * a12 + a13) * s23_sqr
            + a23 * (a23 - a12) * s31_sqr;
        let p1 = a23 * (a13 - a23) * s12_sqr
            - a12 * a12 * s23_sqr
            - 2.0 * a12 * (blob * a23 + a13 * s23_sqr);
        let p0 = a12 * (a12 * s23_sqr - a23 * s12_sqr);

        let g = cube_root(p2 / p3, p1 / p3, p0 / p3);

        #[rustfmt::skip]
        let d0 = Mat3::new(
            a23 * (1.0 - g),  -(a23 * c12),              a23 * c31 * g,
            -(a23 * c12),     a23 - a12 + a13 * g,       -c23 * (a13 * g - a12),
            a23 * c31 * g,    -c23 * (a13 * g - a12),    g * (a13 - a23) - a12,
        );
        let (eig_vectors, eig_values) = eigen_decomposition_singular(d0);
        let eigen_ratio = (0.0_f64.max(-eig_values[1] / eig_values[0])).sqrt();

        let mut lambdas: ArrayVec<Vec3, 4> = ArrayVec::new();
        for ratio in [eigen_ratio, -eigen_ratio] {
            // equation (15)
            let w2 = 1.0 / (ratio * eig_vectors.m12 - eig_vectors.m11);
            let w0 = w2 * (eig_vectors.m21 - ratio * eig_vectors.m22);
            let w1 = w2 * (eig_vectors.m31 - ratio * eig_vectors.m32);

            let a = 1.0 / ((a13 - a12) * w1 * w1 - a12 * b13 * w1 - a12);
            let b = a * (a13 * b12 * w1 - a12 * b13 * w0 - 2.0 * w0 * w1 * (a12 - a13));
            let c = a * ((a13 - a12) * w0 * w0 + a13 * b12 * w0 + a13);
            if b * b - 4.0 * c < 0.0 {
                continue;
            }
            let (_, tau1, tau2) = root2real(b, c);
            for tau in [tau1, tau2] {
                if tau <= 0.0 {
                    continue;
                }
                // equation (16)
                let d = a23 / (tau * (b23 + tau) + 1.0);
                if d <= 0.0 {
                    continue;
                }
                let l2 = d.sqrt();
                let l3 = tau * l2;
                let l1 = w0 * l2 + w1 * l3;
                if l1 >= 0.0 {
                    lambdas.push(Vec3::new(l1, l2, l3));
                }
            }
        }

        #[rustfmt::skip]
        let x_mat = Mat3::new(
            d12[0], d13[0], d12xd13[0],
            d12[1], d13[1], d12xd13[1],
            d12[2], d13[2], d12xd13[2],
        );
        let x_inv = match x_mat.try_inverse() {
            Some(m) => m,
            None => return ArrayVec::new(),
        };

        let lengths = Lengths {
            a12,
            a13,
            a23,
            b12,
            b13,
            b23,
        };
        lambdas
            .iter()
            .map(|&lambda| {
                let lambda = lengths.refine(lambda, self.gauss_newton_iterations);
                let ry1 = lambda[0] * y1;
                let ry2 = lambda[1] * y2;
                let ry3 = lambda[2] * y3;

                let yd1 = ry1 - ry2;
                let yd2 = ry1 - ry3;
                let yd1xd2 = yd1.cross(&yd2);

                #[rustfmt::skip]
                let y_mat = Mat3::new(
                    yd1[0], yd2[0], yd1xd2[0],
                    yd1[1], yd2[1], yd1xd2[1],
                    yd1[2], yd2[2], yd1xd2[2],
                );
                let rot = Rotation3::from_matrix_eps(
                    &(y_mat * x_inv),
                    self.rotation_convergence_epsilon,
                    self.rotation_convergence_iterations,
                    Rotation3::identity(),
                );
                Pose::from_parts(ry1 - rot * w1.coords, rot)
            })
            .collect()
    }
}

/// Squared world distances and bearing cosine terms shared by the depth equations.
struct Lengths {
    a12: f64,
    a13: f64,
    a23: f64,
    b12: f64,
    b13: f64,
    b23: f64,
}

impl Lengths {
    fn residual(&self, l: &Vec3) -> Vec3 {
        let (l1, l2, l3) = (l.x, l.y, l.z);
        Vec3::new(
            l1 * l1 + l2 * l2 + self.b12 * l1 * l2 - self.a12,
            l1 * l1 + l3 * l3 + self.b13 * l1 * l3 - self.a13,
            l2 * l2 + l3 * l3 + self.b23 * l2 * l3 - self.a23,
        )
    }

    /// Gauss-Newton refinement of the depths. The paper notes it rarely improves
    /// after two iterations.
    fn refine(&self, lambda: Vec3, iterations: usize) -> Vec3 {
        let mut l = lambda;
        let mut res = self.residual(&l);
        for _ in 0..iterations {
            if res.lp_norm(1) < 1e-10 {
                break;
            }
            let dr1dl1 = 2.0 * l.x + self.b12 * l.y;
            let dr1dl2 = 2.0 * l.y + self.b12 * l.x;
            let dr2dl1 = 2.0 * l.x + self.b13 * l.z;
            let dr2dl3 = 2.0 * l.z + self.b13 * l.x;
            let dr3dl2 = 2.0 * l.y + self.b23 * l.z;
            let dr3dl3 = 2.0 * l.z + self.b23 * l.y;
            let det = 1.0 / (-dr1dl1 * dr2dl3 * dr3dl2 - dr1dl2 * dr2dl1 * dr3dl3);

            #[rustfmt::skip]
            let adjugate = Mat3::new(
                -dr2dl3 * dr3dl2, -dr1dl2 * dr3dl3,  dr1dl2 * dr2dl3,
                -dr2dl1 * dr3dl3,  dr1dl1 * dr3dl3, -dr1dl1 * dr2dl3,
                 dr2dl1 * dr3dl2, -dr1dl1 * dr3dl2, -dr1dl2 * dr2dl1,
            );
            let candidate = l - det * (adjugate * res);
            let candidate_res = self.residual(&candidate);
            if candidate_res.lp_norm(1) > res.lp_norm(1) {
                break;
            }
            l = candidate;
            res = candidate_res;
        }
        l
    }
}

/// Real roots of `r^2 + b*r + c = 0`, computed without cancellation.
fn root2real(b: f64, c: f64) -> (bool, f64, f64) {
    let discriminant = b * b - 4.0 * c;
    if discriminant < 0.0 {
        let root = 0.5 * b;
        (false, root, root)
    } else if b < 0.0 {
        let y = discriminant.sqrt();
        (true, 0.5 * (-b + y), 0.5 * (-b - y))
    } else {
        let y = discriminant.sqrt();
        (true, 2.0 * c / (-b + y), 2.0 * c / (-b - y))
    }
}

/// The root of `r^3 + b*r^2 + c*r + d = 0` with the steepest derivative.
///
/// Newton-Raphson from a starting point picked by a second order approximation
/// around the stationary points of the cubic, when it has any.
#[allow(clippy::many_single_char_names)]
fn cube_root(b: f64, c: f64, d: f64) -> f64 {
    let h = |r: f64| ((r + b) * r + c) * r + d;
    let dh = |r: f64| (3.0 * r + 2.0 * b) * r + c;

    let mut r0 = if b * b >= 3.0 * c {
        let v = (b * b - 3.0 * c).sqrt();
        let t1 = (-b - v) / 3.0;
        let k1 = h(t1);
        if k1 > 0.0 {
            t1 - (-k1 / (3.0 * t1 + b)).sqrt()
        } else {
            let t2 = (-b + v) / 3.0;
            t2 + (-h(t2) / (3.0 * t2 + b)).sqrt()
        }
    } else {
        let r = -b / 3.0;
        if dh(r).abs() < 1e-4 {
            r + 1.0
        } else {
            r
        }
    };

    // at least 7 iterations, at most 50
    for _ in 0..7 {
        r0 -= h(r0) / dh(r0);
    }
    for _ in 0..43 {
        let fx = h(r0);
        if fx.abs() <= 1e-13 {
            break;
        }
        r0 -= fx / dh(r0);
    }
    r0
}

/// Eigen decomposition of a symmetric matrix with a zero eigenvalue.
///
/// Returns the eigenvectors as columns, the null space last, and the eigenvalues
/// with the largest magnitude first.
fn eigen_decomposition_singular(x: Mat3) -> (Mat3, Vec3) {
    #[rustfmt::skip]
    let v3 = Vec3::new(
        x[1] * x[5] - x[2] * x[4],
        x[2] * x[3] - x[5] * x[0],
        x[4] * x[0] - x[1] * x[3],
    )
    .normalize();

    let x12_sqr = x.m12 * x.m12;
    let b = -x.m11 - x.m22 - x.m33;
    let c = -x12_sqr - x.m13 * x.m13 - x.m23 * x.m23 + x.m11 * (x.m22 + x.m33) + x.m22 * x.m33;
    let (_, mut e1, mut e2) = root2real(b, c);
    if e1.abs() < e2.abs() {
        core::mem::swap(&mut e1, &mut e2);
    }

    let mx0011 = -x.m11 * x.m22;
    let prec_0 = x.m12 * x.m23 - x.m13 * x.m22;
    let prec_1 = x.m12 * x.m13 - x.m11 * x.m23;
    let eigen_vector = |e: f64| {
        let tmp = 1.0 / (e * (x.m11 + x.m22) + mx0011 - e * e + x12_sqr);
        let a1 = -(e * x.m13 + prec_0) * tmp;
        let a2 = -(e * x.m23 + prec_1) * tmp;
        let rnorm = 1.0 / (a1 * a1 + a2 * a2 + 1.0).sqrt();
        Vec3::new(a1 * rnorm, a2 * rnorm, rnorm)
    };
    let v1 = eigen_vector(e1);
    let v2 = eigen_vector(e2);

    (Mat3::from_columns(&[v1, v2, v3]), Vec3::new(e1, e2, 0.0))
}
