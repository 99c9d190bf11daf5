//! Figure recipes.
//!
//! Every recipe is a pure function of `(angle_deg, sphere_radius)`. Loops are built
//! in a canonical vertical frame, tilted, moved to their anchor on the sphere and only
//! then yawed to their clock position. The order matters: yawing before the tilt
//! changes the shape of the figure.

use crate::curve::{points_on_circle, points_on_half_circle, SEGMENTS};
use crate::transform::{embed_xy, embed_xz, embed_yz, matrix, rotate, translate, yaw, LOOP_TILT, TOP_LOOP_TILT};
use core::fmt;
use core::str::FromStr;
use f2b_core::nalgebra::{Point2, Point3, Vector3};
use f2b_core::COS_45;
use thiserror::Error;

/// Radius of a loop relative to the sphere radius.
pub const LOOP_RADIUS_RATIO: f64 = 0.382683;
/// Horizontal (Y) coordinate of a loop center relative to the sphere radius.
pub const LOOP_CENTER_Y_RATIO: f64 = 0.85356;
/// Vertical (Z) coordinate of a loop center relative to the sphere radius.
pub const LOOP_CENTER_Z_RATIO: f64 = 0.35355;
/// Yaw of each lobe of a horizontal eight away from the figure's angle.
pub const EIGHT_HALF_ANGLE: f64 = 24.47;
/// Yaw of each lobe of an overhead eight away from the figure's angle.
pub const OVERHEAD_HALF_ANGLE: f64 = 90.0;

/// Angles of the meridian fan, relative to its base angle.
pub const FAN_ANGLES: [f64; 4] = [0.0, 45.0, 90.0, 135.0];

/// The plane and anchor of a loop on the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopGeometry {
    pub radius: f64,
    /// Loop center before yaw.
    pub center: Vector3<f64>,
    /// Rotation carrying the canonical XZ plane into the loop plane.
    pub tilt: [[f64; 3]; 3],
}

impl LoopGeometry {
    /// A loop tangent to the sphere at 45° of elevation.
    ///
    /// ```
    /// use f2b_geom::LoopGeometry;
    /// let lg = LoopGeometry::inside(25.0);
    /// assert!((lg.radius - 25.0 * 0.382683).abs() < 1e-12);
    /// assert!((lg.center.y - 25.0 * 0.85356).abs() < 1e-12);
    /// ```
    pub fn inside(sphere_radius: f64) -> Self {
        Self {
            radius: sphere_radius * LOOP_RADIUS_RATIO,
            center: Vector3::new(
                0.0,
                LOOP_CENTER_Y_RATIO * sphere_radius,
                LOOP_CENTER_Z_RATIO * sphere_radius,
            ),
            tilt: LOOP_TILT,
        }
    }

    /// A loop flown over the top of the sphere, the same size as [`LoopGeometry::inside`].
    pub fn top(sphere_radius: f64) -> Self {
        Self {
            radius: sphere_radius * LOOP_RADIUS_RATIO,
            center: Vector3::new(
                0.0,
                LOOP_CENTER_Z_RATIO * sphere_radius,
                LOOP_CENTER_Y_RATIO * sphere_radius,
            ),
            tilt: TOP_LOOP_TILT,
        }
    }

    /// Carries an outline drawn in the loop's own plane (XZ, centered on the origin)
    /// onto the sphere at the given angle.
    pub fn place(&self, outline: &[Point2<f64>], angle_deg: f64) -> Vec<Point3<f64>> {
        let tilted = rotate(&embed_xz(outline), &matrix(&self.tilt));
        rotate(&translate(&tilted, &self.center), &yaw(angle_deg))
    }

    /// The loop center at the given angle.
    pub fn anchor(&self, angle_deg: f64) -> Point3<f64> {
        Point3::from(yaw(angle_deg) * self.center)
    }

    fn circle(&self) -> Vec<Point2<f64>> {
        points_on_circle(self.radius, SEGMENTS)
    }

    /// Corners of the inscribed square, bottom left first, counterclockwise.
    fn square_corners(&self) -> [Point2<f64>; 4] {
        let h = self.radius * COS_45;
        [
            Point2::new(-h, -h),
            Point2::new(h, -h),
            Point2::new(h, h),
            Point2::new(-h, h),
        ]
    }

    fn square(&self) -> Vec<Point2<f64>> {
        let [bl, br, tr, tl] = self.square_corners();
        vec![bl, br, tr, tl, bl]
    }

    fn triangle(&self) -> Vec<Point2<f64>> {
        let half_base = self.radius * 3f64.sqrt() / 2.0;
        let base = -self.radius / 2.0;
        let left = Point2::new(-half_base, base);
        vec![
            left,
            Point2::new(half_base, base),
            Point2::new(0.0, self.radius),
            left,
        ]
    }

    fn hourglass(&self) -> Vec<Point2<f64>> {
        let [bl, br, tr, tl] = self.square_corners();
        vec![bl, br, tl, tr, bl]
    }
}

/// The 3d paths of one figure, plus the construction anchors shown in diagnostics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FigurePaths {
    pub paths: Vec<Vec<Point3<f64>>>,
    pub anchors: Vec<Point3<f64>>,
}

impl FigurePaths {
    fn push(&mut self, lg: &LoopGeometry, outline: &[Point2<f64>], angle_deg: f64) {
        self.paths.push(lg.place(outline, angle_deg));
        self.anchors.push(lg.anchor(angle_deg));
    }

    /// Returns `true` if every point of every path is finite.
    pub fn is_finite(&self) -> bool {
        self.paths
            .iter()
            .flatten()
            .chain(self.anchors.iter())
            .all(|p| p.iter().all(|n| n.is_finite()))
    }
}

/// A figure recipe: `(angle_deg, sphere_radius) -> paths`.
pub type Recipe = fn(f64, f64) -> FigurePaths;

/// The figures that can be drawn on the sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FigureId {
    InsideLoop,
    SquareLoop,
    TriangularLoop,
    HorizontalEight,
    SquareHorizontalEight,
    VerticalEight,
    Hourglass,
    OverheadEight,
    FourLeafClover,
}

impl FigureId {
    /// Every figure, in the order they are flown in the pattern.
    pub const ALL: [FigureId; 9] = [
        FigureId::InsideLoop,
        FigureId::SquareLoop,
        FigureId::TriangularLoop,
        FigureId::HorizontalEight,
        FigureId::SquareHorizontalEight,
        FigureId::VerticalEight,
        FigureId::Hourglass,
        FigureId::OverheadEight,
        FigureId::FourLeafClover,
    ];

    /// Short name used on the command line and in logs.
    pub fn name(self) -> &'static str {
        match self {
            FigureId::InsideLoop => "loops",
            FigureId::SquareLoop => "square-loops",
            FigureId::TriangularLoop => "triangular-loops",
            FigureId::HorizontalEight => "horizontal-eight",
            FigureId::SquareHorizontalEight => "square-horizontal-eight",
            FigureId::VerticalEight => "vertical-eight",
            FigureId::Hourglass => "hourglass",
            FigureId::OverheadEight => "overhead-eight",
            FigureId::FourLeafClover => "four-leaf-clover",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn recipe(self) -> Recipe {
        match self {
            FigureId::InsideLoop => inside_loop,
            FigureId::SquareLoop => square_loop,
            FigureId::TriangularLoop => triangular_loop,
            FigureId::HorizontalEight => horizontal_eight,
            FigureId::SquareHorizontalEight => square_horizontal_eight,
            FigureId::VerticalEight => vertical_eight,
            FigureId::Hourglass => hourglass,
            FigureId::OverheadEight => overhead_eight,
            FigureId::FourLeafClover => four_leaf_clover,
        }
    }

    /// Builds the figure at the given clock angle on a sphere of the given radius.
    pub fn build(self, angle_deg: f64, sphere_radius: f64) -> FigurePaths {
        (self.recipe())(angle_deg, sphere_radius)
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown figure {0:?}")]
pub struct UnknownFigure(pub String);

impl FromStr for FigureId {
    type Err = UnknownFigure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FigureId::ALL
            .iter()
            .copied()
            .find(|id| id.name() == s)
            .ok_or_else(|| UnknownFigure(s.to_owned()))
    }
}

pub fn inside_loop(angle_deg: f64, r: f64) -> FigurePaths {
    let lg = LoopGeometry::inside(r);
    let mut fig = FigurePaths::default();
    fig.push(&lg, &lg.circle(), angle_deg);
    fig
}

pub fn top_loop(angle_deg: f64, r: f64) -> FigurePaths {
    let lg = LoopGeometry::top(r);
    let mut fig = FigurePaths::default();
    fig.push(&lg, &lg.circle(), angle_deg);
    fig
}

pub fn square_loop(angle_deg: f64, r: f64) -> FigurePaths {
    let lg = LoopGeometry::inside(r);
    let mut fig = FigurePaths::default();
    fig.push(&lg, &lg.square(), angle_deg);
    fig
}

pub fn triangular_loop(angle_deg: f64, r: f64) -> FigurePaths {
    let lg = LoopGeometry::inside(r);
    let mut fig = FigurePaths::default();
    fig.push(&lg, &lg.triangle(), angle_deg);
    fig
}

pub fn horizontal_eight(angle_deg: f64, r: f64) -> FigurePaths {
    let lg = LoopGeometry::inside(r);
    let mut fig = FigurePaths::default();
    for side in [1.0, -1.0] {
        fig.push(&lg, &lg.circle(), angle_deg + side * EIGHT_HALF_ANGLE);
    }
    fig
}

pub fn square_horizontal_eight(angle_deg: f64, r: f64) -> FigurePaths {
    let lg = LoopGeometry::inside(r);
    let mut fig = FigurePaths::default();
    for side in [1.0, -1.0] {
        fig.push(&lg, &lg.square(), angle_deg + side * EIGHT_HALF_ANGLE);
    }
    fig
}

pub fn vertical_eight(angle_deg: f64, r: f64) -> FigurePaths {
    let bottom = LoopGeometry::inside(r);
    let top = LoopGeometry::top(r);
    let mut fig = FigurePaths::default();
    fig.push(&bottom, &bottom.circle(), angle_deg);
    fig.push(&top, &top.circle(), angle_deg);
    fig
}

pub fn hourglass(angle_deg: f64, r: f64) -> FigurePaths {
    let lg = LoopGeometry::inside(r);
    let mut fig = FigurePaths::default();
    fig.push(&lg, &lg.hourglass(), angle_deg);
    fig
}

pub fn overhead_eight(angle_deg: f64, r: f64) -> FigurePaths {
    let lg = LoopGeometry::top(r);
    let mut fig = FigurePaths::default();
    for side in [1.0, -1.0] {
        fig.push(&lg, &lg.circle(), angle_deg + side * OVERHEAD_HALF_ANGLE);
    }
    fig
}

pub fn four_leaf_clover(angle_deg: f64, r: f64) -> FigurePaths {
    let bottom = LoopGeometry::inside(r);
    let top = LoopGeometry::top(r);
    let mut fig = FigurePaths::default();
    for side in [1.0, -1.0] {
        fig.push(&bottom, &bottom.circle(), angle_deg + side * EIGHT_HALF_ANGLE);
    }
    for side in [1.0, -1.0] {
        fig.push(&top, &top.circle(), angle_deg + side * EIGHT_HALF_ANGLE);
    }
    fig
}

/// The equator of the sphere.
pub fn level_circle(r: f64) -> Vec<Point3<f64>> {
    embed_xy(&points_on_circle(r, SEGMENTS), 0.0)
}

/// Half of a great circle through the pole, from the front of the sphere over the
/// top to the rear, yawed by `angle_deg`.
pub fn meridian(angle_deg: f64, r: f64) -> Vec<Point3<f64>> {
    rotate(&embed_yz(&points_on_half_circle(r, SEGMENTS)), &yaw(angle_deg))
}

/// One meridian of the fan with the gray level it is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct FanMeridian {
    pub angle_deg: f64,
    pub brightness: u8,
    pub points: Vec<Point3<f64>>,
}

/// Gray level of a fan meridian: `255 - 2 * angle`, saturating at black.
pub fn fan_brightness(relative_angle_deg: f64) -> u8 {
    (255.0 - relative_angle_deg * 2.0).clamp(0.0, 255.0) as u8
}

/// Four meridians at 0, 45, 90 and 135° past `base_deg`, brightest first.
pub fn meridian_fan(base_deg: f64, r: f64) -> Vec<FanMeridian> {
    FAN_ANGLES
        .iter()
        .map(|&relative| FanMeridian {
            angle_deg: base_deg + relative,
            brightness: fan_brightness(relative),
            points: meridian(base_deg + relative, r),
        })
        .collect()
}

/// The latitude ring at 45° of elevation.
pub fn latitude_45(r: f64) -> Vec<Point3<f64>> {
    let r45 = COS_45 * r;
    embed_xy(&points_on_circle(r45, SEGMENTS), r45)
}
