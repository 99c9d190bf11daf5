use crate::{PoseError, PoseSolution, PoseSolver};
use arrayvec::ArrayVec;
use f2b_core::{KeyPoint, Marker, ObjectPoints, Pose, NUM_OBJECT_POINTS};
use f2b_pinhole::CameraModel;
use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocateError {
    #[error("cannot solve the pose with {0} of {NUM_OBJECT_POINTS} locator points")]
    NotDefined(usize),
    #[error(transparent)]
    Pose(#[from] PoseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorState {
    /// No locating in progress.
    Idle,
    /// Points are being added or removed.
    Collecting,
    /// All four points exist; the pose can be solved.
    Defined,
    /// The pose was solved from the current points.
    Solved,
}

/// What a locator command changed, for whoever presents it.
#[derive(Debug, Clone, PartialEq)]
pub enum LocatorEvent {
    PointsChanged {
        points: Vec<KeyPoint>,
        instruction: String,
    },
    PointsDefined,
    PoseSolved(PoseSolution),
    PoseSolveFailed(LocateError),
}

/// Collects the clicked marker points and turns them into a camera pose.
///
/// Points are collected in the order of [`Marker::ALL`]. Every command returns the
/// events it produced; commands that do not apply in the current state are no-ops
/// and return no events.
#[derive(Debug, Clone)]
pub struct Locator {
    state: LocatorState,
    points: ArrayVec<KeyPoint, NUM_OBJECT_POINTS>,
    pose: Option<Pose>,
    object_points: ObjectPoints,
    solver: PoseSolver,
}

impl Locator {
    pub fn new(object_points: ObjectPoints, solver: PoseSolver) -> Self {
        Self {
            state: LocatorState::Idle,
            points: ArrayVec::new(),
            pose: None,
            object_points,
            solver,
        }
    }

    pub fn state(&self) -> LocatorState {
        self.state
    }

    pub fn points(&self) -> &[KeyPoint] {
        &self.points
    }

    /// The last solved pose. It survives relocating until a new pose is solved.
    pub fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    pub fn object_points(&self) -> &ObjectPoints {
        &self.object_points
    }

    /// The marker the next click will be assigned to.
    pub fn next_marker(&self) -> Option<Marker> {
        Marker::ALL.get(self.points.len()).copied()
    }

    pub fn instruction(&self) -> String {
        match self.next_marker() {
            Some(marker) => format!("Click {}.", marker.name()),
            None => "All points defined.".to_owned(),
        }
    }

    fn changed(&self) -> LocatorEvent {
        LocatorEvent::PointsChanged {
            points: self.points.to_vec(),
            instruction: self.instruction(),
        }
    }

    pub fn add_point(&mut self, point: KeyPoint) -> Vec<LocatorEvent> {
        if self.points.try_push(point).is_err() {
            return vec![];
        }
        debug!("locator point {} at {:?}", self.points.len(), point.truncated());
        let mut events = vec![self.changed()];
        if self.points.is_full() {
            self.state = LocatorState::Defined;
            events.push(LocatorEvent::PointsDefined);
        } else {
            self.state = LocatorState::Collecting;
        }
        events
    }

    pub fn pop_point(&mut self) -> Vec<LocatorEvent> {
        if self.points.pop().is_none() {
            return vec![];
        }
        self.state = LocatorState::Collecting;
        vec![self.changed()]
    }

    /// Drops every point and returns to [`LocatorState::Idle`].
    pub fn clear(&mut self) -> Vec<LocatorEvent> {
        self.points.clear();
        self.state = LocatorState::Idle;
        vec![self.changed()]
    }

    /// Starts collecting a fresh set of points. The current pose stays usable until
    /// a new one is solved.
    pub fn relocate(&mut self) -> Vec<LocatorEvent> {
        self.points.clear();
        self.state = LocatorState::Collecting;
        vec![self.changed()]
    }

    /// Replaces the points wholesale, as when a saved flight is resumed.
    /// Points beyond the fourth are ignored.
    pub fn set_points(&mut self, points: &[KeyPoint]) -> Vec<LocatorEvent> {
        self.points = points.iter().copied().take(NUM_OBJECT_POINTS).collect();
        let mut events = vec![self.changed()];
        self.state = if self.points.is_full() {
            events.push(LocatorEvent::PointsDefined);
            LocatorState::Defined
        } else if self.points.is_empty() {
            LocatorState::Idle
        } else {
            LocatorState::Collecting
        };
        events
    }

    /// Solves the pose from the four points.
    ///
    /// Any full set of points can be solved, so a failed solve can be retried and a
    /// solved set solved again. On failure the points are kept for inspection and the
    /// locator goes back to collecting; the previous pose is untouched.
    pub fn solve(&mut self, camera: &CameraModel) -> Vec<LocatorEvent> {
        if !self.points.is_full() {
            let err = LocateError::NotDefined(self.points.len());
            warn!("{}", err);
            return vec![LocatorEvent::PoseSolveFailed(err)];
        }
        match self.solver.solve(camera, &self.object_points, &self.points) {
            Ok(solution) => {
                info!(
                    "camera located: rvec {:?} tvec {:?} ({:.2} px rms)",
                    solution.pose.rvec.as_slice(),
                    solution.pose.tvec.as_slice(),
                    solution.rms_error
                );
                self.pose = Some(solution.pose);
                self.state = LocatorState::Solved;
                vec![LocatorEvent::PoseSolved(solution)]
            }
            Err(err) => {
                warn!("pose estimation failed: {}", err);
                self.state = LocatorState::Collecting;
                vec![LocatorEvent::PoseSolveFailed(err.into())]
            }
        }
    }
}
