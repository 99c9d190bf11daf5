use f2b_core::nalgebra::Vector3;
use log::debug;

/// Default rotation applied by one rotate command, in degrees.
pub const DEFAULT_ROTATION_STEP: f64 = 0.5;
/// Default distance moved by one move command, in meters.
pub const DEFAULT_MOVE_STEP: f64 = 0.1;

/// Adjustments the user can make to where the AR sphere is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SphereManipulation {
    RotateCw,
    RotateCcw,
    MoveNorth,
    MoveSouth,
    MoveEast,
    MoveWest,
    ResetCenter,
}

/// Placement of the drawn sphere: its center and the clock angle of its figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereView {
    pub center: Vector3<f64>,
    pub rotation_deg: f64,
}

impl SphereView {
    pub fn new(center: Vector3<f64>) -> Self {
        Self {
            center,
            rotation_deg: 0.0,
        }
    }

    /// Applies one manipulation. Clockwise is as seen from above.
    pub fn manipulate(&mut self, manipulation: SphereManipulation, rotation_step: f64, move_step: f64) {
        match manipulation {
            SphereManipulation::RotateCw => self.rotation_deg += rotation_step,
            SphereManipulation::RotateCcw => self.rotation_deg -= rotation_step,
            SphereManipulation::MoveNorth => self.center.y += move_step,
            SphereManipulation::MoveSouth => self.center.y -= move_step,
            SphereManipulation::MoveEast => self.center.x += move_step,
            SphereManipulation::MoveWest => self.center.x -= move_step,
            SphereManipulation::ResetCenter => self.center = Vector3::zeros(),
        }
        debug!(
            "sphere center {:?} rotation {:.1}°",
            self.center.as_slice(),
            self.rotation_deg
        );
    }
}

impl Default for SphereView {
    fn default() -> Self {
        Self::new(Vector3::zeros())
    }
}
