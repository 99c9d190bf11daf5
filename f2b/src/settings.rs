use crate::ProcessorError;
use f2b_draw::{DEFAULT_MOVE_STEP, DEFAULT_ROTATION_STEP, DEFAULT_TRACK_LENGTH};
use f2b_locate::PoseSolver;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The settings for the frame processor.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorSettings {
    /// The number of frames of aircraft positions kept in the track
    #[serde(default = "default_track_length")]
    pub track_length: usize,
    /// Degrees the sphere turns for one rotate command
    #[serde(default = "default_rotation_step_deg")]
    pub rotation_step_deg: f64,
    /// Meters the sphere moves for one move command
    #[serde(default = "default_move_step")]
    pub move_step: f64,
    /// The worst RMS reprojection error in pixels accepted from the pose solver
    #[serde(default = "default_max_rms_error")]
    pub max_rms_error: f64,
    /// The number of Levenberg-Marquardt iterations used to refine a located pose
    #[serde(default = "default_refine_iterations")]
    pub refine_iterations: usize,
    /// Draw the world axes from the start
    #[serde(default)]
    pub draw_axis: bool,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            track_length: default_track_length(),
            rotation_step_deg: default_rotation_step_deg(),
            move_step: default_move_step(),
            max_rms_error: default_max_rms_error(),
            refine_iterations: default_refine_iterations(),
            draw_axis: false,
        }
    }
}

impl ProcessorSettings {
    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ProcessorError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// The pose solver these settings describe.
    pub fn pose_solver(&self) -> PoseSolver {
        PoseSolver::new()
            .max_rms_error(self.max_rms_error)
            .refine_iterations(self.refine_iterations)
    }
}

fn default_track_length() -> usize {
    DEFAULT_TRACK_LENGTH
}

fn default_rotation_step_deg() -> f64 {
    DEFAULT_ROTATION_STEP
}

fn default_move_step() -> f64 {
    DEFAULT_MOVE_STEP
}

fn default_max_rms_error() -> f64 {
    20.0
}

fn default_refine_iterations() -> usize {
    10
}
