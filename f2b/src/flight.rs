use crate::FlightError;
use f2b_core::nalgebra::Vector3;
use f2b_core::{
    KeyPoint, SphereGeometry, DEFAULT_FLIGHT_RADIUS, DEFAULT_MARKER_HEIGHT, DEFAULT_MARKER_RADIUS,
    NUM_OBJECT_POINTS,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Everything about a flight apart from its video source.
///
/// All dimensions are in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOptions {
    /// The source is a live camera rather than a video file.
    #[serde(default)]
    pub is_live: bool,
    /// Index of the live camera. Required for live video.
    #[serde(default)]
    pub cam_index: Option<usize>,
    /// Frame rate of live video. Required for live video.
    #[serde(default)]
    pub live_fps: Option<f64>,
    /// Halve the input rate of live video.
    #[serde(default)]
    pub enable_decimator: bool,
    #[serde(default)]
    pub calibration_path: Option<PathBuf>,
    /// Skip locating the camera in a calibrated flight. Only the track is drawn.
    #[serde(default)]
    pub skip_locate: bool,
    #[serde(default = "default_flight_radius")]
    pub flight_radius: f64,
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f64,
    #[serde(default = "default_marker_height")]
    pub marker_height: f64,
    /// Offset of the flight sphere from the center of the marker circle.
    #[serde(default)]
    pub sphere_offset: (f64, f64, f64),
    /// Image positions of the markers, in locating order.
    #[serde(default)]
    pub loc_pts: Vec<(f64, f64)>,
}

impl Default for FlightOptions {
    fn default() -> Self {
        Self {
            is_live: false,
            cam_index: None,
            live_fps: None,
            enable_decimator: false,
            calibration_path: None,
            skip_locate: false,
            flight_radius: default_flight_radius(),
            marker_radius: default_marker_radius(),
            marker_height: default_marker_height(),
            sphere_offset: (0.0, 0.0, 0.0),
            loc_pts: vec![],
        }
    }
}

fn default_flight_radius() -> f64 {
    DEFAULT_FLIGHT_RADIUS
}

fn default_marker_radius() -> f64 {
    DEFAULT_MARKER_RADIUS
}

fn default_marker_height() -> f64 {
    DEFAULT_MARKER_HEIGHT
}

/// A flight to be processed: its video source, calibration and sphere geometry.
///
/// The options are validated once by [`Flight::new`]. A flight is persisted as JSON
/// so it can be resumed later without locating the camera again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FlightRecord", into = "FlightRecord")]
pub struct Flight {
    video_path: PathBuf,
    options: FlightOptions,
    geometry: SphereGeometry,
    is_calibrated: bool,
}

/// The persisted form of a [`Flight`].
#[derive(Serialize, Deserialize)]
struct FlightRecord {
    video_path: PathBuf,
    #[serde(default)]
    is_calibrated: bool,
    #[serde(default)]
    is_located: bool,
    #[serde(flatten)]
    options: FlightOptions,
}

impl Flight {
    pub fn new(video_path: impl Into<PathBuf>, options: FlightOptions) -> Result<Self, FlightError> {
        let video_path = video_path.into();
        if options.is_live {
            if options.cam_index.is_none() {
                return Err(FlightError::MissingCameraIndex);
            }
            match options.live_fps {
                Some(fps) if fps.is_finite() && fps > 0.0 => {}
                fps => return Err(FlightError::FrameRate(fps)),
            }
        }
        check_points(&options.loc_pts)?;
        let (x, y, z) = options.sphere_offset;
        let geometry = SphereGeometry::new(
            options.flight_radius,
            options.marker_radius,
            options.marker_height,
            Vector3::new(x, y, z),
        )?;
        let is_calibrated = options
            .calibration_path
            .as_deref()
            .map_or(false, Path::exists);

        info!("creating a new flight");
        info!("      video path: {}", video_path.display());
        if let Some(path) = options.calibration_path.as_deref().filter(|_| is_calibrated) {
            info!("calibration path: {}", path.display());
        }
        info!("  flight radius = {} m", options.flight_radius);
        info!("    mark radius = {} m", options.marker_radius);
        info!("    mark height = {} m", options.marker_height);
        info!("  sphere offset = {:?} m", options.sphere_offset);

        Ok(Self {
            video_path,
            options,
            geometry,
            is_calibrated,
        })
    }

    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    pub fn options(&self) -> &FlightOptions {
        &self.options
    }

    pub fn calibration_path(&self) -> Option<&Path> {
        self.options.calibration_path.as_deref()
    }

    pub fn geometry(&self) -> &SphereGeometry {
        &self.geometry
    }

    /// The calibration file was given and existed when the flight was created.
    pub fn is_calibrated(&self) -> bool {
        self.is_calibrated
    }

    /// The flight is calibrated and all of its locator points are known.
    pub fn is_located(&self) -> bool {
        self.is_calibrated && self.options.loc_pts.len() == NUM_OBJECT_POINTS
    }

    pub fn locator_points(&self) -> Vec<KeyPoint> {
        self.options.loc_pts.iter().copied().map(KeyPoint::from).collect()
    }

    /// Remembers the locator points, typically after the camera was located.
    pub fn set_locator_points(&mut self, points: &[KeyPoint]) -> Result<(), FlightError> {
        let points: Vec<(f64, f64)> = points.iter().copied().map(Into::into).collect();
        check_points(&points)?;
        self.options.loc_pts = points;
        Ok(())
    }

    /// Writes the flight as JSON.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), FlightError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("flight saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reads a flight written by [`Flight::write`], validating it again.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, FlightError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let flight: Self = serde_json::from_reader(reader)?;
        info!("flight loaded from {}", path.as_ref().display());
        Ok(flight)
    }
}

fn check_points(points: &[(f64, f64)]) -> Result<(), FlightError> {
    if points.len() > NUM_OBJECT_POINTS {
        return Err(FlightError::TooManyPoints(points.len()));
    }
    match points
        .iter()
        .position(|&(x, y)| !(x.is_finite() && y.is_finite()))
    {
        Some(ix) => Err(FlightError::NonFinitePoint(ix)),
        None => Ok(()),
    }
}

impl TryFrom<FlightRecord> for Flight {
    type Error = FlightError;

    fn try_from(record: FlightRecord) -> Result<Self, Self::Error> {
        Flight::new(record.video_path, record.options)
    }
}

impl From<Flight> for FlightRecord {
    fn from(flight: Flight) -> Self {
        Self {
            is_calibrated: flight.is_calibrated(),
            is_located: flight.is_located(),
            video_path: flight.video_path,
            options: flight.options,
        }
    }
}
