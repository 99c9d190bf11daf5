use crate::{Flight, ProcessorError, ProcessorSettings};
use f2b_core::nalgebra::Point2;
use f2b_core::{KeyPoint, Pose, NUM_OBJECT_POINTS};
use f2b_draw::{ArRenderer, RenderReport, SphereManipulation, SphereView, Track};
use f2b_geom::FigureId;
use f2b_locate::{LocateError, Locator, LocatorEvent, LocatorState, PoseSolution};
use f2b_pinhole::CameraModel;
use image::RgbImage;
use log::{debug, info, trace, warn};
use std::sync::mpsc::{Receiver, Sender};

/// Requests to the processor. They take effect before the next frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    AddLocatorPoint(KeyPoint),
    PopLocatorPoint,
    ClearLocatorPoints,
    /// Solve the camera pose from the four locator points.
    ConfirmLocatorPoints,
    /// Start locating the camera again with a fresh set of points.
    Relocate,
    ToggleFigure(FigureId, bool),
    NextFigure,
    ToggleDiagnostics(bool),
    ToggleStartEndPoints(bool),
    ToggleAxis(bool),
    ManipulateSphere(SphereManipulation),
    ClearTrack,
}

/// Reports from the processor.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LocatorPointsChanged {
        points: Vec<KeyPoint>,
        instruction: String,
    },
    LocatorPointsDefined,
    PoseSolved(PoseSolution),
    PoseSolveFailed(LocateError),
    LocatingStarted,
    TrackCleared,
}

impl From<LocatorEvent> for Event {
    fn from(event: LocatorEvent) -> Self {
        match event {
            LocatorEvent::PointsChanged {
                points,
                instruction,
            } => Event::LocatorPointsChanged {
                points,
                instruction,
            },
            LocatorEvent::PointsDefined => Event::LocatorPointsDefined,
            LocatorEvent::PoseSolved(solution) => Event::PoseSolved(solution),
            LocatorEvent::PoseSolveFailed(err) => Event::PoseSolveFailed(err),
        }
    }
}

/// What was drawn onto one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// `None` when no pose was available, so no AR geometry was drawn.
    pub render: Option<RenderReport>,
    pub track_segments: usize,
}

/// Draws the AR overlay and the aircraft track onto the frames of one flight.
///
/// Commands arrive on a channel and are drained without blocking at the start of
/// every frame. Everything the processor wants to tell its owner is sent as an
/// [`Event`]; events are dropped if nobody is listening anymore.
pub struct Processor {
    flight: Flight,
    camera: Option<CameraModel>,
    settings: ProcessorSettings,
    locator: Locator,
    renderer: ArRenderer,
    view: SphereView,
    track: Track,
    commands: Receiver<Command>,
    events: Sender<Event>,
}

impl Processor {
    /// Creates the processor for a flight.
    ///
    /// Without a camera model only the track is drawn. A flight that already knows all
    /// of its locator points has its pose solved right away. Any other flight starts
    /// locating, unless it asked to skip that.
    pub fn new(
        flight: Flight,
        camera: Option<CameraModel>,
        settings: ProcessorSettings,
        commands: Receiver<Command>,
        events: Sender<Event>,
    ) -> Self {
        let geometry = *flight.geometry();
        let mut renderer = ArRenderer::new();
        renderer.axis = settings.draw_axis;
        let mut processor = Self {
            locator: Locator::new(geometry.object_points(), settings.pose_solver()),
            renderer,
            view: SphereView::new(geometry.sphere_offset()),
            track: Track::new(settings.track_length),
            flight,
            camera,
            settings,
            commands,
            events,
        };
        if processor.camera.is_none() {
            info!("flight is not calibrated: drawing the track only");
        } else if processor.flight.options().loc_pts.len() == NUM_OBJECT_POINTS {
            info!("resuming a located flight");
            let points = processor.flight.locator_points();
            let mut events = processor.locator.set_points(&points);
            events.extend(processor.solve());
            processor.emit_all(events);
        } else if processor.flight.options().skip_locate {
            info!("skipping camera location");
        } else {
            processor.start_locating();
        }
        processor
    }

    /// Creates the processor, loading the camera model from the flight's calibration.
    pub fn from_flight(
        flight: Flight,
        settings: ProcessorSettings,
        commands: Receiver<Command>,
        events: Sender<Event>,
    ) -> Result<Self, ProcessorError> {
        let camera = match flight.calibration_path().filter(|_| flight.is_calibrated()) {
            Some(path) => Some(CameraModel::load(path)?),
            None => None,
        };
        Ok(Self::new(flight, camera, settings, commands, events))
    }

    pub fn flight(&self) -> &Flight {
        &self.flight
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn renderer(&self) -> &ArRenderer {
        &self.renderer
    }

    pub fn view(&self) -> &SphereView {
        &self.view
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// The current camera pose, if the camera was located.
    pub fn pose(&self) -> Option<&Pose> {
        self.locator.pose()
    }

    /// Applies pending commands, then draws the AR geometry (when a pose exists) and
    /// the track onto `frame`. `aircraft` is where the aircraft was found in this
    /// frame, if anywhere.
    pub fn process_frame(&mut self, frame: &mut RgbImage, aircraft: Option<Point2<f64>>) -> FrameReport {
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
        }

        let render = match (&self.camera, self.locator.pose()) {
            (Some(camera), Some(pose)) => Some(self.renderer.render(
                frame,
                camera,
                pose,
                self.flight.geometry(),
                &self.view,
            )),
            _ => None,
        };
        self.track.push(aircraft);
        let track_segments = self.track.draw(frame);
        trace!(
            "frame drawn: {} figures, {} track segments",
            render.as_ref().map_or(0, |r| r.figures_drawn.len()),
            track_segments
        );
        FrameReport {
            render,
            track_segments,
        }
    }

    /// Applies one command right away.
    pub fn apply(&mut self, command: Command) {
        debug!("command {:?}", command);
        match command {
            Command::AddLocatorPoint(point) => {
                if self.can_locate() {
                    let events = self.locator.add_point(point);
                    self.emit_all(events);
                }
            }
            Command::PopLocatorPoint => {
                if self.can_locate() {
                    let events = self.locator.pop_point();
                    self.emit_all(events);
                }
            }
            Command::ClearLocatorPoints => {
                if self.can_locate() {
                    let events = self.locator.clear();
                    self.emit_all(events);
                }
            }
            Command::ConfirmLocatorPoints => {
                if self.can_locate() {
                    let events = self.solve();
                    self.emit_all(events);
                }
            }
            Command::Relocate => {
                if self.can_locate() {
                    self.start_locating();
                }
            }
            Command::ToggleFigure(id, enabled) => self.renderer.figures.toggle(id, enabled),
            Command::NextFigure => {
                if self.renderer.figures.advance().is_none() {
                    debug!("no next figure");
                }
            }
            Command::ToggleDiagnostics(enabled) => self.renderer.diagnostics = enabled,
            Command::ToggleStartEndPoints(enabled) => self.renderer.start_end_points = enabled,
            Command::ToggleAxis(enabled) => self.renderer.axis = enabled,
            Command::ManipulateSphere(manipulation) => self.view.manipulate(
                manipulation,
                self.settings.rotation_step_deg,
                self.settings.move_step,
            ),
            Command::ClearTrack => {
                self.track.clear();
                self.emit(Event::TrackCleared);
            }
        }
    }

    fn can_locate(&self) -> bool {
        if self.camera.is_none() {
            warn!("cannot locate the camera of an uncalibrated flight");
        }
        self.camera.is_some()
    }

    fn start_locating(&mut self) {
        let mut events = vec![Event::LocatingStarted];
        events.extend(self.locator.relocate().into_iter().map(Event::from));
        for event in events {
            self.emit(event);
        }
    }

    /// Solves the pose and, on success, keeps the points with the flight so it can be
    /// resumed later.
    fn solve(&mut self) -> Vec<LocatorEvent> {
        let camera = match &self.camera {
            Some(camera) => camera,
            None => return vec![],
        };
        let events = self.locator.solve(camera);
        if self.locator.state() == LocatorState::Solved {
            if let Err(err) = self.flight.set_locator_points(self.locator.points()) {
                warn!("failed to keep locator points with the flight: {}", err);
            }
        }
        events
    }

    fn emit_all(&self, events: Vec<LocatorEvent>) {
        for event in events {
            self.emit(event.into());
        }
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            trace!("event dropped: nobody is listening");
        }
    }
}
