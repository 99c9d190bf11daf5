use f2b::camera::CameraModel;
use f2b::geom::FigureId;
use f2b::{Command, Event, Flight, Processor, ProcessorSettings};
use image::{DynamicImage, ImageOutputFormat};
use log::*;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::mpsc::channel;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "f2bdraw",
    about = "A tool to draw the F2B flight sphere and figures onto a video frame"
)]
struct Opt {
    /// The flight file with the sphere geometry and the four locator points.
    #[structopt(short, long, parse(from_os_str))]
    flight: PathBuf,
    /// The camera calibration file.
    ///
    /// If this is not provided, the calibration named by the flight is used.
    #[structopt(short, long, parse(from_os_str))]
    calibration: Option<PathBuf>,
    /// The file where settings are specified.
    ///
    /// This is in the format of `f2b::ProcessorSettings`.
    #[structopt(short, long, parse(from_os_str))]
    settings: Option<PathBuf>,
    /// A figure to draw, such as `loops` or `four-leaf-clover`. May be repeated.
    #[structopt(long = "figure")]
    figures: Vec<FigureId>,
    /// Draw the construction anchors of the figures.
    #[structopt(short, long)]
    diagnostics: bool,
    /// Draw the world axes.
    #[structopt(short, long)]
    axis: bool,
    /// Mark where each figure starts and ends.
    #[structopt(long)]
    start_end_points: bool,
    /// The output path to write to (autodetects image type from extension).
    ///
    /// If this is not provided, then the output goes to stdout as a PNG.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// The undistorted video frame to draw on.
    #[structopt(parse(from_os_str))]
    input: PathBuf,
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let flight = Flight::read(&opt.flight).expect("failed to read flight file");
    let calibration = opt
        .calibration
        .as_deref()
        .or_else(|| flight.calibration_path())
        .expect("no calibration given and the flight names none");
    let camera = CameraModel::load(calibration).expect("failed to load calibration file");

    let settings = opt
        .settings
        .as_ref()
        .and_then(|path| ProcessorSettings::read(path).ok());
    if settings.is_some() {
        info!("loaded existing settings");
    } else {
        info!("used default settings");
    }
    let settings = settings.unwrap_or_default();

    let (commands, command_rx) = channel();
    let (event_tx, events) = channel();
    let mut processor = Processor::new(flight, Some(camera), settings, command_rx, event_tx);
    let solved = events.try_iter().any(|event| match event {
        Event::PoseSolved(solution) => {
            info!("camera located with {:.2} px rms error", solution.rms_error);
            true
        }
        Event::PoseSolveFailed(err) => {
            error!("failed to locate the camera: {}", err);
            false
        }
        _ => false,
    });
    if !solved {
        error!("the flight needs four valid locator points");
        std::process::exit(1);
    }

    for &id in &opt.figures {
        commands.send(Command::ToggleFigure(id, true)).expect("processor is gone");
    }
    commands
        .send(Command::ToggleDiagnostics(opt.diagnostics))
        .expect("processor is gone");
    commands
        .send(Command::ToggleStartEndPoints(opt.start_end_points))
        .expect("processor is gone");
    if opt.axis {
        commands.send(Command::ToggleAxis(true)).expect("processor is gone");
    }

    let mut frame = image::open(&opt.input)
        .expect("failed to open image file")
        .to_rgb8();
    let report = processor.process_frame(&mut frame, None);
    if let Some(render) = report.render {
        for diagnostic in render.diagnostics {
            warn!("{:?}", diagnostic);
        }
    }

    let image = DynamicImage::ImageRgb8(frame);
    if let Some(path) = opt.output {
        image.save(path).expect("failed to write image file");
    } else {
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageOutputFormat::Png)
            .expect("failed to encode image");
        std::io::stdout()
            .lock()
            .write_all(png.get_ref())
            .expect("failed to write image to stdout");
    }
}
