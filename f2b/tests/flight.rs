mod common;

use common::{write_calibration, write_video};
use f2b::core::KeyPoint;
use f2b::{Flight, FlightError, FlightOptions};

#[test]
fn flight_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let video = write_video(dir.path());
    let calibration = write_calibration(dir.path());
    let pts = vec![(942., 1001.), (936., 962.), (519., 964.), (1348., 954.)];
    let r = 21.336;
    let mr = 25.;
    let mh = 1.51;
    let so = (1., -0.7, 0.);

    let f1 = Flight::new(
        &video,
        FlightOptions {
            calibration_path: Some(calibration.clone()),
            flight_radius: r,
            marker_radius: mr,
            marker_height: mh,
            sphere_offset: so,
            loc_pts: pts.clone(),
            ..FlightOptions::default()
        },
    )
    .unwrap();
    let flight_path = dir.path().join("test.flight");
    f1.write(&flight_path).unwrap();
    assert!(flight_path.exists());
    let f2 = Flight::read(&flight_path).unwrap();

    assert_eq!(f1, f2);
    assert_eq!(f2.video_path(), video.as_path());
    assert_eq!(f2.calibration_path(), Some(calibration.as_path()));
    assert!(f1.is_calibrated() && f2.is_calibrated());
    assert!(f1.is_located() && f2.is_located());
    let options = f2.options();
    assert!(!options.is_live);
    assert_eq!(options.flight_radius, r);
    assert_eq!(options.marker_radius, mr);
    assert_eq!(options.marker_height, mh);
    assert_eq!(options.sphere_offset, so);
    assert_eq!(options.loc_pts, pts);
    assert_eq!(f2.geometry().flight_radius(), r);
}

#[test]
fn defaults_fill_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("minimal.flight");
    std::fs::write(&path, r#"{ "video_path": "flight.mp4" }"#).unwrap();
    let flight = Flight::read(&path).unwrap();
    assert_eq!(flight.options(), &FlightOptions::default());
    assert_eq!(flight.geometry().marker_height(), 1.5);
    assert!(!flight.is_calibrated());
    assert!(!flight.is_located());
}

#[test]
fn missing_calibration_is_not_calibrated() {
    let dir = tempfile::tempdir().unwrap();
    let flight = Flight::new(
        "flight.mp4",
        FlightOptions {
            calibration_path: Some(dir.path().join("missing.json")),
            loc_pts: vec![(1., 2.), (3., 4.), (5., 6.), (7., 8.)],
            ..FlightOptions::default()
        },
    )
    .unwrap();
    assert!(!flight.is_calibrated());
    assert!(!flight.is_located());
}

#[test]
fn live_video_needs_camera_and_frame_rate() {
    let live = FlightOptions {
        is_live: true,
        ..FlightOptions::default()
    };
    assert!(matches!(
        Flight::new("", live.clone()),
        Err(FlightError::MissingCameraIndex)
    ));

    let no_fps = FlightOptions {
        cam_index: Some(0),
        ..live.clone()
    };
    assert!(matches!(
        Flight::new("", no_fps.clone()),
        Err(FlightError::FrameRate(None))
    ));

    let zero_fps = FlightOptions {
        live_fps: Some(0.0),
        ..no_fps.clone()
    };
    assert!(matches!(
        Flight::new("", zero_fps),
        Err(FlightError::FrameRate(Some(_)))
    ));

    let ok = FlightOptions {
        live_fps: Some(30.0),
        ..no_fps
    };
    assert!(Flight::new("", ok).is_ok());
}

#[test]
fn invalid_geometry_and_points_are_rejected() {
    let flat = FlightOptions {
        flight_radius: 0.0,
        ..FlightOptions::default()
    };
    assert!(matches!(
        Flight::new("f.mp4", flat),
        Err(FlightError::Geometry(_))
    ));

    let sunk = FlightOptions {
        marker_height: -1.0,
        ..FlightOptions::default()
    };
    assert!(matches!(
        Flight::new("f.mp4", sunk),
        Err(FlightError::Geometry(_))
    ));

    let crowded = FlightOptions {
        loc_pts: vec![(0., 0.); 5],
        ..FlightOptions::default()
    };
    assert!(matches!(
        Flight::new("f.mp4", crowded),
        Err(FlightError::TooManyPoints(5))
    ));

    let mut flight = Flight::new("f.mp4", FlightOptions::default()).unwrap();
    let err = flight
        .set_locator_points(&[KeyPoint::new(1.0, 2.0), KeyPoint::new(f64::NAN, 0.0)])
        .unwrap_err();
    assert!(matches!(err, FlightError::NonFinitePoint(1)));
    assert!(flight.options().loc_pts.is_empty());
}

#[test]
fn invalid_file_is_rejected_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.flight");
    std::fs::write(&path, r#"{ "video_path": "f.mp4", "marker_radius": -3.0 }"#).unwrap();
    assert!(matches!(Flight::read(&path), Err(FlightError::Json(_))));
    assert!(matches!(
        Flight::read(dir.path().join("nope.flight")),
        Err(FlightError::Io(_))
    ));
}
