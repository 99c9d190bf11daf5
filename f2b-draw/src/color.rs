use f2b_geom::FigureId;
use image::Rgb;
use palette::{FromColor, Hsv, RgbHue, Srgb};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const CYAN: Rgb<u8> = Rgb([0, 255, 255]);

/// Hue of the most recent track segment, in degrees.
pub const TRACK_RECENT_HUE: f32 = 0.0;
/// Hue of the oldest track segment, in degrees.
pub const TRACK_OLD_HUE: f32 = 120.0;

fn hsv(hue_deg: f32, saturation: f32, value: f32) -> Rgb<u8> {
    let rgb = Srgb::from_color(Hsv::new(RgbHue::from_degrees(hue_deg), saturation, value));
    Rgb([
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    ])
}

pub fn gray(level: u8) -> Rgb<u8> {
    Rgb([level; 3])
}

/// Color of a track segment at `fraction` of the window, from red (recent) to green (old).
pub fn track_color(fraction: f64) -> Rgb<u8> {
    let fraction = fraction.clamp(0.0, 1.0) as f32;
    hsv(
        TRACK_RECENT_HUE + (TRACK_OLD_HUE - TRACK_RECENT_HUE) * fraction,
        1.0,
        1.0,
    )
}

/// Stable pastel color of a figure, spread around the color wheel.
pub fn figure_color(id: FigureId) -> Rgb<u8> {
    let step = 360.0 / FigureId::ALL.len() as f32;
    hsv(40.0 + step * id.index() as f32, 0.3, 1.0)
}
