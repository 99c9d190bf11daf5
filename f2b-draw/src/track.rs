use crate::color::track_color;
use crate::renderer::{guard_extent, in_guard};
use f2b_core::nalgebra::Point2;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use itertools::Itertools;
use std::collections::VecDeque;

/// Default number of frames kept in the track.
pub const DEFAULT_TRACK_LENGTH: usize = 90;

/// The recent screen positions of the aircraft, most recent first.
///
/// A frame where the aircraft was not found is kept as a hole so the trail is
/// broken there instead of bridging the gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: VecDeque<Option<Point2<f64>>>,
    max_len: usize,
}

impl Track {
    pub fn new(max_len: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(max_len + 1),
            max_len,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Records the position for a new frame, dropping the oldest beyond the window.
    pub fn push(&mut self, point: Option<Point2<f64>>) {
        self.points.push_front(point);
        self.points.truncate(self.max_len);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> impl Iterator<Item = Option<Point2<f64>>> + '_ {
        self.points.iter().copied()
    }

    pub fn segments(&self) -> Vec<TrackSegment> {
        track_segments(self.points(), self.max_len)
    }

    pub fn draw(&self, frame: &mut RgbImage) -> usize {
        draw_track(frame, &self.segments())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSegment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    /// Index of the segment's older point in the track.
    pub index: usize,
    /// `index / window length`: 0 is the most recent, 1 the oldest.
    pub fraction: f64,
    pub color: Rgb<u8>,
}

/// The segments between consecutive known points. Segments touching a hole or a
/// non-finite point are left out.
pub fn track_segments(
    points: impl IntoIterator<Item = Option<Point2<f64>>>,
    max_len: usize,
) -> Vec<TrackSegment> {
    let valid = |p: Option<Point2<f64>>| p.filter(|p| p.x.is_finite() && p.y.is_finite());
    points
        .into_iter()
        .map(valid)
        .tuple_windows()
        .enumerate()
        .filter_map(|(k, pair)| match pair {
            (Some(start), Some(end)) => {
                let index = k + 1;
                let fraction = index as f64 / max_len.max(1) as f64;
                Some(TrackSegment {
                    start,
                    end,
                    index,
                    fraction,
                    color: track_color(fraction),
                })
            }
            _ => None,
        })
        .collect()
}

/// Draws the segments and returns how many were drawn. Segments reaching far outside
/// the frame are left out.
pub fn draw_track(frame: &mut RgbImage, segments: &[TrackSegment]) -> usize {
    let guard = guard_extent(frame);
    let mut drawn = 0;
    for segment in segments {
        if !(in_guard(&segment.start, guard) && in_guard(&segment.end, guard)) {
            continue;
        }
        draw_line_segment_mut(
            frame,
            (segment.start.x as i32 as f32, segment.start.y as i32 as f32),
            (segment.end.x as i32 as f32, segment.end.y as i32 as f32),
            segment.color,
        );
        drawn += 1;
    }
    drawn
}
