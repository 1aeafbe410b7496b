//! Integer ray walking between two pixels.

use crate::classify::AnchorClassifier;
use colorbar_core::RgbaImageView;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Bresenham walk from `start` to `end`, both inclusive.
///
/// Every pixel of the discrete line is yielded exactly once, in order.
#[derive(Clone, Debug)]
pub struct BresenhamLine {
    current: Point2<i32>,
    end: Point2<i32>,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl BresenhamLine {
    pub fn new(start: Point2<i32>, end: Point2<i32>) -> Self {
        let dx = (end.x - start.x).abs();
        let dy = (end.y - start.y).abs();
        Self {
            current: start,
            end,
            dx,
            dy,
            sx: if start.x < end.x { 1 } else { -1 },
            sy: if start.y < end.y { 1 } else { -1 },
            err: (if dx > dy { dx } else { -dy }) / 2,
            done: false,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = Point2<i32>;

    fn next(&mut self) -> Option<Point2<i32>> {
        if self.done {
            return None;
        }
        let p = self.current;
        if p == self.end {
            self.done = true;
            return Some(p);
        }

        let e = self.err;
        if e > -self.dx {
            self.err -= self.dy;
            self.current.x += self.sx;
        }
        if e < self.dy {
            self.err += self.dx;
            self.current.y += self.sy;
        }
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = (self.end.x - self.current.x)
            .abs()
            .max((self.end.y - self.current.y).abs()) as usize
            + 1;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BresenhamLine {}

impl std::iter::FusedIterator for BresenhamLine {}

/// Truncated Euclidean distance in whole pixels.
#[inline]
pub fn pixel_distance(a: Point2<i32>, b: Point2<i32>) -> u32 {
    let dx = i64::from(b.x - a.x);
    let dy = i64::from(b.y - a.y);
    ((dx * dx + dy * dy) as f64).sqrt() as u32
}

/// The colorful stretch of a ray between two anchor bars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point2<i32>,
    pub end: Point2<i32>,
}

impl Segment {
    pub fn new(start: Point2<i32>, end: Point2<i32>) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(&self) -> u32 {
        pixel_distance(self.start, self.end)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn pixels(&self) -> BresenhamLine {
        BresenhamLine::new(self.start, self.end)
    }
}

/// Walk from `from` to `to` and locate the non-anchor stretch between the
/// two anchor bars.
///
/// The leading anchor run is skipped and the first non-anchor pixel becomes
/// the start. Each time the walk re-enters anchor color, the pixel just
/// before it becomes the provisional end; colorful pixels after that are an
/// interior anomaly and the walk goes on. The last re-entry wins.
///
/// With no colorful pixel at all the segment is `from..to` collapsed to the
/// box centers; with no re-entry the end stays at `to`.
pub fn refine_segment(
    image: &RgbaImageView<'_>,
    classifier: &AnchorClassifier,
    from: Point2<i32>,
    to: Point2<i32>,
) -> Segment {
    let mut segment = Segment::new(from, to);
    let mut found_start = false;
    let mut in_color = false;
    let mut prev = from;

    for p in BresenhamLine::new(from, to) {
        let [r, g, b] = image.rgb(p.x, p.y);
        if classifier.is_anchor(r, g, b) {
            if in_color {
                segment.end = prev;
                in_color = false;
            }
        } else if !in_color {
            if !found_start {
                segment.start = p;
                found_start = true;
            }
            in_color = true;
        }
        prev = p;
    }

    segment
}
