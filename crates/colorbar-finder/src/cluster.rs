//! Grouping scan lines into anchor bounding boxes.
//!
//! Lines are merged by transitive adjacency: a box is every line reachable
//! from its seed through a chain of pairwise-adjacent lines. The member list
//! lives in caller-provided index scratch, so clustering never allocates.

use crate::scan::ScanLine;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tight box around a cluster of scan lines, inclusive on all sides.
///
/// A single run on one row has `top == bottom`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    /// `false` when the index scratch ran out while merging; the true
    /// cluster may extend beyond this box.
    pub is_complete: bool,
}

impl BoundingBox {
    pub fn from_line(line: &ScanLine) -> Self {
        Self {
            left: line.start,
            top: line.row,
            right: line.end,
            bottom: line.row,
            is_complete: true,
        }
    }

    /// Grow to cover `line`.
    pub fn include(&mut self, line: &ScanLine) {
        self.left = self.left.min(line.start);
        self.right = self.right.max(line.end);
        self.top = self.top.min(line.row);
        self.bottom = self.bottom.max(line.row);
    }

    /// Integer midpoint, rounded toward zero.
    #[inline]
    pub fn center(&self) -> Point2<i32> {
        Point2::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }
}

/// Are `a` and `b` within `spacing` pixels of each other?
///
/// Vertically touching rows count as spacing zero, so the row test is
/// `<= spacing + 1`. Horizontally, at least one endpoint of either line must
/// fall within `spacing` of the other line's span.
#[inline]
pub fn lines_adjacent(a: &ScanLine, b: &ScanLine, spacing: i32) -> bool {
    let spacing = i64::from(spacing);
    if (i64::from(a.row) - i64::from(b.row)).abs() > spacing + 1 {
        return false;
    }
    let near = |x: i32, span: &ScanLine| {
        let x = i64::from(x);
        x + spacing >= i64::from(span.start) && x - spacing <= i64::from(span.end)
    };
    near(a.start, b) || near(b.start, a) || near(a.end, b) || near(b.end, a)
}

/// Cluster `lines` into boxes written to `dst`; returns the box count.
///
/// `visited` must hold at least `lines.len()` flags; its contents on entry
/// are ignored. `index_scratch` bounds how many lines one box can absorb:
/// lines that do not fit stay unvisited (they may seed a later box) and the
/// box is marked incomplete. Output stops once `dst` is full.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(lines = lines.len()))
)]
pub fn find_bounding_boxes(
    lines: &[ScanLine],
    visited: &mut [bool],
    max_spacing: u32,
    index_scratch: &mut [usize],
    dst: &mut [BoundingBox],
) -> usize {
    assert!(
        visited.len() >= lines.len(),
        "visited flags ({}) shorter than scan lines ({})",
        visited.len(),
        lines.len()
    );
    let spacing = i32::try_from(max_spacing).unwrap_or(i32::MAX);
    let visited = &mut visited[..lines.len()];
    visited.fill(false);

    let mut count = 0usize;
    for seed in 0..lines.len() {
        if visited[seed] {
            continue;
        }

        let (members, complete) = collect_cluster(lines, visited, seed, spacing, index_scratch);

        let mut bbox = BoundingBox::from_line(&lines[seed]);
        for &idx in &index_scratch[..members] {
            bbox.include(&lines[idx]);
        }
        bbox.is_complete = complete;

        let Some(slot) = dst.get_mut(count) else {
            return count;
        };
        *slot = bbox;
        count += 1;
    }

    count
}

/// Breadth-first growth from `seed`. Returns the number of member indices
/// written to `scratch` and whether every adjacent line fit.
fn collect_cluster(
    lines: &[ScanLine],
    visited: &mut [bool],
    seed: usize,
    spacing: i32,
    scratch: &mut [usize],
) -> (usize, bool) {
    visited[seed] = true;

    // Lines before `seed` are all visited already.
    let later = seed + 1..lines.len();

    if scratch.is_empty() {
        let complete = !later
            .clone()
            .any(|k| !visited[k] && lines_adjacent(&lines[seed], &lines[k], spacing));
        return (0, complete);
    }

    scratch[0] = seed;
    let mut len = 1usize;
    let mut cursor = 0usize;
    let mut complete = true;

    while cursor < len {
        let current = lines[scratch[cursor]];
        cursor += 1;

        for k in later.clone() {
            if visited[k] || !lines_adjacent(&current, &lines[k], spacing) {
                continue;
            }
            if len < scratch.len() {
                scratch[len] = k;
                len += 1;
                visited[k] = true;
            } else {
                complete = false;
            }
        }
    }

    (len, complete)
}
