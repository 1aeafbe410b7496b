//! Section-averaged color sampling along a refined segment.

use crate::classify::AnchorClassifier;
use crate::cluster::BoundingBox;
use crate::trace::{pixel_distance, refine_segment, Segment};
use colorbar_core::RgbaImageView;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Upper bound on sections per appearance (and colors per pattern).
pub const MAX_SECTIONS: usize = 25;

/// One candidate marker: two anchor boxes plus the sampled segment between
/// them. Only the first `section_count` entries of each array are meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub first_box: BoundingBox,
    pub second_box: BoundingBox,
    pub segment: Segment,
    pub section_count: usize,
    pub red_average: [f32; MAX_SECTIONS],
    pub green_average: [f32; MAX_SECTIONS],
    pub blue_average: [f32; MAX_SECTIONS],
    pub pixel_count: [u32; MAX_SECTIONS],
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            first_box: BoundingBox::default(),
            second_box: BoundingBox::default(),
            segment: Segment::default(),
            section_count: 0,
            red_average: [0.0; MAX_SECTIONS],
            green_average: [0.0; MAX_SECTIONS],
            blue_average: [0.0; MAX_SECTIONS],
            pixel_count: [0; MAX_SECTIONS],
        }
    }
}

/// Per-section view of an [`Appearance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionAverage {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub pixels: u32,
}

impl SectionAverage {
    /// Channel averages in `[red, green, blue]` order.
    #[inline]
    pub fn channels(&self) -> [f32; 3] {
        [self.red, self.green, self.blue]
    }
}

impl Appearance {
    #[inline]
    pub fn section(&self, i: usize) -> SectionAverage {
        SectionAverage {
            red: self.red_average[i],
            green: self.green_average[i],
            blue: self.blue_average[i],
            pixels: self.pixel_count[i],
        }
    }

    pub fn sections(&self) -> impl ExactSizeIterator<Item = SectionAverage> + '_ {
        (0..self.section_count).map(|i| self.section(i))
    }

    /// Truncated pixel length of the colorful segment.
    #[inline]
    pub fn length(&self) -> u32 {
        self.segment.length()
    }
}

/// `[red, green, blue]` dominance: `1.0` for a channel strictly greater than
/// both others, `0.0` otherwise. Grey pixels dominate nowhere.
#[inline]
pub fn channel_dominance(r: u8, g: u8, b: u8) -> [f32; 3] {
    let score = |hit: bool| if hit { 1.0 } else { 0.0 };
    [
        score(r > g && r > b),
        score(g > r && g > b),
        score(b > r && b > g),
    ]
}

/// Walk `segment` and average channel dominance over `section_count` equal
/// progress buckets.
///
/// A section that receives no pixels (possible when `section_count` exceeds
/// the segment length) keeps zero averages and a zero pixel count.
///
/// Panics if `section_count` is outside `1..=MAX_SECTIONS`.
pub fn sample_appearance(
    image: &RgbaImageView<'_>,
    section_count: usize,
    first_box: BoundingBox,
    second_box: BoundingBox,
    segment: Segment,
) -> Appearance {
    assert!(
        (1..=MAX_SECTIONS).contains(&section_count),
        "section count {section_count} outside 1..={MAX_SECTIONS}"
    );

    let mut out = Appearance {
        first_box,
        second_box,
        segment,
        section_count,
        ..Appearance::default()
    };

    let total = segment.length().max(1) as f32;
    for p in segment.pixels() {
        let progress = pixel_distance(segment.start, p) as f32 / total;
        let idx = ((progress * section_count as f32) as usize).min(section_count - 1);

        let [r, g, b] = image.rgb(p.x, p.y);
        let [dr, dg, db] = channel_dominance(r, g, b);
        out.red_average[idx] += dr;
        out.green_average[idx] += dg;
        out.blue_average[idx] += db;
        out.pixel_count[idx] += 1;
    }

    for i in 0..section_count {
        let n = out.pixel_count[i];
        if n > 0 {
            let n = n as f32;
            out.red_average[i] /= n;
            out.green_average[i] /= n;
            out.blue_average[i] /= n;
        }
    }

    out
}

/// Refine and sample every unordered box pair `(i, j)`, `i < j`, into `dst`.
///
/// Pairs with a degenerate refined segment are skipped. Returns the number
/// of appearances written; stops once `dst` is full.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(boxes = boxes.len(), sections = section_count))
)]
pub fn find_appearances(
    image: &RgbaImageView<'_>,
    classifier: &AnchorClassifier,
    boxes: &[BoundingBox],
    section_count: usize,
    dst: &mut [Appearance],
) -> usize {
    let mut count = 0usize;
    for (i, first) in boxes.iter().enumerate() {
        for second in &boxes[i + 1..] {
            let segment = refine_segment(image, classifier, first.center(), second.center());
            if segment.is_degenerate() {
                continue;
            }
            let Some(slot) = dst.get_mut(count) else {
                return count;
            };
            *slot = sample_appearance(image, section_count, *first, *second, segment);
            log::trace!(
                "appearance {count}: ({}, {}) -> ({}, {}), {} px",
                segment.start.x,
                segment.start.y,
                segment.end.x,
                segment.end.y,
                segment.length()
            );
            count += 1;
        }
    }
    count
}
