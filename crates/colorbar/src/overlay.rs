//! Debug drawing of pipeline outputs back into an RGBA image.
//!
//! Every function writes through [`RgbaImageViewMut::put`], so coordinates
//! outside the image are clipped.

use crate::core::{RgbaImageViewMut, CHANNELS};
use crate::finder::{
    AnchorClassifier, Appearance, BoundingBox, BresenhamLine, ScanLine, Segment, GROUP_BYTES,
    GROUP_PIXELS,
};

pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const YELLOW: [u8; 4] = [255, 255, 0, 255];
pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];
pub const CYAN: [u8; 4] = [0, 255, 255, 255];

/// Replace every anchor-colored pixel with `rgba`; returns how many were
/// painted.
///
/// Whole 8-pixel groups go through the batch classifier; a trailing partial
/// group (width not a multiple of 8) is classified per pixel.
pub fn paint_anchor_pixels(
    image: &mut RgbaImageViewMut<'_>,
    classifier: &AnchorClassifier,
    rgba: [u8; 4],
) -> usize {
    let mut painted = 0usize;
    let mut groups = image.data.chunks_exact_mut(GROUP_BYTES);
    for group in &mut groups {
        let mask = classifier.classify_group(group);
        if mask.is_empty() {
            continue;
        }
        for (i, px) in group.chunks_exact_mut(CHANNELS).enumerate().take(GROUP_PIXELS) {
            if mask.is_set(i) {
                px.copy_from_slice(&rgba);
                painted += 1;
            }
        }
    }
    for px in groups.into_remainder().chunks_exact_mut(CHANNELS) {
        if classifier.is_anchor(px[0], px[1], px[2]) {
            px.copy_from_slice(&rgba);
            painted += 1;
        }
    }
    painted
}

pub fn draw_scan_lines(image: &mut RgbaImageViewMut<'_>, lines: &[ScanLine], rgba: [u8; 4]) {
    for line in lines {
        for x in line.start..=line.end {
            image.put(x, line.row, rgba);
        }
    }
}

/// One-pixel outline of each box.
pub fn draw_boxes(image: &mut RgbaImageViewMut<'_>, boxes: &[BoundingBox], rgba: [u8; 4]) {
    for b in boxes {
        for x in b.left..=b.right {
            image.put(x, b.top, rgba);
            image.put(x, b.bottom, rgba);
        }
        for y in b.top..=b.bottom {
            image.put(b.left, y, rgba);
            image.put(b.right, y, rgba);
        }
    }
}

pub fn draw_segment(image: &mut RgbaImageViewMut<'_>, segment: &Segment, rgba: [u8; 4]) {
    for p in BresenhamLine::new(segment.start, segment.end) {
        image.put(p.x, p.y, rgba);
    }
}

/// Both anchor boxes in `box_rgba` and the colorful segment in
/// `segment_rgba`.
pub fn draw_appearance(
    image: &mut RgbaImageViewMut<'_>,
    appearance: &Appearance,
    box_rgba: [u8; 4],
    segment_rgba: [u8; 4],
) {
    draw_boxes(
        image,
        &[appearance.first_box, appearance.second_box],
        box_rgba,
    );
    draw_segment(image, &appearance.segment, segment_rgba);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RgbaImage;
    use crate::finder::ClassificationConfig;
    use nalgebra::Point2;

    const ANCHOR: [u8; 4] = [235, 215, 25, 255];
    const GREY: [u8; 4] = [90, 90, 90, 255];

    fn pixel(img: &RgbaImage, x: usize, y: usize) -> [u8; 4] {
        let i = (y * img.width + x) * CHANNELS;
        [img.data[i], img.data[i + 1], img.data[i + 2], img.data[i + 3]]
    }

    #[test]
    fn paints_only_anchor_pixels_including_tail() {
        let mut img = RgbaImage::filled(11, 2, GREY);
        img.fill_rect(2, 0, 3, 0, ANCHOR);
        img.fill_rect(9, 1, 10, 1, ANCHOR);
        let classifier = AnchorClassifier::new(ClassificationConfig::default());

        let n = paint_anchor_pixels(&mut img.view_mut(), &classifier, GREEN);
        assert_eq!(n, 4);
        assert_eq!(pixel(&img, 2, 0), GREEN);
        assert_eq!(pixel(&img, 10, 1), GREEN);
        assert_eq!(pixel(&img, 4, 0), GREY);
    }

    #[test]
    fn box_outline_leaves_interior() {
        let mut img = RgbaImage::filled(8, 8, GREY);
        let b = BoundingBox {
            left: 1,
            top: 1,
            right: 5,
            bottom: 4,
            is_complete: true,
        };
        draw_boxes(&mut img.view_mut(), &[b], YELLOW);
        assert_eq!(pixel(&img, 1, 1), YELLOW);
        assert_eq!(pixel(&img, 5, 4), YELLOW);
        assert_eq!(pixel(&img, 3, 2), GREY);
    }

    #[test]
    fn drawing_clips_outside_image() {
        let mut img = RgbaImage::filled(8, 4, GREY);
        let segment = Segment::new(Point2::new(-5, 1), Point2::new(20, 1));
        draw_segment(&mut img.view_mut(), &segment, RED);
        draw_scan_lines(
            &mut img.view_mut(),
            &[ScanLine {
                start: 6,
                end: 12,
                row: 3,
            }],
            BLUE,
        );
        assert!((0..8).all(|x| pixel(&img, x, 1) == RED));
        assert_eq!(pixel(&img, 7, 3), BLUE);
        assert_eq!(pixel(&img, 5, 3), GREY);
    }
}
