//! Horizontal runs of anchor-colored pixels.

use crate::classify::{AnchorClassifier, GROUP_BYTES, GROUP_PIXELS};
use colorbar_core::RgbaImageView;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A maximal run of anchor pixels on one row; `start..=end` are columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanLine {
    pub start: i32,
    pub end: i32,
    pub row: i32,
}

impl ScanLine {
    #[inline]
    pub fn pixel_count(&self) -> i32 {
        self.end - self.start + 1
    }
}

/// Extract all runs, row by row, left to right, into `dst`.
///
/// Returns the number of runs written. Extraction stops as soon as `dst` is
/// full, so a short buffer silently drops the remaining runs.
///
/// Panics if the image width is not a multiple of [`GROUP_PIXELS`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(width = image.width, height = image.height))
)]
pub fn find_scan_lines(
    image: &RgbaImageView<'_>,
    classifier: &AnchorClassifier,
    dst: &mut [ScanLine],
) -> usize {
    assert!(
        image.width % GROUP_PIXELS == 0,
        "image width {} is not a multiple of {}",
        image.width,
        GROUP_PIXELS
    );

    let mut found = 0usize;
    for y in 0..image.height {
        let mut open: Option<ScanLine> = None;

        for (g, group) in image.row(y).chunks_exact(GROUP_BYTES).enumerate() {
            let mask = classifier.classify_group(group);
            if mask.is_empty() {
                if let Some(line) = open.take() {
                    if !emit(dst, &mut found, line) {
                        return found;
                    }
                }
                continue;
            }

            for i in 0..GROUP_PIXELS {
                let x = (g * GROUP_PIXELS + i) as i32;
                if mask.is_set(i) {
                    match open.as_mut() {
                        Some(line) => line.end = x,
                        None => {
                            open = Some(ScanLine {
                                start: x,
                                end: x,
                                row: y as i32,
                            })
                        }
                    }
                } else if let Some(line) = open.take() {
                    if !emit(dst, &mut found, line) {
                        return found;
                    }
                }
            }
        }

        // Run reaching the right edge.
        if let Some(line) = open.take() {
            if !emit(dst, &mut found, line) {
                return found;
            }
        }
    }

    found
}

#[inline]
fn emit(dst: &mut [ScanLine], found: &mut usize, line: ScanLine) -> bool {
    match dst.get_mut(*found) {
        Some(slot) => {
            *slot = line;
            *found += 1;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassificationConfig;
    use colorbar_core::RgbaImage;

    const YELLOW: [u8; 4] = [240, 220, 30, 255];
    const GRAY: [u8; 4] = [90, 90, 90, 255];

    fn classifier() -> AnchorClassifier {
        AnchorClassifier::new(ClassificationConfig::default())
    }

    #[test]
    fn single_row_yields_two_runs_in_order() {
        let mut img = RgbaImage::filled(32, 1, GRAY);
        img.fill_rect(0, 0, 7, 0, YELLOW);
        img.fill_rect(16, 0, 23, 0, YELLOW);

        let mut dst = [ScanLine::default(); 8];
        let n = find_scan_lines(&img.view(), &classifier(), &mut dst);
        assert_eq!(n, 2);
        assert_eq!(
            dst[0],
            ScanLine {
                start: 0,
                end: 7,
                row: 0
            }
        );
        assert_eq!(
            dst[1],
            ScanLine {
                start: 16,
                end: 23,
                row: 0
            }
        );
    }

    #[test]
    fn runs_cross_group_boundaries_and_close_at_row_end() {
        let mut img = RgbaImage::filled(16, 2, GRAY);
        img.fill_rect(5, 0, 10, 0, YELLOW);
        img.fill_rect(13, 1, 15, 1, YELLOW);

        let mut dst = [ScanLine::default(); 8];
        let n = find_scan_lines(&img.view(), &classifier(), &mut dst);
        assert_eq!(n, 2);
        assert_eq!((dst[0].start, dst[0].end, dst[0].row), (5, 10, 0));
        assert_eq!((dst[1].start, dst[1].end, dst[1].row), (13, 15, 1));
        assert_eq!(dst[0].pixel_count(), 6);
    }

    #[test]
    fn runs_do_not_continue_across_rows() {
        let mut img = RgbaImage::filled(8, 2, GRAY);
        img.fill_rect(6, 0, 7, 0, YELLOW);
        img.fill_rect(0, 1, 1, 1, YELLOW);

        let mut dst = [ScanLine::default(); 4];
        let n = find_scan_lines(&img.view(), &classifier(), &mut dst);
        assert_eq!(n, 2);
        assert_eq!(dst[0].row, 0);
        assert_eq!(dst[1].row, 1);
    }

    #[test]
    fn full_buffer_truncates_silently() {
        let mut img = RgbaImage::filled(16, 4, GRAY);
        for y in 0..4 {
            img.fill_rect(2, y, 4, y, YELLOW);
        }
        let mut dst = [ScanLine::default(); 3];
        let n = find_scan_lines(&img.view(), &classifier(), &mut dst);
        assert_eq!(n, 3);
        assert_eq!(dst[2].row, 2);

        let n = find_scan_lines(&img.view(), &classifier(), &mut []);
        assert_eq!(n, 0);
    }

    #[test]
    #[should_panic(expected = "not a multiple")]
    fn misaligned_width_is_rejected() {
        let img = RgbaImage::filled(12, 1, GRAY);
        let mut dst = [ScanLine::default(); 1];
        find_scan_lines(&img.view(), &classifier(), &mut dst);
    }
}
