use super::{DetectParams, FrameSummary};
use crate::arena::ScratchArena;
use crate::classify::AnchorClassifier;
use crate::cluster::find_bounding_boxes;
use crate::request::SearchRequest;
use crate::sample::{find_appearances, MAX_SECTIONS};
use crate::scan::find_scan_lines;
use colorbar_core::RgbaImageView;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Color bar detector for a fixed set of parameters.
#[derive(Clone, Debug)]
pub struct BarCodeFinder {
    params: DetectParams,
    classifier: AnchorClassifier,
}

impl BarCodeFinder {
    pub fn new(params: DetectParams) -> Self {
        Self {
            classifier: AnchorClassifier::new(params.classification),
            params,
        }
    }

    #[inline]
    pub fn params(&self) -> &DetectParams {
        &self.params
    }

    #[inline]
    pub fn classifier(&self) -> &AnchorClassifier {
        &self.classifier
    }

    /// Run one pass over `image` and fill every request's result buffer.
    ///
    /// Does nothing when `requests` is empty. All requests must use patterns
    /// of the same length since appearances are sampled once per frame.
    /// Never allocates; every intermediate result lives in `arena`.
    ///
    /// Panics on mismatched pattern lengths or when the image width is not a
    /// multiple of 8.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip_all,
            fields(width = image.width, height = image.height, requests = requests.len())
        )
    )]
    pub fn detect(
        &self,
        image: &RgbaImageView<'_>,
        requests: &mut [SearchRequest],
        arena: &mut ScratchArena,
    ) -> FrameSummary {
        let Some(first) = requests.first() else {
            return FrameSummary::default();
        };
        let section_count = first.pattern().len();
        assert!(
            requests.iter().all(|r| r.pattern().len() == section_count),
            "all search requests must share one pattern length"
        );

        let summary = self.analyze_frame(image, section_count, arena);
        for request in requests.iter_mut() {
            arena.evaluate_request(request);
        }
        summary
    }

    /// Extract, cluster and sample `image` into `arena` without ranking.
    ///
    /// The appearances stay in the arena until the next pass and can be
    /// ranked with [`ScratchArena::evaluate_request`].
    pub fn analyze_frame(
        &self,
        image: &RgbaImageView<'_>,
        section_count: usize,
        arena: &mut ScratchArena,
    ) -> FrameSummary {
        assert!(
            (1..=MAX_SECTIONS).contains(&section_count),
            "section count {section_count} outside 1..={MAX_SECTIONS}"
        );
        arena.reset();

        let lines = find_scan_lines(image, &self.classifier, &mut arena.scan_lines);
        log::debug!("scan lines: {lines}");
        note_full("scan line", lines, arena.scan_lines.len());

        let boxes = find_bounding_boxes(
            &arena.scan_lines[..lines],
            &mut arena.visited,
            self.params.max_spacing,
            &mut arena.cluster_indices,
            &mut arena.boxes,
        );
        let incomplete = arena.boxes[..boxes]
            .iter()
            .filter(|b| !b.is_complete)
            .count();
        log::debug!("bounding boxes: {boxes} ({incomplete} incomplete)");
        note_full("bounding box", boxes, arena.boxes.len());
        if incomplete > 0 {
            log::debug!(
                "cluster index buffer reached capacity ({})",
                arena.cluster_indices.len()
            );
        }
        for b in &arena.boxes[..boxes] {
            log::trace!(
                "box [{}, {}]..[{}, {}] complete={}",
                b.left,
                b.top,
                b.right,
                b.bottom,
                b.is_complete
            );
        }

        let appearances = find_appearances(
            image,
            &self.classifier,
            &arena.boxes[..boxes],
            section_count,
            &mut arena.appearances,
        );
        log::debug!("appearances: {appearances}");
        note_full("appearance", appearances, arena.appearances.len());

        arena.scan_line_count = lines;
        arena.box_count = boxes;
        arena.appearance_count = appearances;
        arena.section_count = section_count;

        FrameSummary {
            scan_lines: lines,
            boxes,
            incomplete_boxes: incomplete,
            appearances,
        }
    }
}

fn note_full(buffer: &str, count: usize, capacity: usize) {
    if count == capacity && capacity > 0 {
        log::debug!("{buffer} buffer reached capacity ({capacity}), output truncated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaCapacities;
    use colorbar_core::RgbaImage;

    #[test]
    fn no_requests_leaves_arena_untouched() {
        let img = RgbaImage::filled(16, 4, [230, 220, 20, 255]);
        let finder = BarCodeFinder::new(DetectParams::default());
        let mut arena = ScratchArena::try_new(ArenaCapacities::default()).expect("arena");
        let summary = finder.detect(&img.view(), &mut [], &mut arena);
        assert_eq!(summary, FrameSummary::default());
        assert!(arena.scan_lines().is_empty());
    }

    #[test]
    #[should_panic(expected = "share one pattern length")]
    fn mismatched_pattern_lengths_panic() {
        let img = RgbaImage::filled(16, 4, [0, 0, 0, 255]);
        let finder = BarCodeFinder::new(DetectParams::default());
        let mut arena = ScratchArena::try_new(ArenaCapacities::default()).expect("arena");
        let mut requests = [
            SearchRequest::try_new("RGB".parse().expect("pattern"), 0, 0.0, 1).expect("request"),
            SearchRequest::try_new("RG".parse().expect("pattern"), 0, 0.0, 1).expect("request"),
        ];
        finder.detect(&img.view(), &mut requests, &mut arena);
    }

    #[test]
    fn solid_anchor_frame_is_one_box_without_appearances() {
        let img = RgbaImage::filled(16, 4, [230, 220, 20, 255]);
        let finder = BarCodeFinder::new(DetectParams::default());
        let mut arena = ScratchArena::try_new(ArenaCapacities::default()).expect("arena");
        let summary = finder.analyze_frame(&img.view(), 3, &mut arena);
        assert_eq!(summary.scan_lines, 4);
        assert_eq!(summary.boxes, 1);
        assert_eq!(summary.appearances, 0);
        assert_eq!(arena.section_count(), 3);
    }
}
