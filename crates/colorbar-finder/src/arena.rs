//! Preallocated scratch memory shared by every request in a frame.

use crate::cluster::BoundingBox;
use crate::pattern::BarCodePattern;
use crate::rank::rank_appearances;
use crate::request::SearchRequest;
use crate::sample::Appearance;
use crate::scan::ScanLine;
use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("failed to allocate {capacity} entries for {buffer}")]
    Allocation {
        buffer: &'static str,
        capacity: usize,
        #[source]
        source: TryReserveError,
    },
}

/// `Vec` of `len` copies of `value`, reserved fallibly.
pub(crate) fn alloc_filled<T: Clone>(
    buffer: &'static str,
    len: usize,
    value: T,
) -> Result<Vec<T>, ArenaError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|source| ArenaError::Allocation {
            buffer,
            capacity: len,
            source,
        })?;
    v.resize(len, value);
    Ok(v)
}

/// Entry counts for each [`ScratchArena`] buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaCapacities {
    pub scan_lines: usize,
    pub boxes: usize,
    /// Upper bound on scan lines merged into one box.
    pub cluster_indices: usize,
    pub appearances: usize,
    /// Ranked candidates kept per request before copying out.
    pub ranking: usize,
}

impl Default for ArenaCapacities {
    fn default() -> Self {
        Self {
            scan_lines: 4096,
            boxes: 256,
            cluster_indices: 1024,
            appearances: 1024,
            ranking: 256,
        }
    }
}

impl ArenaCapacities {
    /// Capacities scaled to a frame size: a few runs per row and enough index
    /// scratch for a bar as tall as the image.
    pub fn for_image(width: usize, height: usize) -> Self {
        let base = Self::default();
        let rows = height.max(1);
        Self {
            scan_lines: base.scan_lines.max(rows.saturating_mul(4)),
            cluster_indices: base.cluster_indices.max(rows.saturating_mul(2)),
            boxes: base.boxes.max(width.saturating_mul(rows) / 4096),
            ..base
        }
    }
}

/// Caller-owned buffers for one detection pass.
///
/// Allocate once with [`ScratchArena::try_new`] and reuse it for every frame.
/// The pipeline never grows any buffer; each stage truncates at capacity.
#[derive(Debug)]
pub struct ScratchArena {
    capacities: ArenaCapacities,
    pub(crate) scan_lines: Vec<ScanLine>,
    pub(crate) visited: Vec<bool>,
    pub(crate) boxes: Vec<BoundingBox>,
    pub(crate) cluster_indices: Vec<usize>,
    pub(crate) appearances: Vec<Appearance>,
    pub(crate) ranked_refs: Vec<usize>,
    pub(crate) ranked_scores: Vec<f32>,
    pub(crate) scan_line_count: usize,
    pub(crate) box_count: usize,
    pub(crate) appearance_count: usize,
    pub(crate) section_count: usize,
}

impl ScratchArena {
    pub fn try_new(capacities: ArenaCapacities) -> Result<Self, ArenaError> {
        let c = capacities;
        Ok(Self {
            capacities,
            scan_lines: alloc_filled("scan lines", c.scan_lines, ScanLine::default())?,
            visited: alloc_filled("visited flags", c.scan_lines, false)?,
            boxes: alloc_filled("bounding boxes", c.boxes, BoundingBox::default())?,
            cluster_indices: alloc_filled("cluster indices", c.cluster_indices, 0usize)?,
            appearances: alloc_filled("appearances", c.appearances, Appearance::default())?,
            ranked_refs: alloc_filled("ranking refs", c.ranking, 0usize)?,
            ranked_scores: alloc_filled("ranking scores", c.ranking, 0.0f32)?,
            scan_line_count: 0,
            box_count: 0,
            appearance_count: 0,
            section_count: 0,
        })
    }

    pub fn capacities(&self) -> &ArenaCapacities {
        &self.capacities
    }

    /// Scan lines from the most recent pass.
    pub fn scan_lines(&self) -> &[ScanLine] {
        &self.scan_lines[..self.scan_line_count]
    }

    /// Bounding boxes from the most recent pass.
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes[..self.box_count]
    }

    /// Appearances from the most recent pass.
    pub fn appearances(&self) -> &[Appearance] {
        &self.appearances[..self.appearance_count]
    }

    /// Section count the current appearances were sampled with, `0` before
    /// the first pass.
    pub fn section_count(&self) -> usize {
        self.section_count
    }

    pub(crate) fn reset(&mut self) {
        self.scan_line_count = 0;
        self.box_count = 0;
        self.appearance_count = 0;
        self.section_count = 0;
    }

    /// Rank the current appearances for `pattern` in the shared ranking
    /// scratch. Returns the ranked count.
    fn rank(
        &mut self,
        pattern: &BarCodePattern,
        min_segment_length: u32,
        min_match_score: f32,
    ) -> usize {
        rank_appearances(
            pattern,
            min_segment_length,
            min_match_score,
            &self.appearances[..self.appearance_count],
            &mut self.ranked_refs,
            &mut self.ranked_scores,
        )
    }

    /// Rank the current appearances against `request` and copy the best
    /// `min(ranked, request capacity)` into its result buffer.
    ///
    /// An arena with no appearances clears the request. Once a pass has run,
    /// panics if the request's pattern length differs from the sampled
    /// section count, even when that pass found nothing.
    pub fn evaluate_request(&mut self, request: &mut SearchRequest) -> usize {
        request.clear();
        if self.section_count != 0 {
            assert_eq!(
                request.pattern().len(),
                self.section_count,
                "request pattern length must equal the sampled section count"
            );
        }
        if self.appearance_count == 0 {
            return 0;
        }

        let ranked = self.rank(
            request.pattern(),
            request.min_segment_length,
            request.min_match_score,
        );
        if ranked == self.capacities.ranking && ranked > 0 {
            log::debug!("ranking buffer reached capacity ({ranked})");
        }

        let kept = ranked.min(request.capacity());
        for slot in 0..kept {
            let appearance = self.appearances[self.ranked_refs[slot]];
            request.store(slot, appearance, self.ranked_scores[slot]);
        }
        log::debug!("request {}: {ranked} ranked, {kept} kept", request.pattern());
        kept
    }
}
