//! Bounded, descending ranking of appearances against one pattern.

use crate::pattern::{match_score, BarCodePattern};
use crate::sample::Appearance;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Score `appearances` against `pattern` and keep the best ones.
///
/// `refs[..n]` receives indices into `appearances` and `scores[..n]` their
/// scores, sorted by non-increasing score; `n` is returned. Appearances whose
/// segment is shorter than `min_segment_length` or whose score is below
/// `min_match_score` are ignored. Equal scores keep discovery order. The
/// capacity is the shorter of the two buffers; once full, a new entry pushes
/// out the lowest one, and an entry that would rank last is dropped.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(pattern = %pattern, appearances = appearances.len()))
)]
pub fn rank_appearances(
    pattern: &BarCodePattern,
    min_segment_length: u32,
    min_match_score: f32,
    appearances: &[Appearance],
    refs: &mut [usize],
    scores: &mut [f32],
) -> usize {
    let capacity = refs.len().min(scores.len());
    if capacity == 0 {
        return 0;
    }

    let mut count = 0usize;
    for (idx, appearance) in appearances.iter().enumerate() {
        if appearance.length() < min_segment_length {
            continue;
        }
        let score = match_score(pattern, appearance);
        if score < min_match_score {
            continue;
        }

        let pos = scores[..count]
            .iter()
            .position(|&s| score > s)
            .unwrap_or(count);
        if pos >= capacity {
            continue;
        }

        let keep = count.min(capacity - 1);
        refs.copy_within(pos..keep, pos + 1);
        scores.copy_within(pos..keep, pos + 1);
        refs[pos] = idx;
        scores[pos] = score;
        count = keep + 1;
    }
    count
}
