//! Reusable search requests with their own result buffers.

use crate::arena::{alloc_filled, ArenaError};
use crate::pattern::BarCodePattern;
use crate::sample::Appearance;

/// One ranked hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match<'a> {
    pub appearance: &'a Appearance,
    pub score: f32,
}

/// A pattern to look for plus the buffer its matches are copied into.
///
/// The buffer is sized once in [`SearchRequest::try_new`] and holds the
/// matches of the most recent detection pass, best first.
#[derive(Clone, Debug)]
pub struct SearchRequest {
    pattern: BarCodePattern,
    pub min_segment_length: u32,
    pub min_match_score: f32,
    results: Vec<Appearance>,
    scores: Vec<f32>,
    count: usize,
}

impl SearchRequest {
    pub fn try_new(
        pattern: BarCodePattern,
        min_segment_length: u32,
        min_match_score: f32,
        capacity: usize,
    ) -> Result<Self, ArenaError> {
        Ok(Self {
            pattern,
            min_segment_length,
            min_match_score,
            results: alloc_filled("request results", capacity, Appearance::default())?,
            scores: alloc_filled("request scores", capacity, 0.0f32)?,
            count: 0,
        })
    }

    pub fn pattern(&self) -> &BarCodePattern {
        &self.pattern
    }

    pub fn capacity(&self) -> usize {
        self.results.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn matches(&self) -> impl ExactSizeIterator<Item = Match<'_>> + '_ {
        self.results[..self.count]
            .iter()
            .zip(&self.scores[..self.count])
            .map(|(appearance, &score)| Match { appearance, score })
    }

    pub fn get(&self, index: usize) -> Option<Match<'_>> {
        (index < self.count).then(|| Match {
            appearance: &self.results[index],
            score: self.scores[index],
        })
    }

    pub fn best(&self) -> Option<Match<'_>> {
        self.get(0)
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Write `slot`, which must be at most the current length.
    pub(crate) fn store(&mut self, slot: usize, appearance: Appearance, score: f32) {
        debug_assert!(slot <= self.count);
        self.results[slot] = appearance;
        self.scores[slot] = score;
        self.count = self.count.max(slot + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_is_empty() {
        let r = SearchRequest::try_new("RGB".parse().expect("pattern"), 8, 0.1, 3).expect("request");
        assert_eq!(r.capacity(), 3);
        assert!(r.is_empty());
        assert!(r.best().is_none());
        assert_eq!(r.matches().len(), 0);
    }

    #[test]
    fn stored_matches_are_visible_until_cleared() {
        let mut r = SearchRequest::try_new("R".parse().expect("pattern"), 0, 0.0, 2).expect("request");
        r.store(0, Appearance::default(), 0.75);
        r.store(1, Appearance::default(), 0.5);
        assert_eq!(r.len(), 2);
        assert_eq!(r.best().map(|m| m.score), Some(0.75));
        assert_eq!(r.matches().map(|m| m.score).collect::<Vec<_>>(), vec![0.75, 0.5]);
        assert!(r.get(2).is_none());
        r.clear();
        assert!(r.is_empty());
    }
}
