//! JSON configuration and report helpers.

use crate::finder::{
    ArenaCapacities, ArenaError, BarCodeFinder, BarCodePattern, BoundingBox,
    ClassificationConfig, DetectParams, FrameSummary, ScratchArena, SearchRequest, Segment,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Per-request search settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub min_match_score: f32,
    /// Shortest accepted colorful segment, in pixels.
    pub min_segment_length: u32,
    /// Matches kept per request.
    pub result_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_match_score: 0.1,
            min_segment_length: 8,
            result_capacity: 16,
        }
    }
}

/// Everything needed to run detection on a still image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    pub classification: ClassificationConfig,
    pub max_spacing: u32,
    pub capacities: ArenaCapacities,
    pub search: SearchConfig,
}

impl Default for DetectConfig {
    fn default() -> Self {
        let params = DetectParams::default();
        Self {
            classification: params.classification,
            max_spacing: params.max_spacing,
            capacities: ArenaCapacities::default(),
            search: SearchConfig::default(),
        }
    }
}

impl DetectConfig {
    /// Load a JSON config from disk. Missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        read_json(path.as_ref())
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json(self, path.as_ref())
    }

    pub fn build_params(&self) -> DetectParams {
        DetectParams {
            classification: self.classification,
            max_spacing: self.max_spacing,
        }
    }

    pub fn build_finder(&self) -> BarCodeFinder {
        BarCodeFinder::new(self.build_params())
    }

    pub fn build_arena(&self) -> Result<ScratchArena, ArenaError> {
        ScratchArena::try_new(self.capacities)
    }

    pub fn build_request(&self, pattern: BarCodePattern) -> Result<SearchRequest, ArenaError> {
        SearchRequest::try_new(
            pattern,
            self.search.min_segment_length,
            self.search.min_match_score,
            self.search.result_capacity,
        )
    }
}

/// One reported match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub score: f32,
    pub segment: Segment,
    pub length: u32,
    pub first_box: BoundingBox,
    pub second_box: BoundingBox,
}

/// Results of one request over one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectReport {
    pub image_path: String,
    pub width: usize,
    pub height: usize,
    pub pattern: BarCodePattern,
    pub summary: FrameSummary,
    pub matches: Vec<MatchReport>,
}

impl DetectReport {
    /// Snapshot the matches currently held by `request`.
    pub fn from_request(
        image_path: impl Into<String>,
        width: usize,
        height: usize,
        summary: FrameSummary,
        request: &SearchRequest,
    ) -> Self {
        let matches = request
            .matches()
            .map(|m| MatchReport {
                score: m.score,
                segment: m.appearance.segment,
                length: m.appearance.length(),
                first_box: m.appearance.first_box,
                second_box: m.appearance.second_box,
            })
            .collect();
        Self {
            image_path: image_path.into(),
            width,
            height,
            pattern: *request.pattern(),
            summary,
            matches,
        }
    }

    pub fn best(&self) -> Option<&MatchReport> {
        self.matches.first()
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        read_json(path.as_ref())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json(self, path.as_ref())
    }
}
