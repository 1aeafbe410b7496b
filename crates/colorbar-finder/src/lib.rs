//! Detection of color-coded bar markers in RGBA frames.
//!
//! A marker is a short run of red, green and blue sections drawn between two
//! solid anchor-colored bars (yellow with the default thresholds). The
//! pipeline:
//! - classifies pixels eight at a time and extracts horizontal anchor runs,
//! - clusters runs into anchor bounding boxes,
//! - traces every box pair to find the colorful segment between them and
//!   samples it into per-section channel averages,
//! - scores those appearances against each requested pattern, in either
//!   reading direction, and keeps the best ones.
//!
//! All buffers live in a caller-owned [`ScratchArena`] and per-request result
//! buffers, so a detection pass does not allocate.

mod arena;
mod classify;
mod cluster;
mod detector;
mod pattern;
mod rank;
mod request;
mod sample;
mod scan;
mod trace;

pub use arena::{ArenaCapacities, ArenaError, ScratchArena};
pub use classify::{
    is_anchor, AnchorClassifier, ClassificationConfig, GroupMask, GROUP_BYTES, GROUP_PIXELS,
};
pub use cluster::{find_bounding_boxes, lines_adjacent, BoundingBox};
pub use detector::{BarCodeFinder, DetectParams, FrameSummary};
pub use pattern::{match_score, BarCodePattern, BarColor, PatternError};
pub use rank::rank_appearances;
pub use request::{Match, SearchRequest};
pub use sample::{
    channel_dominance, find_appearances, sample_appearance, Appearance, SectionAverage,
    MAX_SECTIONS,
};
pub use scan::{find_scan_lines, ScanLine};
pub use trace::{pixel_distance, refine_segment, BresenhamLine, Segment};

pub use colorbar_core::{RgbaImage, RgbaImageView, RgbaImageViewMut};
